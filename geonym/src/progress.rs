//! Progress reporting and cooperative cancellation.

/// Host callback invoked between pipeline stages.
///
/// Returning `false` aborts the rest of the document run.
pub trait Progress {
    /// `percent` of the run is done out of `total` stages.
    fn on_progress(&mut self, percent: u8, total: usize) -> bool;
}

impl<F> Progress for F
where
    F: FnMut(u8, usize) -> bool,
{
    fn on_progress(&mut self, percent: u8, total: usize) -> bool {
        self(percent, total)
    }
}

/// Progress sink that never cancels.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn on_progress(&mut self, _percent: u8, _total: usize) -> bool {
        true
    }
}
