//! The recognition pipeline.
//!
//! [`GeoAnalyzer`] runs a fixed sequence of passes over one
//! [`GeoDocument`]:
//!
//! ```text
//! Init -> CandidatePrep -> Territory0 -> Territory1 -> Union -> City
//!      -> OntologyRepropagation -> HierarchyLink -> Canonicalization -> Done
//! ```
//!
//! Every pass is single-threaded and mutates the document in place. The
//! analyzer itself is read-only after construction and may be shared across
//! threads; parallelism is across documents.

mod city;
mod hierarchy;
mod reprop;
mod territory;
mod union;

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use geonym_coalesce::{CanonicalStats, Canonicalizer};
use geonym_core::{EntityId, Language, Ontology, TokenId};
use serde::{Deserialize, Serialize};

use crate::collab::{
    CandidateGenerator, CityParser, ContainmentOracle, Definer, ResolvedSpan, TerritoryParser,
};
use crate::config::GeoConfig;
use crate::document::GeoDocument;
use crate::error::{Error, Result};
use crate::gazetteer::Gazetteer;
use crate::progress::{NoProgress, Progress};
use crate::recognizers::{
    AddressDetailAnnotator, DefaultCityParser, DefaultDefiner, DefaultOracle,
    DefaultTerritoryParser, OrganizationAnnotator,
};

// =============================================================================
// Stages and outcome
// =============================================================================

/// A pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Seed the document from the analyzer's ontology.
    Init,
    /// Run candidate generators.
    CandidatePrep,
    /// Territory pass over every token.
    Territory0,
    /// Territory pass over capitalized and flagged tokens.
    Territory1,
    /// Supranational unions.
    Union,
    /// Cities.
    City,
    /// Bind bare re-mentions of known entities.
    OntologyRepropagation,
    /// Link adjacent mentions into hierarchies.
    HierarchyLink,
    /// Register provisional entities and retarget references.
    Canonicalization,
    /// Finished.
    Done,
}

impl Stage {
    /// Stages in execution order, `Done` excluded.
    pub const PIPELINE: [Stage; 9] = [
        Stage::Init,
        Stage::CandidatePrep,
        Stage::Territory0,
        Stage::Territory1,
        Stage::Union,
        Stage::City,
        Stage::OntologyRepropagation,
        Stage::HierarchyLink,
        Stage::Canonicalization,
    ];

    /// Stages that create entities and are skipped once the cap is hit.
    #[must_use]
    pub fn creates_entities(self) -> bool {
        matches!(
            self,
            Stage::Territory1 | Stage::Union | Stage::City | Stage::OntologyRepropagation
        )
    }

    /// Stable lower-case name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Init => "init",
            Stage::CandidatePrep => "candidate-prep",
            Stage::Territory0 => "territory-0",
            Stage::Territory1 => "territory-1",
            Stage::Union => "union",
            Stage::City => "city",
            Stage::OntologyRepropagation => "ontology-repropagation",
            Stage::HierarchyLink => "hierarchy-link",
            Stage::Canonicalization => "canonicalization",
            Stage::Done => "done",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// Every stage ran.
    Completed,
    /// The entity cap stopped entity creation; linking and
    /// canonicalization still ran.
    CapReached,
    /// The host cancelled before `stage`; the document is left as it was.
    Cancelled {
        /// The stage that did not run.
        stage: Stage,
    },
}

/// Summary of one document run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// How the run ended.
    pub status: RunStatus,
    /// Canonical entities after the run.
    pub registered: usize,
    /// Provisional entities merged during canonicalization.
    pub provisional_merged: usize,
    /// Stages that ran, in order.
    pub stages_run: Vec<Stage>,
}

impl Outcome {
    /// Whether every stage ran.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == RunStatus::Completed
    }

    /// Whether the run was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self.status, RunStatus::Cancelled { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PassStatus {
    Done,
    CapReached,
}

// =============================================================================
// Analyzer
// =============================================================================

/// Rule-based geographic entity recognizer.
///
/// # Example
///
/// ```rust
/// use geonym::{GeoAnalyzer, Language};
///
/// let analyzer = GeoAnalyzer::new().unwrap();
/// let (doc, outcome) = analyzer.analyze("Россия, г. Москва", Language::Russian).unwrap();
/// assert!(outcome.is_completed());
/// let mentions = doc.mentions();
/// assert_eq!(mentions.len(), 1);
/// assert_eq!(doc.display(mentions[0].entity), "город МОСКВА, государство РОССИЯ");
/// ```
pub struct GeoAnalyzer {
    config: GeoConfig,
    generators: Vec<Box<dyn CandidateGenerator>>,
    territory: Box<dyn TerritoryParser>,
    city: Box<dyn CityParser>,
    definer: Box<dyn Definer>,
    oracle: Box<dyn ContainmentOracle>,
    canonicalizer: Canonicalizer,
    ontology: Option<Arc<Ontology>>,
}

impl fmt::Debug for GeoAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeoAnalyzer")
            .field("config", &self.config)
            .field(
                "generators",
                &self.generators.iter().map(|g| g.name()).collect::<Vec<_>>(),
            )
            .field("ontology", &self.ontology.as_ref().map(|o| o.len()))
            .finish_non_exhaustive()
    }
}

impl GeoAnalyzer {
    /// Analyzer with the built-in lexicon and default collaborators.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Start building a customized analyzer.
    #[must_use]
    pub fn builder() -> GeoAnalyzerBuilder {
        GeoAnalyzerBuilder::new()
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &GeoConfig {
        &self.config
    }

    /// Tokenize and process `text`.
    pub fn analyze(&self, text: &str, lang: Language) -> Result<(GeoDocument, Outcome)> {
        let mut doc = GeoDocument::from_text(text, lang);
        let outcome = self.process(&mut doc)?;
        Ok((doc, outcome))
    }

    /// Process a document without progress reporting.
    pub fn process(&self, doc: &mut GeoDocument) -> Result<Outcome> {
        self.process_with_progress(doc, &mut NoProgress)
    }

    /// Process a document, consulting `progress` before every stage.
    ///
    /// Errors only come from structural failures; a hit entity cap or a
    /// cancellation is reported in the [`Outcome`].
    pub fn process_with_progress(
        &self,
        doc: &mut GeoDocument,
        progress: &mut impl Progress,
    ) -> Result<Outcome> {
        let total = Stage::PIPELINE.len();
        let mut stages_run = Vec::with_capacity(total + 1);
        let mut cap_hit = false;
        let mut stats = CanonicalStats::default();
        let mut timings: Vec<(Stage, Duration)> = Vec::with_capacity(total);

        for (i, &stage) in Stage::PIPELINE.iter().enumerate() {
            let percent = u8::try_from(i * 100 / total).unwrap_or(100);
            if !progress.on_progress(percent, total) {
                log::info!("cancelled before stage {stage}");
                return Ok(Outcome {
                    status: RunStatus::Cancelled { stage },
                    registered: doc.registry.len(),
                    provisional_merged: stats.merged,
                    stages_run,
                });
            }
            if cap_hit && stage.creates_entities() {
                log::debug!("skipping {stage}: entity cap reached");
                continue;
            }
            let started = Instant::now();
            // `None`: the stage is disabled for this document.
            let status = match stage {
                Stage::Init => {
                    self.init(doc);
                    Some(PassStatus::Done)
                }
                Stage::CandidatePrep => {
                    for g in &self.generators {
                        let n = g.prepare(doc);
                        log::debug!("generator {}: {n} spans", g.name());
                    }
                    Some(PassStatus::Done)
                }
                Stage::Territory0 => Some(self.territory_pass(doc, 0)),
                Stage::Territory1 if self.config.second_territory_pass => {
                    Some(self.territory_pass(doc, 1))
                }
                Stage::Union => Some(self.union_pass(doc)),
                Stage::City => Some(self.city_pass(doc)),
                Stage::OntologyRepropagation
                    if self.config.ontology_repropagation && doc.cities_added > 0 =>
                {
                    Some(self.repropagate(doc))
                }
                Stage::HierarchyLink => {
                    self.link_hierarchy(doc);
                    Some(PassStatus::Done)
                }
                Stage::Canonicalization => {
                    stats = self.canonicalizer.canonicalize(
                        &mut doc.stream,
                        &mut doc.store,
                        &mut doc.registry,
                        &mut doc.provisional,
                        doc.lang,
                    )?;
                    doc.reset_flags();
                    Some(PassStatus::Done)
                }
                Stage::Territory1 | Stage::OntologyRepropagation | Stage::Done => None,
            };
            let Some(status) = status else {
                log::debug!("skipping {stage}: disabled");
                continue;
            };
            if status == PassStatus::CapReached {
                cap_hit = true;
            }
            timings.push((stage, started.elapsed()));
            stages_run.push(stage);
        }
        progress.on_progress(100, total);
        stages_run.push(Stage::Done);
        log::info!(
            "document done: {} registered, {} merged, {} mentions; {}",
            doc.registry.len(),
            stats.merged,
            doc.mentions().len(),
            timings
                .iter()
                .map(|(s, d)| format!("{s}={}us", d.as_micros()))
                .collect::<Vec<_>>()
                .join(" ")
        );

        Ok(Outcome {
            status: if cap_hit {
                RunStatus::CapReached
            } else {
                RunStatus::Completed
            },
            registered: doc.registry.len(),
            provisional_merged: stats.merged,
            stages_run,
        })
    }

    fn init(&self, doc: &mut GeoDocument) {
        if let Some(onto) = &self.ontology {
            if doc.store.is_empty() {
                doc.import_ontology(onto);
                log::debug!("seeded {} entities from ontology", onto.len());
            }
        }
    }

    // =========================================================================
    // Helpers shared by passes
    // =========================================================================

    /// Embed a resolved span. An entity left without any mention is
    /// dropped from the provisional list.
    pub(crate) fn bind(doc: &mut GeoDocument, span: ResolvedSpan) -> Option<TokenId> {
        let node = doc.embed_geo(span.begin, span.end, span.entity);
        if node.is_none() {
            doc.discard_unused(span.entity);
        }
        node
    }

    /// Merge two entities judged equal, keeping a registered one when
    /// either is registered. Returns the survivor.
    pub(crate) fn merge_equal(doc: &mut GeoDocument, keep: EntityId, drop: EntityId) -> EntityId {
        let (keep, drop) = (doc.store.resolve(keep), doc.store.resolve(drop));
        if keep == drop {
            return keep;
        }
        let (keep, drop) = if doc.registry.contains(drop) && !doc.registry.contains(keep) {
            (drop, keep)
        } else {
            (keep, drop)
        };
        doc.store.merge_slots2(keep, drop, doc.lang);
        doc.store.forward(drop, keep);
        doc.provisional.retain(|&p| p != drop);
        if !doc.registry.contains(keep) && !doc.provisional.contains(&keep) {
            doc.provisional.push(keep);
        }
        keep
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for [`GeoAnalyzer`].
#[derive(Default)]
pub struct GeoAnalyzerBuilder {
    config: GeoConfig,
    gazetteer: Option<Arc<Gazetteer>>,
    generators: Vec<Box<dyn CandidateGenerator>>,
    territory: Option<Box<dyn TerritoryParser>>,
    city: Option<Box<dyn CityParser>>,
    definer: Option<Box<dyn Definer>>,
    oracle: Option<Box<dyn ContainmentOracle>>,
    ontology: Option<Arc<Ontology>>,
    verify: bool,
}

impl GeoAnalyzerBuilder {
    /// Create a builder with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            verify: true,
            ..Self::default()
        }
    }

    /// Set the configuration.
    #[must_use]
    pub fn config(mut self, config: GeoConfig) -> Self {
        self.config = config;
        self
    }

    /// Lexicon for the default parsers.
    #[must_use]
    pub fn gazetteer(mut self, gazetteer: Arc<Gazetteer>) -> Self {
        self.gazetteer = Some(gazetteer);
        self
    }

    /// Add a candidate generator. Generators run in the order added;
    /// without any, the address and organization annotators run.
    #[must_use]
    pub fn generator(mut self, generator: Box<dyn CandidateGenerator>) -> Self {
        self.generators.push(generator);
        self
    }

    /// Replace the territory parser.
    #[must_use]
    pub fn territory_parser(mut self, parser: Box<dyn TerritoryParser>) -> Self {
        self.territory = Some(parser);
        self
    }

    /// Replace the city parser.
    #[must_use]
    pub fn city_parser(mut self, parser: Box<dyn CityParser>) -> Self {
        self.city = Some(parser);
        self
    }

    /// Replace the definer.
    #[must_use]
    pub fn definer(mut self, definer: Box<dyn Definer>) -> Self {
        self.definer = Some(definer);
        self
    }

    /// Replace the containment oracle.
    #[must_use]
    pub fn oracle(mut self, oracle: Box<dyn ContainmentOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    /// Seed every processed document with `ontology`.
    #[must_use]
    pub fn ontology(mut self, ontology: Arc<Ontology>) -> Self {
        self.ontology = Some(ontology);
        self
    }

    /// Check after canonicalization that nothing refers to a merged-away
    /// entity (on by default).
    #[must_use]
    pub fn verify_canonical(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// Build the analyzer.
    pub fn build(self) -> Result<GeoAnalyzer> {
        self.config.validate()?;
        let needs_lexicon = self.territory.is_none() || self.city.is_none();
        let gazetteer = self.gazetteer.unwrap_or_else(Gazetteer::builtin);
        if needs_lexicon && gazetteer.is_empty() {
            return Err(Error::lexicon("default parsers need a non-empty gazetteer"));
        }
        let generators = if self.generators.is_empty() {
            vec![
                Box::new(AddressDetailAnnotator) as Box<dyn CandidateGenerator>,
                Box::new(OrganizationAnnotator),
            ]
        } else {
            self.generators
        };
        Ok(GeoAnalyzer {
            config: self.config,
            generators,
            territory: self.territory.unwrap_or_else(|| {
                Box::new(DefaultTerritoryParser::new(Arc::clone(&gazetteer)))
            }),
            city: self
                .city
                .unwrap_or_else(|| Box::new(DefaultCityParser::new(Arc::clone(&gazetteer)))),
            definer: self.definer.unwrap_or_else(|| Box::new(DefaultDefiner::new())),
            oracle: self.oracle.unwrap_or_else(|| Box::new(DefaultOracle::new())),
            canonicalizer: Canonicalizer::new().with_verification(self.verify),
            ontology: self.ontology,
        })
    }
}
