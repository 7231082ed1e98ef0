//! Collaborator interfaces of the recognition pipeline.
//!
//! The pipeline only sequences passes. Everything language- or
//! lexicon-specific sits behind these traits; default implementations live
//! in [`crate::recognizers`].

use std::sync::Arc;

use geonym_core::{CharsInfo, EntityId, EntityStore, MorphInfo, TokenId, TypeWord};

use crate::document::GeoDocument;
use crate::gazetteer::GazetteerEntry;

/// What a candidate item stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateKind {
    /// An administrative designator ("область", "city").
    TypeWord,
    /// A noun-like name ("Россия", "Normandy").
    ProperName,
    /// A name-forming adjective ("Ленинградская").
    Adjective,
}

/// One item of a parsed territory or city phrase.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// First token covered.
    pub begin: TokenId,
    /// Last token covered.
    pub end: TokenId,
    /// Item kind.
    pub kind: CandidateKind,
    /// The designator, for [`CandidateKind::TypeWord`].
    pub type_word: Option<&'static TypeWord>,
    /// Normalized surface value.
    pub value: String,
    /// Lexicon entry the name was matched against.
    pub template: Option<Arc<GazetteerEntry>>,
    /// Already known entity with this name.
    pub onto: Option<EntityId>,
    /// Morphology of the first token.
    pub morph: MorphInfo,
    /// Character shape of the first token.
    pub chars: CharsInfo,
}

impl Candidate {
    /// Bare candidate covering `[begin, end]`.
    #[must_use]
    pub fn new(begin: TokenId, end: TokenId, kind: CandidateKind, value: impl Into<String>) -> Self {
        Self {
            begin,
            end,
            kind,
            type_word: None,
            value: value.into(),
            template: None,
            onto: None,
            morph: MorphInfo::default(),
            chars: CharsInfo::default(),
        }
    }

    /// Whether this is a designator.
    #[must_use]
    pub fn is_type_word(&self) -> bool {
        self.kind == CandidateKind::TypeWord
    }

    /// Whether this is a name or name-forming adjective.
    #[must_use]
    pub fn is_name(&self) -> bool {
        matches!(self.kind, CandidateKind::ProperName | CandidateKind::Adjective)
    }
}

/// A span a definer resolved to an entity. The caller embeds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedSpan {
    /// First token.
    pub begin: TokenId,
    /// Last token.
    pub end: TokenId,
    /// Entity to bind (already registered or provisional).
    pub entity: EntityId,
}

/// Pre-embeds non-geographic spans so geographic passes skip them.
pub trait CandidateGenerator: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Embed annotations into the document; returns how many were added.
    fn prepare(&self, doc: &mut GeoDocument) -> usize;
}

/// Parses territory phrases.
pub trait TerritoryParser: Send + Sync {
    /// Parse up to `max` candidate items starting at `start`.
    fn try_parse_list(&self, doc: &GeoDocument, start: TokenId, max: usize) -> Option<Vec<Candidate>>;
}

/// Parses city phrases.
pub trait CityParser: Send + Sync {
    /// Parse up to `max` candidate items starting at `start`.
    fn try_parse_list(&self, doc: &GeoDocument, start: TokenId, max: usize) -> Option<Vec<Candidate>>;
}

/// Turns candidate lists into entities.
///
/// A definer creates the entity in the document's store and either
/// confirms it (registers now) or holds it provisional. It never embeds.
pub trait Definer: Send + Sync {
    /// Define a territory from a prefix of `items`.
    ///
    /// `strict` forbids resolutions that need surrounding context; `city`
    /// is a confirmed city immediately before the phrase.
    fn try_define_territory(
        &self,
        doc: &mut GeoDocument,
        items: &[Candidate],
        strict: bool,
        city: Option<EntityId>,
    ) -> Option<ResolvedSpan>;

    /// Define a city from a prefix of `items`.
    fn try_define_city(&self, doc: &mut GeoDocument, items: &[Candidate]) -> Option<ResolvedSpan>;
}

/// Decides whether one entity may administratively contain another.
pub trait ContainmentOracle: Send + Sync {
    /// Whether `hi` may be placed above `lo`.
    fn can_be_higher(&self, store: &EntityStore, hi: EntityId, lo: EntityId) -> bool;

    /// Token-level variant for two resolved mentions.
    fn can_be_higher_token(&self, doc: &GeoDocument, hi: TokenId, lo: TokenId) -> bool {
        match (doc.geo_at(hi), doc.geo_at(lo)) {
            (Some(h), Some(l)) => self.can_be_higher(&doc.store, h, l),
            _ => false,
        }
    }
}
