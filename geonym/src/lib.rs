//! # geonym
//!
//! Rule-based recognition of geographic names: states, regions, districts,
//! cities, settlements and supranational unions.
//!
//! - **Pipeline**: [`GeoAnalyzer`] runs territory, union, city, repropagation
//!   and hierarchy passes over a [`GeoDocument`], then canonicalizes
//! - **Collaborators**: parsers, definer and containment oracle are traits
//!   ([`TerritoryParser`], [`CityParser`], [`Definer`], [`ContainmentOracle`])
//!   with lexicon-driven defaults
//! - **Lexicon**: [`Gazetteer`], built in or loaded from JSON
//!
//! Core types (token stream, referents, registry) live in `geonym-core`
//! and are re-exported here.
//!
//! ```rust
//! use geonym::{GeoAnalyzer, Language};
//!
//! let analyzer = GeoAnalyzer::new()?;
//! let (doc, outcome) = analyzer.analyze("г. Торжок, Тверская область", Language::Russian)?;
//! assert!(outcome.is_completed());
//! for m in doc.mentions() {
//!     println!("{} -> {}", m.text, doc.display(m.entity));
//! }
//! # Ok::<(), geonym::Error>(())
//! ```

#![warn(missing_docs)]

pub mod collab;
pub mod config;
pub mod document;
pub mod error;
pub mod gazetteer;
pub mod pipeline;
pub mod progress;
pub mod recognizers;

pub use collab::{
    Candidate, CandidateGenerator, CandidateKind, CityParser, ContainmentOracle, Definer,
    ResolvedSpan, TerritoryParser,
};
pub use config::GeoConfig;
pub use document::{GeoDocument, Mention, TokenFlags};
pub use error::{Error, Result};
pub use gazetteer::{EntryKind, Gazetteer, GazetteerEntry};
pub use pipeline::{GeoAnalyzer, GeoAnalyzerBuilder, Outcome, RunStatus, Stage};
pub use progress::{NoProgress, Progress};
pub use recognizers::{
    AddressDetailAnnotator, DefaultCityParser, DefaultDefiner, DefaultOracle,
    DefaultTerritoryParser, OrganizationAnnotator,
};

pub use geonym_core::{
    AnnotationKind, EntityId, EntityStore, GeoReferent, Language, Ontology, OntologyEntry,
    Registry, TokenId, TokenStream, TypeKind,
};
