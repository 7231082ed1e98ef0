//! # geonym-core
//!
//! Core types for geonym: shared data structures for the recognition
//! pipeline and the canonicalization pass.
//!
//! This crate provides:
//! - **Tokens**: `TextToken`, `MorphInfo`, `CharsInfo`, and a convenience `tokenize`
//! - **Token stream**: `TokenStream`, an arena with span embedding (`embed`, `walk_inner`)
//! - **Entities**: `GeoReferent` with slots, occurrences and cached classification
//! - **Store / registry**: `EntityStore` (cycle-checked hierarchy, forwarding,
//!   equality, merging), `Registry` (register-or-return-canonical), `Ontology`
//! - **Taxonomy**: administrative designators and their surface forms

pub mod error;
pub mod lang;
pub mod names;
pub mod ontology;
pub mod referent;
pub mod registry;
pub mod store;
pub mod stream;
pub mod taxonomy;
pub mod token;
pub mod tokenizer;

pub use error::{Error, Result};
pub use lang::{script_of, Language, Script};
pub use ontology::{Ontology, OntologyEntry};
pub use referent::{
    Classification, EntityId, ForeignRef, GeoReferent, Occurrence, Slot, SlotName, SlotValue,
};
pub use registry::Registry;
pub use store::{EntityStatus, EntityStore, OntologyItem, MAX_HIGHER_DEPTH};
pub use stream::{Annotation, AnnotationKind, Node, NodeKind, TokenStream};
pub use taxonomy::{TypeKind, TypeWord};
pub use token::{CharsInfo, Gender, MorphClass, MorphInfo, TextToken, TokenId};
pub use tokenizer::tokenize;
