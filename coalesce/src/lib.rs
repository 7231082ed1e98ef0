//! # geonym-coalesce
//!
//! End-of-document canonicalization of geographic referents.
//!
//! Recognition leaves behind provisional entities, some of them
//! duplicates of each other or of already-registered ones. This crate
//! registers them in a stable order, forwards every duplicate to its
//! survivor, and rewrites all references in the token stream and in
//! entity slots.
//!
//! # Example
//!
//! ```
//! use geonym_coalesce::Canonicalizer;
//! use geonym_core::{EntityStore, GeoReferent, Language, Registry, TokenStream};
//!
//! let mut stream = TokenStream::from_text("");
//! let mut store = EntityStore::new();
//! let mut registry = Registry::new();
//! let a = store.add(GeoReferent::with_name_type("Тверская", "область"));
//! let b = store.add(GeoReferent::with_name_type("Тверской", "область"));
//! let mut provisional = vec![a, b];
//!
//! let stats = Canonicalizer::new()
//!     .canonicalize(&mut stream, &mut store, &mut registry, &mut provisional, Language::Russian)
//!     .unwrap();
//! assert_eq!(stats.merged, 1);
//! assert_eq!(store.resolve(b), a);
//! ```

#![warn(missing_docs)]

pub mod canonicalize;

pub use canonicalize::{CanonicalStats, Canonicalizer};
