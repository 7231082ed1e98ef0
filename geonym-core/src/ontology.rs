//! Pre-seeded ontology shared read-only across documents.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::referent::{EntityId, GeoReferent};
use crate::store::EntityStore;

/// One entry of the JSON ontology format.
///
/// ```json
/// [
///   {"names": ["Россия", "Russia"], "types": ["государство"], "alpha2": "RU"},
///   {"names": ["Москва"], "types": ["город"], "higher": 0}
/// ]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OntologyEntry {
    /// Name variants.
    pub names: Vec<String>,
    /// Designators.
    pub types: Vec<String>,
    /// ISO alpha-2 code.
    pub alpha2: Option<String>,
    /// Index of the parent entry.
    pub higher: Option<usize>,
    /// MISC flags.
    pub misc: Vec<String>,
}

/// Known entities supplied by a caller.
#[derive(Debug, Clone, Default)]
pub struct Ontology {
    store: EntityStore,
}

impl Ontology {
    /// Empty ontology.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity; it is canonical by construction.
    pub fn add(&mut self, entity: GeoReferent) -> EntityId {
        let id = self.store.add(entity.clone_without_occurrences());
        self.store.mark_canonical(id);
        id
    }

    /// Link two entities of this ontology. Returns `false` on a rejected link.
    pub fn set_higher(&mut self, child: EntityId, parent: EntityId) -> bool {
        self.store.set_higher(child, Some(parent))
    }

    /// The backing store.
    #[must_use]
    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    /// Number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// True when empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Snapshot the live entities of a processed document.
    #[must_use]
    pub fn from_store(source: &EntityStore) -> Self {
        let mut store = EntityStore::new();
        store.import(source);
        Self { store }
    }

    /// Build from parsed entries.
    pub fn from_entries(entries: &[OntologyEntry]) -> Result<Self> {
        let mut onto = Self::new();
        for (i, e) in entries.iter().enumerate() {
            if e.names.iter().all(|n| n.trim().is_empty()) {
                return Err(Error::invalid_input(format!("ontology entry {i} has no names")));
            }
            let mut r = GeoReferent::new();
            for n in &e.names {
                r.add_name(n);
            }
            for t in &e.types {
                r.add_type(t);
            }
            if let Some(a2) = &e.alpha2 {
                r.set_alpha2(a2);
            }
            for m in &e.misc {
                r.add_misc(m);
            }
            onto.add(r);
        }
        for (i, e) in entries.iter().enumerate() {
            let Some(h) = e.higher else { continue };
            if h >= entries.len() || h == i {
                return Err(Error::invalid_input(format!(
                    "ontology entry {i}: bad higher index {h}"
                )));
            }
            if !onto.set_higher(EntityId::new(i), EntityId::new(h)) {
                return Err(Error::invalid_input(format!(
                    "ontology entry {i}: higher {h} forms a cycle"
                )));
            }
        }
        Ok(onto)
    }

    /// Parse the JSON entry list.
    pub fn from_json(json: &str) -> Result<Self> {
        let entries: Vec<OntologyEntry> = serde_json::from_str(json)?;
        Self::from_entries(&entries)
    }
}
