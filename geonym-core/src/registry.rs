//! Local ontology: register-or-return-canonical.
//!
//! After `register(candidate)` returns `survivor`, callers must use
//! `survivor` from then on. When the candidate duplicates a member it is
//! merged into that member and forwarded; the stream is retargeted later
//! by the canonicalization pass.

use std::collections::HashMap;

use crate::lang::Language;
use crate::names::term_key;
use crate::referent::EntityId;
use crate::store::EntityStore;

/// Canonical entities of one document, indexed by name.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    members: Vec<EntityId>,
    position: HashMap<EntityId, usize>,
    index: HashMap<String, Vec<EntityId>>,
}

impl Registry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Members in registration order.
    #[must_use]
    pub fn members(&self) -> &[EntityId] {
        &self.members
    }

    /// Number of registered entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// True when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Whether `id` is a member.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.position.contains_key(&id)
    }

    /// Members with a name matching `name` modulo inflection.
    #[must_use]
    pub fn lookup_name(&self, name: &str) -> Vec<EntityId> {
        self.lookup_term(&term_key(name))
    }

    /// Member with the given ISO alpha-2 code.
    #[must_use]
    pub fn lookup_alpha2(&self, code: &str) -> Option<EntityId> {
        self.lookup_term(&format!("#{}", code.to_ascii_uppercase()))
            .into_iter()
            .next()
    }

    fn lookup_term(&self, term: &str) -> Vec<EntityId> {
        self.index.get(term).cloned().unwrap_or_default()
    }

    fn index_entity(&mut self, store: &EntityStore, id: EntityId) {
        for term in store.create_ontology_item(id).terms {
            let slot = self.index.entry(term).or_default();
            if !slot.contains(&id) {
                slot.push(id);
            }
        }
    }

    /// First member (in registration order) that `candidate` may equal.
    #[must_use]
    pub fn find_equal(&self, store: &EntityStore, candidate: EntityId) -> Option<EntityId> {
        let item = store.create_ontology_item(candidate);
        let mut hits: Vec<EntityId> = item
            .terms
            .iter()
            .flat_map(|t| self.lookup_term(t))
            .filter(|&m| m != item.entity)
            .collect();
        hits.sort_by_key(|m| self.position.get(m).copied().unwrap_or(usize::MAX));
        hits.dedup();
        hits.into_iter()
            .find(|&m| store.can_be_equals(m, item.entity))
    }

    /// Register `candidate`, returning the instance all code must use.
    pub fn register(&mut self, store: &mut EntityStore, candidate: EntityId, lang: Language) -> EntityId {
        let candidate = store.resolve(candidate);
        if self.contains(candidate) {
            return candidate;
        }
        if let Some(existing) = self.find_equal(store, candidate) {
            store.merge_slots2(existing, candidate, lang);
            store.forward(candidate, existing);
            self.index_entity(store, existing);
            log::debug!(
                "registry: {candidate} merged into {existing} ({})",
                store.entity(existing).short_display()
            );
            return existing;
        }
        store.mark_canonical(candidate);
        self.position.insert(candidate, self.members.len());
        self.members.push(candidate);
        self.index_entity(store, candidate);
        candidate
    }

    /// Add an already-canonical entity (e.g. imported from an ontology)
    /// without equality checks.
    pub fn adopt(&mut self, store: &EntityStore, id: EntityId) {
        if self.contains(id) {
            return;
        }
        self.position.insert(id, self.members.len());
        self.members.push(id);
        self.index_entity(store, id);
    }
}
