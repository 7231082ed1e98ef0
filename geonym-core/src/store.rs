//! Per-document entity arena.
//!
//! Entities are addressed by [`EntityId`] and carry an explicit
//! [`EntityStatus`]. Duplicates are never removed from the arena; they are
//! marked `Forwarded(survivor)` and [`EntityStore::resolve`] follows the
//! forwarding chain.
//!
//! # Hierarchy
//!
//! The HIGHER relation must stay a forest. [`EntityStore::set_higher`]
//! refuses (returns `false`) any assignment that would make an entity its
//! own ancestor, or place above it an entity with the same short display
//! ("область ТВЕРСКАЯ" above "область ТВЕРСКАЯ"). [`EntityStore::higher`]
//! applies the same test on read, so slots written by merges can never be
//! observed as a cycle.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::lang::{script_of, Language};
use crate::names::term_key;
use crate::referent::{EntityId, GeoReferent, Occurrence, SlotName, SlotValue};
use crate::taxonomy::{is_preferred_city_type, is_soviet_variant, kind_of, TypeKind};

/// Longest HIGHER chain walked before giving up.
pub const MAX_HIGHER_DEPTH: usize = 32;

/// Recursion bound of [`EntityStore::can_be_equals`] through parents.
const EQUALS_DEPTH: usize = 4;

/// Lifecycle state of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityStatus {
    /// Built during recognition, not yet registered.
    Provisional,
    /// Registered (or imported) canonical instance.
    Canonical,
    /// Merged into another entity.
    Forwarded(EntityId),
}

/// Index terms of an entity, as used by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OntologyItem {
    /// The entity.
    pub entity: EntityId,
    /// Lookup keys: inflection-insensitive names and `#ALPHA2`.
    pub terms: Vec<String>,
}

/// Arena of geographic entities for one document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityStore {
    entities: Vec<GeoReferent>,
    status: Vec<EntityStatus>,
}

impl EntityStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entities, forwarded ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// True when no entity was ever added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Add a provisional entity.
    pub fn add(&mut self, entity: GeoReferent) -> EntityId {
        let id = EntityId::new(self.entities.len());
        self.entities.push(entity);
        self.status.push(EntityStatus::Provisional);
        id
    }

    /// Entity by id, failing on ids this store never issued.
    pub fn get(&self, id: EntityId) -> Result<&GeoReferent> {
        self.entities
            .get(id.index())
            .ok_or(Error::UnknownEntity(id.index()))
    }

    /// Entity by an id issued by this store.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this store.
    #[must_use]
    pub fn entity(&self, id: EntityId) -> &GeoReferent {
        &self.entities[id.index()]
    }

    /// Mutable entity by an id issued by this store.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this store.
    pub fn entity_mut(&mut self, id: EntityId) -> &mut GeoReferent {
        &mut self.entities[id.index()]
    }

    /// All ids in creation order.
    pub fn ids(&self) -> impl Iterator<Item = EntityId> {
        (0..self.entities.len()).map(EntityId::new)
    }

    /// Status of `id`.
    #[must_use]
    pub fn status(&self, id: EntityId) -> EntityStatus {
        self.status
            .get(id.index())
            .copied()
            .unwrap_or(EntityStatus::Provisional)
    }

    /// Mark `id` canonical.
    pub fn mark_canonical(&mut self, id: EntityId) {
        if let Some(s) = self.status.get_mut(id.index()) {
            *s = EntityStatus::Canonical;
        }
    }

    /// Whether `id` was merged away.
    #[must_use]
    pub fn is_forwarded(&self, id: EntityId) -> bool {
        matches!(self.status(id), EntityStatus::Forwarded(_))
    }

    /// Follow forwarding to the surviving entity.
    #[must_use]
    pub fn resolve(&self, id: EntityId) -> EntityId {
        let mut cur = id;
        for _ in 0..=self.entities.len() {
            match self.status(cur) {
                EntityStatus::Forwarded(to) if to != cur => cur = to,
                _ => return cur,
            }
        }
        cur
    }

    /// Forward `from` to `to`, moving its mentions onto the survivor.
    pub fn forward(&mut self, from: EntityId, to: EntityId) {
        let to = self.resolve(to);
        if from == to {
            return;
        }
        self.status[from.index()] = EntityStatus::Forwarded(to);
        let occurrences = self.entity_mut(from).take_occurrences();
        let survivor = self.entity_mut(to);
        for occ in occurrences {
            survivor.add_occurrence(occ);
        }
    }

    /// Record a mention of `id` (of its survivor, if forwarded).
    pub fn add_occurrence(&mut self, id: EntityId, occ: Occurrence) {
        let id = self.resolve(id);
        self.entity_mut(id).add_occurrence(occ);
    }

    // =========================================================================
    // Hierarchy
    // =========================================================================

    fn raw_parent(&self, id: EntityId) -> Option<EntityId> {
        self.entity(id).raw_higher().map(|h| self.resolve(h))
    }

    /// Whether `parent` may be placed directly above `child`.
    #[must_use]
    pub fn accepts_parent(&self, child: EntityId, parent: EntityId) -> bool {
        let child = self.resolve(child);
        let parent = self.resolve(parent);
        if parent == child {
            return false;
        }
        let display = self.entity(child).short_display();
        let mut cur = Some(parent);
        let mut steps = 0;
        while let Some(c) = cur {
            if c == child || self.entity(c).short_display() == display {
                return false;
            }
            steps += 1;
            if steps > MAX_HIGHER_DEPTH {
                return false;
            }
            cur = self.raw_parent(c);
        }
        true
    }

    /// Validated parent of `id`.
    #[must_use]
    pub fn higher(&self, id: EntityId) -> Option<EntityId> {
        let id = self.resolve(id);
        let parent = self.raw_parent(id)?;
        self.accepts_parent(id, parent).then_some(parent)
    }

    /// Assign (or clear) the parent of `child`.
    ///
    /// Returns `false` and leaves the entity untouched when the assignment
    /// would break the forest.
    pub fn set_higher(&mut self, child: EntityId, parent: Option<EntityId>) -> bool {
        let child = self.resolve(child);
        match parent {
            None => {
                self.entity_mut(child).put_higher(None);
                true
            }
            Some(p) => {
                let p = self.resolve(p);
                if !self.accepts_parent(child, p) {
                    log::debug!("rejected higher {child} -> {p}");
                    return false;
                }
                self.entity_mut(child).put_higher(Some(p));
                true
            }
        }
    }

    /// Put `hi` above `lo`, or above the top of `lo`'s chain when `lo`
    /// already has a parent.
    pub fn attach_higher(&mut self, lo: EntityId, hi: EntityId) -> bool {
        let lo = self.resolve(lo);
        let hi = self.resolve(hi);
        if self.is_ancestor(hi, lo) {
            return true;
        }
        if self.higher(lo).is_none() {
            return self.set_higher(lo, Some(hi));
        }
        let top = self.top(lo);
        if top == hi {
            return true;
        }
        self.set_higher(top, Some(hi))
    }

    /// Ancestors of `id`, nearest first.
    #[must_use]
    pub fn ancestors(&self, id: EntityId) -> Vec<EntityId> {
        let mut out = Vec::new();
        let mut cur = self.higher(id);
        while let Some(c) = cur {
            if out.contains(&c) || out.len() >= MAX_HIGHER_DEPTH {
                break;
            }
            out.push(c);
            cur = self.higher(c);
        }
        out
    }

    /// Length of the validated HIGHER chain above `id`.
    #[must_use]
    pub fn depth(&self, id: EntityId) -> usize {
        self.ancestors(id).len()
    }

    /// Topmost ancestor (or `id` itself).
    #[must_use]
    pub fn top(&self, id: EntityId) -> EntityId {
        self.ancestors(id)
            .last()
            .copied()
            .unwrap_or_else(|| self.resolve(id))
    }

    /// Whether `ancestor` is above `id`.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: EntityId, id: EntityId) -> bool {
        let ancestor = self.resolve(ancestor);
        self.ancestors(id).contains(&ancestor)
    }

    /// Collapse duplicate HIGHER slots to the first acceptable one.
    pub fn normalize_higher(&mut self, id: EntityId) {
        let id = self.resolve(id);
        let candidates = self.entity(id).higher_slots();
        if candidates.is_empty() {
            return;
        }
        let chosen = candidates
            .into_iter()
            .map(|c| self.resolve(c))
            .find(|&c| self.accepts_parent(id, c));
        self.entity_mut(id).put_higher(chosen);
    }

    /// "type NAME, type NAME, ..." from `id` up the hierarchy.
    #[must_use]
    pub fn display(&self, id: EntityId) -> String {
        let id = self.resolve(id);
        std::iter::once(id)
            .chain(self.ancestors(id))
            .map(|e| self.entity(e).short_display())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Rewrite every entity-valued slot of every entity to its survivor.
    /// Returns the number of entities changed.
    pub fn retarget_slots(&mut self) -> usize {
        let resolved: Vec<EntityId> = self.ids().map(|id| self.resolve(id)).collect();
        let mut changed = 0;
        for e in &mut self.entities {
            if e.map_geo_slots(|id| resolved.get(id.index()).copied().unwrap_or(id)) {
                changed += 1;
            }
        }
        changed
    }

    // =========================================================================
    // Equality and merging
    // =========================================================================

    /// Whether `a` and `b` may denote the same place. Symmetric.
    #[must_use]
    pub fn can_be_equals(&self, a: EntityId, b: EntityId) -> bool {
        self.can_be_equals_at(a, b, 0)
    }

    fn can_be_equals_at(&self, a: EntityId, b: EntityId, depth: usize) -> bool {
        let (a, b) = (self.resolve(a), self.resolve(b));
        if a == b {
            return true;
        }
        if depth > EQUALS_DEPTH {
            return false;
        }
        let (ra, rb) = (self.entity(a), self.entity(b));
        match (ra.alpha2(), rb.alpha2()) {
            (Some(x), Some(y)) if x == y => return true,
            (Some(_), Some(_)) => return false,
            _ => {}
        }
        if ra.is_city() != rb.is_city() || ra.is_union() != rb.is_union() {
            return false;
        }
        if ra.is_union() {
            let ma = self.member_set(a);
            let mb = self.member_set(b);
            if !ma.is_empty() || !mb.is_empty() {
                return ma == mb;
            }
        } else {
            let (fa, fb) = (self.foreign_refs(a), self.foreign_refs(b));
            if (!fa.is_empty() || !fb.is_empty()) && fa != fb {
                return false;
            }
        }
        if ra.is_region() != rb.is_region() || ra.is_state() != rb.is_state() {
            return false;
        }
        if !ra.names().any(|n| rb.has_name(n)) {
            return false;
        }
        if !types_compatible(ra, rb) {
            return false;
        }
        if let (Some(ha), Some(hb)) = (self.higher(a), self.higher(b)) {
            if ha == hb || self.can_be_equals_at(ha, hb, depth + 1) {
                return true;
            }
            if let Some(hha) = self.higher(ha) {
                if hha == hb || self.can_be_equals_at(hha, hb, depth + 1) {
                    return true;
                }
            }
            if let Some(hhb) = self.higher(hb) {
                if ha == hhb || self.can_be_equals_at(ha, hhb, depth + 1) {
                    return true;
                }
            }
            return false;
        }
        true
    }

    fn member_set(&self, id: EntityId) -> BTreeSet<EntityId> {
        self.entity(id)
            .geo_refs()
            .into_iter()
            .map(|r| self.resolve(r))
            .collect()
    }

    fn foreign_refs(&self, id: EntityId) -> BTreeSet<String> {
        self.entity(id)
            .refs()
            .map(|v| match v {
                SlotValue::Geo(g) => self.resolve(*g).to_string(),
                SlotValue::Foreign(f) => format!("{}:{}", f.kind, f.label),
                SlotValue::Text(t) => t.clone(),
            })
            .collect()
    }

    /// Merge the slots of `from` into `into` for a document in `lang`.
    pub fn merge_slots2(&mut self, into: EntityId, from: EntityId, lang: Language) {
        let into = self.resolve(into);
        if into == from {
            return;
        }
        let script = lang.script();
        let source = self.entity(from).slots().to_vec();
        let dst = self.entity_mut(into);
        let backfill_names = dst.names().next().is_none();
        let backfill_types = dst.types().next().is_none();
        for slot in source {
            match slot.name {
                SlotName::Name => {
                    let Some(text) = slot.value.as_text() else { continue };
                    if backfill_names
                        || (!is_soviet_variant(text) && script_of(text).fits(script))
                    {
                        dst.add_slot(slot.name, slot.value, slot.count);
                    }
                }
                SlotName::Type => {
                    let Some(text) = slot.value.as_text() else { continue };
                    if backfill_types || script_of(text).fits(script) {
                        dst.add_slot(slot.name, slot.value, slot.count);
                    }
                }
                SlotName::Higher => dst.push_slot(slot),
                _ => dst.add_slot(slot.name, slot.value, slot.count),
            }
        }

        if dst.is_state() {
            dst.retain_slots(|s| {
                s.name != SlotName::Type
                    || !matches!(
                        s.value.as_text().and_then(kind_of),
                        Some(TypeKind::Region | TypeKind::District)
                    )
            });
        }
        if dst.is_city() {
            let city_types: Vec<String> = dst
                .types()
                .filter(|t| kind_of(t) == Some(TypeKind::City))
                .map(str::to_string)
                .collect();
            if city_types.len() > 1 {
                let keep = city_types
                    .iter()
                    .find(|t| is_preferred_city_type(t) && script_of(t).fits(script))
                    .or_else(|| city_types.iter().find(|t| is_preferred_city_type(t)))
                    .unwrap_or(&city_types[0])
                    .clone();
                dst.retain_slots(|s| {
                    s.name != SlotName::Type
                        || s.value.as_text().map_or(true, |t| {
                            t == keep || kind_of(t) != Some(TypeKind::City)
                        })
                });
            }
        }
        self.normalize_higher(into);
    }

    /// Index terms of `id`.
    #[must_use]
    pub fn create_ontology_item(&self, id: EntityId) -> OntologyItem {
        let id = self.resolve(id);
        let e = self.entity(id);
        let mut terms: Vec<String> = e.names().map(term_key).collect();
        if let Some(a2) = e.alpha2() {
            terms.push(format!("#{a2}"));
        }
        terms.sort();
        terms.dedup();
        OntologyItem { entity: id, terms }
    }

    /// Clone the live entities of `other` into this store as canonical
    /// entities, remapping entity-valued slots. Returns the new ids in
    /// `other`'s order (forwarded entries map to their survivor's copy).
    pub fn import(&mut self, other: &EntityStore) -> Vec<EntityId> {
        let mut mapping: HashMap<EntityId, EntityId> = HashMap::new();
        for id in other.ids() {
            if other.is_forwarded(id) {
                continue;
            }
            let copy = other.entity(id).clone_without_occurrences();
            let new_id = self.add(copy);
            self.mark_canonical(new_id);
            mapping.insert(id, new_id);
        }
        let out: Vec<EntityId> = other
            .ids()
            .map(|id| mapping[&other.resolve(id)])
            .collect();
        for new_id in mapping.values().copied().collect::<Vec<_>>() {
            self.entity_mut(new_id)
                .map_geo_slots(|old| mapping.get(&other.resolve(old)).copied().unwrap_or(old));
        }
        log::debug!("imported {} ontology entities", mapping.len());
        out
    }
}

fn types_compatible(a: &GeoReferent, b: &GeoReferent) -> bool {
    if a.is_settlement() || b.is_settlement() {
        return true;
    }
    let ta: Vec<&str> = a.types().collect();
    let tb: Vec<&str> = b.types().collect();
    if ta.is_empty() || tb.is_empty() {
        return true;
    }
    ta.iter()
        .any(|x| tb.iter().any(|y| x == y || x.ends_with(y) || y.ends_with(x)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn city(store: &mut EntityStore, name: &str) -> EntityId {
        store.add(GeoReferent::with_name_type(name, "город"))
    }

    fn region(store: &mut EntityStore, name: &str) -> EntityId {
        store.add(GeoReferent::with_name_type(name, "область"))
    }

    fn state(store: &mut EntityStore, name: &str, a2: &str) -> EntityId {
        let mut r = GeoReferent::with_name_type(name, "государство");
        r.set_alpha2(a2);
        store.add(r)
    }

    #[test]
    fn test_set_higher_rejects_cycle() {
        let mut s = EntityStore::new();
        let a = city(&mut s, "Тверь");
        let b = region(&mut s, "Тверская");
        let c = state(&mut s, "Россия", "RU");
        assert!(s.set_higher(a, Some(b)));
        assert!(s.set_higher(b, Some(c)));
        assert!(!s.set_higher(c, Some(a)));
        assert!(!s.set_higher(a, Some(a)));
        assert_eq!(s.higher(c), None);
        assert_eq!(s.ancestors(a), vec![b, c]);
        assert_eq!(s.depth(a), 2);
        assert_eq!(s.top(a), c);
    }

    #[test]
    fn test_set_higher_rejects_same_display() {
        let mut s = EntityStore::new();
        let a = region(&mut s, "Тверская");
        let b = region(&mut s, "Тверская");
        assert!(!s.set_higher(a, Some(b)));
        assert_eq!(s.higher(a), None);
    }

    #[test]
    fn test_higher_read_rejects_merged_cycle() {
        let mut s = EntityStore::new();
        let a = city(&mut s, "Тверь");
        let b = region(&mut s, "Тверская");
        assert!(s.set_higher(a, Some(b)));
        // A raw HIGHER slot written by a merge, bypassing set_higher.
        s.entity_mut(b).push_slot(crate::referent::Slot {
            name: SlotName::Higher,
            value: SlotValue::Geo(a),
            count: 1,
        });
        assert_eq!(s.higher(b), None);
        assert_eq!(s.higher(a), None);
        s.normalize_higher(b);
        assert!(s.entity(b).higher_slots().is_empty());
        assert_eq!(s.ancestors(a), vec![b]);
    }

    #[test]
    fn test_attach_higher_goes_above_top() {
        let mut s = EntityStore::new();
        let a = city(&mut s, "Тверь");
        let b = region(&mut s, "Тверская");
        let c = state(&mut s, "Россия", "RU");
        assert!(s.set_higher(a, Some(b)));
        assert!(s.attach_higher(a, c));
        assert_eq!(s.higher(a), Some(b));
        assert_eq!(s.higher(b), Some(c));
        assert!(s.attach_higher(a, c));
        assert_eq!(s.display(a), "город ТВЕРЬ, область ТВЕРСКАЯ, государство РОССИЯ");
    }

    #[test]
    fn test_forward_moves_occurrences() {
        let mut s = EntityStore::new();
        let a = region(&mut s, "Ленинградская");
        let b = region(&mut s, "Ленинградская");
        s.entity_mut(b).add_occurrence(Occurrence {
            node: crate::token::TokenId(3),
            begin_char: 0,
            end_char: 10,
        });
        s.forward(b, a);
        assert_eq!(s.resolve(b), a);
        assert!(s.is_forwarded(b));
        assert!(s.entity(b).occurrences().is_empty());
        assert_eq!(s.entity(a).occurrences().len(), 1);
    }

    #[test]
    fn test_can_be_equals_inflected_names() {
        let mut s = EntityStore::new();
        let a = region(&mut s, "Ленинградская");
        let b = s.add(GeoReferent::with_name_type("ЛЕНИНГРАДСКОЙ", "область"));
        let c = region(&mut s, "Тверская");
        assert!(s.can_be_equals(a, b));
        assert!(!s.can_be_equals(a, c));
    }

    #[test]
    fn test_can_be_equals_alpha2() {
        let mut s = EntityStore::new();
        let a = state(&mut s, "Франция", "FR");
        let mut r = GeoReferent::with_name_type("French Republic", "republic");
        r.set_alpha2("FR");
        let b = s.add(r);
        let c = state(&mut s, "Германия", "DE");
        assert!(s.can_be_equals(a, b));
        assert!(!s.can_be_equals(a, c));
    }

    #[test]
    fn test_can_be_equals_city_vs_region() {
        let mut s = EntityStore::new();
        let a = city(&mut s, "Москва");
        let b = region(&mut s, "Москва");
        assert!(!s.can_be_equals(a, b));
    }

    #[test]
    fn test_can_be_equals_checks_higher() {
        let mut s = EntityStore::new();
        let tver = region(&mut s, "Тверская");
        let msk = region(&mut s, "Московская");
        let a = s.add(GeoReferent::with_name_type("Кировский", "район"));
        let b = s.add(GeoReferent::with_name_type("Кировский", "район"));
        assert!(s.set_higher(a, Some(tver)));
        assert!(s.set_higher(b, Some(msk)));
        assert!(!s.can_be_equals(a, b));
        assert!(s.set_higher(b, Some(tver)));
        assert!(s.can_be_equals(a, b));
    }

    #[test]
    fn test_settlement_types_are_permissive() {
        let mut s = EntityStore::new();
        let a = s.add(GeoReferent::with_name_type("Ивановка", "село"));
        let b = s.add(GeoReferent::with_name_type("Ивановка", "деревня"));
        assert!(s.can_be_equals(a, b));
        let c = s.add(GeoReferent::with_name_type("Кировский", "район"));
        let d = s.add(GeoReferent::with_name_type("Кировский", "округ"));
        assert!(!s.can_be_equals(c, d));
    }

    #[test]
    fn test_merge_slots2_filters_script_and_soviet_names() {
        let mut s = EntityStore::new();
        let a = state(&mut s, "Украина", "UA");
        let mut r = GeoReferent::with_name_type("Украинская ССР", "республика");
        r.add_name("Ukraine");
        r.add_name("Україна");
        r.set_alpha2("UA");
        let b = s.add(r);
        s.merge_slots2(a, b, Language::Russian);
        let names: Vec<_> = s.entity(a).names().collect();
        assert_eq!(names, vec!["УКРАИНА", "УКРАЇНА"]);
        assert!(!s.entity(a).has_type("республика"));
        assert!(s.entity(a).is_state());
    }

    #[test]
    fn test_merge_slots2_backfills_and_keeps_one_city_type() {
        let mut s = EntityStore::new();
        let a = s.add(GeoReferent::new());
        let mut r = GeoReferent::with_name_type("Paris", "town");
        r.add_type("город");
        r.add_type("city");
        let b = s.add(r);
        s.merge_slots2(a, b, Language::English);
        let e = s.entity(a);
        assert_eq!(e.names().collect::<Vec<_>>(), vec!["PARIS"]);
        assert_eq!(e.types().collect::<Vec<_>>(), vec!["city"]);
    }

    #[test]
    fn test_merge_collapses_duplicate_higher() {
        let mut s = EntityStore::new();
        let r1 = region(&mut s, "Тверская");
        let r2 = region(&mut s, "Московская");
        let a = city(&mut s, "Тверь");
        let b = city(&mut s, "Тверь");
        assert!(s.set_higher(a, Some(r1)));
        assert!(s.set_higher(b, Some(r2)));
        s.merge_slots2(a, b, Language::Russian);
        assert_eq!(s.entity(a).higher_slots(), vec![r1]);
    }

    #[test]
    fn test_create_ontology_item_terms() {
        let mut s = EntityStore::new();
        let a = state(&mut s, "Россия", "RU");
        s.entity_mut(a).add_name("РОССИИ");
        let item = s.create_ontology_item(a);
        assert_eq!(item.terms, vec!["#RU".to_string(), term_key("РОССИЯ")]);
    }

    #[test]
    fn test_import_remaps_higher() {
        let mut seed = EntityStore::new();
        let c = state(&mut seed, "Россия", "RU");
        let m = city(&mut seed, "Москва");
        assert!(seed.set_higher(m, Some(c)));
        let mut doc = EntityStore::new();
        doc.add(GeoReferent::new());
        let ids = doc.import(&seed);
        assert_eq!(ids.len(), 2);
        assert_eq!(doc.status(ids[1]), EntityStatus::Canonical);
        assert_eq!(doc.higher(ids[1]), Some(ids[0]));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        const NAMES: &[&str] = &["Тверь", "Тверская", "Москва", "Кировский", "Paris"];
        const TYPES: &[&str] = &["город", "область", "район", "село", "city", "государство"];

        fn build(specs: &[(usize, usize, Option<usize>, bool)]) -> EntityStore {
            let mut s = EntityStore::new();
            for (n, t, _, a2) in specs {
                let mut r = GeoReferent::with_name_type(NAMES[*n], TYPES[*t]);
                if *a2 {
                    r.set_alpha2("RU");
                }
                s.add(r);
            }
            for (i, (_, _, h, _)) in specs.iter().enumerate() {
                if let Some(h) = h {
                    s.set_higher(EntityId::new(i), Some(EntityId::new(*h % specs.len())));
                }
            }
            s
        }

        proptest! {
            #[test]
            fn higher_chains_terminate(
                links in proptest::collection::vec((0usize..8, 0usize..8), 0..40)
            ) {
                let mut s = EntityStore::new();
                for i in 0..8 {
                    s.add(GeoReferent::with_name_type(&format!("N{i}"), "район"));
                }
                for (a, b) in links {
                    s.set_higher(EntityId::new(a), Some(EntityId::new(b)));
                }
                for id in s.ids() {
                    let chain = s.ancestors(id);
                    prop_assert!(!chain.contains(&id));
                    prop_assert!(chain.len() < 8);
                }
            }

            #[test]
            fn reverse_link_is_rejected(a in 0usize..6, b in 0usize..6) {
                prop_assume!(a != b);
                let mut s = EntityStore::new();
                for i in 0..6 {
                    s.add(GeoReferent::with_name_type(&format!("N{i}"), "район"));
                }
                let (a, b) = (EntityId::new(a), EntityId::new(b));
                prop_assert!(s.set_higher(a, Some(b)));
                prop_assert!(!s.set_higher(b, Some(a)));
            }

            #[test]
            fn can_be_equals_is_symmetric(
                specs in proptest::collection::vec(
                    (0usize..5, 0usize..6, proptest::option::of(0usize..6), any::<bool>()),
                    1..6,
                )
            ) {
                let s = build(&specs);
                for a in s.ids() {
                    for b in s.ids() {
                        prop_assert_eq!(s.can_be_equals(a, b), s.can_be_equals(b, a));
                    }
                }
            }

            #[test]
            fn classification_is_stable_between_writes(t in 0usize..6, extra in 0usize..6) {
                let mut r = GeoReferent::with_name_type("Тверь", TYPES[t]);
                let first = r.classification();
                prop_assert_eq!(first, r.classification());
                r.add_type(TYPES[extra]);
                let fresh = GeoReferent::with_name_type("Тверь", TYPES[t]);
                let mut expected = fresh;
                expected.add_type(TYPES[extra]);
                prop_assert_eq!(r.classification(), expected.classification());
            }
        }
    }
}
