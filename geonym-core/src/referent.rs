//! The geographic referent entity model.
//!
//! A [`GeoReferent`] is an ordered multiset of slots plus the list of spans
//! that mention it. Classification predicates (`is_city`, `is_state`, ...)
//! are derived from TYPE/ALPHA2/MISC slots and cached; every mutating
//! method drops the cache before returning, so the next read recomputes.

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::lang::{script_of, Script};
use crate::names::{normalize_name, term_key};
use crate::taxonomy::{is_big_city_name, is_preferred_city_type, kind_of, TypeKind};
use crate::token::TokenId;

/// Stable id of an entity inside an [`crate::EntityStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub(crate) u32);

impl EntityId {
    /// Wrap an arena index.
    #[must_use]
    pub fn new(index: usize) -> Self {
        EntityId(index as u32)
    }

    /// Arena index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Attribute names of a geographic referent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SlotName {
    /// Name variant (repeatable).
    Name,
    /// Lower-case administrative designator (repeatable).
    Type,
    /// ISO 3166-1 alpha-2 country code.
    Alpha2,
    /// Administrative parent.
    Higher,
    /// Free-form flags ("big", "union member").
    Misc,
    /// Link to a related entity (union member, organization).
    Ref,
    /// FIAS registry identifier.
    Fias,
    /// BTI registry identifier.
    Bti,
}

impl SlotName {
    /// Upper-case attribute tag.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SlotName::Name => "NAME",
            SlotName::Type => "TYPE",
            SlotName::Alpha2 => "ALPHA2",
            SlotName::Higher => "HIGHER",
            SlotName::Misc => "MISC",
            SlotName::Ref => "REF",
            SlotName::Fias => "FIAS",
            SlotName::Bti => "BTI",
        }
    }
}

/// A non-geographic entity referenced from a REF slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ForeignRef {
    /// Entity kind ("organization").
    pub kind: String,
    /// Normalized label.
    pub label: String,
}

/// Value of a slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotValue {
    /// Plain string.
    Text(String),
    /// Another geographic entity.
    Geo(EntityId),
    /// A non-geographic entity.
    Foreign(ForeignRef),
}

impl SlotValue {
    /// String payload.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            SlotValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Entity payload.
    #[must_use]
    pub fn as_geo(&self) -> Option<EntityId> {
        match self {
            SlotValue::Geo(id) => Some(*id),
            _ => None,
        }
    }
}

/// One (attribute, value, count) fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    /// Attribute.
    pub name: SlotName,
    /// Value.
    pub value: SlotValue,
    /// How many times the fact was asserted.
    pub count: u32,
}

/// A span of the stream that mentions an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    /// The composite node bound to the entity.
    pub node: TokenId,
    /// Start character offset.
    pub begin_char: usize,
    /// End character offset (exclusive).
    pub end_char: usize,
}

/// Derived classification of an entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// City, town or settlement.
    pub is_city: bool,
    /// City large enough to contain districts directly.
    pub is_big_city: bool,
    /// Region or district.
    pub is_region: bool,
    /// Sovereign state.
    pub is_state: bool,
    /// Supranational union.
    pub is_union: bool,
    /// Rural settlement (also `is_city`).
    pub is_settlement: bool,
    /// Subdivision inside a city.
    pub is_city_district: bool,
}

/// A geographic entity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeoReferent {
    slots: Vec<Slot>,
    occurrences: Vec<Occurrence>,
    #[serde(skip)]
    class: OnceCell<Classification>,
}

impl GeoReferent {
    /// Empty entity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Entity with a name and a designator.
    #[must_use]
    pub fn with_name_type(name: &str, typ: &str) -> Self {
        let mut r = Self::new();
        r.add_name(name);
        r.add_type(typ);
        r
    }

    fn invalidate(&mut self) {
        self.class.take();
    }

    // =========================================================================
    // Slots
    // =========================================================================

    /// All slots in insertion order.
    #[must_use]
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Add a fact, bumping the count when the same fact already exists.
    pub fn add_slot(&mut self, name: SlotName, value: SlotValue, count: u32) {
        if let Some(s) = self
            .slots
            .iter_mut()
            .find(|s| s.name == name && s.value == value)
        {
            s.count += count.max(1);
        } else {
            self.slots.push(Slot {
                name,
                value,
                count: count.max(1),
            });
        }
        self.invalidate();
    }

    /// Append a slot verbatim, duplicates included.
    pub fn push_slot(&mut self, slot: Slot) {
        self.slots.push(slot);
        self.invalidate();
    }

    /// Keep only the slots matching `keep`.
    pub fn retain_slots(&mut self, keep: impl FnMut(&Slot) -> bool) {
        self.slots.retain(keep);
        self.invalidate();
    }

    /// Rewrite every entity-valued slot through `map`.
    pub fn map_geo_slots(&mut self, mut map: impl FnMut(EntityId) -> EntityId) -> bool {
        let mut changed = false;
        for s in &mut self.slots {
            if let SlotValue::Geo(id) = s.value {
                let to = map(id);
                if to != id {
                    s.value = SlotValue::Geo(to);
                    changed = true;
                }
            }
        }
        if changed {
            self.invalidate();
        }
        changed
    }

    /// Add a name (normalized to upper case).
    pub fn add_name(&mut self, name: &str) {
        let name = normalize_name(name);
        if !name.is_empty() {
            self.add_slot(SlotName::Name, SlotValue::Text(name), 1);
        }
    }

    /// Add a designator (normalized to lower case).
    pub fn add_type(&mut self, typ: &str) {
        let typ = typ.trim().to_lowercase();
        if !typ.is_empty() {
            self.add_slot(SlotName::Type, SlotValue::Text(typ), 1);
        }
    }

    /// Set the ISO alpha-2 code, replacing any previous one.
    pub fn set_alpha2(&mut self, code: &str) {
        self.slots.retain(|s| s.name != SlotName::Alpha2);
        self.add_slot(
            SlotName::Alpha2,
            SlotValue::Text(code.trim().to_ascii_uppercase()),
            1,
        );
    }

    /// Add a MISC flag.
    pub fn add_misc(&mut self, misc: &str) {
        self.add_slot(SlotName::Misc, SlotValue::Text(misc.to_string()), 1);
    }

    /// Overwrite the HIGHER slot. Validation lives in the store.
    pub(crate) fn put_higher(&mut self, parent: Option<EntityId>) {
        self.slots.retain(|s| s.name != SlotName::Higher);
        if let Some(p) = parent {
            self.slots.push(Slot {
                name: SlotName::Higher,
                value: SlotValue::Geo(p),
                count: 1,
            });
        }
        self.invalidate();
    }

    fn texts(&self, name: SlotName) -> impl Iterator<Item = &str> + '_ {
        self.slots
            .iter()
            .filter(move |s| s.name == name)
            .filter_map(|s| s.value.as_text())
    }

    /// NAME values.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.texts(SlotName::Name)
    }

    /// TYPE values.
    pub fn types(&self) -> impl Iterator<Item = &str> + '_ {
        self.texts(SlotName::Type)
    }

    /// MISC values.
    pub fn misc(&self) -> impl Iterator<Item = &str> + '_ {
        self.texts(SlotName::Misc)
    }

    /// ALPHA2 code.
    #[must_use]
    pub fn alpha2(&self) -> Option<&str> {
        self.texts(SlotName::Alpha2).next()
    }

    /// Every HIGHER target, duplicates included.
    #[must_use]
    pub fn higher_slots(&self) -> Vec<EntityId> {
        self.slots
            .iter()
            .filter(|s| s.name == SlotName::Higher)
            .filter_map(|s| s.value.as_geo())
            .collect()
    }

    /// Raw first HIGHER target, unvalidated.
    #[must_use]
    pub fn raw_higher(&self) -> Option<EntityId> {
        self.higher_slots().into_iter().next()
    }

    /// Geographic REF targets.
    #[must_use]
    pub fn geo_refs(&self) -> Vec<EntityId> {
        self.slots
            .iter()
            .filter(|s| s.name == SlotName::Ref)
            .filter_map(|s| s.value.as_geo())
            .collect()
    }

    /// All REF values.
    pub fn refs(&self) -> impl Iterator<Item = &SlotValue> + '_ {
        self.slots
            .iter()
            .filter(|s| s.name == SlotName::Ref)
            .map(|s| &s.value)
    }

    /// Whether a NAME matches `name` modulo inflection.
    #[must_use]
    pub fn has_name(&self, name: &str) -> bool {
        let key = term_key(name);
        self.names().any(|n| term_key(n) == key)
    }

    /// Whether the exact designator is present.
    #[must_use]
    pub fn has_type(&self, typ: &str) -> bool {
        self.types().any(|t| t == typ)
    }

    /// Whether any designator is written in `script`.
    #[must_use]
    pub fn has_type_in(&self, script: Script) -> bool {
        self.types().any(|t| script_of(t) == script)
    }

    // =========================================================================
    // Occurrences
    // =========================================================================

    /// Mentions of this entity.
    #[must_use]
    pub fn occurrences(&self) -> &[Occurrence] {
        &self.occurrences
    }

    /// Record a mention; the same node is recorded once.
    pub fn add_occurrence(&mut self, occ: Occurrence) {
        if !self.occurrences.iter().any(|o| o.node == occ.node) {
            self.occurrences.push(occ);
        }
    }

    /// Remove and return all mentions.
    pub fn take_occurrences(&mut self) -> Vec<Occurrence> {
        std::mem::take(&mut self.occurrences)
    }

    /// Copy of this entity without its mentions.
    #[must_use]
    pub fn clone_without_occurrences(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            occurrences: Vec::new(),
            class: OnceCell::new(),
        }
    }

    // =========================================================================
    // Classification
    // =========================================================================

    /// Derived classification, computed on first read after a write.
    pub fn classification(&self) -> Classification {
        *self.class.get_or_init(|| self.classify())
    }

    fn classify(&self) -> Classification {
        let kinds: Vec<TypeKind> = self.types().filter_map(kind_of).collect();
        let has = |k: TypeKind| kinds.contains(&k);
        let mut c = Classification {
            is_union: has(TypeKind::Union),
            ..Classification::default()
        };
        if self.alpha2().is_some() {
            c.is_state = true;
            c.is_city = has(TypeKind::City);
        } else {
            c.is_state = has(TypeKind::State);
            c.is_city = has(TypeKind::City) || has(TypeKind::Settlement);
            c.is_settlement = has(TypeKind::Settlement) && !has(TypeKind::City);
            c.is_region = !c.is_state
                && !c.is_city
                && !c.is_union
                && (has(TypeKind::Region) || has(TypeKind::District));
            c.is_city_district = !c.is_city && has(TypeKind::CityDistrict);
        }
        c.is_big_city = c.is_city
            && (self.misc().any(|m| m == "big") || self.names().any(is_big_city_name));
        c
    }

    /// City, town or settlement.
    pub fn is_city(&self) -> bool {
        self.classification().is_city
    }

    /// Big city.
    pub fn is_big_city(&self) -> bool {
        self.classification().is_big_city
    }

    /// Region or district.
    pub fn is_region(&self) -> bool {
        self.classification().is_region
    }

    /// Sovereign state.
    pub fn is_state(&self) -> bool {
        self.classification().is_state
    }

    /// Supranational union.
    pub fn is_union(&self) -> bool {
        self.classification().is_union
    }

    /// Rural settlement.
    pub fn is_settlement(&self) -> bool {
        self.classification().is_settlement
    }

    /// District inside a city.
    pub fn is_city_district(&self) -> bool {
        self.classification().is_city_district
    }

    /// The designator shown in displays: a preferred city type for cities,
    /// otherwise the first TYPE.
    #[must_use]
    pub fn display_type(&self) -> Option<&str> {
        if self.is_city() {
            if let Some(t) = self.types().find(|t| is_preferred_city_type(t)) {
                return Some(t);
            }
        }
        self.types().next()
    }

    /// "type NAME" without the hierarchy.
    #[must_use]
    pub fn short_display(&self) -> String {
        let name = self
            .names()
            .next()
            .or_else(|| self.alpha2())
            .unwrap_or("?");
        match self.display_type() {
            Some(t) => format!("{t} {name}"),
            None => name.to_string(),
        }
    }
}
