//! Per-document recognition state.
//!
//! A [`GeoDocument`] owns the token stream, the entity store, the local
//! registry and the provisional list of one run. Nothing here is shared
//! between documents; independent documents may be processed in parallel
//! with one analyzer.

use std::ops::{BitOr, BitOrAssign};

use geonym_core::{
    Annotation, AnnotationKind, EntityId, EntityStore, GeoReferent, Language, MorphInfo, NodeKind,
    Occurrence, Ontology, Registry, TokenId, TokenStream,
};

/// Per-token marks set by earlier passes for later ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenFlags(u8);

impl TokenFlags {
    /// A territory parse started here but could not be defined.
    pub const MAYBE_TERRITORY: TokenFlags = TokenFlags(1);
    /// The city pass already tried this position.
    pub const TRIED_CITY: TokenFlags = TokenFlags(1 << 1);

    /// No flags.
    #[must_use]
    pub const fn empty() -> Self {
        TokenFlags(0)
    }

    /// Whether all bits of `other` are set.
    #[must_use]
    pub const fn contains(self, other: TokenFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// True if no flag is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for TokenFlags {
    type Output = TokenFlags;

    fn bitor(self, rhs: TokenFlags) -> TokenFlags {
        TokenFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for TokenFlags {
    fn bitor_assign(&mut self, rhs: TokenFlags) {
        self.0 |= rhs.0;
    }
}

/// One mention of an entity in the top-level stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mention {
    /// The composite node.
    pub node: TokenId,
    /// The entity the node is bound to.
    pub entity: EntityId,
    /// Start offset in characters.
    pub begin_char: usize,
    /// End offset in characters (exclusive).
    pub end_char: usize,
    /// Covered text.
    pub text: String,
}

/// A document under recognition.
#[derive(Debug, Clone)]
pub struct GeoDocument {
    pub(crate) stream: TokenStream,
    pub(crate) store: EntityStore,
    pub(crate) registry: Registry,
    pub(crate) provisional: Vec<EntityId>,
    pub(crate) lang: Language,
    flags: Vec<TokenFlags>,
    pub(crate) cities_added: usize,
}

impl GeoDocument {
    /// Wrap an already tokenized stream.
    #[must_use]
    pub fn new(stream: TokenStream, lang: Language) -> Self {
        Self {
            stream,
            store: EntityStore::new(),
            registry: Registry::new(),
            provisional: Vec::new(),
            lang,
            flags: Vec::new(),
            cities_added: 0,
        }
    }

    /// Tokenize `text` with the built-in tokenizer.
    #[must_use]
    pub fn from_text(text: &str, lang: Language) -> Self {
        Self::new(TokenStream::from_text(text), lang)
    }

    /// Seed the local registry with the entities of `ontology`.
    #[must_use]
    pub fn with_ontology(mut self, ontology: &Ontology) -> Self {
        self.import_ontology(ontology);
        self
    }

    pub(crate) fn import_ontology(&mut self, ontology: &Ontology) {
        let ids = self.store.import(ontology.store());
        for id in ids {
            self.registry.adopt(&self.store, id);
        }
    }

    // =========================================================================
    // Read access
    // =========================================================================

    /// The token stream.
    #[must_use]
    pub fn stream(&self) -> &TokenStream {
        &self.stream
    }

    /// The entity store.
    #[must_use]
    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    /// The local registry.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Document language.
    #[must_use]
    pub fn lang(&self) -> Language {
        self.lang
    }

    /// Canonical entities in registration order.
    #[must_use]
    pub fn registered(&self) -> &[EntityId] {
        self.registry.members()
    }

    /// Entities still awaiting canonicalization.
    #[must_use]
    pub fn provisional(&self) -> &[EntityId] {
        &self.provisional
    }

    /// Top-level geographic mentions in text order.
    #[must_use]
    pub fn mentions(&self) -> Vec<Mention> {
        self.stream
            .iter()
            .filter_map(|id| {
                let node = self.stream.node(id);
                node.geo().map(|entity| Mention {
                    node: id,
                    entity: self.store.resolve(entity),
                    begin_char: node.begin_char,
                    end_char: node.end_char,
                    text: self.stream.surface(id),
                })
            })
            .collect()
    }

    /// "type NAME, type NAME" display of an entity and its ancestors.
    #[must_use]
    pub fn display(&self, id: EntityId) -> String {
        self.store.display(id)
    }

    /// Snapshot the canonical entities as an ontology for later documents.
    #[must_use]
    pub fn to_ontology(&self) -> Ontology {
        Ontology::from_store(&self.store)
    }

    // =========================================================================
    // Entity lifecycle
    // =========================================================================

    /// Add a new entity to the store. It is neither registered nor
    /// provisional until [`confirm`](Self::confirm) or
    /// [`add_provisional`](Self::add_provisional).
    pub fn add_entity(&mut self, entity: GeoReferent) -> EntityId {
        self.store.add(entity)
    }

    /// Register `id` now, returning the instance to use from then on.
    pub fn confirm(&mut self, id: EntityId) -> EntityId {
        let survivor = self.registry.register(&mut self.store, id, self.lang);
        self.provisional.retain(|&p| p != id);
        survivor
    }

    /// Hold `id` for the canonicalization pass.
    pub fn add_provisional(&mut self, id: EntityId) -> EntityId {
        if !self.provisional.contains(&id) {
            self.provisional.push(id);
        }
        id
    }

    /// Distinct live entities of this document.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        let live = self
            .provisional
            .iter()
            .filter(|&&id| !self.store.is_forwarded(id) && !self.registry.contains(id))
            .count();
        self.registry.len() + live
    }

    /// Whether no further entity may be created.
    pub(crate) fn budget_exhausted(&self, cap: usize) -> bool {
        self.entity_count() >= cap
    }

    /// Registered and provisional entities, resolved and deduplicated, in
    /// registration then creation order.
    pub(crate) fn seen_entities(&self) -> Vec<EntityId> {
        let mut out: Vec<EntityId> = self.registry.members().to_vec();
        for &id in &self.provisional {
            let id = self.store.resolve(id);
            if !out.contains(&id) {
                out.push(id);
            }
        }
        out
    }

    /// Drop a provisional entity that never got a mention.
    pub(crate) fn discard_unused(&mut self, id: EntityId) {
        let id = self.store.resolve(id);
        if self.store.entity(id).occurrences().is_empty() {
            self.provisional.retain(|&p| p != id);
        }
    }

    // =========================================================================
    // Stream
    // =========================================================================

    /// Entity bound to a geographic node.
    #[must_use]
    pub fn geo_at(&self, id: TokenId) -> Option<EntityId> {
        self.stream.node(id).geo().map(|e| self.store.resolve(e))
    }

    /// Embed `[begin, end]` as a mention of `entity`.
    ///
    /// A span the stream rejects is logged and skipped.
    pub(crate) fn embed_geo(
        &mut self,
        begin: TokenId,
        end: TokenId,
        entity: EntityId,
    ) -> Option<TokenId> {
        let entity = self.store.resolve(entity);
        match self
            .stream
            .embed(begin, end, NodeKind::Geo(entity), MorphInfo::default())
        {
            Ok(node) => {
                let n = self.stream.node(node);
                let occ = Occurrence {
                    node,
                    begin_char: n.begin_char,
                    end_char: n.end_char,
                };
                self.store.add_occurrence(entity, occ);
                Some(node)
            }
            Err(e) => {
                log::warn!("cannot embed span for {entity}: {e}");
                None
            }
        }
    }

    /// Embed `[begin, end]` as a non-geographic annotation.
    ///
    /// Candidate generators use this to claim spans the geographic passes
    /// must not read.
    pub fn annotate(
        &mut self,
        begin: TokenId,
        end: TokenId,
        kind: AnnotationKind,
        label: impl Into<String>,
    ) -> geonym_core::Result<TokenId> {
        let payload = NodeKind::Annotation(Annotation {
            kind,
            label: label.into(),
        });
        self.stream.embed(begin, end, payload, MorphInfo::default())
    }

    /// Flags of a token.
    #[must_use]
    pub fn flags(&self, id: TokenId) -> TokenFlags {
        self.flags.get(id.index()).copied().unwrap_or_default()
    }

    pub(crate) fn set_flag(&mut self, id: TokenId, flag: TokenFlags) {
        let i = id.index();
        if self.flags.len() <= i {
            self.flags.resize(i + 1, TokenFlags::empty());
        }
        self.flags[i] |= flag;
    }

    pub(crate) fn reset_flags(&mut self) {
        self.flags.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embed_geo_records_occurrence() {
        let mut doc = GeoDocument::from_text("в г. Тверь", Language::Russian);
        let ids: Vec<_> = doc.stream.iter().collect();
        let e = doc.store.add(GeoReferent::with_name_type("Тверь", "город"));
        let node = doc.embed_geo(ids[1], ids[3], e).unwrap();
        assert_eq!(doc.geo_at(node), Some(e));
        assert_eq!(doc.store.entity(e).occurrences().len(), 1);
        let m = doc.mentions();
        assert_eq!(m.len(), 1);
        assert_eq!(m[0].text, "г. Тверь");
        assert_eq!((m[0].begin_char, m[0].end_char), (2, 10));
    }

    #[test]
    fn test_embed_geo_rejects_consumed_span() {
        let mut doc = GeoDocument::from_text("г. Тверь", Language::Russian);
        let ids: Vec<_> = doc.stream.iter().collect();
        let e = doc.store.add(GeoReferent::with_name_type("Тверь", "город"));
        assert!(doc.embed_geo(ids[0], ids[2], e).is_some());
        assert!(doc.embed_geo(ids[2], ids[2], e).is_none());
    }

    #[test]
    fn test_entity_count_and_confirm() {
        let mut doc = GeoDocument::from_text("", Language::Russian);
        let a = doc.store.add(GeoReferent::with_name_type("Тверская", "область"));
        let b = doc.store.add(GeoReferent::with_name_type("Тверская", "область"));
        doc.add_provisional(a);
        doc.add_provisional(b);
        assert_eq!(doc.entity_count(), 2);
        assert!(doc.budget_exhausted(2));
        assert_eq!(doc.confirm(a), a);
        assert_eq!(doc.confirm(b), a);
        assert_eq!(doc.entity_count(), 1);
        assert!(doc.provisional().is_empty());
        assert_eq!(doc.seen_entities(), vec![a]);
    }

    #[test]
    fn test_flags() {
        let mut doc = GeoDocument::from_text("a b", Language::English);
        let t = doc.stream.first().unwrap();
        assert!(doc.flags(t).is_empty());
        doc.set_flag(t, TokenFlags::MAYBE_TERRITORY);
        doc.set_flag(t, TokenFlags::TRIED_CITY);
        assert!(doc.flags(t).contains(TokenFlags::MAYBE_TERRITORY | TokenFlags::TRIED_CITY));
        doc.reset_flags();
        assert!(doc.flags(t).is_empty());
    }

    #[test]
    fn test_with_ontology_adopts_entities() {
        let onto = Ontology::from_json(r#"[{"names": ["Россия"], "alpha2": "RU"}]"#).unwrap();
        let doc = GeoDocument::from_text("", Language::Russian).with_ontology(&onto);
        assert_eq!(doc.registered().len(), 1);
        assert!(doc.registry().lookup_alpha2("RU").is_some());
    }
}
