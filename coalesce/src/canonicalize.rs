//! The canonicalization pass.

use geonym_core::{EntityId, EntityStore, Error, Language, Registry, Result, TokenStream};

/// Counters reported by [`Canonicalizer::canonicalize`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CanonicalStats {
    /// Provisional entities accepted as new canonical members.
    pub registered: usize,
    /// Provisional entities merged into an existing member.
    pub merged: usize,
    /// Stream nodes rebound to a survivor.
    pub retargeted_nodes: usize,
    /// Entities whose HIGHER/REF slots were rewritten.
    pub retargeted_entities: usize,
}

/// Collapses provisional entities into canonical ones.
#[derive(Debug, Clone)]
pub struct Canonicalizer {
    verify: bool,
}

impl Canonicalizer {
    /// Create a canonicalizer that verifies its result.
    pub fn new() -> Self {
        Self { verify: true }
    }

    /// Set whether to check, after the pass, that no forwarded entity is
    /// still referenced.
    pub fn with_verification(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// Register every provisional entity and retarget all references.
    ///
    /// # Algorithm
    ///
    /// 1. Stable-sort provisional entities by (hierarchy depth, short display),
    ///    so parents are registered before their children
    /// 2. Normalize each entity's HIGHER slot, then `register` it; duplicates
    ///    are merged and forwarded by the registry
    /// 3. Walk the stream recursively and rebind nodes of forwarded entities
    /// 4. Rewrite HIGHER/REF slots of every entity
    ///
    /// `provisional` is drained.
    pub fn canonicalize(
        &self,
        stream: &mut TokenStream,
        store: &mut EntityStore,
        registry: &mut Registry,
        provisional: &mut Vec<EntityId>,
        lang: Language,
    ) -> Result<CanonicalStats> {
        let mut stats = CanonicalStats::default();

        let mut pending: Vec<EntityId> = Vec::with_capacity(provisional.len());
        for id in provisional.drain(..) {
            let id = store.resolve(id);
            if !registry.contains(id) && !pending.contains(&id) {
                pending.push(id);
            }
        }
        pending.sort_by_cached_key(|&id| (store.depth(id), store.entity(id).short_display()));

        for id in pending {
            store.normalize_higher(id);
            let survivor = registry.register(store, id, lang);
            if survivor == id {
                stats.registered += 1;
            } else {
                stats.merged += 1;
            }
        }

        for node in stream.all_reachable() {
            let Some(bound) = stream.node(node).geo() else {
                continue;
            };
            let target = store.resolve(bound);
            if target != bound {
                stream.set_geo(node, target)?;
                stats.retargeted_nodes += 1;
            }
        }
        stats.retargeted_entities = store.retarget_slots();
        for id in registry.members().to_vec() {
            store.normalize_higher(id);
        }

        log::debug!(
            "canonicalize: {} registered, {} merged, {} nodes and {} entities retargeted",
            stats.registered,
            stats.merged,
            stats.retargeted_nodes,
            stats.retargeted_entities
        );

        if self.verify {
            Self::verify(stream, store, registry)?;
        }
        Ok(stats)
    }

    /// Check that nothing reachable refers to a forwarded entity.
    pub fn verify(stream: &TokenStream, store: &EntityStore, registry: &Registry) -> Result<()> {
        for node in stream.all_reachable() {
            if let Some(id) = stream.node(node).geo() {
                if store.is_forwarded(id) {
                    return Err(Error::invariant(format!(
                        "node {node} still bound to forwarded entity {id}"
                    )));
                }
            }
        }
        for id in store.ids().filter(|&id| !store.is_forwarded(id)) {
            let e = store.entity(id);
            for target in e.higher_slots().into_iter().chain(e.geo_refs()) {
                if store.is_forwarded(target) {
                    return Err(Error::invariant(format!(
                        "entity {id} still references forwarded entity {target}"
                    )));
                }
            }
        }
        if let Some(&id) = registry.members().iter().find(|&&m| store.is_forwarded(m)) {
            return Err(Error::invariant(format!("registry member {id} is forwarded")));
        }
        Ok(())
    }
}

impl Default for Canonicalizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geonym_core::{GeoReferent, MorphInfo, NodeKind, SlotName, SlotValue};

    fn run(
        stream: &mut TokenStream,
        store: &mut EntityStore,
        provisional: &mut Vec<EntityId>,
    ) -> (Registry, CanonicalStats) {
        let mut registry = Registry::new();
        let stats = Canonicalizer::new()
            .canonicalize(stream, store, &mut registry, provisional, Language::Russian)
            .unwrap();
        (registry, stats)
    }

    #[test]
    fn test_duplicates_retargeted_in_stream() {
        let mut stream = TokenStream::from_text("Ленинградская область и Ленинградской обл.");
        let ids: Vec<_> = stream.iter().collect();
        let mut store = EntityStore::new();
        let a = store.add(GeoReferent::with_name_type("Ленинградская", "область"));
        let b = store.add(GeoReferent::with_name_type("Ленинградской", "область"));
        let na = stream
            .embed(ids[0], ids[1], NodeKind::Geo(a), MorphInfo::default())
            .unwrap();
        let nb = stream
            .embed(ids[3], ids[5], NodeKind::Geo(b), MorphInfo::default())
            .unwrap();
        let mut provisional = vec![b, a];
        let (registry, stats) = run(&mut stream, &mut store, &mut provisional);

        assert!(provisional.is_empty());
        assert_eq!(registry.len(), 1);
        assert_eq!(stats.merged, 1);
        let survivor = registry.members()[0];
        assert_eq!(stream.node(na).geo(), Some(survivor));
        assert_eq!(stream.node(nb).geo(), Some(survivor));
    }

    #[test]
    fn test_nested_nodes_and_slots_retargeted() {
        let mut stream = TokenStream::from_text("г. Тверь Тверская область");
        let ids: Vec<_> = stream.iter().collect();
        let mut store = EntityStore::new();
        let city = store.add(GeoReferent::with_name_type("Тверь", "город"));
        let r1 = store.add(GeoReferent::with_name_type("Тверская", "область"));
        let r2 = store.add(GeoReferent::with_name_type("Тверской", "область"));
        assert!(store.set_higher(city, Some(r2)));

        let inner = stream
            .embed(ids[3], ids[4], NodeKind::Geo(r2), MorphInfo::default())
            .unwrap();
        let outer = stream
            .embed(ids[0], inner, NodeKind::Geo(city), MorphInfo::default())
            .unwrap();
        let mut provisional = vec![city, r1, r2];
        let (registry, stats) = run(&mut stream, &mut store, &mut provisional);

        assert_eq!(registry.len(), 2);
        let region = store.resolve(r2);
        assert_eq!(region, r1);
        assert_eq!(stream.node(inner).geo(), Some(r1));
        assert_eq!(stream.node(outer).geo(), Some(city));
        assert_eq!(store.higher(city), Some(r1));
        assert!(matches!(
            store.entity(city).slots().iter().find(|s| s.name == SlotName::Higher),
            Some(s) if s.value == SlotValue::Geo(r1)
        ));
        assert!(stats.retargeted_nodes >= 1);
    }

    #[test]
    fn test_parents_registered_first() {
        let mut stream = TokenStream::from_text("");
        let mut store = EntityStore::new();
        let region = store.add(GeoReferent::with_name_type("Тверская", "область"));
        let city = store.add(GeoReferent::with_name_type("Тверь", "город"));
        assert!(store.set_higher(city, Some(region)));
        let mut provisional = vec![city, region];
        let (registry, _) = run(&mut stream, &mut store, &mut provisional);
        assert_eq!(registry.members(), &[region, city]);
    }

    #[test]
    fn test_verify_detects_stale_binding() {
        let mut stream = TokenStream::from_text("Тверь");
        let first = stream.first().unwrap();
        let mut store = EntityStore::new();
        let a = store.add(GeoReferent::with_name_type("Тверь", "город"));
        let b = store.add(GeoReferent::with_name_type("Тверь", "город"));
        stream
            .embed(first, first, NodeKind::Geo(b), MorphInfo::default())
            .unwrap();
        store.forward(b, a);
        let err = Canonicalizer::verify(&stream, &store, &Registry::new());
        assert!(matches!(err, Err(Error::Invariant(_))));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        const NAMES: &[&str] = &["Тверь", "Тверская", "Тверской", "Москва", "Химки"];
        const TYPES: &[&str] = &["город", "область", "район"];

        proptest! {
            #[test]
            fn every_provisional_is_registered_or_merged(
                specs in proptest::collection::vec(
                    (0usize..5, 0usize..3, proptest::option::of(0usize..6)),
                    1..6,
                )
            ) {
                let mut stream = TokenStream::from_text("a b c d e f");
                let tokens: Vec<_> = stream.iter().collect();
                let mut store = EntityStore::new();
                let ids: Vec<_> = specs
                    .iter()
                    .map(|&(n, t, _)| store.add(GeoReferent::with_name_type(NAMES[n], TYPES[t])))
                    .collect();
                for (i, &(_, _, h)) in specs.iter().enumerate() {
                    if let Some(h) = h {
                        store.set_higher(ids[i], Some(ids[h % ids.len()]));
                    }
                }
                for (&tok, &id) in tokens.iter().zip(&ids) {
                    stream.embed(tok, tok, NodeKind::Geo(id), MorphInfo::default()).unwrap();
                }

                let mut provisional = ids.clone();
                let (registry, stats) = run(&mut stream, &mut store, &mut provisional);
                prop_assert!(provisional.is_empty());
                prop_assert_eq!(stats.registered + stats.merged, ids.len());
                prop_assert_eq!(registry.len(), stats.registered);
                for &id in &ids {
                    prop_assert!(registry.contains(store.resolve(id)));
                }
            }
        }
    }
}
