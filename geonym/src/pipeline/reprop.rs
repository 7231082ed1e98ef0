//! Ontology repropagation: bare capitalized re-mentions of entities the
//! document already knows ("... Normandy again") are bound to a fresh
//! provisional copy, which canonicalization merges back.

use std::collections::HashMap;

use geonym_core::names::term_key;
use geonym_core::EntityId;

use super::{GeoAnalyzer, PassStatus};
use crate::collab::ResolvedSpan;
use crate::document::GeoDocument;
use crate::recognizers::items::{is_function_word, looks_like_name};

impl GeoAnalyzer {
    pub(crate) fn repropagate(&self, doc: &mut GeoDocument) -> PassStatus {
        // Single-word names only; the first entity seen wins.
        let mut by_name: HashMap<String, EntityId> = HashMap::new();
        for id in doc.seen_entities() {
            let e = doc.store.entity(id);
            if e.is_union() {
                continue;
            }
            for name in e.names().filter(|n| !n.contains([' ', '-'])) {
                by_name.entry(term_key(name)).or_insert(id);
            }
        }
        if by_name.is_empty() {
            return PassStatus::Done;
        }

        let mut bound = 0usize;
        let mut cur = doc.stream.first();
        while let Some(t) = cur {
            cur = doc.stream.next(t);
            let node = doc.stream.node(t);
            let Some(term) = node.term() else { continue };
            let class = node.morph.class;
            if !looks_like_name(node)
                || class.is_proper()
                || class.is_adjective()
                || is_function_word(node)
            {
                continue;
            }
            let Some(&source) = by_name.get(&term_key(term)) else {
                continue;
            };
            if doc.budget_exhausted(self.config.max_entities) {
                log::warn!(
                    "entity cap {} reached during repropagation",
                    self.config.max_entities
                );
                return PassStatus::CapReached;
            }
            let copy = doc.store.entity(source).clone_without_occurrences();
            let id = doc.add_entity(copy);
            let entity = doc.add_provisional(id);
            if let Some(n) = Self::bind(doc, ResolvedSpan { begin: t, end: t, entity }) {
                bound += 1;
                cur = doc.stream.next(n);
            }
        }
        log::debug!("repropagation: {bound} mentions");
        PassStatus::Done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geonym_core::Language;

    #[test]
    fn test_bare_remention_bound_to_copy() {
        let analyzer = GeoAnalyzer::new().unwrap();
        let mut doc = GeoDocument::from_text(
            "Region Normandy, city of Rouen. We visited Normandy again.",
            Language::English,
        );
        analyzer.territory_pass(&mut doc, 0);
        analyzer.territory_pass(&mut doc, 1);
        analyzer.city_pass(&mut doc);
        let before = doc.mentions().len();
        analyzer.repropagate(&mut doc);
        let m = doc.mentions();
        assert_eq!(m.len(), before + 1);
        let last = m.last().unwrap();
        assert_eq!(last.text, "Normandy");
        assert_ne!(last.entity, m[0].entity);
        assert!(doc.store.can_be_equals(last.entity, m[0].entity));
        assert!(doc.provisional().contains(&last.entity));
    }

    #[test]
    fn test_lowercase_words_untouched() {
        let analyzer = GeoAnalyzer::new().unwrap();
        let mut doc = GeoDocument::from_text("Город Тверь. тверь", Language::Russian);
        analyzer.city_pass(&mut doc);
        analyzer.repropagate(&mut doc);
        assert_eq!(doc.mentions().len(), 1);
    }
}
