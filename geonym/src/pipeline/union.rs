//! Supranational unions ("Союз России и Беларуси", "Union of France and
//! Germany").

use geonym_core::taxonomy::type_by_form;
use geonym_core::{EntityId, GeoReferent, SlotName, SlotValue, TokenId, TypeKind, TypeWord};

use super::{GeoAnalyzer, PassStatus};
use crate::collab::ResolvedSpan;
use crate::document::GeoDocument;

/// Union designator at `t`, and the token after it ("OF" skipped).
fn marker(doc: &GeoDocument, t: TokenId) -> Option<(&'static TypeWord, TokenId)> {
    let term = doc.stream.node(t).term()?;
    let word = type_by_form(term, doc.lang).filter(|w| w.kind == TypeKind::Union)?;
    let mut after = doc.stream.next(t)?;
    if doc.stream.node(after).is_term("OF") {
        after = doc.stream.next(after)?;
    }
    Some((word, after))
}

fn is_separator(doc: &GeoDocument, t: TokenId) -> bool {
    let node = doc.stream.node(t);
    node.is_comma() || node.text().is_some_and(|k| k.is_and())
}

/// State mentions from `start` joined by commas and conjunctions.
fn members(doc: &GeoDocument, start: TokenId) -> Vec<(TokenId, EntityId)> {
    let mut out = Vec::new();
    let mut cur = Some(start);
    while let Some(t) = cur {
        let Some(e) = doc.geo_at(t).filter(|&e| doc.store.entity(e).is_state()) else {
            break;
        };
        if !out.iter().any(|&(_, m)| m == e) {
            out.push((t, e));
        }
        cur = doc.stream.next(t).filter(|&s| is_separator(doc, s)).and_then(|s| {
            let s = doc.stream.next(s)?;
            // "Россия, Беларусь, и Казахстан"
            if is_separator(doc, s) {
                doc.stream.next(s)
            } else {
                Some(s)
            }
        });
    }
    out
}

impl GeoAnalyzer {
    pub(crate) fn union_pass(&self, doc: &mut GeoDocument) -> PassStatus {
        let mut found = 0usize;
        let mut cur = doc.stream.first();
        while let Some(t) = cur {
            if doc.budget_exhausted(self.config.max_entities) {
                log::warn!("entity cap {} reached in union pass", self.config.max_entities);
                return PassStatus::CapReached;
            }
            let Some((word, after)) = marker(doc, t) else {
                cur = doc.stream.next(t);
                continue;
            };
            let list = members(doc, after);
            let Some(&(last, _)) = list.last().filter(|_| list.len() >= 2) else {
                cur = doc.stream.next(t);
                continue;
            };

            let mut r = GeoReferent::new();
            r.add_type(word.canonical);
            let names: Vec<String> = list
                .iter()
                .filter_map(|&(_, e)| doc.store.entity(e).names().next().map(str::to_string))
                .collect();
            r.add_name(&format!("{} {}", word.canonical, names.join(" ")));
            for &(_, e) in &list {
                r.add_slot(SlotName::Ref, SlotValue::Geo(e), 1);
            }
            let id = doc.add_entity(r);
            let entity = doc.confirm(id);
            match Self::bind(doc, ResolvedSpan { begin: t, end: last, entity }) {
                Some(node) => {
                    found += 1;
                    cur = doc.stream.next(node);
                }
                None => cur = doc.stream.next(t),
            }
        }
        log::debug!("union pass: {found} unions");
        PassStatus::Done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geonym_core::Language;

    fn run(text: &str, lang: Language) -> GeoDocument {
        let analyzer = GeoAnalyzer::new().unwrap();
        let mut doc = GeoDocument::from_text(text, lang);
        analyzer.territory_pass(&mut doc, 0);
        analyzer.union_pass(&mut doc);
        doc
    }

    #[test]
    fn test_union_of_states() {
        let doc = run("Союз России, Беларуси и Казахстана", Language::Russian);
        let m = doc.mentions();
        assert_eq!(m.len(), 1);
        let u = doc.store.entity(m[0].entity);
        assert!(u.is_union());
        assert_eq!(u.geo_refs().len(), 3);
        assert!(u
            .geo_refs()
            .iter()
            .all(|&e| doc.store.entity(e).is_state()));
    }

    #[test]
    fn test_union_of_english() {
        let doc = run("the Union of France and Germany", Language::English);
        let m = doc.mentions();
        assert_eq!(m.len(), 1);
        assert_eq!(m[0].text, "Union of France and Germany");
    }

    #[test]
    fn test_single_member_is_not_a_union() {
        let doc = run("Союз России", Language::Russian);
        let m = doc.mentions();
        assert_eq!(m.len(), 1);
        assert!(doc.store.entity(m[0].entity).is_state());
    }
}
