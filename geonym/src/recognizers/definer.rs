//! Default definer: candidate lists to entities.

use geonym_core::names::adjective_name;
use geonym_core::{EntityId, GeoReferent, TokenId, TypeKind, TypeWord};

use crate::collab::{Candidate, CandidateKind, Definer, ResolvedSpan};
use crate::document::GeoDocument;
use crate::gazetteer::EntryKind;

/// Lexicon- and designator-driven definer.
///
/// Territory rules, first match wins:
///
/// | items                     | accepted when                                   |
/// |---------------------------|-------------------------------------------------|
/// | name + designator         | the name is not a bare adjective without entry  |
/// | designator + name         | always                                          |
/// | name                      | state entry, or a known non-city entity         |
/// | name (non-strict)         | region entry next to a resolved mention or city |
///
/// States and republics are registered at once; other territories stay
/// provisional. Cities are always registered at once.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultDefiner;

impl DefaultDefiner {
    /// Create a definer.
    pub fn new() -> Self {
        Self
    }
}

fn territory_designator(c: &Candidate) -> Option<&'static TypeWord> {
    c.type_word.filter(|w| {
        matches!(
            w.kind,
            TypeKind::State | TypeKind::Region | TypeKind::District | TypeKind::CityDistrict
        )
    })
}

fn city_designator(c: &Candidate) -> Option<&'static TypeWord> {
    c.type_word
        .filter(|w| matches!(w.kind, TypeKind::City | TypeKind::Settlement))
}

/// Whether a geographic node sits right before `begin` or right after `end`,
/// a comma in between allowed.
fn next_to_mention(doc: &GeoDocument, begin: TokenId, end: TokenId) -> bool {
    let stream = doc.stream();
    let step = |id: Option<TokenId>, fwd: bool| {
        id.and_then(|i| {
            if stream.node(i).is_comma() {
                if fwd {
                    stream.next(i)
                } else {
                    stream.prev(i)
                }
            } else {
                Some(i)
            }
        })
    };
    let before = step(stream.prev(begin), false);
    let after = step(stream.next(end), true);
    [before, after]
        .into_iter()
        .flatten()
        .any(|n| doc.geo_at(n).is_some())
}

fn settle(doc: &mut GeoDocument, r: GeoReferent) -> EntityId {
    let register_now = r.is_state() || r.has_type("республика") || r.has_type("republic");
    let id = doc.add_entity(r);
    if register_now {
        doc.confirm(id)
    } else {
        doc.add_provisional(id)
    }
}

impl DefaultDefiner {
    /// Entity for `name` qualified by the designator `word`.
    fn qualified(
        doc: &GeoDocument,
        name: &Candidate,
        word: &'static TypeWord,
        designator_first: bool,
    ) -> Option<GeoReferent> {
        let lang = doc.lang();
        let entry = name
            .template
            .as_ref()
            .filter(|e| matches!(e.kind, EntryKind::State | EntryKind::Region));
        if name.kind == CandidateKind::Adjective && entry.is_none() && !designator_first {
            return None;
        }
        let mut r = match entry {
            Some(e) if e.kind == EntryKind::State => e.to_referent(lang),
            Some(e) => {
                let mut r = e.to_referent(lang);
                if name.kind == CandidateKind::Adjective {
                    r.add_name(&adjective_name(&name.value, word.gender));
                }
                r
            }
            None => {
                let mut r = GeoReferent::new();
                // A name after its designator keeps its own form ("округ Отрадное").
                let value = if name.kind == CandidateKind::Adjective && !designator_first {
                    adjective_name(&name.value, word.gender)
                } else {
                    name.value.clone()
                };
                r.add_name(&value);
                r
            }
        };
        if !r.is_state() || word.kind == TypeKind::State {
            r.add_type(word.canonical);
        }
        Some(r)
    }
}

impl Definer for DefaultDefiner {
    fn try_define_territory(
        &self,
        doc: &mut GeoDocument,
        items: &[Candidate],
        strict: bool,
        city: Option<EntityId>,
    ) -> Option<ResolvedSpan> {
        let first = items.first()?;
        let second = items.get(1);

        if let (true, Some(word)) = (first.is_name(), second.and_then(territory_designator)) {
            if let Some(r) = Self::qualified(doc, first, word, false) {
                let end = second.map_or(first.end, |c| c.end);
                let entity = settle(doc, r);
                return Some(ResolvedSpan { begin: first.begin, end, entity });
            }
        }
        if let (Some(word), Some(name)) = (territory_designator(first), second.filter(|c| c.is_name())) {
            if let Some(r) = Self::qualified(doc, name, word, true) {
                let entity = settle(doc, r);
                return Some(ResolvedSpan { begin: first.begin, end: name.end, entity });
            }
        }
        if !first.is_name() {
            return None;
        }

        let lang = doc.lang();
        let entry = first.template.clone();
        if let Some(e) = entry.as_ref().filter(|e| e.kind == EntryKind::State) {
            if first.kind == CandidateKind::ProperName {
                let entity = settle(doc, e.to_referent(lang));
                return Some(ResolvedSpan { begin: first.begin, end: first.end, entity });
            }
        }
        if let Some(known) = first.onto.map(|id| doc.store().resolve(id)) {
            if !doc.store().entity(known).is_city() {
                return Some(ResolvedSpan { begin: first.begin, end: first.end, entity: known });
            }
        }
        if strict {
            return None;
        }
        let e = entry.filter(|e| e.kind == EntryKind::Region)?;
        if city.is_none() && !next_to_mention(doc, first.begin, first.end) {
            return None;
        }
        let mut r = e.to_referent(lang);
        if first.kind == CandidateKind::Adjective {
            let gender = r
                .types()
                .find_map(geonym_core::taxonomy::by_canonical)
                .map(|w| w.gender)
                .unwrap_or_default();
            r.add_name(&adjective_name(&first.value, gender));
        }
        let entity = settle(doc, r);
        Some(ResolvedSpan { begin: first.begin, end: first.end, entity })
    }

    fn try_define_city(&self, doc: &mut GeoDocument, items: &[Candidate]) -> Option<ResolvedSpan> {
        let first = items.first()?;
        let lang = doc.lang();
        let (r, begin, end) = if let Some(word) = city_designator(first) {
            let name = items.get(1).filter(|c| c.is_name())?;
            let mut r = match name.template.as_ref().filter(|e| e.kind == EntryKind::City) {
                Some(e) => e.to_referent(lang),
                None => {
                    let mut r = GeoReferent::new();
                    r.add_name(&name.value);
                    r
                }
            };
            r.add_type(word.canonical);
            (r, first.begin, name.end)
        } else {
            let e = first
                .template
                .as_ref()
                .filter(|e| e.kind == EntryKind::City && first.kind == CandidateKind::ProperName)?;
            (e.to_referent(lang), first.begin, first.end)
        };
        let id = doc.add_entity(r);
        let entity = doc.confirm(id);
        Some(ResolvedSpan { begin, end, entity })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::{CityParser, TerritoryParser};
    use crate::gazetteer::Gazetteer;
    use crate::recognizers::{DefaultCityParser, DefaultTerritoryParser};
    use geonym_core::Language;

    fn define(text: &str, lang: Language, strict: bool) -> (GeoDocument, Option<ResolvedSpan>) {
        let mut doc = GeoDocument::from_text(text, lang);
        let p = DefaultTerritoryParser::new(Gazetteer::builtin());
        let items = p
            .try_parse_list(&doc, doc.stream().first().unwrap(), 5)
            .unwrap_or_default();
        let span = DefaultDefiner::new().try_define_territory(&mut doc, &items, strict, None);
        (doc, span)
    }

    #[test]
    fn test_state_registered_at_once() {
        let (doc, span) = define("Россия", Language::Russian, true);
        let span = span.unwrap();
        assert_eq!(doc.registered(), &[span.entity]);
        assert_eq!(doc.store().entity(span.entity).alpha2(), Some("RU"));
    }

    #[test]
    fn test_region_from_adjective_entry_is_provisional() {
        let (doc, span) = define("Ленинградской области", Language::Russian, true);
        let span = span.unwrap();
        assert_eq!(doc.provisional(), &[span.entity]);
        let e = doc.store().entity(span.entity);
        assert!(e.is_region());
        assert_eq!(e.names().next(), Some("ЛЕНИНГРАДСКАЯ"));
        assert_eq!(e.types().collect::<Vec<_>>(), vec!["область"]);
    }

    #[test]
    fn test_unknown_adjective_left_to_fallback() {
        let (_, span) = define("Новгородская область", Language::Russian, true);
        assert!(span.is_none());
    }

    #[test]
    fn test_designator_then_unknown_name() {
        let (doc, span) = define("Region Zzab", Language::English, true);
        let e = doc.store().entity(span.unwrap().entity);
        assert_eq!(e.short_display(), "region ZZAB");
    }

    #[test]
    fn test_name_after_designator_keeps_its_form() {
        let (doc, span) = define("муниципальный округ Отрадное", Language::Russian, true);
        let e = doc.store().entity(span.unwrap().entity);
        assert_eq!(e.names().collect::<Vec<_>>(), vec!["ОТРАДНОЕ"]);
        assert!(e.has_type("муниципальный округ"));
    }

    #[test]
    fn test_republic_registered_at_once() {
        let (doc, span) = define("Республика Татарстан", Language::Russian, true);
        assert_eq!(doc.registered(), &[span.unwrap().entity]);
    }

    #[test]
    fn test_bare_region_needs_context() {
        let (_, span) = define("Normandy", Language::English, true);
        assert!(span.is_none());
        let (_, span) = define("Normandy", Language::English, false);
        assert!(span.is_none());
    }

    #[test]
    fn test_city_with_designator() {
        let mut doc = GeoDocument::from_text("г. Химки", Language::Russian);
        let p = DefaultCityParser::new(Gazetteer::builtin());
        let items = p.try_parse_list(&doc, doc.stream().first().unwrap(), 5).unwrap();
        let span = DefaultDefiner::new().try_define_city(&mut doc, &items).unwrap();
        assert_eq!(doc.registered(), &[span.entity]);
        assert!(doc.store().entity(span.entity).is_city());
        assert_eq!(span.end, doc.stream().iter().last().unwrap());
    }
}
