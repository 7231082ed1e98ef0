//! Territory passes.
//!
//! Step 0 visits every primitive token and accepts only strict patterns.
//! Step 1 revisits capitalized tokens and those step 0 flagged, with the
//! relaxed rules of the definer.

use geonym_core::names::{adjective_name, initials};
use geonym_core::{EntityId, GeoReferent, TokenId, TypeKind};

use super::{GeoAnalyzer, PassStatus};
use crate::collab::{Candidate, CandidateKind, ResolvedSpan};
use crate::document::{GeoDocument, TokenFlags};
use crate::gazetteer::EntryKind;
use crate::recognizers::items::looks_like_name;

impl GeoAnalyzer {
    pub(crate) fn territory_pass(&self, doc: &mut GeoDocument, step: u8) -> PassStatus {
        let strict = step == 0;
        let mut resolved = 0usize;
        let mut cur = doc.stream.first();
        while let Some(t) = cur {
            if doc.budget_exhausted(self.config.max_entities) {
                log::warn!(
                    "entity cap {} reached in territory pass {step}; pass aborted",
                    self.config.max_entities
                );
                return PassStatus::CapReached;
            }
            let node = doc.stream.node(t);
            if node.text().is_none()
                || (step == 1
                    && !looks_like_name(node)
                    && !doc.flags(t).contains(TokenFlags::MAYBE_TERRITORY))
            {
                cur = doc.stream.next(t);
                continue;
            }

            let Some(items) = self
                .territory
                .try_parse_list(doc, t, self.config.max_lookahead)
            else {
                cur = doc.stream.next(t);
                continue;
            };
            let bound = self
                .define_territory(doc, &items, strict)
                .and_then(|span| Self::bind(doc, span));
            match bound {
                Some(node) => {
                    resolved += 1;
                    let last = self.absorb_parenthetical(doc, node);
                    cur = doc.stream.next(last);
                }
                None => {
                    doc.set_flag(t, TokenFlags::MAYBE_TERRITORY);
                    cur = doc.stream.next(t);
                }
            }
        }
        log::debug!("territory pass {step}: {resolved} mentions");
        PassStatus::Done
    }

    /// The definer, then the pass-local fallbacks in order.
    fn define_territory(
        &self,
        doc: &mut GeoDocument,
        items: &[Candidate],
        strict: bool,
    ) -> Option<ResolvedSpan> {
        if let Some(span) = self.definer.try_define_territory(doc, items, strict, None) {
            return Some(span);
        }
        adjective_region(doc, items)
            .or_else(|| acronym(doc, items))
            .or_else(|| self.city_before_territory(doc, items))
    }

    /// "Тверь, Тверская область": a city designator and name directly
    /// followed by a territory is defined as the city.
    fn city_before_territory(
        &self,
        doc: &mut GeoDocument,
        items: &[Candidate],
    ) -> Option<ResolvedSpan> {
        let first = items.first()?;
        first
            .type_word
            .filter(|w| matches!(w.kind, TypeKind::City | TypeKind::Settlement))?;
        let name = items.get(1).filter(|c| c.is_name())?;

        let mut after = doc.stream.next(name.end)?;
        if doc.stream.node(after).is_comma() {
            after = doc.stream.next(after)?;
        }
        let follow = self
            .territory
            .try_parse_list(doc, after, self.config.max_lookahead)?;
        if !starts_territory(&follow) {
            return None;
        }

        let city_items = self
            .city
            .try_parse_list(doc, first.begin, self.config.max_lookahead)?;
        let span = self.definer.try_define_city(doc, &city_items)?;
        doc.cities_added += 1;
        Some(span)
    }

    /// "France (French Republic)": a territory in parentheses right after a
    /// mention is merged into it when the two may be equal, and the
    /// parentheses are absorbed. Returns the last node consumed.
    fn absorb_parenthetical(&self, doc: &mut GeoDocument, node: TokenId) -> TokenId {
        let Some(x) = doc.geo_at(node) else {
            return node;
        };
        let Some(open) = doc.stream.next(node).filter(|&o| doc.stream.node(o).is_char('('))
        else {
            return node;
        };
        let Some(inner) = doc.stream.next(open) else {
            return node;
        };
        let Some(span) = self
            .territory
            .try_parse_list(doc, inner, self.config.max_lookahead)
            .and_then(|items| self.definer.try_define_territory(doc, &items, false, None))
        else {
            return node;
        };

        let y = doc.store.resolve(span.entity);
        let close = doc
            .stream
            .next(span.end)
            .filter(|&c| doc.stream.node(c).is_char(')'));
        let same = y == x || doc.store.can_be_equals(x, y);
        match close {
            Some(close) if same => {
                let survivor = Self::merge_equal(doc, x, y);
                Self::bind(doc, ResolvedSpan {
                    begin: node,
                    end: close,
                    entity: survivor,
                })
                .unwrap_or(node)
            }
            // A different territory in parentheses is a mention of its own.
            _ => Self::bind(doc, span).unwrap_or(node),
        }
    }
}

/// Whether a candidate list opens with something territorial.
fn starts_territory(items: &[Candidate]) -> bool {
    let Some(first) = items.first() else {
        return false;
    };
    let designator = |c: &Candidate| {
        c.type_word.is_some_and(|w| {
            matches!(
                w.kind,
                TypeKind::State | TypeKind::Region | TypeKind::District
            )
        })
    };
    designator(first)
        || first
            .template
            .as_ref()
            .is_some_and(|e| matches!(e.kind, EntryKind::State | EntryKind::Region))
        || (first.kind == CandidateKind::Adjective && items.get(1).is_some_and(designator))
}

/// "Новгородская область": an adjective unknown to the lexicon followed by
/// a region or district designator forms a new entity.
fn adjective_region(doc: &mut GeoDocument, items: &[Candidate]) -> Option<ResolvedSpan> {
    let adj = items.first().filter(|c| c.kind == CandidateKind::Adjective)?;
    let designator = items.get(1)?;
    let word = designator
        .type_word
        .filter(|w| matches!(w.kind, TypeKind::Region | TypeKind::District))?;

    let mut r = GeoReferent::new();
    r.add_name(&adjective_name(&adj.value, word.gender));
    r.add_type(word.canonical);
    let id = doc.add_entity(r);
    let entity = doc.add_provisional(id);
    Some(ResolvedSpan {
        begin: adj.begin,
        end: designator.end,
        entity,
    })
}

/// "ЛО", "РФ", "US": two capitals matching exactly one entity already seen
/// in the document, by alpha-2 code or by initials.
fn acronym(doc: &mut GeoDocument, items: &[Candidate]) -> Option<ResolvedSpan> {
    let first = items
        .first()
        .filter(|c| c.kind == CandidateKind::ProperName && c.template.is_none())?;
    if first.begin != first.end
        || !first.chars.is_all_upper
        || first.value.chars().count() != 2
    {
        return None;
    }
    let term = first.value.as_str();
    let hits: Vec<EntityId> = doc
        .seen_entities()
        .into_iter()
        .filter(|&id| acronym_matches(doc, id, term))
        .collect();
    match hits.as_slice() {
        [only] => Some(ResolvedSpan {
            begin: first.begin,
            end: first.end,
            entity: *only,
        }),
        _ => None,
    }
}

fn acronym_matches(doc: &GeoDocument, id: EntityId, term: &str) -> bool {
    let e = doc.store.entity(id);
    if e.is_city() || e.is_union() {
        return false;
    }
    if e.alpha2() == Some(term) {
        return true;
    }
    e.names().any(|name| {
        let words = name.split([' ', '-']).count();
        (words == 2 && initials(name) == term)
            || (words == 1 && e.types().any(|t| initials(&format!("{name} {t}")) == term))
    })
}
