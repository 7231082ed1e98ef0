//! City pass.

use geonym_core::{EntityId, TokenId, TypeKind};

use super::{GeoAnalyzer, PassStatus};
use crate::collab::ResolvedSpan;
use crate::document::{GeoDocument, TokenFlags};
use crate::recognizers::items::{looks_like_name, type_word_at};

/// Tokens that end the before-lookaside.
fn is_sentence_end(doc: &GeoDocument, t: TokenId) -> bool {
    let node = doc.stream.node(t);
    ['.', '!', '?', ';'].iter().any(|&c| node.is_char(c))
}

impl GeoAnalyzer {
    pub(crate) fn city_pass(&self, doc: &mut GeoDocument) -> PassStatus {
        let before = doc.cities_added;
        let mut city_before: Option<EntityId> = None;
        let mut cur = doc.stream.first();
        while let Some(t) = cur {
            if doc.budget_exhausted(self.config.max_entities) {
                log::warn!("entity cap {} reached in city pass", self.config.max_entities);
                return PassStatus::CapReached;
            }
            if let Some(e) = doc.geo_at(t) {
                city_before = doc.store.entity(e).is_city().then_some(e);
                cur = doc.stream.next(t);
                continue;
            }
            let node = doc.stream.node(t);
            if node.text().is_none() {
                city_before = None;
                cur = doc.stream.next(t);
                continue;
            }
            if node.is_comma() {
                cur = doc.stream.next(t);
                continue;
            }
            if let Some(city) = city_before.take() {
                if doc.flags(t).contains(TokenFlags::MAYBE_TERRITORY) {
                    if let Some(n) = self.trailing_territory(doc, t, city) {
                        cur = doc.stream.next(n);
                        continue;
                    }
                }
            }
            if doc.flags(t).contains(TokenFlags::TRIED_CITY) {
                cur = doc.stream.next(t);
                continue;
            }
            doc.set_flag(t, TokenFlags::TRIED_CITY);

            if let Some(n) = self.city_anaphora(doc, t) {
                cur = doc.stream.next(n);
                continue;
            }
            let span = self
                .city
                .try_parse_list(doc, t, self.config.max_lookahead)
                .and_then(|items| self.definer.try_define_city(doc, &items));
            let Some(span) = span else {
                cur = doc.stream.next(t);
                continue;
            };
            doc.cities_added += 1;
            let span = Self::extend_left(doc, span);
            let Some(n) = Self::bind(doc, span) else {
                cur = doc.stream.next(t);
                continue;
            };
            self.attach_territory_before(doc, n, span.entity);
            city_before = doc.geo_at(n);
            cur = doc.stream.next(n);
        }
        log::debug!("city pass: {} cities", doc.cities_added - before);
        PassStatus::Done
    }

    /// A territory flagged by the territory passes right after a city,
    /// defined with the city as context.
    fn trailing_territory(
        &self,
        doc: &mut GeoDocument,
        t: TokenId,
        city: EntityId,
    ) -> Option<TokenId> {
        let items = self
            .territory
            .try_parse_list(doc, t, self.config.max_lookahead)?;
        let span = self
            .definer
            .try_define_territory(doc, &items, false, Some(city))?;
        let node = Self::bind(doc, span)?;
        if self.oracle.can_be_higher(&doc.store, span.entity, city) {
            doc.store.attach_higher(city, span.entity);
        }
        Some(node)
    }

    /// "этот город", "the same city" with no name after it refers back to
    /// the nearest preceding city mention.
    fn city_anaphora(&self, doc: &mut GeoDocument, t: TokenId) -> Option<TokenId> {
        let term = doc.stream.node(t).term()?;
        if !geonym_core::tokenizer::is_demonstrative(term) {
            return None;
        }
        let word = type_word_at(doc, doc.stream.next(t)?)?;
        word.type_word
            .filter(|w| matches!(w.kind, TypeKind::City | TypeKind::Settlement))?;
        if doc
            .stream
            .next(word.end)
            .is_some_and(|n| looks_like_name(doc.stream.node(n)))
        {
            return None;
        }

        let mut back = doc.stream.prev(t);
        let mut steps = 0;
        while let Some(b) = back {
            if steps >= self.config.city_behind_referent_window {
                break;
            }
            if let Some(e) = doc.geo_at(b).filter(|&e| doc.store.entity(e).is_city()) {
                return Self::bind(doc, ResolvedSpan {
                    begin: t,
                    end: word.end,
                    entity: e,
                });
            }
            back = doc.stream.prev(b);
            steps += 1;
        }
        None
    }

    /// Grow a city span over a directly preceding mention of the same city
    /// ("Москва г. Москва").
    fn extend_left(doc: &mut GeoDocument, span: ResolvedSpan) -> ResolvedSpan {
        let Some(p) = doc.stream.prev(span.begin) else {
            return span;
        };
        let Some(pe) = doc.geo_at(p) else {
            return span;
        };
        if pe != span.entity && !doc.store.can_be_equals(pe, span.entity) {
            return span;
        }
        let entity = Self::merge_equal(doc, pe, span.entity);
        ResolvedSpan {
            begin: p,
            end: span.end,
            entity,
        }
    }

    /// Put the nearest preceding region or state of the same sentence above
    /// a new city.
    fn attach_territory_before(&self, doc: &mut GeoDocument, node: TokenId, city: EntityId) {
        if doc.store.higher(city).is_some() {
            return;
        }
        let mut back = doc.stream.prev(node);
        let mut steps = 0;
        while let Some(b) = back {
            if steps >= self.config.territory_before_city_window || is_sentence_end(doc, b) {
                return;
            }
            if let Some(e) = doc.geo_at(b) {
                let ent = doc.store.entity(e);
                if (ent.is_region() || ent.is_state())
                    && self.oracle.can_be_higher(&doc.store, e, city)
                {
                    doc.store.attach_higher(city, e);
                }
                return;
            }
            back = doc.stream.prev(b);
            steps += 1;
        }
    }
}
