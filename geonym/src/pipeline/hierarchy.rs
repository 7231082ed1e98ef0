//! Hierarchy linking.
//!
//! Adjacent mentions ("Россия, г. Москва", "Rouen, Normandy") are linked
//! with HIGHER slots and merged into one composite mention bound to the
//! lowest entity of the chain.

use geonym_core::taxonomy::is_municipality;
use geonym_core::{AnnotationKind, EntityId, TokenId};

use super::GeoAnalyzer;
use crate::collab::ResolvedSpan;
use crate::document::GeoDocument;

/// A mention reached from the previous one.
#[derive(Debug, Clone, Copy)]
struct Neighbor {
    node: TokenId,
    entity: EntityId,
    comma_before: bool,
}

/// Links to apply, as (lower, higher) pairs.
#[derive(Debug)]
struct Link {
    pairs: Vec<(EntityId, EntityId)>,
    last: TokenId,
    lowest: EntityId,
}

fn names_moscow(doc: &GeoDocument, e: EntityId) -> bool {
    let e = doc.store.entity(e);
    e.is_city() && (e.has_name("МОСКВА") || e.has_name("MOSCOW"))
}

impl GeoAnalyzer {
    pub(crate) fn link_hierarchy(&self, doc: &mut GeoDocument) {
        let mut linked = 0usize;
        let mut cur = doc.stream.first();
        while let Some(t) = cur {
            let Some(a) = doc.geo_at(t) else {
                cur = doc.stream.next(t);
                continue;
            };
            let a = Neighbor {
                node: t,
                entity: a,
                comma_before: false,
            };
            let b = self.next_mention(doc, t);
            let c = b.and_then(|b| self.next_mention(doc, b.node));
            let Some(link) = self.decide(doc, a, b, c) else {
                cur = doc.stream.next(t);
                continue;
            };

            for &(lo, hi) in &link.pairs {
                if !doc.store.attach_higher(lo, hi) {
                    log::debug!("hierarchy link {lo} -> {hi} rejected");
                }
            }
            let span = ResolvedSpan {
                begin: t,
                end: link.last,
                entity: link.lowest,
            };
            match Self::bind(doc, span) {
                Some(n) => {
                    linked += 1;
                    cur = doc.stream.prev(n).or(Some(n));
                }
                None => cur = doc.stream.next(t),
            }
        }
        log::debug!("hierarchy pass: {linked} composites");
    }

    /// Next mention after `from`, skipping at most the configured number of
    /// commas, prepositions, lower-case adjectives and address details.
    fn next_mention(&self, doc: &GeoDocument, from: TokenId) -> Option<Neighbor> {
        let mut comma = false;
        let mut cur = doc.stream.next(from);
        let mut skipped = 0;
        while let Some(t) = cur {
            if let Some(entity) = doc.geo_at(t) {
                return Some(Neighbor {
                    node: t,
                    entity,
                    comma_before: comma,
                });
            }
            if skipped >= self.config.hierarchy_skip_limit {
                return None;
            }
            let node = doc.stream.node(t);
            let class = node.morph.class;
            let skippable = node.is_comma()
                || class.is_preposition()
                || (class.is_adjective() && node.chars.is_all_lower)
                || node
                    .annotation()
                    .is_some_and(|a| a.kind == AnnotationKind::AddressDetail);
            if !skippable {
                return None;
            }
            comma |= node.is_comma();
            skipped += 1;
            cur = doc.stream.next(t);
        }
        None
    }

    /// First matching rule wins.
    fn decide(
        &self,
        doc: &GeoDocument,
        a: Neighbor,
        b: Option<Neighbor>,
        c: Option<Neighbor>,
    ) -> Option<Link> {
        let b = b?;
        let store = &doc.store;
        let (ea, eb) = (store.entity(a.entity), store.entity(b.entity));
        if ea.is_union() || eb.is_union() {
            return None;
        }
        let oracle = &self.oracle;
        let fits = |hi: &Neighbor, lo: &Neighbor| oracle.can_be_higher_token(doc, hi.node, lo.node);

        if let Some(c) = c {
            let ec = store.entity(c.entity);
            // "муниципальный округ Отрадное, г. Зеленоград, г. Москва".
            if ea.types().any(is_municipality) && eb.is_city() && names_moscow(doc, c.entity) {
                return Some(Link {
                    pairs: vec![(a.entity, c.entity), (b.entity, a.entity)],
                    last: c.node,
                    lowest: b.entity,
                });
            }
            let same_sep = b.comma_before == c.comma_before;
            if same_sep
                && ea.is_city()
                && eb.is_region()
                && (ec.is_region() || ec.is_state())
                && fits(&b, &a)
                && fits(&c, &b)
            {
                return Some(Link {
                    pairs: vec![(b.entity, c.entity), (a.entity, b.entity)],
                    last: c.node,
                    lowest: a.entity,
                });
            }
            if same_sep
                && (ea.is_region() || ea.is_state())
                && eb.is_region()
                && ec.is_city()
                && fits(&a, &b)
                && fits(&b, &c)
            {
                return Some(Link {
                    pairs: vec![(b.entity, a.entity), (c.entity, b.entity)],
                    last: c.node,
                    lowest: c.entity,
                });
            }
        }

        match (fits(&a, &b), fits(&b, &a)) {
            (true, false) => Some(Link {
                pairs: vec![(b.entity, a.entity)],
                last: b.node,
                lowest: b.entity,
            }),
            (false, true) => Some(Link {
                pairs: vec![(a.entity, b.entity)],
                last: b.node,
                lowest: a.entity,
            }),
            _ => None,
        }
    }
}
