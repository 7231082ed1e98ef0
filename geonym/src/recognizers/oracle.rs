//! Default containment oracle.

use geonym_core::taxonomy::kind_of;
use geonym_core::{EntityId, EntityStore, GeoReferent, TypeKind};

use crate::collab::ContainmentOracle;

/// Administrative rank of a territory; lower ranks contain higher ones.
fn rank(e: &GeoReferent) -> Option<u8> {
    e.types()
        .filter_map(kind_of)
        .filter_map(|k| match k {
            TypeKind::Region => Some(1),
            TypeKind::District => Some(2),
            TypeKind::CityDistrict => Some(3),
            _ => None,
        })
        .min()
}

/// Classification-based containment:
///
/// - nothing contains a state or a union, and a union contains nothing
/// - a state contains everything else
/// - a region contains cities, city districts and lower-ranked regions
/// - a city contains its districts; a big city also contains plain districts
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultOracle;

impl DefaultOracle {
    /// Create an oracle.
    pub fn new() -> Self {
        Self
    }
}

impl ContainmentOracle for DefaultOracle {
    fn can_be_higher(&self, store: &EntityStore, hi: EntityId, lo: EntityId) -> bool {
        let (hi, lo) = (store.resolve(hi), store.resolve(lo));
        if hi == lo {
            return false;
        }
        let (h, l) = (store.entity(hi), store.entity(lo));
        if l.is_state() || l.is_union() || h.is_union() {
            return false;
        }
        if h.is_state() {
            return true;
        }
        if h.is_region() {
            if l.is_city() || l.is_city_district() {
                return true;
            }
            return l.is_region() && matches!((rank(h), rank(l)), (Some(a), Some(b)) if a < b);
        }
        if h.is_city() {
            if l.is_city_district() {
                return true;
            }
            return h.is_big_city() && l.is_region() && rank(l) == Some(2);
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(entities: Vec<GeoReferent>) -> (EntityStore, Vec<EntityId>) {
        let mut store = EntityStore::new();
        let ids = entities.into_iter().map(|e| store.add(e)).collect();
        (store, ids)
    }

    fn state(name: &str, a2: &str) -> GeoReferent {
        let mut r = GeoReferent::with_name_type(name, "государство");
        r.set_alpha2(a2);
        r
    }

    #[test]
    fn test_state_contains_everything_but_states() {
        let (s, ids) = store_with(vec![
            state("Россия", "RU"),
            state("Франция", "FR"),
            GeoReferent::with_name_type("Тверь", "город"),
        ]);
        let o = DefaultOracle::new();
        assert!(o.can_be_higher(&s, ids[0], ids[2]));
        assert!(!o.can_be_higher(&s, ids[0], ids[1]));
        assert!(!o.can_be_higher(&s, ids[2], ids[0]));
    }

    #[test]
    fn test_region_ranks() {
        let (s, ids) = store_with(vec![
            GeoReferent::with_name_type("Тверская", "область"),
            GeoReferent::with_name_type("Калининский", "район"),
            GeoReferent::with_name_type("Тверь", "город"),
        ]);
        let o = DefaultOracle::new();
        assert!(o.can_be_higher(&s, ids[0], ids[1]));
        assert!(!o.can_be_higher(&s, ids[1], ids[0]));
        assert!(o.can_be_higher(&s, ids[1], ids[2]));
        assert!(!o.can_be_higher(&s, ids[2], ids[1]));
    }

    #[test]
    fn test_big_city_contains_districts() {
        let mut moscow = GeoReferent::with_name_type("Москва", "город");
        moscow.add_misc("big");
        let (s, ids) = store_with(vec![
            moscow,
            GeoReferent::with_name_type("Тверской", "район"),
            GeoReferent::with_name_type("Тверь", "город"),
        ]);
        let o = DefaultOracle::new();
        assert!(o.can_be_higher(&s, ids[0], ids[1]));
        assert!(!o.can_be_higher(&s, ids[2], ids[1]));
        assert!(!o.can_be_higher(&s, ids[0], ids[2]));
    }
}
