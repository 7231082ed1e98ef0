//! Default city phrase parser.

use std::sync::Arc;

use geonym_core::{TokenId, TypeKind};

use super::items::{bare_name_at, looks_like_name, name_at, type_word_at};
use crate::collab::{Candidate, CityParser};
use crate::document::GeoDocument;
use crate::gazetteer::{EntryKind, Gazetteer};

const PREFER: &[EntryKind] = &[EntryKind::City];

/// Parses "designator + name" ("г. Тверь", "city of Rouen") and bare
/// lexicon city names ("Москва").
#[derive(Debug, Clone)]
pub struct DefaultCityParser {
    gazetteer: Arc<Gazetteer>,
}

impl DefaultCityParser {
    /// Create a parser over `gazetteer`.
    pub fn new(gazetteer: Arc<Gazetteer>) -> Self {
        Self { gazetteer }
    }

    fn city_name(&self, doc: &GeoDocument, t: TokenId) -> Option<Candidate> {
        if let Some(c) = name_at(doc, &self.gazetteer, t, PREFER) {
            return Some(c);
        }
        let mut c = bare_name_at(doc, t)?;
        // "Нижний Новгород": an adjective joins the following name.
        if c.morph.class.is_adjective() {
            let stream = doc.stream();
            if let Some(n) = stream.next(t).filter(|&n| {
                let node = stream.node(n);
                !node.newline_before && looks_like_name(node)
            }) {
                if let Some(term) = stream.node(n).term() {
                    c.value = format!("{} {term}", c.value);
                    c.end = n;
                }
            }
        }
        Some(c)
    }
}

impl CityParser for DefaultCityParser {
    fn try_parse_list(&self, doc: &GeoDocument, start: TokenId, max: usize) -> Option<Vec<Candidate>> {
        let stream = doc.stream();
        let designator = type_word_at(doc, start).filter(|c| {
            c.type_word
                .is_some_and(|w| matches!(w.kind, TypeKind::City | TypeKind::Settlement))
        });
        if let Some(tw) = designator {
            let name = stream
                .next(tw.end)
                .filter(|&n| !stream.node(n).newline_before)
                .and_then(|n| self.city_name(doc, n))?;
            let mut items = vec![tw, name];
            items.truncate(max.max(1));
            return Some(items);
        }
        let name = name_at(doc, &self.gazetteer, start, PREFER)?;
        name.template
            .as_ref()
            .is_some_and(|e| e.kind == EntryKind::City)
            .then(|| vec![name])
    }
}
