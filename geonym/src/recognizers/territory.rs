//! Default territory phrase parser.

use std::sync::Arc;

use geonym_core::TokenId;

use super::items::{adjective_at, bare_name_at, name_at, type_word_at};
use crate::collab::{Candidate, TerritoryParser};
use crate::document::GeoDocument;
use crate::gazetteer::{EntryKind, Gazetteer};

const PREFER: &[EntryKind] = &[EntryKind::State, EntryKind::Region];

/// Parses runs of designators, lexicon names, adjectives and capitalized
/// words. The definer decides which prefix, if any, forms a territory.
#[derive(Debug, Clone)]
pub struct DefaultTerritoryParser {
    gazetteer: Arc<Gazetteer>,
}

impl DefaultTerritoryParser {
    /// Create a parser over `gazetteer`.
    pub fn new(gazetteer: Arc<Gazetteer>) -> Self {
        Self { gazetteer }
    }

    fn parse_one(&self, doc: &GeoDocument, t: TokenId) -> Option<Candidate> {
        let g = &self.gazetteer;
        if let Some(c) = name_at(doc, g, t, PREFER).filter(|c| c.end != c.begin) {
            return Some(c);
        }
        type_word_at(doc, t)
            .or_else(|| adjective_at(doc, g, t, PREFER))
            .or_else(|| name_at(doc, g, t, PREFER))
            .or_else(|| bare_name_at(doc, t))
    }
}

impl TerritoryParser for DefaultTerritoryParser {
    fn try_parse_list(&self, doc: &GeoDocument, start: TokenId, max: usize) -> Option<Vec<Candidate>> {
        let stream = doc.stream();
        let mut items = Vec::new();
        let mut cur = Some(start);
        while let Some(t) = cur {
            if items.len() >= max || (t != start && stream.node(t).newline_before) {
                break;
            }
            let Some(item) = self.parse_one(doc, t) else { break };
            cur = stream.next(item.end);
            items.push(item);
        }
        (!items.is_empty()).then_some(items)
    }
}
