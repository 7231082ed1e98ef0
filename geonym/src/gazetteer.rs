//! Lexicon of known places.
//!
//! A built-in lexicon covers a few states, regions and cities in Russian
//! and English. Hosts with richer data load their own from JSON:
//!
//! ```json
//! [
//!   {"kind": "state", "names": ["Франция", "France"], "alpha2": "FR"},
//!   {"kind": "region", "adjectives": ["Тверская"], "types": ["область"]},
//!   {"kind": "city", "names": ["Тверь", "Tver"]}
//! ]
//! ```
//!
//! States default to the "государство"/"country" designators and cities to
//! "город"/"city" when `types` is omitted.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use geonym_core::names::{adjective_key, term_key};
use geonym_core::{script_of, GeoReferent, Language, TokenId, TokenStream};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// What a lexicon entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Sovereign state.
    State,
    /// Region or district.
    Region,
    /// City or settlement.
    City,
}

/// One known place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GazetteerEntry {
    /// Entry kind.
    pub kind: EntryKind,
    /// Noun-like names, possibly multi-word.
    #[serde(default)]
    pub names: Vec<String>,
    /// Name-forming adjectives ("Тверская").
    #[serde(default)]
    pub adjectives: Vec<String>,
    /// Designators.
    #[serde(default)]
    pub types: Vec<String>,
    /// ISO alpha-2 code.
    #[serde(default)]
    pub alpha2: Option<String>,
    /// Big city.
    #[serde(default)]
    pub big: bool,
}

impl GazetteerEntry {
    fn default_types(&self) -> &'static [&'static str] {
        match self.kind {
            EntryKind::State => &["государство", "country"],
            EntryKind::City => &["город", "city"],
            EntryKind::Region => &[],
        }
    }

    /// Designators, defaults included.
    #[must_use]
    pub fn designators(&self) -> Vec<&str> {
        if self.types.is_empty() {
            self.default_types().to_vec()
        } else {
            self.types.iter().map(String::as_str).collect()
        }
    }

    /// Build an entity from this entry.
    ///
    /// Designators are restricted to the document script when any match.
    /// Names are kept in every language so later mentions can match.
    #[must_use]
    pub fn to_referent(&self, lang: Language) -> GeoReferent {
        let mut r = GeoReferent::new();
        for n in &self.names {
            r.add_name(n);
        }
        let designators = self.designators();
        let fitting: Vec<&str> = designators
            .iter()
            .copied()
            .filter(|t| script_of(t).fits(lang.script()))
            .collect();
        let chosen = if fitting.is_empty() { designators } else { fitting };
        for t in chosen {
            r.add_type(t);
        }
        if let Some(a2) = &self.alpha2 {
            r.set_alpha2(a2);
        }
        if self.big {
            r.add_misc("big");
        }
        r
    }
}

/// Result of matching a name phrase in the stream.
#[derive(Debug, Clone)]
pub struct NameMatch {
    /// Last token of the phrase.
    pub end: TokenId,
    /// Words in the phrase.
    pub words: usize,
    /// Normalized phrase.
    pub phrase: String,
    /// Matching entries, lexicon order.
    pub entries: Vec<Arc<GazetteerEntry>>,
}

/// Indexed lexicon.
#[derive(Debug, Clone, Default)]
pub struct Gazetteer {
    entries: Vec<Arc<GazetteerEntry>>,
    by_name: HashMap<String, Vec<usize>>,
    by_adjective: HashMap<String, Vec<usize>>,
    by_alpha2: HashMap<String, usize>,
    max_words: usize,
}

static BUILTIN: Lazy<Arc<Gazetteer>> = Lazy::new(|| Arc::new(Gazetteer::index(builtin_entries())));

impl Gazetteer {
    /// The built-in lexicon.
    #[must_use]
    pub fn builtin() -> Arc<Gazetteer> {
        Arc::clone(&BUILTIN)
    }

    /// Build from entries, rejecting an empty lexicon and nameless entries.
    pub fn from_entries(entries: Vec<GazetteerEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(Error::lexicon("gazetteer has no entries"));
        }
        if let Some(i) = entries
            .iter()
            .position(|e| e.names.is_empty() && e.adjectives.is_empty())
        {
            return Err(Error::lexicon(format!("gazetteer entry {i} has no names")));
        }
        Ok(Self::index(entries))
    }

    /// Parse the JSON entry list.
    pub fn from_json(json: &str) -> Result<Self> {
        let entries: Vec<GazetteerEntry> = serde_json::from_str(json)?;
        Self::from_entries(entries)
    }

    /// Load a JSON lexicon file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    fn index(entries: Vec<GazetteerEntry>) -> Self {
        let mut g = Gazetteer::default();
        for (i, e) in entries.into_iter().enumerate() {
            for n in &e.names {
                g.max_words = g.max_words.max(n.split_whitespace().count());
                g.by_name.entry(term_key(n)).or_default().push(i);
            }
            for a in &e.adjectives {
                g.by_adjective
                    .entry(adjective_key(&a.to_uppercase()))
                    .or_default()
                    .push(i);
            }
            if let Some(a2) = &e.alpha2 {
                g.by_alpha2.entry(a2.to_ascii_uppercase()).or_insert(i);
            }
            g.entries.push(Arc::new(e));
        }
        g
    }

    /// All entries.
    #[must_use]
    pub fn entries(&self) -> &[Arc<GazetteerEntry>] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True for an empty lexicon.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries named `name`, modulo inflection.
    #[must_use]
    pub fn lookup_name(&self, name: &str) -> Vec<Arc<GazetteerEntry>> {
        self.collect(self.by_name.get(&term_key(name)))
    }

    /// Entries formed by the adjective `word`.
    #[must_use]
    pub fn lookup_adjective(&self, word: &str) -> Vec<Arc<GazetteerEntry>> {
        self.collect(self.by_adjective.get(&adjective_key(&word.to_uppercase())))
    }

    /// State with the given ISO alpha-2 code.
    #[must_use]
    pub fn lookup_alpha2(&self, code: &str) -> Option<Arc<GazetteerEntry>> {
        self.by_alpha2
            .get(&code.to_ascii_uppercase())
            .map(|&i| Arc::clone(&self.entries[i]))
    }

    fn collect(&self, hits: Option<&Vec<usize>>) -> Vec<Arc<GazetteerEntry>> {
        hits.map(|v| v.iter().map(|&i| Arc::clone(&self.entries[i])).collect())
            .unwrap_or_default()
    }

    /// Longest name phrase starting at `start`.
    ///
    /// Words are joined by single spaces, or by tight hyphens
    /// ("Санкт-Петербург"). A phrase never crosses a line break or a
    /// non-text node.
    #[must_use]
    pub fn match_at(&self, stream: &TokenStream, start: TokenId) -> Option<NameMatch> {
        let mut best: Option<NameMatch> = None;
        let mut phrase = String::new();
        let mut words = 0usize;
        let mut cur = Some(start);
        let mut joiner = false;
        while let Some(id) = cur {
            let node = stream.node(id);
            let Some(tok) = node.text() else { break };
            if id != start && node.newline_before {
                break;
            }
            if tok.is_hyphen() {
                let tight = node.whitespaces_before == 0
                    && stream
                        .next(id)
                        .is_some_and(|n| stream.node(n).whitespaces_before == 0);
                if words == 0 || joiner || !tight {
                    break;
                }
                phrase.push('-');
                joiner = true;
                cur = stream.next(id);
                continue;
            }
            if !tok.is_word() {
                break;
            }
            if words > 0 && !joiner {
                phrase.push(' ');
            }
            phrase.push_str(&tok.term);
            joiner = false;
            words += 1;
            if words > self.max_words.max(1) + 2 {
                break;
            }
            if let Some(hits) = self.by_name.get(&term_key(&phrase)) {
                best = Some(NameMatch {
                    end: id,
                    words,
                    phrase: phrase.clone(),
                    entries: self.collect(Some(hits)),
                });
            }
            cur = stream.next(id);
        }
        best
    }
}

fn entry(
    kind: EntryKind,
    names: &[&str],
    adjectives: &[&str],
    types: &[&str],
    alpha2: Option<&str>,
    big: bool,
) -> GazetteerEntry {
    let own = |v: &[&str]| v.iter().map(|s| (*s).to_string()).collect();
    GazetteerEntry {
        kind,
        names: own(names),
        adjectives: own(adjectives),
        types: own(types),
        alpha2: alpha2.map(str::to_string),
        big,
    }
}

fn builtin_entries() -> Vec<GazetteerEntry> {
    use EntryKind::{City, Region, State};
    vec![
        // States
        entry(State, &["Россия", "Российская Федерация", "Russia", "Russian Federation"],
            &["Российская"], &[], Some("RU"), false),
        entry(State, &["Франция", "Французская Республика", "France", "French Republic"],
            &["Французская"], &[], Some("FR"), false),
        entry(State, &["Беларусь", "Белоруссия", "Республика Беларусь", "Belarus"],
            &["Белорусская"], &[], Some("BY"), false),
        entry(State, &["Казахстан", "Республика Казахстан", "Kazakhstan"],
            &[], &[], Some("KZ"), false),
        entry(State, &["Украина", "Украинская ССР", "Ukraine"],
            &["Украинская"], &[], Some("UA"), false),
        entry(State, &["Германия", "Федеративная Республика Германия", "Germany"],
            &[], &[], Some("DE"), false),
        entry(State, &["США", "Соединенные Штаты Америки", "United States",
            "United States of America", "USA"], &[], &[], Some("US"), false),
        entry(State, &["Великобритания", "Соединенное Королевство", "United Kingdom",
            "Great Britain"], &[], &[], Some("GB"), false),
        entry(State, &["Китай", "Китайская Народная Республика", "China"],
            &[], &[], Some("CN"), false),
        entry(State, &["Армения", "Armenia"], &["Армянская"], &[], Some("AM"), false),
        // Regions
        entry(Region, &[], &["Ленинградская"], &["область"], None, false),
        entry(Region, &[], &["Московская"], &["область"], None, false),
        entry(Region, &[], &["Тверская"], &["область"], None, false),
        entry(Region, &[], &["Краснодарский"], &["край"], None, false),
        entry(Region, &["Татарстан", "Tatarstan"], &[], &["республика", "republic"], None, false),
        entry(Region, &["Нормандия", "Normandy"], &[], &["region"], None, false),
        // Cities
        entry(City, &["Москва", "Moscow"], &[], &[], None, true),
        entry(City, &["Санкт-Петербург", "Петербург", "Saint Petersburg"], &[], &[], None, true),
        entry(City, &["Париж", "Paris"], &[], &[], None, true),
        entry(City, &["Берлин", "Berlin"], &[], &[], None, true),
        entry(City, &["Минск", "Minsk"], &[], &[], None, true),
        entry(City, &["Лондон", "London"], &[], &[], None, true),
        entry(City, &["Казань", "Kazan"], &[], &[], None, false),
        entry(City, &["Тверь", "Tver"], &[], &[], None, false),
        entry(City, &["Химки", "Khimki"], &[], &[], None, false),
        entry(City, &["Руан", "Rouen"], &[], &[], None, false),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        let g = Gazetteer::builtin();
        assert!(!g.is_empty());
        let hits = g.lookup_name("России");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].alpha2.as_deref(), Some("RU"));
        assert_eq!(g.lookup_adjective("ЛЕНИНГРАДСКОЙ").len(), 1);
        assert!(g.lookup_alpha2("fr").is_some());
    }

    #[test]
    fn test_match_at_longest_phrase() {
        let g = Gazetteer::builtin();
        let stream = TokenStream::from_text("French Republic today");
        let m = g.match_at(&stream, stream.first().unwrap()).unwrap();
        assert_eq!(m.words, 2);
        assert_eq!(m.phrase, "FRENCH REPUBLIC");
        assert_eq!(m.entries[0].alpha2.as_deref(), Some("FR"));
    }

    #[test]
    fn test_match_at_hyphenated() {
        let g = Gazetteer::builtin();
        let stream = TokenStream::from_text("Санкт-Петербурге");
        let m = g.match_at(&stream, stream.first().unwrap()).unwrap();
        assert_eq!(m.phrase, "САНКТ-ПЕТЕРБУРГЕ");
        assert_eq!(m.end, stream.iter().last().unwrap());
    }

    #[test]
    fn test_match_at_stops_at_loose_hyphen() {
        let g = Gazetteer::builtin();
        let stream = TokenStream::from_text("Санкт - Петербург");
        assert!(g.match_at(&stream, stream.first().unwrap()).is_none());
    }

    #[test]
    fn test_to_referent_filters_designators_by_script() {
        let g = Gazetteer::builtin();
        let moscow = &g.lookup_name("Moscow")[0];
        let ru = moscow.to_referent(Language::Russian);
        assert_eq!(ru.types().collect::<Vec<_>>(), vec!["город"]);
        assert!(ru.is_big_city());
        let en = moscow.to_referent(Language::English);
        assert_eq!(en.types().collect::<Vec<_>>(), vec!["city"]);
        assert!(en.has_name("МОСКВЕ"));
    }

    #[test]
    fn test_rejects_empty_lexicon() {
        assert!(matches!(Gazetteer::from_entries(vec![]), Err(Error::Lexicon(_))));
        assert!(matches!(Gazetteer::from_json("[]"), Err(Error::Lexicon(_))));
        assert!(matches!(
            Gazetteer::from_json(r#"[{"kind": "city"}]"#),
            Err(Error::Lexicon(_))
        ));
        assert!(matches!(Gazetteer::from_json("{"), Err(Error::Json(_))));
    }

    #[test]
    fn test_from_json_defaults() {
        let g = Gazetteer::from_json(r#"[{"kind": "city", "names": ["Тверь"]}]"#).unwrap();
        let r = g.entries()[0].to_referent(Language::Russian);
        assert!(r.is_city());
        assert!(!r.is_big_city());
    }

    #[test]
    fn test_from_path_missing_file() {
        assert!(matches!(
            Gazetteer::from_path("/nonexistent/geonym-lexicon.json"),
            Err(Error::Io(_))
        ));
    }
}
