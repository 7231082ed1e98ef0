//! Convenience tokenizer.
//!
//! Splits text into words, digit runs and single punctuation characters,
//! and tags a handful of closed-class words. Real morphological analysis is
//! the host's job; this is enough for gazetteer-driven recognition and
//! tests.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use crate::names::has_adjective_ending;
use crate::token::{Gender, MorphClass, MorphInfo, TextToken};

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\p{L}\p{M}]+|\d+|\S").expect("Failed to compile token pattern")
});

static PREPOSITIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "В", "ВО", "НА", "ИЗ", "ОТ", "ДО", "ПО", "ПОД", "НАД", "ПРИ", "ЗА", "У", "К", "С", "СО",
        "ОКОЛО", "ВБЛИЗИ", "IN", "AT", "OF", "FROM", "TO", "NEAR", "ON", "BY", "WITHIN",
    ]
    .into_iter()
    .collect()
});

static CONJUNCTIONS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["И", "ИЛИ", "А", "НО", "AND", "OR", "BUT"].into_iter().collect());

static DEMONSTRATIVES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "ЭТОТ", "ЭТОГО", "ЭТОМ", "ЭТОМУ", "ЭТА", "ЭТОЙ", "ЭТУ", "ДАННЫЙ", "ДАННОГО", "ДАННОМ",
        "ДАННОМУ", "ДАННАЯ", "ДАННОЙ", "УКАЗАННЫЙ", "УКАЗАННОГО", "УКАЗАННОМ", "УКАЗАННАЯ",
        "УКАЗАННОЙ", "THIS", "THAT", "SAME",
    ]
    .into_iter()
    .collect()
});

/// Shallow morphology for an upper-case term.
#[must_use]
pub fn guess_morph(term: &str) -> MorphInfo {
    let mut class = MorphClass::empty();
    if PREPOSITIONS.contains(term) {
        class.insert(MorphClass::PREPOSITION);
    }
    if CONJUNCTIONS.contains(term) {
        class.insert(MorphClass::CONJUNCTION);
    }
    if DEMONSTRATIVES.contains(term) {
        class.insert(MorphClass::PRONOUN);
    }
    let mut gender = Gender::Undefined;
    if class.is_empty() && has_adjective_ending(term) {
        class.insert(MorphClass::ADJECTIVE);
        gender = if term.ends_with("АЯ") || term.ends_with("ЯЯ") {
            Gender::Feminine
        } else if term.ends_with("ОЕ") || term.ends_with("ЕЕ") {
            Gender::Neuter
        } else if term.ends_with("ИЙ") || term.ends_with("ЫЙ") {
            Gender::Masculine
        } else {
            Gender::Undefined
        };
    }
    MorphInfo {
        class,
        gender,
        normal: None,
    }
}

/// Whether `term` is a demonstrative pointing back to an earlier mention.
#[must_use]
pub fn is_demonstrative(term: &str) -> bool {
    DEMONSTRATIVES.contains(term)
}

/// Split `text` into primitive tokens with character offsets.
#[must_use]
pub fn tokenize(text: &str) -> Vec<TextToken> {
    let mut out = Vec::new();
    let mut last_byte = 0usize;
    let mut char_pos = 0usize;
    for m in TOKEN_RE.find_iter(text) {
        let gap = &text[last_byte..m.start()];
        let gap_chars = gap.chars().count();
        let begin = char_pos + gap_chars;
        let len = m.as_str().chars().count();
        let mut tok = TextToken::new(m.as_str(), begin, begin + len)
            .with_spacing(gap_chars, gap.contains('\n'));
        tok.morph = guess_morph(&tok.term);
        out.push(tok);
        char_pos = begin + len;
        last_byte = m.end();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_offsets() {
        let toks = tokenize("Россия, г. Москва");
        let terms: Vec<_> = toks.iter().map(|t| t.term.as_str()).collect();
        assert_eq!(terms, vec!["РОССИЯ", ",", "Г", ".", "МОСКВА"]);
        assert_eq!((toks[4].begin_char, toks[4].end_char), (11, 17));
        assert_eq!(toks[2].whitespaces_before, 1);
        assert_eq!(toks[1].whitespaces_before, 0);
    }

    #[test]
    fn test_tokenize_newline() {
        let toks = tokenize("Paris\nFrance");
        assert!(toks[1].newline_before);
        assert!(!toks[0].newline_before);
    }

    #[test]
    fn test_tokenize_hyphenated() {
        let toks = tokenize("Санкт-Петербург");
        assert_eq!(toks.len(), 3);
        assert!(toks[1].is_hyphen());
    }

    #[test]
    fn test_guess_morph() {
        assert!(guess_morph("В").class.is_preposition());
        assert!(guess_morph("AND").class.is_conjunction());
        let m = guess_morph("ЛЕНИНГРАДСКАЯ");
        assert!(m.class.is_adjective());
        assert_eq!(m.gender, Gender::Feminine);
        assert!(guess_morph("ЭТОМ").class.is_pronoun());
        assert!(guess_morph("MOSCOW").class.is_empty());
    }
}
