//! Name normalization and inflection-insensitive matching keys.
//!
//! Cyrillic names arrive inflected ("России", "Ленинградской"). Without a
//! morphological dictionary we compare them by crude stems:
//!
//! ```text
//! РОССИЯ  / РОССИИ          -> РОСС          (noun endings)
//! ЛЕНИНГРАДСКАЯ / -СКОЙ     -> ЛЕНИНГРАДСК   (adjective endings)
//! MOSCOW                    -> MOSCOW        (Latin is left alone)
//! ```
//!
//! Stems are only ever used as lookup keys; stored NAME values keep the
//! normalized surface form.

use crate::lang::{script_of, Script};
use crate::token::Gender;

/// Adjective endings, longest first.
const ADJECTIVE_ENDINGS: &[&str] = &[
    "ОГО", "ЕГО", "ОМУ", "ЕМУ", "ЫМИ", "ИМИ", "АЯ", "ЯЯ", "ОЙ", "ЕЙ", "УЮ", "ЮЮ", "ИЙ", "ЫЙ", "ОЕ",
    "ЕЕ", "ЫЕ", "ИЕ", "ЫХ", "ИХ", "ЫМ", "ИМ", "ОМ", "ЕМ",
];

/// Noun endings, longest first.
const NOUN_ENDINGS: &[&str] = &[
    "ИЕЙ", "ИЯМ", "ИЯХ", "ИЯ", "ИИ", "ИЮ", "ИЕ", "ОЙ", "ЕЙ", "ОМ", "ЕМ", "АМ", "ЯМ", "АХ", "ЯХ",
    "А", "Я", "У", "Ю", "Е", "И", "Ы", "Ь", "О", "Й",
];

const MIN_STEM: usize = 3;

/// Upper-case, fold Ё to Е, trim and collapse inner whitespace.
#[must_use]
pub fn normalize_name(raw: &str) -> String {
    let upper: String = raw
        .chars()
        .flat_map(char::to_uppercase)
        .map(|c| if c == 'Ё' { 'Е' } else { c })
        .collect();
    upper.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_longest<'a>(word: &'a str, endings: &[&str]) -> Option<&'a str> {
    for ending in endings {
        if let Some(stem) = word.strip_suffix(ending) {
            if stem.chars().count() >= MIN_STEM {
                return Some(stem);
            }
        }
    }
    None
}

/// Returns true if an upper-case Cyrillic word looks like an inflected adjective.
#[must_use]
pub fn has_adjective_ending(word: &str) -> bool {
    if script_of(word) != Script::Cyrillic || word.chars().count() < 5 {
        return false;
    }
    // Bare -ОЙ is ambiguous with noun instrumental ("МОСКВОЙ"); require a
    // suffix consonant typical of relational adjectives.
    if let Some(stem) = word.strip_suffix("ОЙ") {
        return stem.ends_with('К') || stem.ends_with('Н');
    }
    ADJECTIVE_ENDINGS
        .iter()
        .filter(|e| **e != "ОЙ")
        .any(|e| word.ends_with(e))
}

/// Stem of an adjective ("ЛЕНИНГРАДСКОЙ" -> "ЛЕНИНГРАДСК").
#[must_use]
pub fn adjective_key(word: &str) -> String {
    if script_of(word) != Script::Cyrillic {
        return word.to_string();
    }
    strip_longest(word, ADJECTIVE_ENDINGS)
        .unwrap_or(word)
        .to_string()
}

/// Stem of a noun-like proper name ("РОССИИ" -> "РОСС").
#[must_use]
pub fn name_key(word: &str) -> String {
    if script_of(word) != Script::Cyrillic {
        return word.to_string();
    }
    strip_longest(word, NOUN_ENDINGS).unwrap_or(word).to_string()
}

/// Key for a single upper-case word, choosing adjective or noun stemming.
#[must_use]
pub fn word_key(word: &str) -> String {
    let word = normalize_name(word);
    if has_adjective_ending(&word) {
        adjective_key(&word)
    } else {
        name_key(&word)
    }
}

/// Key for a possibly multi-word (and hyphenated) name.
#[must_use]
pub fn term_key(name: &str) -> String {
    normalize_name(name)
        .split(' ')
        .map(|w| {
            w.split('-')
                .map(word_key)
                .collect::<Vec<_>>()
                .join("-")
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether two names denote the same word sequence modulo inflection.
#[must_use]
pub fn names_match(a: &str, b: &str) -> bool {
    term_key(a) == term_key(b)
}

/// Re-inflect an adjective to agree with the gender of its designator.
///
/// "ЛЕНИНГРАДСКОЙ" + feminine -> "ЛЕНИНГРАДСКАЯ"; Latin words pass through.
#[must_use]
pub fn adjective_name(word: &str, gender: Gender) -> String {
    let word = normalize_name(word);
    if script_of(&word) != Script::Cyrillic || !has_adjective_ending(&word) {
        return word;
    }
    let stem = adjective_key(&word);
    match gender {
        Gender::Feminine => format!("{stem}АЯ"),
        Gender::Neuter => format!("{stem}ОЕ"),
        Gender::Masculine => {
            if ["ИЙ", "ЫЙ", "ОЙ"].iter().any(|e| word.ends_with(e)) {
                word
            } else if stem.ends_with(['К', 'Г', 'Х', 'Ж', 'Ш', 'Ч', 'Щ']) {
                format!("{stem}ИЙ")
            } else {
                format!("{stem}ЫЙ")
            }
        }
        Gender::Undefined => word,
    }
}

/// Initial letters of the words of `phrase` ("РОССИЙСКАЯ ФЕДЕРАЦИЯ" -> "РФ").
#[must_use]
pub fn initials(phrase: &str) -> String {
    normalize_name(phrase)
        .split([' ', '-'])
        .filter_map(|w| w.chars().next())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  Орёл   Город "), "ОРЕЛ ГОРОД");
        assert_eq!(normalize_name("new york"), "NEW YORK");
    }

    #[test]
    fn test_noun_keys_are_case_insensitive() {
        assert_eq!(name_key("РОССИЯ"), name_key("РОССИИ"));
        assert_eq!(name_key("КАЗАНЬ"), name_key("КАЗАНИ"));
        assert_eq!(name_key("МОСКВА"), name_key("МОСКВЕ"));
        assert_eq!(name_key("MOSCOW"), "MOSCOW");
    }

    #[test]
    fn test_adjective_keys() {
        assert!(has_adjective_ending("ЛЕНИНГРАДСКОЙ"));
        assert!(has_adjective_ending("ТВЕРСКАЯ"));
        assert!(!has_adjective_ending("МОСКВОЙ"));
        assert!(!has_adjective_ending("РОССИЯ"));
        assert_eq!(word_key("Ленинградская"), word_key("ЛЕНИНГРАДСКОЙ"));
        assert_eq!(word_key("ТВЕРСКОЙ"), word_key("ТВЕРСКИЙ"));
    }

    #[test]
    fn test_term_key_multiword() {
        assert!(names_match("Российская Федерация", "РОССИЙСКОЙ ФЕДЕРАЦИИ"));
        assert!(names_match("Санкт-Петербург", "САНКТ-ПЕТЕРБУРГЕ"));
        assert!(!names_match("Москва", "Казань"));
    }

    #[test]
    fn test_adjective_name_agreement() {
        assert_eq!(adjective_name("Ленинградской", Gender::Feminine), "ЛЕНИНГРАДСКАЯ");
        assert_eq!(adjective_name("Тверского", Gender::Masculine), "ТВЕРСКИЙ");
        assert_eq!(adjective_name("Тверской", Gender::Masculine), "ТВЕРСКОЙ");
        assert_eq!(adjective_name("French", Gender::Feminine), "FRENCH");
    }

    #[test]
    fn test_initials() {
        assert_eq!(initials("РОССИЙСКАЯ ФЕДЕРАЦИЯ"), "РФ");
        assert_eq!(initials("United States"), "US");
    }
}
