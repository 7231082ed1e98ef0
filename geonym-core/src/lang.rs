//! Language and script classification utilities.

use serde::{Deserialize, Serialize};

/// Languages the engine has type-word tables for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Russian language
    #[default]
    Russian,
    /// Ukrainian language
    Ukrainian,
    /// English language
    English,
    /// Other/unknown language
    Other,
}

impl Language {
    /// Parse a BCP-47-ish tag ("ru", "en-US", "uk").
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        let primary = tag.split(['-', '_']).next().unwrap_or("").to_ascii_lowercase();
        match primary.as_str() {
            "ru" | "rus" | "russian" => Language::Russian,
            "uk" | "ukr" | "ukrainian" => Language::Ukrainian,
            "en" | "eng" | "english" => Language::English,
            _ => Language::Other,
        }
    }

    /// The script names in this language are written in.
    #[must_use]
    pub fn script(self) -> Script {
        match self {
            Language::Russian | Language::Ukrainian => Script::Cyrillic,
            Language::English => Script::Latin,
            Language::Other => Script::Unknown,
        }
    }

    /// Returns true for languages written in Cyrillic.
    #[must_use]
    pub fn is_cyrillic(self) -> bool {
        self.script() == Script::Cyrillic
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            Language::Russian => "ru",
            Language::Ukrainian => "uk",
            Language::English => "en",
            Language::Other => "und",
        };
        f.write_str(tag)
    }
}

/// Writing script of a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Script {
    /// Only Latin letters.
    Latin,
    /// Only Cyrillic letters.
    Cyrillic,
    /// Letters from both scripts.
    Mixed,
    /// No letters, or letters from neither script.
    Unknown,
}

impl Script {
    /// Whether a value written in `self` is acceptable for a target script.
    ///
    /// `Unknown` targets accept anything.
    #[must_use]
    pub fn fits(self, target: Script) -> bool {
        match target {
            Script::Unknown => true,
            Script::Mixed => true,
            _ => self == target,
        }
    }
}

/// Returns true for Cyrillic letters (basic block and supplement).
#[must_use]
pub fn is_cyrillic_char(c: char) -> bool {
    matches!(c, '\u{0400}'..='\u{04ff}' | '\u{0500}'..='\u{052f}')
}

/// Returns true for ASCII and Latin-1/Extended-A letters.
#[must_use]
pub fn is_latin_char(c: char) -> bool {
    c.is_ascii_alphabetic() || (matches!(c, '\u{00c0}'..='\u{024f}') && c.is_alphabetic())
}

/// Classify the script of `text` by its letters.
#[must_use]
pub fn script_of(text: &str) -> Script {
    let mut latin = false;
    let mut cyrillic = false;
    for c in text.chars() {
        if is_cyrillic_char(c) {
            cyrillic = true;
        } else if is_latin_char(c) {
            latin = true;
        }
    }
    match (latin, cyrillic) {
        (true, true) => Script::Mixed,
        (true, false) => Script::Latin,
        (false, true) => Script::Cyrillic,
        (false, false) => Script::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tag() {
        assert_eq!(Language::from_tag("ru"), Language::Russian);
        assert_eq!(Language::from_tag("en-US"), Language::English);
        assert_eq!(Language::from_tag("uk_UA"), Language::Ukrainian);
        assert_eq!(Language::from_tag("de"), Language::Other);
    }

    #[test]
    fn test_script_of() {
        assert_eq!(script_of("МОСКВА"), Script::Cyrillic);
        assert_eq!(script_of("Moscow"), Script::Latin);
        assert_eq!(script_of("Москва-City"), Script::Mixed);
        assert_eq!(script_of("123"), Script::Unknown);
    }

    #[test]
    fn test_script_fits() {
        assert!(Script::Latin.fits(Script::Latin));
        assert!(!Script::Latin.fits(Script::Cyrillic));
        assert!(Script::Cyrillic.fits(Script::Unknown));
    }
}
