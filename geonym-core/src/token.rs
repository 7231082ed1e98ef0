//! Primitive tokens and their morphology tags.
//!
//! Tokens are produced by an external tokenizer (see [`crate::tokenizer`]
//! for a convenience one) and are never mutated by recognition: the
//! pipeline only rewires the stream around them.

use serde::{Deserialize, Serialize};

use crate::lang::{is_cyrillic_char, is_latin_char};

/// Stable index of a node in a [`crate::TokenStream`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TokenId(pub(crate) u32);

impl TokenId {
    /// Position of this node in the stream arena.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for TokenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// Character-shape information of a token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharsInfo {
    /// Contains only letters.
    pub is_letter: bool,
    /// First letter upper-case, rest lower-case.
    pub is_capitalized: bool,
    /// All letters upper-case.
    pub is_all_upper: bool,
    /// All letters lower-case.
    pub is_all_lower: bool,
    /// Contains Latin letters.
    pub is_latin: bool,
    /// Contains Cyrillic letters.
    pub is_cyrillic: bool,
}

impl CharsInfo {
    /// Compute shape flags for a surface string.
    #[must_use]
    pub fn of(text: &str) -> Self {
        let mut info = CharsInfo {
            is_letter: !text.is_empty(),
            ..CharsInfo::default()
        };
        let mut letters = 0usize;
        let mut upper = 0usize;
        let mut lower = 0usize;
        let mut first_upper = false;
        for (i, c) in text.chars().enumerate() {
            if !c.is_alphabetic() {
                info.is_letter = false;
                continue;
            }
            letters += 1;
            if c.is_uppercase() {
                upper += 1;
                if i == 0 {
                    first_upper = true;
                }
            } else if c.is_lowercase() {
                lower += 1;
            }
            if is_cyrillic_char(c) {
                info.is_cyrillic = true;
            } else if is_latin_char(c) {
                info.is_latin = true;
            }
        }
        if letters > 0 {
            info.is_all_upper = upper == letters;
            info.is_all_lower = lower == letters;
            info.is_capitalized = first_upper && (letters == 1 || upper == 1);
        }
        info
    }
}

/// Grammatical gender, used to re-inflect region adjectives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    /// Unknown or not applicable.
    #[default]
    Undefined,
    /// Masculine.
    Masculine,
    /// Feminine.
    Feminine,
    /// Neuter.
    Neuter,
}

/// Part-of-speech class bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MorphClass(u8);

impl MorphClass {
    /// Common noun.
    pub const NOUN: MorphClass = MorphClass(1);
    /// Adjective.
    pub const ADJECTIVE: MorphClass = MorphClass(1 << 1);
    /// Proper name known to the morphology (person names etc.).
    pub const PROPER: MorphClass = MorphClass(1 << 2);
    /// Preposition.
    pub const PREPOSITION: MorphClass = MorphClass(1 << 3);
    /// Conjunction.
    pub const CONJUNCTION: MorphClass = MorphClass(1 << 4);
    /// Pronoun (demonstratives included).
    pub const PRONOUN: MorphClass = MorphClass(1 << 5);
    /// Verb.
    pub const VERB: MorphClass = MorphClass(1 << 6);

    /// Empty class set.
    #[must_use]
    pub const fn empty() -> Self {
        MorphClass(0)
    }

    /// Whether all bits of `other` are set.
    #[must_use]
    pub const fn contains(self, other: MorphClass) -> bool {
        self.0 & other.0 == other.0
    }

    /// Set the bits of `other`.
    pub fn insert(&mut self, other: MorphClass) {
        self.0 |= other.0;
    }

    /// True if no class is known.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Adjective bit.
    #[must_use]
    pub const fn is_adjective(self) -> bool {
        self.contains(MorphClass::ADJECTIVE)
    }

    /// Proper-name bit.
    #[must_use]
    pub const fn is_proper(self) -> bool {
        self.contains(MorphClass::PROPER)
    }

    /// Preposition bit.
    #[must_use]
    pub const fn is_preposition(self) -> bool {
        self.contains(MorphClass::PREPOSITION)
    }

    /// Conjunction bit.
    #[must_use]
    pub const fn is_conjunction(self) -> bool {
        self.contains(MorphClass::CONJUNCTION)
    }

    /// Pronoun bit.
    #[must_use]
    pub const fn is_pronoun(self) -> bool {
        self.contains(MorphClass::PRONOUN)
    }
}

impl std::ops::BitOr for MorphClass {
    type Output = MorphClass;

    fn bitor(self, rhs: MorphClass) -> MorphClass {
        MorphClass(self.0 | rhs.0)
    }
}

/// Morphology attached to a token or composite node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MorphInfo {
    /// Part-of-speech classes.
    pub class: MorphClass,
    /// Gender, when known.
    pub gender: Gender,
    /// Upper-case normal (dictionary) form, when known.
    pub normal: Option<String>,
}

impl MorphInfo {
    /// Morphology with only a class set.
    #[must_use]
    pub fn with_class(class: MorphClass) -> Self {
        Self {
            class,
            ..Self::default()
        }
    }
}

/// A primitive token over the source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextToken {
    /// Upper-case surface with Ё folded to Е.
    pub term: String,
    /// Surface as written.
    pub source: String,
    /// Start character offset (inclusive).
    pub begin_char: usize,
    /// End character offset (exclusive).
    pub end_char: usize,
    /// Character shape.
    pub chars: CharsInfo,
    /// Morphology tags.
    pub morph: MorphInfo,
    /// A line break precedes this token.
    pub newline_before: bool,
    /// Number of whitespace characters before this token.
    pub whitespaces_before: usize,
}

impl TextToken {
    /// Create a token for `source` spanning `[begin_char, end_char)`.
    #[must_use]
    pub fn new(source: impl Into<String>, begin_char: usize, end_char: usize) -> Self {
        let source = source.into();
        let term = crate::names::normalize_name(&source);
        let chars = CharsInfo::of(&source);
        Self {
            term,
            source,
            begin_char,
            end_char,
            chars,
            morph: MorphInfo::default(),
            newline_before: false,
            whitespaces_before: 0,
        }
    }

    /// Set morphology.
    #[must_use]
    pub fn with_morph(mut self, morph: MorphInfo) -> Self {
        self.morph = morph;
        self
    }

    /// Set whitespace information.
    #[must_use]
    pub fn with_spacing(mut self, whitespaces_before: usize, newline_before: bool) -> Self {
        self.whitespaces_before = whitespaces_before;
        self.newline_before = newline_before;
        self
    }

    /// True if the token is exactly the character `c`.
    #[must_use]
    pub fn is_char(&self, c: char) -> bool {
        let mut it = self.source.chars();
        it.next() == Some(c) && it.next().is_none()
    }

    /// Comma token.
    #[must_use]
    pub fn is_comma(&self) -> bool {
        self.is_char(',')
    }

    /// Hyphen or dash token.
    #[must_use]
    pub fn is_hyphen(&self) -> bool {
        self.is_char('-') || self.is_char('\u{2010}') || self.is_char('\u{2013}')
    }

    /// Coordinating "and" in either supported language.
    #[must_use]
    pub fn is_and(&self) -> bool {
        matches!(self.term.as_str(), "И" | "AND" | "&")
    }

    /// A word made only of letters.
    #[must_use]
    pub fn is_word(&self) -> bool {
        self.chars.is_letter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chars_info_capitalized() {
        let info = CharsInfo::of("Москва");
        assert!(info.is_letter && info.is_capitalized && info.is_cyrillic);
        assert!(!info.is_all_upper && !info.is_latin);
    }

    #[test]
    fn test_chars_info_acronym() {
        let info = CharsInfo::of("РФ");
        assert!(info.is_all_upper);
        assert!(!info.is_capitalized);
        let info = CharsInfo::of("Г");
        assert!(info.is_capitalized && info.is_all_upper);
    }

    #[test]
    fn test_chars_info_non_letter() {
        let info = CharsInfo::of("12");
        assert!(!info.is_letter);
        assert!(!info.is_capitalized);
    }

    #[test]
    fn test_text_token_term() {
        let t = TextToken::new("Орёл", 0, 4);
        assert_eq!(t.term, "ОРЕЛ");
        assert!(t.is_word());
        assert!(!t.is_comma());
        assert!(TextToken::new(",", 4, 5).is_comma());
        assert!(TextToken::new("and", 0, 3).is_and());
    }

    #[test]
    fn test_morph_class_bits() {
        let mut c = MorphClass::empty();
        assert!(c.is_empty());
        c.insert(MorphClass::ADJECTIVE);
        assert!(c.is_adjective() && !c.is_proper());
        let both = MorphClass::PREPOSITION | MorphClass::CONJUNCTION;
        assert!(both.is_preposition() && both.is_conjunction());
    }
}
