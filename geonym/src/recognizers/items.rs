//! Single-item parsers shared by the territory and city parsers.

use geonym_core::taxonomy::type_by_form;
use geonym_core::{Node, TokenId};

use crate::collab::{Candidate, CandidateKind};
use crate::document::GeoDocument;
use crate::gazetteer::{EntryKind, Gazetteer};

/// Closed-class words never start a name.
pub(crate) fn is_function_word(node: &Node) -> bool {
    let c = node.morph.class;
    c.is_preposition() || c.is_conjunction() || c.is_pronoun()
}

/// Capitalized, or an all-caps word of at least two letters.
pub(crate) fn looks_like_name(node: &Node) -> bool {
    let Some(tok) = node.text() else { return false };
    tok.is_word()
        && (node.chars.is_capitalized || (node.chars.is_all_upper && tok.term.chars().count() > 1))
}

fn with_shape(mut c: Candidate, doc: &GeoDocument, t: TokenId) -> Candidate {
    let node = doc.stream.node(t);
    c.morph = node.morph.clone();
    c.chars = node.chars;
    c
}

fn known_entity(doc: &GeoDocument, value: &str) -> Option<geonym_core::EntityId> {
    doc.registry().lookup_name(value).into_iter().next()
}

/// Designator at `t` ("область", "г.", "AUTONOMOUS OKRUG", "city of").
pub(crate) fn type_word_at(doc: &GeoDocument, t: TokenId) -> Option<Candidate> {
    let stream = &doc.stream;
    let node = stream.node(t);
    let tok = node.text().filter(|k| k.is_word())?;

    let mut found = None;
    if let Some(n) = stream.next(t) {
        let second = stream.node(n);
        if let Some(t2) = second.text().filter(|k| k.is_word() && !second.newline_before) {
            found = type_by_form(&format!("{} {}", tok.term, t2.term), doc.lang).map(|w| (w, n));
        }
    }
    let (word, mut end) = match found {
        Some(f) => f,
        None => (type_by_form(&tok.term, doc.lang)?, t),
    };
    if word.is_abbreviation(&tok.term) {
        if let Some(dot) = stream.next(end).filter(|&d| stream.node(d).is_char('.')) {
            end = dot;
        }
    }
    if let Some(of) = stream.next(end).filter(|&o| stream.node(o).is_term("OF")) {
        if stream.next(of).is_some_and(|x| looks_like_name(stream.node(x))) {
            end = of;
        }
    }

    let mut c = Candidate::new(t, end, CandidateKind::TypeWord, word.canonical);
    c.type_word = Some(word);
    Some(with_shape(c, doc, t))
}

/// Lexicon name at `t`, preferring entries of the given kinds.
pub(crate) fn name_at(
    doc: &GeoDocument,
    gazetteer: &Gazetteer,
    t: TokenId,
    prefer: &[EntryKind],
) -> Option<Candidate> {
    let node = doc.stream.node(t);
    if node.chars.is_all_lower || is_function_word(node) {
        return None;
    }
    let m = gazetteer.match_at(&doc.stream, t)?;
    let template = m
        .entries
        .iter()
        .find(|e| prefer.contains(&e.kind))
        .or_else(|| m.entries.first())
        .cloned();
    let mut c = Candidate::new(t, m.end, CandidateKind::ProperName, m.phrase.as_str());
    c.template = template;
    c.onto = known_entity(doc, &m.phrase);
    Some(with_shape(c, doc, t))
}

/// Name-forming adjective at `t`. Lower-case adjectives need a lexicon entry.
pub(crate) fn adjective_at(
    doc: &GeoDocument,
    gazetteer: &Gazetteer,
    t: TokenId,
    prefer: &[EntryKind],
) -> Option<Candidate> {
    let node = doc.stream.node(t);
    let tok = node.text().filter(|k| k.is_word())?;
    if !node.morph.class.is_adjective() {
        return None;
    }
    let entries = gazetteer.lookup_adjective(&tok.term);
    let template = entries
        .iter()
        .find(|e| prefer.contains(&e.kind))
        .or_else(|| entries.first())
        .cloned();
    if template.is_none() && !node.chars.is_capitalized {
        return None;
    }
    let mut c = Candidate::new(t, t, CandidateKind::Adjective, tok.term.as_str());
    c.template = template;
    c.onto = known_entity(doc, &tok.term);
    Some(with_shape(c, doc, t))
}

/// Unknown capitalized word at `t`.
pub(crate) fn bare_name_at(doc: &GeoDocument, t: TokenId) -> Option<Candidate> {
    let node = doc.stream.node(t);
    if !looks_like_name(node) || is_function_word(node) {
        return None;
    }
    let tok = node.text()?;
    if type_by_form(&tok.term, doc.lang).is_some() {
        return None;
    }
    let mut c = Candidate::new(t, t, CandidateKind::ProperName, tok.term.as_str());
    c.onto = known_entity(doc, &tok.term);
    Some(with_shape(c, doc, t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geonym_core::{Language, TypeKind};

    fn doc(text: &str, lang: Language) -> (GeoDocument, Vec<TokenId>) {
        let d = GeoDocument::from_text(text, lang);
        let ids = d.stream().iter().collect();
        (d, ids)
    }

    #[test]
    fn test_type_word_abbreviation_absorbs_period() {
        let (d, ids) = doc("обл. Тверская", Language::Russian);
        let c = type_word_at(&d, ids[0]).unwrap();
        assert_eq!(c.value, "область");
        assert_eq!(c.end, ids[1]);
    }

    #[test]
    fn test_type_word_two_words_and_of() {
        let (d, ids) = doc("Ханты-Мансийского автономного округа", Language::Russian);
        let c = type_word_at(&d, ids[3]).unwrap();
        assert_eq!(c.type_word.unwrap().kind, TypeKind::Region);
        assert_eq!(c.end, ids[4]);

        let (d, ids) = doc("city of Rouen", Language::English);
        let c = type_word_at(&d, ids[0]).unwrap();
        assert_eq!(c.value, "city");
        assert_eq!(c.end, ids[1]);
    }

    #[test]
    fn test_adjective_needs_capital_or_entry() {
        let g = Gazetteer::builtin();
        let (d, ids) = doc("Новгородская северная тверская", Language::Russian);
        assert!(adjective_at(&d, &g, ids[0], &[]).unwrap().template.is_none());
        assert!(adjective_at(&d, &g, ids[1], &[]).is_none());
        assert!(adjective_at(&d, &g, ids[2], &[]).unwrap().template.is_some());
    }

    #[test]
    fn test_bare_name_skips_function_and_type_words() {
        let (d, ids) = doc("В Region Zzab ЛО", Language::English);
        assert!(bare_name_at(&d, ids[0]).is_none());
        assert!(bare_name_at(&d, ids[1]).is_none());
        assert_eq!(bare_name_at(&d, ids[2]).unwrap().value, "ZZAB");
        assert_eq!(bare_name_at(&d, ids[3]).unwrap().value, "ЛО");
    }
}
