//! Property-based tests for pipeline invariants.
//!
//! Documents are random sequences drawn from a vocabulary of geographic
//! names, designators, punctuation and filler words, so that most passes
//! fire and interact.

use geonym::{GeoAnalyzer, GeoDocument, Language, RunStatus};
use once_cell::sync::Lazy;
use proptest::prelude::*;

static ANALYZER: Lazy<GeoAnalyzer> =
    Lazy::new(|| GeoAnalyzer::new().expect("default analyzer builds"));

const RU_WORDS: &[&str] = &[
    "Россия", "России", "РФ", "Беларусь", "Казахстана", "Москва", "г.", "город", "Тверь",
    "Химки", "Тверская", "Ленинградской", "область", "обл.", "ЛО", "Союз", "и", ",", ",", "(",
    ")", ".", "в", "этот", "муниципальный", "округ", "Отрадное", "район", "д.", "5", "улица",
    "ООО", "«Ромашка»", "Новгородская", "жители", "Республика", "Татарстан",
];

const EN_WORDS: &[&str] = &[
    "Russia", "France", "(", "French", "Republic", ")", "Union", "of", "and", ",", "Moscow",
    "city", "Rouen", "Region", "Normandy", "the", "same", "US", "county", "Paris", ".", "Acme",
    "Inc",
];

fn text_from(words: &[&str], picks: &[usize]) -> String {
    picks
        .iter()
        .map(|&i| words[i % words.len()])
        .collect::<Vec<_>>()
        .join(" ")
}

fn check_canonical(doc: &GeoDocument) -> Result<(), TestCaseError> {
    let store = doc.store();
    for &id in doc.registered() {
        prop_assert!(!store.is_forwarded(id));
        for r in store.entity(id).geo_refs() {
            prop_assert!(!store.is_forwarded(r), "stale REF {} on {}", r, id);
        }
        if let Some(h) = store.entity(id).raw_higher() {
            prop_assert!(!store.is_forwarded(h), "stale HIGHER {} on {}", h, id);
        }
    }
    let stream = doc.stream();
    for node in stream.all_reachable() {
        if let Some(e) = stream.node(node).geo() {
            prop_assert!(!store.is_forwarded(e), "node {} bound to forwarded {}", node, e);
            prop_assert!(doc.registry().contains(e));
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(96))]

    #[test]
    fn russian_documents_canonicalize_fully(
        picks in proptest::collection::vec(0usize..64, 0..40)
    ) {
        let text = text_from(RU_WORDS, &picks);
        let (doc, outcome) = ANALYZER.analyze(&text, Language::Russian).unwrap();
        prop_assert_eq!(outcome.status, RunStatus::Completed);
        prop_assert!(doc.provisional().is_empty());
        check_canonical(&doc)?;
    }

    #[test]
    fn english_documents_canonicalize_fully(
        picks in proptest::collection::vec(0usize..64, 0..40)
    ) {
        let text = text_from(EN_WORDS, &picks);
        let (doc, outcome) = ANALYZER.analyze(&text, Language::English).unwrap();
        prop_assert_eq!(outcome.status, RunStatus::Completed);
        check_canonical(&doc)?;
    }

    #[test]
    fn mentions_are_ordered_and_disjoint(
        picks in proptest::collection::vec(0usize..64, 0..40)
    ) {
        let text = text_from(RU_WORDS, &picks);
        let (doc, _) = ANALYZER.analyze(&text, Language::Russian).unwrap();
        let mentions = doc.mentions();
        for w in mentions.windows(2) {
            prop_assert!(w[0].end_char <= w[1].begin_char);
        }
        for m in &mentions {
            prop_assert!(m.begin_char < m.end_char);
            prop_assert!(m.end_char <= text.chars().count());
        }
    }

    #[test]
    fn hierarchy_chains_terminate(
        picks in proptest::collection::vec(0usize..64, 0..40)
    ) {
        let text = text_from(RU_WORDS, &picks);
        let (doc, _) = ANALYZER.analyze(&text, Language::Russian).unwrap();
        for &id in doc.registered() {
            let chain = doc.store().ancestors(id);
            prop_assert!(!chain.contains(&id));
            prop_assert!(chain.len() <= geonym_core::MAX_HIGHER_DEPTH);
        }
    }

    #[test]
    fn processing_is_deterministic(
        picks in proptest::collection::vec(0usize..64, 0..30)
    ) {
        let text = text_from(RU_WORDS, &picks);
        let (a, _) = ANALYZER.analyze(&text, Language::Russian).unwrap();
        let (b, _) = ANALYZER.analyze(&text, Language::Russian).unwrap();
        let show = |d: &GeoDocument| {
            d.mentions()
                .iter()
                .map(|m| (m.begin_char, m.end_char, d.display(m.entity)))
                .collect::<Vec<_>>()
        };
        prop_assert_eq!(show(&a), show(&b));
    }
}
