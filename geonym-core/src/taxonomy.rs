//! Administrative designator taxonomy ("город", "область", "district", ...).
//!
//! Each designator has one lower-case canonical string (what ends up in a
//! TYPE slot) and the upper-case surface forms it is recognized by. Forms
//! may span two words ("АВТОНОМНОГО ОКРУГА", "MUNICIPAL DISTRICT").

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::lang::{Language, Script};
use crate::token::Gender;

/// Administrative level of a designator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
    /// Sovereign state.
    State,
    /// First-level subdivision (oblast, krai, province, US state).
    Region,
    /// Second-level subdivision (raion, county, municipality).
    District,
    /// Subdivision inside a city.
    CityDistrict,
    /// City or town.
    City,
    /// Rural settlement (village, stanitsa).
    Settlement,
    /// Supranational union.
    Union,
}

/// A designator and its surface forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeWord {
    /// Lower-case canonical designator.
    pub canonical: &'static str,
    /// Administrative level.
    pub kind: TypeKind,
    /// Gender, for adjective agreement.
    pub gender: Gender,
    /// Script of the designator.
    pub script: Script,
    /// Upper-case surface forms, full words.
    pub forms: &'static [&'static str],
    /// Upper-case abbreviations, optionally followed by a period.
    pub abbreviations: &'static [&'static str],
}

impl TypeWord {
    /// Whether `form` is one of this designator's abbreviations.
    #[must_use]
    pub fn is_abbreviation(&self, form: &str) -> bool {
        self.abbreviations.contains(&form)
    }

    /// Whether this designator belongs to `lang`.
    #[must_use]
    pub fn fits_language(&self, lang: Language) -> bool {
        self.script.fits(lang.script())
    }
}

macro_rules! tw {
    ($canon:expr, $kind:ident, $gender:ident, $script:ident, [$($f:expr),* $(,)?], [$($a:expr),* $(,)?]) => {
        TypeWord {
            canonical: $canon,
            kind: TypeKind::$kind,
            gender: Gender::$gender,
            script: Script::$script,
            forms: &[$($f),*],
            abbreviations: &[$($a),*],
        }
    };
}

static TYPE_WORDS: Lazy<Vec<TypeWord>> = Lazy::new(|| {
    vec![
        // Russian
        tw!("государство", State, Neuter, Cyrillic,
            ["ГОСУДАРСТВО", "ГОСУДАРСТВА", "ГОСУДАРСТВЕ", "ГОСУДАРСТВУ", "ГОСУДАРСТВОМ"], []),
        tw!("страна", State, Feminine, Cyrillic,
            ["СТРАНА", "СТРАНЫ", "СТРАНЕ", "СТРАНУ", "СТРАНОЙ"], []),
        tw!("королевство", State, Neuter, Cyrillic,
            ["КОРОЛЕВСТВО", "КОРОЛЕВСТВА", "КОРОЛЕВСТВЕ", "КОРОЛЕВСТВУ", "КОРОЛЕВСТВОМ"], []),
        tw!("республика", Region, Feminine, Cyrillic,
            ["РЕСПУБЛИКА", "РЕСПУБЛИКИ", "РЕСПУБЛИКЕ", "РЕСПУБЛИКУ", "РЕСПУБЛИКОЙ"], ["РЕСП"]),
        tw!("область", Region, Feminine, Cyrillic,
            ["ОБЛАСТЬ", "ОБЛАСТИ", "ОБЛАСТЬЮ"], ["ОБЛ"]),
        tw!("край", Region, Masculine, Cyrillic,
            ["КРАЙ", "КРАЯ", "КРАЕ", "КРАЮ", "КРАЕМ"], []),
        tw!("автономный округ", Region, Masculine, Cyrillic,
            ["АВТОНОМНЫЙ ОКРУГ", "АВТОНОМНОГО ОКРУГА", "АВТОНОМНОМ ОКРУГЕ", "АВТОНОМНОМУ ОКРУГУ"], []),
        tw!("округ", District, Masculine, Cyrillic,
            ["ОКРУГ", "ОКРУГА", "ОКРУГЕ", "ОКРУГУ", "ОКРУГОМ"], []),
        tw!("район", District, Masculine, Cyrillic,
            ["РАЙОН", "РАЙОНА", "РАЙОНЕ", "РАЙОНУ", "РАЙОНОМ"], []),
        tw!("муниципальный округ", District, Masculine, Cyrillic,
            ["МУНИЦИПАЛЬНЫЙ ОКРУГ", "МУНИЦИПАЛЬНОГО ОКРУГА", "МУНИЦИПАЛЬНОМ ОКРУГЕ"], []),
        tw!("поселение", District, Neuter, Cyrillic,
            ["ПОСЕЛЕНИЕ", "ПОСЕЛЕНИЯ", "ПОСЕЛЕНИИ", "ПОСЕЛЕНИЮ"], []),
        tw!("микрорайон", CityDistrict, Masculine, Cyrillic,
            ["МИКРОРАЙОН", "МИКРОРАЙОНА", "МИКРОРАЙОНЕ"], ["МКР", "МКРН"]),
        tw!("город", City, Masculine, Cyrillic,
            ["ГОРОД", "ГОРОДА", "ГОРОДЕ", "ГОРОДУ", "ГОРОДОМ"], ["Г", "ГОР"]),
        tw!("поселок", Settlement, Masculine, Cyrillic,
            ["ПОСЕЛОК", "ПОСЕЛКА", "ПОСЕЛКЕ", "ПОСЕЛКУ"], ["ПОС", "П"]),
        tw!("село", Settlement, Neuter, Cyrillic,
            ["СЕЛО", "СЕЛА", "СЕЛЕ", "СЕЛУ"], []),
        tw!("деревня", Settlement, Feminine, Cyrillic,
            ["ДЕРЕВНЯ", "ДЕРЕВНИ", "ДЕРЕВНЕ", "ДЕРЕВНЮ"], ["ДЕР", "Д"]),
        tw!("станица", Settlement, Feminine, Cyrillic,
            ["СТАНИЦА", "СТАНИЦЫ", "СТАНИЦЕ", "СТАНИЦУ"], ["СТ"]),
        tw!("союз", Union, Masculine, Cyrillic,
            ["СОЮЗ", "СОЮЗА", "СОЮЗЕ", "СОЮЗУ"], []),
        tw!("содружество", Union, Neuter, Cyrillic,
            ["СОДРУЖЕСТВО", "СОДРУЖЕСТВА", "СОДРУЖЕСТВЕ"], []),
        // English
        tw!("country", State, Undefined, Latin, ["COUNTRY"], []),
        tw!("kingdom", State, Undefined, Latin, ["KINGDOM"], []),
        tw!("empire", State, Undefined, Latin, ["EMPIRE"], []),
        tw!("republic", Region, Undefined, Latin, ["REPUBLIC"], ["REP"]),
        tw!("state", Region, Undefined, Latin, ["STATE"], []),
        tw!("region", Region, Undefined, Latin, ["REGION"], []),
        tw!("oblast", Region, Undefined, Latin, ["OBLAST"], []),
        tw!("province", Region, Undefined, Latin, ["PROVINCE"], []),
        tw!("krai", Region, Undefined, Latin, ["KRAI"], []),
        tw!("district", District, Undefined, Latin, ["DISTRICT"], []),
        tw!("county", District, Undefined, Latin, ["COUNTY"], []),
        tw!("municipal district", District, Undefined, Latin, ["MUNICIPAL DISTRICT"], []),
        tw!("borough", CityDistrict, Undefined, Latin, ["BOROUGH"], []),
        tw!("microdistrict", CityDistrict, Undefined, Latin, ["MICRODISTRICT"], []),
        tw!("city", City, Undefined, Latin, ["CITY"], []),
        tw!("town", City, Undefined, Latin, ["TOWN"], []),
        tw!("village", Settlement, Undefined, Latin, ["VILLAGE"], []),
        tw!("settlement", Settlement, Undefined, Latin, ["SETTLEMENT"], []),
        tw!("hamlet", Settlement, Undefined, Latin, ["HAMLET"], []),
        tw!("union", Union, Undefined, Latin, ["UNION"], []),
        tw!("commonwealth", Union, Undefined, Latin, ["COMMONWEALTH"], []),
    ]
});

static BY_CANONICAL: Lazy<HashMap<&'static str, usize>> = Lazy::new(|| {
    TYPE_WORDS
        .iter()
        .enumerate()
        .map(|(i, w)| (w.canonical, i))
        .collect()
});

static BY_FORM: Lazy<HashMap<&'static str, Vec<usize>>> = Lazy::new(|| {
    let mut map: HashMap<&'static str, Vec<usize>> = HashMap::new();
    for (i, w) in TYPE_WORDS.iter().enumerate() {
        for f in w.forms.iter().chain(w.abbreviations) {
            map.entry(*f).or_default().push(i);
        }
    }
    map
});

/// Big cities that contain districts directly.
static BIG_CITIES: &[&str] = &[
    "МОСКВА", "MOSCOW", "САНКТ-ПЕТЕРБУРГ", "SAINT PETERSBURG", "ST PETERSBURG", "КИЕВ", "KYIV",
    "МИНСК", "MINSK", "ПАРИЖ", "PARIS", "БЕРЛИН", "BERLIN", "ЛОНДОН", "LONDON", "NEW YORK",
];

/// Longest designator form, in words.
pub const MAX_FORM_WORDS: usize = 2;

/// All known designators.
#[must_use]
pub fn type_words() -> &'static [TypeWord] {
    &TYPE_WORDS
}

/// Designator by its canonical lower-case string.
#[must_use]
pub fn by_canonical(canonical: &str) -> Option<&'static TypeWord> {
    BY_CANONICAL.get(canonical).map(|&i| &TYPE_WORDS[i])
}

/// Designator recognized by an upper-case surface form (one or two words
/// joined by a single space). Ambiguous forms prefer `lang`.
#[must_use]
pub fn type_by_form(form: &str, lang: Language) -> Option<&'static TypeWord> {
    let candidates = BY_FORM.get(form)?;
    candidates
        .iter()
        .map(|&i| &TYPE_WORDS[i])
        .find(|w| w.fits_language(lang))
        .or_else(|| candidates.first().map(|&i| &TYPE_WORDS[i]))
}

/// Kind of a TYPE slot value. Unknown multi-word designators fall back
/// to their last word ("городской округ" -> "округ").
#[must_use]
pub fn kind_of(typ: &str) -> Option<TypeKind> {
    let typ = typ.trim();
    if let Some(w) = by_canonical(typ) {
        return Some(w.kind);
    }
    let lower = typ.to_lowercase();
    if let Some(w) = by_canonical(&lower) {
        return Some(w.kind);
    }
    lower
        .rsplit(' ')
        .next()
        .filter(|last| *last != lower)
        .and_then(by_canonical)
        .map(|w| w.kind)
}

/// Municipality designators used by the Moscow carve-out.
#[must_use]
pub fn is_municipality(typ: &str) -> bool {
    matches!(
        typ,
        "муниципальный округ" | "поселение" | "municipal district"
    )
}

/// The designator a city keeps when merged types disagree.
#[must_use]
pub fn is_preferred_city_type(typ: &str) -> bool {
    matches!(typ, "город" | "city")
}

/// Whether `name` is a Soviet-era variant ("УКРАИНСКАЯ ССР").
#[must_use]
pub fn is_soviet_variant(name: &str) -> bool {
    name.split([' ', '-'])
        .any(|w| w == "ССР" || w == "СССР" || w == "SSR" || w == "USSR")
}

/// Whether an upper-case city name is in the big-city list.
#[must_use]
pub fn is_big_city_name(name: &str) -> bool {
    BIG_CITIES.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_of_canonical_and_fallback() {
        assert_eq!(kind_of("город"), Some(TypeKind::City));
        assert_eq!(kind_of("область"), Some(TypeKind::Region));
        assert_eq!(kind_of("country"), Some(TypeKind::State));
        assert_eq!(kind_of("городской округ"), Some(TypeKind::District));
        assert_eq!(kind_of("Region"), Some(TypeKind::Region));
        assert_eq!(kind_of("улица"), None);
    }

    #[test]
    fn test_type_by_form() {
        let w = type_by_form("ОБЛ", Language::Russian).unwrap();
        assert_eq!(w.canonical, "область");
        assert!(w.is_abbreviation("ОБЛ"));
        let w = type_by_form("АВТОНОМНОГО ОКРУГА", Language::Russian).unwrap();
        assert_eq!(w.canonical, "автономный округ");
        assert_eq!(type_by_form("CITY", Language::English).unwrap().kind, TypeKind::City);
        assert!(type_by_form("MOSCOW", Language::English).is_none());
    }

    #[test]
    fn test_every_form_resolves() {
        for w in type_words() {
            for f in w.forms {
                assert!(f.split(' ').count() <= MAX_FORM_WORDS, "{f}");
                assert!(type_by_form(f, Language::Other).is_some(), "{f}");
            }
        }
    }

    #[test]
    fn test_soviet_variant() {
        assert!(is_soviet_variant("УКРАИНСКАЯ ССР"));
        assert!(is_soviet_variant("UKRAINIAN SSR"));
        assert!(!is_soviet_variant("УКРАИНА"));
    }
}
