//! Non-geographic span annotators run before the geographic passes.
//!
//! They claim spans that would otherwise be misread: "д. 5" is a house
//! number, not the village designator "д."; "ул. Тверская" is a street,
//! not the Tver region adjective.

use once_cell::sync::Lazy;
use std::collections::HashSet;

use geonym_core::{AnnotationKind, TokenId, TokenStream};

use crate::collab::CandidateGenerator;
use crate::document::GeoDocument;

static DETAIL_MARKERS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "Д", "ДОМ", "КВ", "КВАРТИРА", "КОРП", "КОРПУС", "СТР", "СТРОЕНИЕ", "ОФ", "ОФИС", "HOUSE",
        "APT", "BLDG", "SUITE",
    ]
    .into_iter()
    .collect()
});

static STREET_PREFIXES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "УЛ", "УЛИЦА", "УЛИЦЕ", "УЛИЦЫ", "ПР", "ПРОСПЕКТ", "ПР-Т", "ПЕР", "ПЕРЕУЛОК", "НАБ",
        "НАБЕРЕЖНАЯ", "Ш", "ШОССЕ", "БУЛЬВАР", "ПЛ", "ПЛОЩАДЬ",
    ]
    .into_iter()
    .collect()
});

static STREET_SUFFIXES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["STREET", "ST", "AVENUE", "AVE", "ROAD", "RD", "BOULEVARD", "LANE"]
        .into_iter()
        .collect()
});

static ORG_PREFIXES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["ООО", "ОАО", "ЗАО", "ПАО", "АО", "НКО", "ФГУП", "МУП", "ГУП", "ИП"]
        .into_iter()
        .collect()
});

static ORG_SUFFIXES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["INC", "LTD", "LLC", "CORP", "GMBH", "PLC", "AG"]
        .into_iter()
        .collect()
});

fn is_capitalized_word(stream: &TokenStream, id: TokenId) -> bool {
    let n = stream.node(id);
    n.text().is_some_and(|t| t.is_word()) && (n.chars.is_capitalized || n.chars.is_all_upper)
}

fn is_number(stream: &TokenStream, id: TokenId) -> bool {
    stream
        .node(id)
        .text()
        .is_some_and(|t| !t.term.is_empty() && t.term.chars().all(|c| c.is_ascii_digit()))
}

fn skip_char(stream: &TokenStream, id: TokenId, c: char) -> TokenId {
    match stream.next(id) {
        Some(n) if stream.node(n).is_char(c) => n,
        _ => id,
    }
}

fn span_text(stream: &TokenStream, begin: TokenId, end: TokenId) -> String {
    let mut out = stream.surface(begin);
    let mut cur = begin;
    while cur != end {
        let Some(n) = stream.next(cur) else { break };
        if stream.node(n).whitespaces_before > 0 {
            out.push(' ');
        }
        out.push_str(&stream.surface(n));
        cur = n;
    }
    out
}

fn embed(doc: &mut GeoDocument, begin: TokenId, end: TokenId, kind: AnnotationKind) -> Option<TokenId> {
    let label = span_text(&doc.stream, begin, end);
    match doc.annotate(begin, end, kind, label) {
        Ok(id) => Some(id),
        Err(e) => {
            log::warn!("annotation span rejected: {e}");
            None
        }
    }
}

/// Run `matcher` at every top-level text node; embed what it returns.
fn scan(
    doc: &mut GeoDocument,
    kind: AnnotationKind,
    matcher: impl Fn(&TokenStream, TokenId) -> Option<(TokenId, TokenId)>,
) -> usize {
    let mut added = 0;
    let mut cur = doc.stream.first();
    while let Some(t) = cur {
        if doc.stream.node(t).text().is_none() {
            cur = doc.stream.next(t);
            continue;
        }
        match matcher(&doc.stream, t) {
            Some((b, e)) => match embed(doc, b, e, kind) {
                Some(node) => {
                    added += 1;
                    cur = doc.stream.next(node);
                }
                None => cur = doc.stream.next(t),
            },
            None => cur = doc.stream.next(t),
        }
    }
    added
}

/// Claims house/apartment details and street names.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddressDetailAnnotator;

impl AddressDetailAnnotator {
    fn detail(stream: &TokenStream, t: TokenId) -> Option<(TokenId, TokenId)> {
        let term = stream.node(t).term()?;
        if !DETAIL_MARKERS.contains(term) {
            return None;
        }
        let after = skip_char(stream, skip_char(stream, t, '.'), '№');
        let num = stream.next(after).filter(|&n| is_number(stream, n))?;
        // "д. 5/2", "д. 5А"
        let mut end = num;
        if let Some(n) = stream.next(end) {
            let node = stream.node(n);
            if node.whitespaces_before == 0 && (node.is_char('/') || node.is_char('-')) {
                if let Some(m) = stream.next(n).filter(|&m| is_number(stream, m)) {
                    end = m;
                }
            } else if node.whitespaces_before == 0
                && node.text().is_some_and(|k| k.is_word() && k.term.chars().count() == 1)
            {
                end = n;
            }
        }
        Some((t, end))
    }

    fn street(stream: &TokenStream, t: TokenId) -> Option<(TokenId, TokenId)> {
        let term = stream.node(t).term()?;
        if STREET_PREFIXES.contains(term) {
            let after = skip_char(stream, t, '.');
            let name = stream.next(after).filter(|&n| is_capitalized_word(stream, n))?;
            return Some((t, name));
        }
        if is_capitalized_word(stream, t) {
            let suffix = stream.next(t).filter(|&n| {
                stream
                    .node(n)
                    .term()
                    .is_some_and(|s| STREET_SUFFIXES.contains(s))
            })?;
            return Some((t, skip_char(stream, suffix, '.')));
        }
        None
    }
}

impl CandidateGenerator for AddressDetailAnnotator {
    fn name(&self) -> &'static str {
        "address-detail"
    }

    fn prepare(&self, doc: &mut GeoDocument) -> usize {
        scan(doc, AnnotationKind::AddressDetail, Self::detail)
            + scan(doc, AnnotationKind::Street, Self::street)
    }
}

/// Claims organization names ("ООО «Ромашка»", "Acme Inc.").
#[derive(Debug, Clone, Copy, Default)]
pub struct OrganizationAnnotator;

impl OrganizationAnnotator {
    fn prefixed(stream: &TokenStream, t: TokenId) -> Option<(TokenId, TokenId)> {
        let term = stream.node(t).term()?;
        if !ORG_PREFIXES.contains(term) {
            return None;
        }
        let next = stream.next(t)?;
        let open = stream.node(next);
        let close = if open.is_char('«') {
            '»'
        } else if open.is_char('"') {
            '"'
        } else {
            return is_capitalized_word(stream, next).then_some((t, next));
        };
        let mut cur = stream.next(next);
        for _ in 0..8 {
            let c = cur?;
            if stream.node(c).is_char(close) {
                return Some((t, c));
            }
            cur = stream.next(c);
        }
        None
    }

    fn suffixed(stream: &TokenStream, t: TokenId) -> Option<(TokenId, TokenId)> {
        if !is_capitalized_word(stream, t) {
            return None;
        }
        let mut cur = stream.next(t);
        for _ in 0..3 {
            let c = cur?;
            let node = stream.node(c);
            if node.term().is_some_and(|s| ORG_SUFFIXES.contains(s)) {
                return Some((t, skip_char(stream, c, '.')));
            }
            if !(node.is_comma() || is_capitalized_word(stream, c)) {
                return None;
            }
            cur = stream.next(c);
        }
        None
    }
}

impl CandidateGenerator for OrganizationAnnotator {
    fn name(&self) -> &'static str {
        "organization"
    }

    fn prepare(&self, doc: &mut GeoDocument) -> usize {
        scan(doc, AnnotationKind::Organization, |s, t| {
            Self::prefixed(s, t).or_else(|| Self::suffixed(s, t))
        })
    }
}
