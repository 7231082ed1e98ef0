//! Token stream arena with span embedding.
//!
//! The stream is an arena of nodes addressed by [`TokenId`]. Primitive
//! tokens occupy the first slots; every `embed` call appends one composite
//! node and rewires the visible `prev`/`next` links around it:
//!
//! ```text
//! before:   [Россия] -> [,] -> [г] -> [.] -> [Москва]
//! embed(г..Москва, Geo(e1)):
//!           [Россия] -> [,] -> <e1: г . Москва>
//! embed(Россия..<e1>, Geo(e1)):
//!           <e1: Россия , <e1: г . Москва>>
//! ```
//!
//! Consumed nodes keep their own links, so [`TokenStream::walk_inner`] can
//! still iterate the children of a composite. A node is *visible* when no
//! composite has consumed it; only visible nodes can be endpoints of a new
//! embedding, which rules out partial overlaps.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::referent::EntityId;
use crate::token::{CharsInfo, MorphInfo, TextToken, TokenId};

/// Kind of a non-geographic span embedded by a candidate generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnnotationKind {
    /// Organization name ("ООО Ромашка", "Acme Inc").
    Organization,
    /// Street mention.
    Street,
    /// Address detail (house number, building, apartment).
    AddressDetail,
    /// Anything else a host generator wants to protect from re-parsing.
    Other,
}

/// A span claimed by a candidate generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// What was recognized.
    pub kind: AnnotationKind,
    /// Generator-provided label (normalized surface).
    pub label: String,
}

/// Payload of a stream node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Primitive token.
    Text(TextToken),
    /// Resolved geographic mention.
    Geo(EntityId),
    /// Span claimed by a candidate generator.
    Annotation(Annotation),
}

/// A node of the stream arena.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Payload.
    pub kind: NodeKind,
    /// First child (self for primitives).
    pub begin: TokenId,
    /// Last child, inclusive (self for primitives).
    pub end: TokenId,
    /// Start character offset.
    pub begin_char: usize,
    /// End character offset (exclusive).
    pub end_char: usize,
    /// Morphology of the whole span.
    pub morph: MorphInfo,
    /// Shape of the first primitive.
    pub chars: CharsInfo,
    /// Line break before the span.
    pub newline_before: bool,
    /// Whitespace before the span.
    pub whitespaces_before: usize,
    prev: Option<TokenId>,
    next: Option<TokenId>,
    parent: Option<TokenId>,
    composite: bool,
}

impl Node {
    /// Primitive token payload, if any.
    #[must_use]
    pub fn text(&self) -> Option<&TextToken> {
        match &self.kind {
            NodeKind::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Bound entity, if this is a geographic mention.
    #[must_use]
    pub fn geo(&self) -> Option<EntityId> {
        match self.kind {
            NodeKind::Geo(id) => Some(id),
            _ => None,
        }
    }

    /// Annotation payload, if any.
    #[must_use]
    pub fn annotation(&self) -> Option<&Annotation> {
        match &self.kind {
            NodeKind::Annotation(a) => Some(a),
            _ => None,
        }
    }

    /// Upper-case term of a primitive token.
    #[must_use]
    pub fn term(&self) -> Option<&str> {
        self.text().map(|t| t.term.as_str())
    }

    /// Primitive token consisting of exactly `c`.
    #[must_use]
    pub fn is_char(&self, c: char) -> bool {
        self.text().is_some_and(|t| t.is_char(c))
    }

    /// Comma primitive.
    #[must_use]
    pub fn is_comma(&self) -> bool {
        self.text().is_some_and(TextToken::is_comma)
    }

    /// Hyphen primitive.
    #[must_use]
    pub fn is_hyphen(&self) -> bool {
        self.text().is_some_and(TextToken::is_hyphen)
    }

    /// Primitive whose term equals `term`.
    #[must_use]
    pub fn is_term(&self, term: &str) -> bool {
        self.term() == Some(term)
    }

    /// Whether this node was created by `embed`.
    #[must_use]
    pub fn is_composite(&self) -> bool {
        self.composite
    }

    /// The composite that consumed this node, if any.
    #[must_use]
    pub fn parent(&self) -> Option<TokenId> {
        self.parent
    }
}

/// Arena-backed token stream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenStream {
    nodes: Vec<Node>,
    head: Option<TokenId>,
    primitives: usize,
}

impl TokenStream {
    /// Build a stream from primitive tokens in text order.
    #[must_use]
    pub fn new(tokens: Vec<TextToken>) -> Self {
        let n = tokens.len();
        let nodes = tokens
            .into_iter()
            .enumerate()
            .map(|(i, t)| {
                let id = TokenId(i as u32);
                Node {
                    begin: id,
                    end: id,
                    begin_char: t.begin_char,
                    end_char: t.end_char,
                    morph: t.morph.clone(),
                    chars: t.chars,
                    newline_before: t.newline_before,
                    whitespaces_before: t.whitespaces_before,
                    kind: NodeKind::Text(t),
                    prev: i.checked_sub(1).map(|p| TokenId(p as u32)),
                    next: (i + 1 < n).then(|| TokenId((i + 1) as u32)),
                    parent: None,
                    composite: false,
                }
            })
            .collect();
        Self {
            nodes,
            head: (n > 0).then_some(TokenId(0)),
            primitives: n,
        }
    }

    /// Tokenize `text` with the built-in tokenizer.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self::new(crate::tokenizer::tokenize(text))
    }

    /// First visible node.
    #[must_use]
    pub fn first(&self) -> Option<TokenId> {
        self.head
    }

    /// Number of primitive tokens.
    #[must_use]
    pub fn primitive_count(&self) -> usize {
        self.primitives
    }

    /// Total arena size (primitives plus composites).
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True for a stream without tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Access a node, failing on ids this stream never issued.
    pub fn get(&self, id: TokenId) -> Result<&Node> {
        self.nodes
            .get(id.index())
            .ok_or(Error::UnknownToken(id.index()))
    }

    /// Access a node by an id obtained from this stream.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this stream.
    #[must_use]
    pub fn node(&self, id: TokenId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Next node at the same nesting level.
    #[must_use]
    pub fn next(&self, id: TokenId) -> Option<TokenId> {
        self.nodes.get(id.index()).and_then(|n| n.next)
    }

    /// Previous node at the same nesting level.
    #[must_use]
    pub fn prev(&self, id: TokenId) -> Option<TokenId> {
        self.nodes.get(id.index()).and_then(|n| n.prev)
    }

    /// Skip `steps` nodes forward.
    #[must_use]
    pub fn nth_next(&self, id: TokenId, steps: usize) -> Option<TokenId> {
        let mut cur = id;
        for _ in 0..steps {
            cur = self.next(cur)?;
        }
        Some(cur)
    }

    /// Whether no composite has consumed `id`.
    #[must_use]
    pub fn is_visible(&self, id: TokenId) -> bool {
        self.nodes
            .get(id.index())
            .is_some_and(|n| n.parent.is_none())
    }

    /// Top-level nodes in order.
    pub fn iter(&self) -> impl Iterator<Item = TokenId> + '_ {
        std::iter::successors(self.head, move |id| self.next(*id))
    }

    /// Reduce the visible range `[begin, end]` into a new composite node.
    ///
    /// Both endpoints must be visible and `end` must be reachable from
    /// `begin`. The new node takes the place of the range in traversal.
    pub fn embed(
        &mut self,
        begin: TokenId,
        end: TokenId,
        kind: NodeKind,
        morph: MorphInfo,
    ) -> Result<TokenId> {
        self.get(begin)?;
        self.get(end)?;
        if !self.is_visible(begin) || !self.is_visible(end) {
            return Err(Error::invalid_span(format!(
                "{begin}..{end}: endpoint already embedded"
            )));
        }
        let mut children = vec![begin];
        let mut cur = begin;
        while cur != end {
            match self.next(cur) {
                Some(n) => {
                    children.push(n);
                    cur = n;
                }
                None => {
                    return Err(Error::invalid_span(format!(
                        "{begin}..{end}: end not reachable from begin"
                    )))
                }
            }
        }

        let id = TokenId(self.nodes.len() as u32);
        let (first, last) = (self.node(begin), self.node(end));
        let node = Node {
            kind,
            begin,
            end,
            begin_char: first.begin_char,
            end_char: last.end_char,
            morph,
            chars: first.chars,
            newline_before: first.newline_before,
            whitespaces_before: first.whitespaces_before,
            prev: first.prev,
            next: last.next,
            parent: None,
            composite: true,
        };
        if let Some(p) = node.prev {
            self.nodes[p.index()].next = Some(id);
        } else {
            self.head = Some(id);
        }
        if let Some(n) = node.next {
            self.nodes[n.index()].prev = Some(id);
        }
        self.nodes.push(node);
        for child in children {
            self.nodes[child.index()].parent = Some(id);
        }
        Ok(id)
    }

    /// Direct children of a composite, in order. Primitives yield themselves.
    #[must_use]
    pub fn walk_inner(&self, id: TokenId) -> Vec<TokenId> {
        let node = self.node(id);
        if !node.composite {
            return vec![id];
        }
        let mut out = Vec::new();
        let mut cur = Some(node.begin);
        while let Some(c) = cur {
            out.push(c);
            if c == node.end {
                break;
            }
            cur = self.next(c);
        }
        out
    }

    /// Visit `id` and every node nested inside it, outer before inner.
    pub fn walk_inner_recursive(&self, id: TokenId, visit: &mut impl FnMut(TokenId, &Node)) {
        visit(id, self.node(id));
        if self.node(id).composite {
            for child in self.walk_inner(id) {
                self.walk_inner_recursive(child, visit);
            }
        }
    }

    /// Every node reachable from the top level, recursively.
    #[must_use]
    pub fn all_reachable(&self) -> Vec<TokenId> {
        let mut out = Vec::new();
        for top in self.iter() {
            self.walk_inner_recursive(top, &mut |id, _| out.push(id));
        }
        out
    }

    /// Primitive tokens under `id`, in order.
    #[must_use]
    pub fn primitives(&self, id: TokenId) -> Vec<TokenId> {
        let mut out = Vec::new();
        self.walk_inner_recursive(id, &mut |t, n| {
            if !n.composite {
                out.push(t);
            }
        });
        out
    }

    /// Source text covered by `id`, spacing reconstructed from tokens.
    #[must_use]
    pub fn surface(&self, id: TokenId) -> String {
        let mut out = String::new();
        for (i, t) in self.primitives(id).into_iter().enumerate() {
            if let Some(tok) = self.node(t).text() {
                if i > 0 && tok.whitespaces_before > 0 {
                    out.push(' ');
                }
                out.push_str(&tok.source);
            }
        }
        out
    }

    /// Rebind a geographic composite to another entity.
    pub fn set_geo(&mut self, id: TokenId, entity: EntityId) -> Result<()> {
        let node = self
            .nodes
            .get_mut(id.index())
            .ok_or(Error::UnknownToken(id.index()))?;
        match &mut node.kind {
            NodeKind::Geo(e) => {
                *e = entity;
                Ok(())
            }
            _ => Err(Error::invalid_span(format!("{id} is not a geographic node"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(text: &str) -> TokenStream {
        TokenStream::from_text(text)
    }

    fn terms(s: &TokenStream) -> Vec<String> {
        s.iter()
            .map(|id| match &s.node(id).kind {
                NodeKind::Text(t) => t.term.clone(),
                NodeKind::Geo(e) => format!("<{e}>"),
                NodeKind::Annotation(a) => format!("[{}]", a.label),
            })
            .collect()
    }

    #[test]
    fn test_embed_replaces_range() {
        let mut s = stream("Россия, г. Москва");
        let ids: Vec<_> = s.iter().collect();
        assert_eq!(ids.len(), 5);
        let e = EntityId::new(0);
        let c = s
            .embed(ids[2], ids[4], NodeKind::Geo(e), MorphInfo::default())
            .unwrap();
        assert_eq!(terms(&s), vec!["РОССИЯ", ",", "<e0>"]);
        assert_eq!(s.walk_inner(c), vec![ids[2], ids[3], ids[4]]);
        assert_eq!(s.surface(c), "г. Москва");
        assert!(!s.is_visible(ids[3]));
        assert_eq!(s.node(c).begin_char, 8);
        assert_eq!(s.node(c).end_char, 17);
    }

    #[test]
    fn test_nested_embed() {
        let mut s = stream("Россия, г. Москва");
        let ids: Vec<_> = s.iter().collect();
        let e = EntityId::new(0);
        let inner = s
            .embed(ids[2], ids[4], NodeKind::Geo(e), MorphInfo::default())
            .unwrap();
        let outer = s
            .embed(ids[0], inner, NodeKind::Geo(e), MorphInfo::default())
            .unwrap();
        assert_eq!(s.iter().collect::<Vec<_>>(), vec![outer]);
        assert_eq!(s.first(), Some(outer));
        assert_eq!(s.primitives(outer), ids);
        let mut seen = Vec::new();
        s.walk_inner_recursive(outer, &mut |id, _| seen.push(id));
        assert_eq!(seen.len(), 7);
        assert_eq!(seen[0], outer);
    }

    #[test]
    fn test_partial_overlap_rejected() {
        let mut s = stream("a b c d");
        let ids: Vec<_> = s.iter().collect();
        let e = EntityId::new(0);
        s.embed(ids[1], ids[2], NodeKind::Geo(e), MorphInfo::default())
            .unwrap();
        let err = s.embed(ids[0], ids[1], NodeKind::Geo(e), MorphInfo::default());
        assert!(matches!(err, Err(Error::InvalidSpan(_))));
    }

    #[test]
    fn test_misordered_rejected() {
        let mut s = stream("a b c");
        let ids: Vec<_> = s.iter().collect();
        let err = s.embed(
            ids[2],
            ids[0],
            NodeKind::Geo(EntityId::new(0)),
            MorphInfo::default(),
        );
        assert!(matches!(err, Err(Error::InvalidSpan(_))));
        assert_eq!(s.len(), 3);
    }

    #[test]
    fn test_set_geo_only_on_geo_nodes() {
        let mut s = stream("a b");
        let ids: Vec<_> = s.iter().collect();
        let c = s
            .embed(ids[0], ids[1], NodeKind::Geo(EntityId::new(3)), MorphInfo::default())
            .unwrap();
        s.set_geo(c, EntityId::new(7)).unwrap();
        assert_eq!(s.node(c).geo(), Some(EntityId::new(7)));
        assert!(s.set_geo(ids[0], EntityId::new(1)).is_err());
    }

    #[test]
    fn test_unknown_token() {
        let s = stream("a");
        assert!(matches!(s.get(TokenId(9)), Err(Error::UnknownToken(9))));
    }
}
