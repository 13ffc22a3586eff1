//! The parsed tree: an arena of text-segment and subtag-invocation nodes.
//!
//! Nodes are stored flat and addressed by index. Parent links and the
//! shared cursor map are plain indices/ownership on the Tree itself, so
//! the root owns every descendant and nothing points back up with an
//! owning reference.

use crate::language::selection::{Intersection, Position, Range};
use crate::parsing::cursor::CursorMap;

/// Index of a node within its [`Tree`]. Only meaningful for the tree that
/// produced it; using it against another tree is a programmer error and
/// may panic.
#[derive(Clone, Copy, Eq, Debug, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// A parsed document. Immutable once built; re-parsing replaces the whole
/// tree.
#[derive(Eq, Debug, PartialEq)]
pub struct Tree {
    pub(crate) map: CursorMap,
    pub(crate) nodes: Vec<Node>,
    pub(crate) root: NodeId,
}

#[derive(Eq, Debug, PartialEq)]
pub struct Node {
    pub(crate) parent: Option<NodeId>,
    /// Cursor indices into the map; the node's range is
    /// `[start.position, end.position)`.
    pub(crate) start: usize,
    pub(crate) end: usize,
    pub kind: NodeKind,
}

#[derive(Eq, Debug, PartialEq)]
pub enum NodeKind {
    Segment(Segment),
    Subtag(Subtag),
}

/// Literal text between/around subtag invocations at one nesting level.
#[derive(Eq, Debug, PartialEq, Default)]
pub struct Segment {
    pub(crate) subtags: Vec<NodeId>,
    /// Cursor indices of stray `}`/`;` characters. Only ever populated on
    /// the top-level document segment.
    pub(crate) unexpected_closes: Vec<usize>,
}

/// A `{name;arg;...}` invocation. Parameter 0 is always present and is the
/// name parameter, even when empty.
#[derive(Eq, Debug, PartialEq)]
pub struct Subtag {
    pub(crate) params: Vec<NodeId>,
    pub(crate) missing_close: bool,
    pub(crate) name: SubtagName,
}

/// The resolved name of a subtag invocation.
#[derive(Clone, Eq, Debug, PartialEq)]
pub enum SubtagName {
    /// Trimmed, case-folded content of the name parameter.
    Static(String),
    /// The name parameter contains nested subtags, so the name cannot be
    /// known until the template is evaluated.
    Dynamic,
}

impl Node {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn as_segment(&self) -> Option<&Segment> {
        match &self.kind {
            NodeKind::Segment(segment) => Some(segment),
            NodeKind::Subtag(_) => None,
        }
    }

    pub fn as_subtag(&self) -> Option<&Subtag> {
        match &self.kind {
            NodeKind::Subtag(subtag) => Some(subtag),
            NodeKind::Segment(_) => None,
        }
    }
}

impl Segment {
    /// Child subtag invocations, in document order.
    pub fn subtags(&self) -> &[NodeId] {
        &self.subtags
    }

    pub fn unexpected_closes(&self) -> &[usize] {
        &self.unexpected_closes
    }
}

impl Subtag {
    /// All parameters, the name parameter first.
    pub fn params(&self) -> &[NodeId] {
        &self.params
    }

    /// The name parameter.
    pub fn name_param(&self) -> NodeId {
        self.params[0]
    }

    /// Parameters after the name.
    pub fn args(&self) -> &[NodeId] {
        &self.params[1..]
    }

    /// True when no matching `}` was found before end-of-file.
    pub fn is_missing_close(&self) -> bool {
        self.missing_close
    }

    pub fn name(&self) -> &SubtagName {
        &self.name
    }
}

impl Tree {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn map(&self) -> &CursorMap {
        &self.map
    }

    pub fn range(&self, id: NodeId) -> Range {
        let node = self.node(id);
        Range::new(
            self.map.cursor(node.start).position(),
            self.map.cursor(node.end).position(),
        )
    }

    /// The exact source text spanned by a node.
    pub fn content(&self, id: NodeId) -> &str {
        let node = self.node(id);
        self.map.get(node.start, node.end)
    }

    /// A node's children in document order: subtags for a segment,
    /// parameters for a subtag.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match &self.node(id).kind {
            NodeKind::Segment(segment) => &segment.subtags,
            NodeKind::Subtag(subtag) => &subtag.params,
        }
    }

    /// The range of a subtag's name parameter, or `None` for segments.
    pub fn name_range(&self, id: NodeId) -> Option<Range> {
        let subtag = self.node(id).as_subtag()?;
        Some(self.range(subtag.name_param()))
    }

    /// Total number of subtag invocations in the tree.
    pub fn subtag_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node.kind, NodeKind::Subtag(_)))
            .count()
    }

    /// The innermost node whose range contains `position`, or `None` when
    /// the position falls outside the root's range. Children never overlap
    /// by construction, so the descent visits one node per level.
    pub fn locate(&self, position: Position) -> Option<NodeId> {
        self.locate_from(self.root, position)
    }

    fn locate_from(&self, id: NodeId, position: Position) -> Option<NodeId> {
        if !self.range(id).contains(position) {
            return None;
        }
        for &child in self.children(id) {
            if let Some(found) = self.locate_from(child, position) {
                return Some(found);
            }
        }
        Some(id)
    }

    /// The parts of a node's span not shadowed by a directly nested (one
    /// level down) subtag invocation. Zero-width pieces are dropped.
    pub fn dominant_ranges(&self, id: NodeId) -> Vec<Range> {
        let mut result = vec![self.range(id)];

        for child in self.nested_subtags(id) {
            let shadow = self.range(child);
            for i in 0..result.len() {
                if result[i].intersection(shadow) == Intersection::Contains {
                    let after = Range::new(shadow.end, result[i].end);
                    result[i].end = shadow.start;
                    result.insert(i + 1, after);
                    break;
                }
            }
        }

        result.retain(|range| !range.is_empty());
        result
    }

    /// Subtag invocations exactly one nesting level inside a node: the
    /// direct subtags of a segment, or the subtags of each parameter of a
    /// subtag.
    fn nested_subtags(&self, id: NodeId) -> Vec<NodeId> {
        match &self.node(id).kind {
            NodeKind::Segment(segment) => segment.subtags.clone(),
            NodeKind::Subtag(subtag) => subtag
                .params
                .iter()
                .filter_map(|&param| self.node(param).as_segment())
                .flat_map(|segment| segment.subtags.iter().copied())
                .collect(),
        }
    }
}
