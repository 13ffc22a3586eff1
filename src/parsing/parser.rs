//! Recursive-descent parser for BBTag.
//!
//! Editors feed this parser syntactically broken intermediate states on
//! every keystroke, so it never fails: missing closing braces and stray
//! delimiters are recorded on the tree and surfaced later as findings.

use tracing::trace;

use crate::language::{Node, NodeId, NodeKind, Segment, Subtag, SubtagName, Tree};
use crate::parsing::cursor::{CursorMap, Navigator};

/// Parse a document snapshot into a tree. Always succeeds; structural
/// defects are flagged on the nodes rather than reported as errors.
pub fn parse(content: &str) -> Tree {
    let map = CursorMap::new(content);
    let mut builder = Builder {
        map: &map,
        nodes: Vec::new(),
    };

    let mut navigator = map.navigator();
    let root = builder.parse_segment(None, &mut navigator);

    let nodes = builder.nodes;
    Tree { map, nodes, root }
}

struct Builder<'m> {
    map: &'m CursorMap,
    nodes: Vec<Node>,
}

impl<'m> Builder<'m> {
    fn reserve(&mut self, parent: Option<NodeId>, start: usize, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            parent,
            start,
            end: start,
            kind,
        });
        id
    }

    /// Scan a text segment until a delimiter that belongs to the enclosing
    /// subtag, or end-of-file. `parent` is the enclosing subtag when this
    /// segment is one of its parameters; the top-level document segment
    /// has no parent and records stray `}`/`;` instead of stopping.
    fn parse_segment(&mut self, parent: Option<NodeId>, navigator: &mut Navigator<'m>) -> NodeId {
        let start = navigator.current_index();
        let id = self.reserve(parent, start, NodeKind::Segment(Segment::default()));
        trace!(start, "segment");

        let mut subtags = Vec::new();
        let mut unexpected_closes = Vec::new();

        let end = loop {
            let current = navigator.current();
            match current.next_char() {
                Some('{') => {
                    subtags.push(self.parse_subtag(id, navigator));
                    // the navigator already sits just past the subtag;
                    // resume scanning there without advancing again
                    continue;
                }
                Some(';' | '}') => {
                    if parent.is_some() {
                        break navigator.current_index();
                    }
                    // tolerated at the top level: note it and keep going
                    unexpected_closes.push(navigator.current_index());
                }
                Some(_) => {}
                None => break navigator.current_index(),
            }

            if !navigator.move_next() {
                break navigator.current_index();
            }
        };

        let (start, end) = self.trim(start, end, &subtags);

        let node = &mut self.nodes[id.index()];
        node.start = start;
        node.end = end;
        node.kind = NodeKind::Segment(Segment {
            subtags,
            unexpected_closes,
        });
        id
    }

    /// Parse one `{...}` invocation. The navigator must sit on the opening
    /// brace; on return it sits just past the consumed text (one past the
    /// closing brace, or at end-of-file).
    fn parse_subtag(&mut self, parent: NodeId, navigator: &mut Navigator<'m>) -> NodeId {
        debug_assert_eq!(navigator.current().next_char(), Some('{'));

        let start = navigator.current_index();
        let id = self.reserve(Some(parent), start, NodeKind::Subtag(placeholder()));
        trace!(start, "subtag");

        let mut params = Vec::new();
        let mut missing_close = true;

        if navigator.move_next() {
            loop {
                // skip whitespace-only runs between delimiters without
                // emitting an empty parameter
                if navigator.current().next_char().is_none_or(char::is_whitespace) {
                    if !navigator.move_next() {
                        break;
                    }
                    continue;
                }

                params.push(self.parse_segment(Some(id), navigator));

                if navigator.current().next_char() == Some('}') && navigator.move_next() {
                    missing_close = false;
                    break;
                }

                // a ';' is stepped over here; end-of-file ends the subtag
                if !navigator.move_next() {
                    break;
                }
            }
        }

        // degenerate invocation with no parameters at all still gets an
        // empty name parameter
        if params.is_empty() {
            let at = navigator.current_index();
            params.push(self.reserve(Some(id), at, NodeKind::Segment(Segment::default())));
        }

        let end = navigator.current_index();
        let name = self.resolve_name(params[0]);

        let node = &mut self.nodes[id.index()];
        node.end = end;
        node.kind = NodeKind::Subtag(Subtag {
            params,
            missing_close,
            name,
        });
        id
    }

    /// A subtag's name is only knowable statically when its name parameter
    /// contains no nested subtags.
    fn resolve_name(&self, name_param: NodeId) -> SubtagName {
        let node = &self.nodes[name_param.index()];
        match &node.kind {
            NodeKind::Segment(segment) if segment.subtags.is_empty() => {
                let text = self.map.get(node.start, node.end);
                SubtagName::Static(text.trim().to_lowercase())
            }
            _ => SubtagName::Dynamic,
        }
    }

    /// Pull a segment's boundaries in over leading/trailing whitespace.
    /// Never crosses the first child's start or the last child's end, and
    /// never inverts the span.
    fn trim(&self, start: usize, end: usize, subtags: &[NodeId]) -> (usize, usize) {
        let mut start = start;
        let mut end = end;

        let start_limit = subtags
            .first()
            .map(|&child| self.nodes[child.index()].start)
            .unwrap_or(end);
        while start < start_limit
            && self
                .map
                .cursor(start)
                .next_char()
                .is_some_and(char::is_whitespace)
        {
            start += 1;
        }

        let end_limit = subtags
            .last()
            .map(|&child| self.nodes[child.index()].end)
            .unwrap_or(start)
            .max(start);
        while end > end_limit
            && self
                .map
                .cursor(end)
                .prev_char()
                .is_some_and(char::is_whitespace)
        {
            end -= 1;
        }

        (start, end)
    }
}

fn placeholder() -> Subtag {
    Subtag {
        params: Vec::new(),
        missing_close: true,
        name: SubtagName::Dynamic,
    }
}

#[cfg(test)]
mod check {
    use super::*;
    use crate::language::Position;

    fn root_segment(tree: &Tree) -> &Segment {
        tree.node(tree.root()).as_segment().unwrap()
    }

    fn first_subtag(tree: &Tree) -> (NodeId, &Subtag) {
        let id = root_segment(tree).subtags()[0];
        (id, tree.node(id).as_subtag().unwrap())
    }

    #[test]
    fn plain_text_is_one_trimmed_segment() {
        let tree = parse("  some plain text \n");
        let root = root_segment(&tree);

        assert!(root.subtags().is_empty());
        assert!(root.unexpected_closes().is_empty());
        assert_eq!(tree.content(tree.root()), "some plain text");
    }

    #[test]
    fn well_formed_subtag() {
        let tree = parse("{a;b;c}");
        let (id, subtag) = first_subtag(&tree);

        assert_eq!(subtag.params().len(), 3);
        assert!(!subtag.is_missing_close());
        assert_eq!(subtag.name(), &SubtagName::Static("a".to_string()));
        assert_eq!(tree.content(id), "{a;b;c}");
        assert_eq!(tree.content(subtag.params()[1]), "b");
        assert_eq!(tree.content(subtag.params()[2]), "c");
    }

    #[test]
    fn name_is_case_folded() {
        let tree = parse("{ IF ;x}");
        let (_, subtag) = first_subtag(&tree);
        assert_eq!(subtag.name(), &SubtagName::Static("if".to_string()));
    }

    #[test]
    fn missing_close_is_flagged_not_fatal() {
        let tree = parse("{a;b");
        let (_, subtag) = first_subtag(&tree);

        assert!(subtag.is_missing_close());
        assert_eq!(subtag.params().len(), 2);
        assert_eq!(subtag.name(), &SubtagName::Static("a".to_string()));
    }

    #[test]
    fn stray_close_is_recorded_and_scanning_continues() {
        let tree = parse("before } after");
        let root = root_segment(&tree);

        assert_eq!(root.unexpected_closes().len(), 1);
        let position = tree.map().cursor(root.unexpected_closes()[0]).position();
        assert_eq!(position, Position::new(0, 7));
        assert_eq!(tree.content(tree.root()), "before } after");
    }

    #[test]
    fn stray_semicolon_at_top_level() {
        let tree = parse("a;b");
        assert_eq!(root_segment(&tree).unexpected_closes().len(), 1);
    }

    #[test]
    fn empty_invocation_synthesizes_name_parameter() {
        let tree = parse("{}");
        let (_, subtag) = first_subtag(&tree);

        assert_eq!(subtag.params().len(), 1);
        assert!(!subtag.is_missing_close());
        assert_eq!(subtag.name(), &SubtagName::Static(String::new()));
    }

    #[test]
    fn open_brace_at_eof() {
        let tree = parse("{");
        let (_, subtag) = first_subtag(&tree);

        assert!(subtag.is_missing_close());
        assert_eq!(subtag.params().len(), 1);
    }

    #[test]
    fn nested_subtags() {
        let tree = parse("{outer;{inner;x};tail}");
        let (_, outer) = first_subtag(&tree);

        assert_eq!(outer.params().len(), 3);
        let second = tree.node(outer.params()[1]).as_segment().unwrap();
        assert_eq!(second.subtags().len(), 1);

        let inner = tree.node(second.subtags()[0]).as_subtag().unwrap();
        assert_eq!(inner.name(), &SubtagName::Static("inner".to_string()));
        assert_eq!(tree.content(second.subtags()[0]), "{inner;x}");
    }

    #[test]
    fn dynamic_name_when_parameter_zero_nests() {
        let tree = parse("{{x};y}");
        let (_, subtag) = first_subtag(&tree);
        assert_eq!(subtag.name(), &SubtagName::Dynamic);
    }

    #[test]
    fn whitespace_only_runs_do_not_become_parameters() {
        let tree = parse("{a;  \n  ;b}");
        let (_, subtag) = first_subtag(&tree);

        // the whitespace run before the second ';' still parses as an
        // (empty, trimmed) parameter; the run before 'b' does not add one
        assert_eq!(subtag.params().len(), 3);
        assert_eq!(tree.content(subtag.params()[1]), "");
        assert_eq!(tree.content(subtag.params()[2]), "b");
    }

    #[test]
    fn parameter_spans_are_trimmed() {
        let tree = parse("{name; padded arg }");
        let (_, subtag) = first_subtag(&tree);
        assert_eq!(tree.content(subtag.params()[1]), "padded arg");
    }

    #[test]
    fn trimming_does_not_cross_nested_subtags() {
        let tree = parse("{a;  {b}  }");
        let (_, subtag) = first_subtag(&tree);

        let param = subtag.params()[1];
        assert_eq!(tree.content(param), "{b}");
    }

    #[test]
    fn text_around_subtags_survives() {
        let tree = parse("hello {name} world");
        let root = root_segment(&tree);

        assert_eq!(root.subtags().len(), 1);
        assert_eq!(tree.content(tree.root()), "hello {name} world");
        assert_eq!(tree.content(root.subtags()[0]), "{name}");
    }

    #[test]
    fn multiline_content_slices_exactly() {
        let source = "first line\n{if;\n  {get;x};\n  yes\n}\ntrailing";
        let tree = parse(source);
        let (id, subtag) = first_subtag(&tree);

        assert_eq!(tree.content(id), "{if;\n  {get;x};\n  yes\n}");
        assert_eq!(subtag.params().len(), 3);
        assert_eq!(tree.content(subtag.params()[2]), "yes");
    }

    #[test]
    fn locate_returns_innermost_node() {
        //            0123456789012345
        let source = "{outer;{inner;x}}";
        let tree = parse(source);
        let (outer_id, outer) = first_subtag(&tree);
        let inner_id = tree
            .node(outer.params()[1])
            .as_segment()
            .unwrap()
            .subtags()[0];

        // inside "inner"
        let found = tree.locate(Position::new(0, 9)).unwrap();
        assert_eq!(tree.node(found).parent(), Some(inner_id));

        // on the outer name
        let found = tree.locate(Position::new(0, 2)).unwrap();
        assert_eq!(tree.node(found).parent(), Some(outer_id));

        // outside everything
        assert_eq!(tree.locate(Position::new(5, 0)), None);
    }

    #[test]
    fn dominant_ranges_cut_out_nested_subtags() {
        //            01234567890123456
        let source = "{a;pre{b}post}";
        let tree = parse(source);
        let (id, _) = first_subtag(&tree);

        let ranges = tree.dominant_ranges(id);
        assert_eq!(ranges.len(), 2);
        assert_eq!(ranges[0].start, Position::new(0, 0));
        assert_eq!(ranges[0].end, Position::new(0, 6));
        assert_eq!(ranges[1].start, Position::new(0, 9));
        assert_eq!(ranges[1].end, Position::new(0, 14));
    }

    #[test]
    fn dominant_ranges_drop_zero_width_pieces() {
        let source = "{a;{b}}";
        let tree = parse(source);
        let (id, _) = first_subtag(&tree);

        for range in tree.dominant_ranges(id) {
            assert!(!range.is_empty());
        }
    }

    #[test]
    fn reparsing_is_deterministic() {
        let source = "text {a;{b;c};d} more }";
        assert_eq!(parse(source), parse(source));
    }

    #[test]
    fn subtag_count_is_total() {
        let tree = parse("{a;{b;{c}};{d}}");
        assert_eq!(tree.subtag_count(), 4);
    }
}
