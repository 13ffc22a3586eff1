//! Walks a parsed tree and yields findings: structural defects and name
//! resolution misses.
//!
//! The walk is a single forward pass driven by an explicit work stack, so
//! callers can stop pulling at any point (typically via `take(n)`) without
//! the validator having looked ahead further than the finding it just
//! produced.

use crate::catalog::SubtagLookup;
use crate::language::{NodeId, Range, SubtagName, Tree};

/// Names under this prefix are resolved at evaluation time; they are never
/// reported as unknown.
const DYNAMIC_NAME_ESCAPE: &str = "func.";

/// How many fuzzy suggestions to attach to an unknown-name finding.
const MAX_SUGGESTIONS: usize = 3;

/// One validation finding. Severity is deliberately absent; the caller
/// maps kinds onto whatever severity scale it reports in.
#[derive(Clone, Eq, Debug, PartialEq)]
pub struct Finding {
    pub range: Range,
    pub message: String,
    pub kind: FindingKind,
}

#[derive(Clone, Copy, Eq, Debug, PartialEq)]
pub enum FindingKind {
    /// A stray `}` or `;` outside any subtag.
    UnexpectedClose,
    /// A subtag with no matching `}` before end-of-file.
    MissingClose,
    /// A subtag whose name can only be known at evaluation time.
    DynamicName,
    /// A statically-known name absent from the catalog.
    UnknownName,
}

enum Task {
    Segment(NodeId),
    Subtag(NodeId),
    Emit(Finding),
}

/// Lazy iterator of findings over one tree. Pass `None` for the lookup
/// when no catalog is available yet: structural findings are still
/// produced, name resolution is skipped.
pub struct Validator<'t> {
    tree: &'t Tree,
    lookup: Option<&'t SubtagLookup>,
    stack: Vec<Task>,
}

impl<'t> Validator<'t> {
    pub fn new(tree: &'t Tree, lookup: Option<&'t SubtagLookup>) -> Validator<'t> {
        Validator {
            tree,
            lookup,
            stack: vec![Task::Segment(tree.root())],
        }
    }

    fn expand_segment(&mut self, id: NodeId) {
        let Some(segment) = self.tree.node(id).as_segment() else {
            return;
        };

        // stray closes and child subtags interleave, so merge them back
        // into document order before queueing
        let mut pending = Vec::new();
        for &index in segment.unexpected_closes() {
            let cursor = self.tree.map().cursor(index);
            let close = cursor.next_char().unwrap_or('}');
            pending.push((
                index,
                Task::Emit(Finding {
                    range: Range::at(cursor.position()),
                    message: format!("Unexpected '{}'", close),
                    kind: FindingKind::UnexpectedClose,
                }),
            ));
        }
        for &subtag in segment.subtags() {
            pending.push((self.tree.node(subtag).start, Task::Subtag(subtag)));
        }
        pending.sort_by_key(|(index, _)| *index);

        self.push_in_order(pending.into_iter().map(|(_, task)| task).collect());
    }

    fn expand_subtag(&mut self, id: NodeId) {
        let Some(subtag) = self.tree.node(id).as_subtag() else {
            return;
        };

        let mut pending = Vec::new();

        if subtag.is_missing_close() {
            pending.push(Task::Emit(Finding {
                range: self.tree.range(id),
                message: "Missing closing '}'".to_string(),
                kind: FindingKind::MissingClose,
            }));
        }

        let Some(name_range) = self.tree.name_range(id) else {
            return;
        };
        let mut recurse = true;

        match subtag.name() {
            SubtagName::Dynamic => {
                pending.push(Task::Emit(Finding {
                    range: name_range,
                    message: "Dynamic subtag name; static validation is not possible here"
                        .to_string(),
                    kind: FindingKind::DynamicName,
                }));
            }
            SubtagName::Static(name) => {
                if let Some(lookup) = self.lookup {
                    match lookup.get(name) {
                        Some(definition) => {
                            if definition.suppresses_validation() {
                                recurse = false;
                            }
                        }
                        None => {
                            if !name.starts_with(DYNAMIC_NAME_ESCAPE) {
                                pending.push(Task::Emit(Finding {
                                    range: name_range,
                                    message: unknown_name_message(name, lookup),
                                    kind: FindingKind::UnknownName,
                                }));
                            }
                        }
                    }
                }
                // no catalog yet: structural findings only
            }
        }

        if recurse {
            for &param in subtag.params() {
                pending.push(Task::Segment(param));
            }
        }

        self.push_in_order(pending);
    }

    fn push_in_order(&mut self, pending: Vec<Task>) {
        // the stack pops last-in first, so queue in reverse
        self.stack.extend(pending.into_iter().rev());
    }
}

fn unknown_name_message(name: &str, lookup: &SubtagLookup) -> String {
    let mut suggestions: Vec<String> = Vec::new();
    for (term, _) in lookup.find(name) {
        if !suggestions.contains(&term) {
            suggestions.push(term);
        }
        if suggestions.len() == MAX_SUGGESTIONS {
            break;
        }
    }

    if suggestions.is_empty() {
        format!("Unknown subtag '{}'", name)
    } else {
        let suggestions = suggestions
            .iter()
            .map(|term| format!("'{}'", term))
            .collect::<Vec<_>>()
            .join(", ");
        format!("Unknown subtag '{}'. Did you mean {}?", name, suggestions)
    }
}

impl<'t> Iterator for Validator<'t> {
    type Item = Finding;

    fn next(&mut self) -> Option<Finding> {
        while let Some(task) = self.stack.pop() {
            match task {
                Task::Emit(finding) => return Some(finding),
                Task::Segment(id) => self.expand_segment(id),
                Task::Subtag(id) => self.expand_subtag(id),
            }
        }
        None
    }
}
