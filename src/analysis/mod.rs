//! Document-level analysis: a tree cache keyed by document identity, and
//! the validator that turns trees into findings.

use std::collections::HashMap;

use tracing::debug;

use crate::language::Tree;
use crate::parsing;

mod validator;

pub use validator::*;

struct Entry {
    text: String,
    tree: Option<Tree>,
}

/// Holds the latest text of each open document and parses it at most once
/// per revision. Any text change throws the old tree away wholesale; the
/// next query parses fresh. Trees are never patched in place.
pub struct DocumentCache {
    entries: HashMap<String, Entry>,
}

impl DocumentCache {
    pub fn new() -> DocumentCache {
        DocumentCache {
            entries: HashMap::new(),
        }
    }

    /// Register a document, or replace its text if already present.
    pub fn open(&mut self, uri: impl Into<String>, text: impl Into<String>) {
        self.update(uri, text);
    }

    /// Replace a document's text and invalidate its cached tree.
    pub fn update(&mut self, uri: impl Into<String>, text: impl Into<String>) {
        let uri = uri.into();
        debug!(%uri, "document updated");
        self.entries.insert(
            uri,
            Entry {
                text: text.into(),
                tree: None,
            },
        );
    }

    /// Forget a document entirely.
    pub fn close(&mut self, uri: &str) {
        debug!(%uri, "document closed");
        self.entries.remove(uri);
    }

    pub fn text(&self, uri: &str) -> Option<&str> {
        self.entries
            .get(uri)
            .map(|entry| entry.text.as_str())
    }

    /// The tree for a document, parsing on first access since the last
    /// update. Returns None for unknown documents.
    pub fn tree(&mut self, uri: &str) -> Option<&Tree> {
        let entry = self.entries.get_mut(uri)?;
        if entry.tree.is_none() {
            entry.tree = Some(parsing::parse(&entry.text));
        }
        entry.tree.as_ref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for DocumentCache {
    fn default() -> DocumentCache {
        DocumentCache::new()
    }
}
