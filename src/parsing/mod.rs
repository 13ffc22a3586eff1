//! parser for the BBTag templating language

use std::path::Path;
use tracing::debug;

use crate::language::{LoadingError, Tree};

pub mod cursor;
pub mod parser;

/// Read a file and return an owned String. We pass that ownership back to
/// the caller so the Tree built by parse() below can outlive this module's
/// borrow of the filename.
pub fn load(filename: &Path) -> Result<String, LoadingError<'_>> {
    match std::fs::read_to_string(filename) {
        Ok(content) => Ok(content),
        Err(error) => {
            debug!(?error);
            match error.kind() {
                std::io::ErrorKind::NotFound => Err(LoadingError {
                    problem: "File not found".to_string(),
                    details: String::new(),
                    filename,
                }),
                _ => Err(LoadingError {
                    problem: "Failed reading".to_string(),
                    details: error
                        .kind()
                        .to_string(),
                    filename,
                }),
            }
        }
    }
}

/// Parse text into a Tree. This cannot fail: a template mid-edit is the
/// common case, and structural defects come back as flags on the tree.
pub fn parse(content: &str) -> Tree {
    debug!("parse start");
    let tree = parser::parse(content);
    debug!("parse done, {} subtags found", tree.subtag_count());
    tree
}
