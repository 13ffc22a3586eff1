//! Subtag definitions: the catalog of known subtags and their signatures.
//!
//! The catalog is supplied from outside as an already-deserialized list
//! (the fetching, caching, and refresh of it live with the editor-side
//! collaborator); this crate only indexes and consults it.

use serde::Deserialize;

mod lookup;

pub use lookup::*;

/// The category a subtag belongs to.
#[derive(Clone, Copy, Eq, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubtagCategory {
    Simple,
    Misc,
    Array,
    Json,
    Math,
    Loops,
    Bot,
    Message,
    Channel,
    Thread,
    User,
    Role,
    Guild,
    /// Comment-like subtags: their parameters are opaque to validation.
    Comment,
}

/// One known subtag: its name, aliases, and accepted parameter shapes.
#[derive(Clone, Eq, Debug, PartialEq, Deserialize)]
pub struct SubtagDefinition {
    pub name: String,
    pub category: SubtagCategory,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub signatures: Vec<SubtagSignature>,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Clone, Eq, Debug, PartialEq, Deserialize)]
pub struct SubtagSignature {
    #[serde(default)]
    pub parameters: Vec<SubtagParameter>,
    #[serde(default)]
    pub description: String,
}

#[derive(Clone, Eq, Debug, PartialEq, Deserialize)]
pub struct SubtagParameter {
    pub name: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub default_value: Option<String>,
}

impl SubtagDefinition {
    pub fn new(name: impl Into<String>, category: SubtagCategory) -> SubtagDefinition {
        SubtagDefinition {
            name: name.into(),
            category,
            aliases: Vec::new(),
            signatures: Vec::new(),
            deprecated: false,
            description: None,
        }
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> SubtagDefinition
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    /// Comment-like subtags keep their content out of validation.
    pub fn suppresses_validation(&self) -> bool {
        self.category == SubtagCategory::Comment
    }
}
