// Types representing BBTag documents: positions, ranges, and the parsed tree

mod error;
mod selection;
mod tree;

// Re-export all public symbols
pub use error::*;
pub use selection::*;
pub use tree::*;
