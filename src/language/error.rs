use std::{fmt, path::Path};

/// Failure to read a template file from disk. Parsing itself never fails;
/// this is the only error the loading boundary can produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadingError<'i> {
    pub problem: String,
    pub details: String,
    pub filename: &'i Path,
}

impl<'i> fmt::Display for LoadingError<'i> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.problem, self.details)
    }
}

impl<'i> std::error::Error for LoadingError<'i> {}
