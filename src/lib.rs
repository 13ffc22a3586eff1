//! Parsing and analysis for the BBTag templating language.
//!
//! BBTag is free text with subtag invocations of the form
//! `{name;argument;argument;...}` nested arbitrarily inside any argument.
//! Editors hold documents in syntactically broken intermediate states most
//! of the time, so the parser here never fails: every input yields a
//! best-effort tree with structural defects recorded as flags, surfaced
//! later as findings by the validator.

pub mod analysis;
pub mod catalog;
pub mod language;
pub mod parsing;
pub mod problem;
