use std::path::Path;

use owo_colors::OwoColorize;

use crate::analysis::Finding;
use crate::language::LoadingError;

/// Format a finding with full details including source code context
pub fn full_finding(finding: &Finding, filename: &Path, source: &str) -> String {
    let line = finding.range.start.line as usize + 1;
    let column = finding.range.start.character as usize + 1;

    let code = source
        .lines()
        .nth(finding.range.start.line as usize)
        .unwrap_or("?");
    let width = 3.max(
        line.to_string()
            .len(),
    );

    let span = if finding.range.start.line == finding.range.end.line {
        (finding.range.end.character - finding.range.start.character).max(1) as usize
    } else {
        1
    };
    let carets = "^".repeat(span);

    format!(
        r#"
{}: {}:{}:{} {}

{:width$} {}
{:width$} {} {}
{:width$} {} {}{}
        "#,
        "error".bright_red(),
        filename.to_string_lossy(),
        line,
        column,
        finding
            .message
            .bold(),
        ' ',
        '|'.bright_blue(),
        line.bright_blue(),
        '|'.bright_blue(),
        code,
        ' ',
        '|'.bright_blue(),
        caret_pad(code, column),
        carets.bright_red(),
    )
    .trim_ascii()
    .to_string()
}

/// Whitespace prefix lining the caret up under the finding's column. Tabs
/// are kept so they expand the same way the source line above does; every
/// other character counts as one terminal cell, so double-width glyphs
/// still shift the caret on lines containing them.
fn caret_pad(code: &str, column: usize) -> String {
    let mut pad = String::new();
    let mut remaining = column.saturating_sub(1);

    for c in code.chars() {
        if remaining == 0 {
            break;
        }
        pad.push(if c == '\t' { '\t' } else { ' ' });
        remaining -= 1;
    }
    for _ in 0..remaining {
        pad.push(' ');
    }
    pad
}

/// Format a finding with concise single-line output
pub fn concise_finding(finding: &Finding, filename: &Path) -> String {
    format!(
        "{}: {}:{}:{} {}",
        "error".bright_red(),
        filename.to_string_lossy(),
        finding.range.start.line + 1,
        finding.range.start.character + 1,
        finding
            .message
            .bold(),
    )
}

/// Format a LoadingError with concise single-line output
pub fn concise_loading_error(error: &LoadingError<'_>) -> String {
    format!(
        "{}: {}:{}",
        "error".bright_red(),
        error
            .filename
            .display(),
        error
            .problem
            .bold()
    )
}

#[cfg(test)]
mod check {
    use super::*;

    #[test]
    fn caret_pad_preserves_tabs() {
        assert_eq!(caret_pad("\tif {x}", 5), "\t   ");
        assert_eq!(caret_pad("abc", 1), "");
        // findings past the end of the line still get a full-width pad
        assert_eq!(caret_pad("ab", 6), "     ");
    }

    #[test]
    fn caret_pad_counts_multibyte_text_by_char() {
        assert_eq!(caret_pad("héllo", 4), "   ");
    }
}
