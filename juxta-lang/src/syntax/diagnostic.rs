//! Renders errors against the source they were raised for.

use std::fmt::{self, Display};

use super::parser::ParseError;
use super::{Ranged, SourceLines, SourceRange};

/// Renders the line containing `range` with a run of `~` beneath the range.
///
/// ```text
///  3 | let total = a +
///                    ~
/// ```
///
/// The marker is clipped to the end of the line and is always at least one
/// character wide.
#[must_use]
pub fn caret_diagram(source: &str, range: SourceRange) -> String {
    let position = SourceLines::new(source).locate(range.start);
    let line_start = position.line_start.min(source.len());
    let line_end = source[line_start..]
        .find('\n')
        .map_or(source.len(), |index| line_start + index);
    let line = source[line_start..line_end].trim_end_matches('\r');

    let start = range.start.clamp(line_start, line_end);
    let end = range.end().clamp(start, line_end);
    let column = count_chars(source, line_start, start);
    let width = count_chars(source, start, end).max(1);

    let gutter = format!(" {} | ", position.line);
    format!(
        "{gutter}{line}\n{:indent$}{}\n",
        "",
        "~".repeat(width),
        indent = gutter.len() + column
    )
}

fn count_chars(source: &str, start: usize, end: usize) -> usize {
    source
        .get(start..end)
        .map_or(end - start, |slice| slice.chars().count())
}

/// A parse error prepared for display to a user.
#[derive(Clone, Copy, Debug)]
pub struct Diagnostic<'a> {
    error: &'a Ranged<ParseError>,
    source: &'a str,
}

impl Ranged<ParseError> {
    /// Returns a displayable diagnostic for this error.
    #[must_use]
    pub fn diagnostic<'a>(&'a self, source: &'a str) -> Diagnostic<'a> {
        Diagnostic {
            error: self,
            source,
        }
    }
}

impl Display for Diagnostic<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(cause) = self.error.cause() {
            return write!(f, "{}: {}", self.error.0, cause.diagnostic(self.source));
        }

        let diagram = caret_diagram(self.source, self.error.range());
        match &self.error.0 {
            ParseError::UnclosedParen {
                cause: Some(cause), ..
            } => write!(
                f,
                "{}\n\n{diagram}\nbecause of a lexical error: {cause}",
                self.error.0
            ),
            error => write!(f, "{error}\n\n{diagram}"),
        }
    }
}

#[test]
fn caret_under_token() {
    assert_eq!(
        caret_diagram("let x = 1 +", SourceRange::from(10..11)),
        " 1 | let x = 1 +\n               ~\n"
    );
}

#[test]
fn caret_on_later_line() {
    let source = "a\r\nbb cc\nd";
    assert_eq!(
        caret_diagram(source, SourceRange::from(6..8)),
        " 2 | bb cc\n        ~~\n"
    );
}

#[test]
fn caret_clipped_to_line() {
    assert_eq!(
        caret_diagram("(a\n b", SourceRange::from(1..5)),
        " 1 | (a\n      ~\n"
    );
    assert_eq!(caret_diagram("x", SourceRange::empty_at(1)), " 1 | x\n      ~\n");
}
