//! Directive-line classification.
//!
//! Sources and templates may open with optional annotation lines:
//!
//! ```text
//! title: The Short Title        ← sources, anywhere in the first two lines
//! template: article.html        ← sources, anywhere in the first two lines
//! sources: about.rest, news.md  ← templates, first line only
//! ```
//!
//! Parsing is permissive. A line that doesn't start with one of the exact
//! lowercase prefixes is a [`Directive::Plain`] line and stays in the body;
//! nothing here ever fails.

/// Number of leading lines of a source that may carry directives.
pub const SOURCE_DIRECTIVE_LINES: usize = 2;

/// Classification of a single line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive<'a> {
    /// `title: <value>`, value trimmed.
    Title(&'a str),
    /// `template: <value>`, value trimmed.
    Template(&'a str),
    /// `sources: a, b, c`, entries trimmed, empty entries dropped,
    /// order and duplicates kept.
    Sources(Vec<&'a str>),
    /// Anything else.
    Plain,
}

/// Classify one line. Trailing `\n` / `\r\n` are ignored.
pub fn classify(line: &str) -> Directive<'_> {
    let line = line.trim_end_matches(['\n', '\r']);
    if let Some(value) = line.strip_prefix("title:") {
        Directive::Title(value.trim())
    } else if let Some(value) = line.strip_prefix("template:") {
        Directive::Template(value.trim())
    } else if let Some(value) = line.strip_prefix("sources:") {
        Directive::Sources(
            value
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .collect(),
        )
    } else {
        Directive::Plain
    }
}
