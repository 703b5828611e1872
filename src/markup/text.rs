//! Plain-text decoder: the baseline every build carries.
//!
//! Blank lines separate paragraphs; everything is HTML-escaped, nothing is
//! interpreted.

use super::{Decoder, MarkupError, escape_html};

#[derive(Debug, Clone, Copy, Default)]
pub struct TextDecoder;

impl Decoder for TextDecoder {
    fn decode(&self, text: &str) -> Result<String, MarkupError> {
        let mut html = String::new();
        for paragraph in paragraphs(text) {
            html.push_str("<p>");
            html.push_str(&escape_html(&paragraph));
            html.push_str("</p>\n");
        }
        Ok(html)
    }
}

/// Group consecutive non-blank lines, dropping surrounding whitespace lines.
pub(crate) fn paragraphs(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                out.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        out.push(current.join("\n"));
    }
    out
}
