//! Markdown decoder backed by `pulldown-cmark`.

use super::{Decoder, MarkupError};
use pulldown_cmark::{Options, Parser, html};

#[derive(Debug, Clone, Copy)]
pub struct MarkdownDecoder {
    options: Options,
}

impl MarkdownDecoder {
    /// CommonMark plus tables, footnotes, and strikethrough.
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        Self { options }
    }
}

impl Default for MarkdownDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for MarkdownDecoder {
    fn decode(&self, text: &str) -> Result<String, MarkupError> {
        let parser = Parser::new_ext(text, self.options);
        let mut out = String::new();
        html::push_html(&mut out, parser);
        Ok(out)
    }
}
