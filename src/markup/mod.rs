//! Markup decoders and the registry that selects them.
//!
//! | Kind | Identifiers | Decoder |
//! |---|---|---|
//! | **text** | `text`, `txt`, `plain` | built in, HTML-escaped paragraphs |
//! | **rest** | `rest`, `rst` | built in, reStructuredText subset |
//! | **markdown** | `markdown`, `md` | `pulldown-cmark` (feature `markdown`) |
//! | **textile** | `textile`, `tt` | none linked |
//! | **creole** | `creole` | none linked |
//!
//! Resolution is two-staged so a caller can tell a typo from a missing
//! plugin:
//!
//! 1. [`MarkupKind::from_identifier`] fails with [`MarkupError::Unsupported`]
//!    when the identifier names no known kind.
//! 2. [`MarkupRegistry::ensure_available`] fails with
//!    [`MarkupError::MissingDependency`] when the kind is known but no
//!    decoder for it was registered.
//!
//! The registry never falls back to another decoder.

#[cfg(feature = "markdown")]
pub mod markdown;
pub mod rest;
pub mod text;

use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

#[cfg(feature = "markdown")]
pub use markdown::MarkdownDecoder;
pub use rest::RestDecoder;
pub use text::TextDecoder;

#[derive(Error, Debug)]
pub enum MarkupError {
    #[error("unsupported markup language `{0}`")]
    Unsupported(String),
    #[error("markup language `{kind}` is recognised but not installed (needs {package})")]
    MissingDependency { kind: MarkupKind, package: &'static str },
    #[error("could not decode {kind} text: {message}")]
    Decode { kind: MarkupKind, message: String },
}

/// The decoder selection key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MarkupKind {
    Text,
    Rest,
    Markdown,
    Textile,
    Creole,
}

impl MarkupKind {
    pub const ALL: [MarkupKind; 5] = [
        MarkupKind::Text,
        MarkupKind::Rest,
        MarkupKind::Markdown,
        MarkupKind::Textile,
        MarkupKind::Creole,
    ];

    /// Canonical identifier, the one written to `config.ini`.
    pub fn name(self) -> &'static str {
        match self {
            MarkupKind::Text => "text",
            MarkupKind::Rest => "rest",
            MarkupKind::Markdown => "markdown",
            MarkupKind::Textile => "textile",
            MarkupKind::Creole => "creole",
        }
    }

    /// Every identifier (canonical name first) that selects this kind.
    /// These double as the recognised file extensions.
    pub fn identifiers(self) -> &'static [&'static str] {
        match self {
            MarkupKind::Text => &["text", "txt", "plain"],
            MarkupKind::Rest => &["rest", "rst"],
            MarkupKind::Markdown => &["markdown", "md"],
            MarkupKind::Textile => &["textile", "tt"],
            MarkupKind::Creole => &["creole"],
        }
    }

    /// What has to be linked in for this kind to decode.
    pub fn package(self) -> &'static str {
        match self {
            MarkupKind::Text | MarkupKind::Rest => "nothing (built in)",
            MarkupKind::Markdown => "the `markdown` feature (pulldown-cmark)",
            MarkupKind::Textile => "a textile decoder",
            MarkupKind::Creole => "a creole decoder",
        }
    }

    /// Look up a kind by identifier or file extension, case-insensitively.
    pub fn from_identifier(identifier: &str) -> Result<Self, MarkupError> {
        let wanted = identifier.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.identifiers().contains(&wanted.as_str()))
            .ok_or_else(|| MarkupError::Unsupported(identifier.to_string()))
    }
}

impl fmt::Display for MarkupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A markup-to-HTML capability.
pub trait Decoder {
    /// Decode markup text into an HTML fragment.
    fn decode(&self, text: &str) -> Result<String, MarkupError>;
}

/// Maps markup kinds to the decoders linked into this build.
pub struct MarkupRegistry {
    decoders: HashMap<MarkupKind, Box<dyn Decoder>>,
}

impl MarkupRegistry {
    /// A registry with no decoders at all.
    pub fn empty() -> Self {
        Self {
            decoders: HashMap::new(),
        }
    }

    /// Built-in decoders plus every optional decoder compiled in.
    pub fn with_builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(MarkupKind::Text, Box::new(TextDecoder));
        registry.register(MarkupKind::Rest, Box::new(RestDecoder));
        #[cfg(feature = "markdown")]
        registry.register(MarkupKind::Markdown, Box::new(MarkdownDecoder::new()));
        registry
    }

    /// Link a decoder in, replacing any previous one for the kind.
    pub fn register(&mut self, kind: MarkupKind, decoder: Box<dyn Decoder>) {
        self.decoders.insert(kind, decoder);
    }

    /// Stage one: is the identifier a known markup kind?
    pub fn kind(&self, identifier: &str) -> Result<MarkupKind, MarkupError> {
        MarkupKind::from_identifier(identifier)
    }

    /// Stage two: is the known kind actually decodable here?
    pub fn ensure_available(&self, identifier: &str) -> Result<MarkupKind, MarkupError> {
        let kind = self.kind(identifier)?;
        if self.decoders.contains_key(&kind) {
            Ok(kind)
        } else {
            Err(MarkupError::MissingDependency {
                kind,
                package: kind.package(),
            })
        }
    }

    /// Both stages, returning the decoder.
    pub fn resolve(&self, identifier: &str) -> Result<&dyn Decoder, MarkupError> {
        let kind = self.ensure_available(identifier)?;
        self.decoder(kind)
    }

    /// Decoder for an already-resolved kind.
    pub fn decoder(&self, kind: MarkupKind) -> Result<&dyn Decoder, MarkupError> {
        self.decoders
            .get(&kind)
            .map(|decoder| decoder.as_ref())
            .ok_or(MarkupError::MissingDependency {
                kind,
                package: kind.package(),
            })
    }

    /// Kinds with a registered decoder, in [`MarkupKind::ALL`] order.
    pub fn available(&self) -> Vec<MarkupKind> {
        MarkupKind::ALL
            .into_iter()
            .filter(|kind| self.decoders.contains_key(kind))
            .collect()
    }
}

impl Default for MarkupRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

impl fmt::Debug for MarkupRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkupRegistry")
            .field("available", &self.available())
            .finish()
    }
}

/// HTML-escape text for inclusion in element content or attribute values.
pub(crate) fn escape_html(text: &str) -> String {
    maud::html! { (text) }.into_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_resolve_to_the_same_kind() {
        assert_eq!(MarkupKind::from_identifier("rest").unwrap(), MarkupKind::Rest);
        assert_eq!(MarkupKind::from_identifier("rst").unwrap(), MarkupKind::Rest);
        assert_eq!(MarkupKind::from_identifier("md").unwrap(), MarkupKind::Markdown);
        assert_eq!(MarkupKind::from_identifier("markdown").unwrap(), MarkupKind::Markdown);
        assert_eq!(MarkupKind::from_identifier("tt").unwrap(), MarkupKind::Textile);
        assert_eq!(MarkupKind::from_identifier("textile").unwrap(), MarkupKind::Textile);
        assert_eq!(MarkupKind::from_identifier("creole").unwrap(), MarkupKind::Creole);
        assert_eq!(MarkupKind::from_identifier("TXT").unwrap(), MarkupKind::Text);
    }

    #[test]
    fn unknown_identifier_is_unsupported() {
        let registry = MarkupRegistry::with_builtin();
        let err = registry.resolve("bogus").err().unwrap();
        assert!(matches!(err, MarkupError::Unsupported(ref id) if id == "bogus"));
    }

    #[test]
    fn recognised_but_unlinked_is_missing_dependency() {
        let registry = MarkupRegistry::with_builtin();
        assert!(registry.kind("textile").is_ok());
        let err = registry.ensure_available("textile").unwrap_err();
        assert!(matches!(
            err,
            MarkupError::MissingDependency {
                kind: MarkupKind::Textile,
                ..
            }
        ));
    }

    #[test]
    fn empty_registry_reports_missing_not_unsupported() {
        let registry = MarkupRegistry::empty();
        assert!(matches!(
            registry.resolve("rest").err().unwrap(),
            MarkupError::MissingDependency { .. }
        ));
        assert!(matches!(
            registry.resolve("nope").err().unwrap(),
            MarkupError::Unsupported(_)
        ));
    }

    #[test]
    fn builtin_decoders_are_always_available() {
        let registry = MarkupRegistry::with_builtin();
        let available = registry.available();
        assert!(available.contains(&MarkupKind::Text));
        assert!(available.contains(&MarkupKind::Rest));
        assert!(!available.contains(&MarkupKind::Creole));
    }

    #[cfg(feature = "markdown")]
    #[test]
    fn markdown_available_with_feature() {
        let registry = MarkupRegistry::with_builtin();
        let html = registry.resolve("md").unwrap().decode("*x*").unwrap();
        assert_eq!(html, "<p><em>x</em></p>\n");
    }

    #[test]
    fn register_replaces_decoder() {
        struct Shout;
        impl Decoder for Shout {
            fn decode(&self, text: &str) -> Result<String, MarkupError> {
                Ok(text.to_uppercase())
            }
        }
        let mut registry = MarkupRegistry::with_builtin();
        registry.register(MarkupKind::Creole, Box::new(Shout));
        assert_eq!(registry.resolve("creole").unwrap().decode("hi").unwrap(), "HI");
    }

    #[test]
    fn escape_html_escapes_markup_characters() {
        assert_eq!(escape_html("a < b & \"c\""), "a &lt; b &amp; &quot;c&quot;");
    }
}
