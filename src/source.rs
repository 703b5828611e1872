//! Source entity: one content file, its directives, and its decoded body.
//!
//! ```text
//! title: About us           ┐ optional, either order,
//! template: wide.html       ┘ only within the first two lines
//! Body text in the file's markup language…
//! ```
//!
//! [`Source`] is the pure parse of the text. [`SourceFile`] adds what the
//! project knows from the file system: the file name and the markup kind
//! derived from its extension.

use crate::directive::{self, Directive, SOURCE_DIRECTIVE_LINES};
use crate::engine::{self, EngineError, EngineOptions, TemplateEngine};
use crate::markup::{Decoder, MarkupError, MarkupKind, MarkupRegistry};
use crate::naming;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("failed to read source {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("source {name}: {source}")]
    Markup { name: String, source: MarkupError },
    #[error("source {name}: {source}")]
    Engine { name: String, source: EngineError },
}

/// Parsed source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    text: String,
    title: Option<String>,
    template: Option<String>,
    body: String,
}

impl Source {
    /// Split off `title:` / `template:` directives from the first two lines.
    ///
    /// A second directive of the same kind is not a directive; it stays in
    /// the body untouched.
    pub fn parse(text: impl Into<String>) -> Self {
        let text = text.into();
        let mut title = None;
        let mut template = None;
        let mut body = String::with_capacity(text.len());

        for (idx, line) in text.split_inclusive('\n').enumerate() {
            if idx < SOURCE_DIRECTIVE_LINES {
                match directive::classify(line) {
                    Directive::Title(value) if title.is_none() => {
                        title = Some(value.to_string());
                        continue;
                    }
                    Directive::Template(value) if template.is_none() => {
                        template = Some(value.to_string());
                        continue;
                    }
                    _ => {}
                }
            }
            body.push_str(line);
        }

        Self {
            text,
            title,
            template,
            body,
        }
    }

    /// The full original text, directives included.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Template override from a `template:` directive.
    pub fn template(&self) -> Option<&str> {
        self.template.as_deref()
    }

    /// The template to use: the override, else `default`.
    pub fn template_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.template().unwrap_or(default)
    }

    /// Text left after directive removal.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Decode the body to HTML.
    pub fn decode(&self, decoder: &dyn Decoder) -> Result<String, MarkupError> {
        decoder.decode(&self.body)
    }
}

/// A source as found in a project's `sources/` directory.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub markup: MarkupKind,
    pub source: Source,
}

impl SourceFile {
    /// Read and parse `path`.
    ///
    /// The markup kind comes from the file extension; files without one use
    /// the `fallback` identifier. The kind must be decodable with `markups`.
    pub fn load(
        path: &Path,
        markups: &MarkupRegistry,
        fallback: &str,
    ) -> Result<Self, SourceError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let markup = markup_for(&name, markups, fallback).map_err(|source| SourceError::Markup {
            name: name.clone(),
            source,
        })?;
        let text = fs::read_to_string(path).map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            name,
            markup,
            source: Source::parse(text),
        })
    }

    /// Title for the namespace: the `title:` directive, else the file stem.
    pub fn display_title(&self) -> String {
        match self.source.title() {
            Some(title) => title.to_string(),
            None => naming::parse_file_name(&self.name).stem,
        }
    }

    /// Decode this source and render it through `template_body`.
    pub fn render(
        &self,
        markups: &MarkupRegistry,
        engine: &dyn TemplateEngine,
        template_body: &str,
        options: &EngineOptions,
    ) -> Result<String, SourceError> {
        let content = markups
            .decoder(self.markup)
            .and_then(|decoder| self.source.decode(decoder))
            .map_err(|source| SourceError::Markup {
                name: self.name.clone(),
                source,
            })?;
        let namespace = engine::namespace(&self.display_title(), &content);
        engine
            .render(template_body, &namespace, options)
            .map_err(|source| SourceError::Engine {
                name: self.name.clone(),
                source,
            })
    }
}

impl PartialEq for SourceFile {
    fn eq(&self, other: &Self) -> bool {
        self.markup == other.markup && self.source.text() == other.source.text()
    }
}

/// Markup kind for a file name: its extension, else the `fallback` identifier.
pub fn markup_for(
    name: &str,
    markups: &MarkupRegistry,
    fallback: &str,
) -> Result<MarkupKind, MarkupError> {
    match naming::parse_file_name(name).extension {
        Some(ext) => markups.ensure_available(&ext),
        None => markups.ensure_available(fallback),
    }
}
