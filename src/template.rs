//! Template entity: a layout plus the sources it declares.
//!
//! The first line may be `sources: a.rest, b.md`; every other line is the
//! template body in the project's template language. Declared sources are
//! resolved relative to the project's `sources/` directory at render time.

use crate::directive::{self, Directive};
use crate::engine::{EngineOptions, TemplateEngine};
use crate::markup::MarkupRegistry;
use crate::source::{SourceError, SourceFile};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("source {} does not exist", .0.display())]
    NonexistingSource(PathBuf),
    #[error("failed to read template {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Source(#[from] SourceError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    body: String,
    source_names: Vec<String>,
}

impl Template {
    /// Split an optional `sources:` directive off the first line.
    pub fn parse(text: &str) -> Self {
        let (first, rest) = match text.split_once('\n') {
            Some((first, rest)) => (first, rest),
            None => (text, ""),
        };
        match directive::classify(first) {
            Directive::Sources(names) => Self {
                body: rest.to_string(),
                source_names: names.into_iter().map(str::to_string).collect(),
            },
            _ => Self {
                body: text.to_string(),
                source_names: Vec::new(),
            },
        }
    }

    pub fn load(path: &Path) -> Result<Self, TemplateError> {
        let text = fs::read_to_string(path).map_err(|source| TemplateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&text))
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Declared source names, in declaration order, duplicates kept.
    pub fn source_names(&self) -> &[String] {
        &self.source_names
    }

    /// Load each declared source from `source_dir`.
    ///
    /// Every item is its own `Result`: a missing file yields
    /// [`TemplateError::NonexistingSource`] and the remaining names are
    /// still visited.
    pub fn declared_sources<'a>(
        &'a self,
        source_dir: &'a Path,
        markups: &'a MarkupRegistry,
        fallback: &'a str,
    ) -> impl Iterator<Item = Result<SourceFile, TemplateError>> + 'a {
        self.source_names
            .iter()
            .map(move |name| load_declared(source_dir, name, markups, fallback))
    }

    /// Lazily render every declared source through this template.
    ///
    /// Yields `(source name, rendered text)` in declaration order. The
    /// sequence is single-pass; a template without declared sources yields
    /// nothing.
    pub fn render<'a>(
        &'a self,
        source_dir: &'a Path,
        markups: &'a MarkupRegistry,
        fallback: &'a str,
        engine: &'a dyn TemplateEngine,
        options: &'a EngineOptions,
    ) -> TemplateRender<'a> {
        TemplateRender {
            template: self,
            names: self.source_names.iter(),
            source_dir,
            markups,
            fallback,
            engine,
            options,
        }
    }
}

fn load_declared(
    source_dir: &Path,
    name: &str,
    markups: &MarkupRegistry,
    fallback: &str,
) -> Result<SourceFile, TemplateError> {
    let path = source_dir.join(name);
    if !path.is_file() {
        return Err(TemplateError::NonexistingSource(path));
    }
    Ok(SourceFile::load(&path, markups, fallback)?)
}

/// Iterator returned by [`Template::render`].
pub struct TemplateRender<'a> {
    template: &'a Template,
    names: std::slice::Iter<'a, String>,
    source_dir: &'a Path,
    markups: &'a MarkupRegistry,
    fallback: &'a str,
    engine: &'a dyn TemplateEngine,
    options: &'a EngineOptions,
}

impl Iterator for TemplateRender<'_> {
    type Item = Result<(String, String), TemplateError>;

    fn next(&mut self) -> Option<Self::Item> {
        let name = self.names.next()?;
        debug!("rendering declared source {name}");
        let rendered = load_declared(self.source_dir, name, self.markups, self.fallback)
            .and_then(|file| {
                Ok(file.render(
                    self.markups,
                    self.engine,
                    &self.template.body,
                    self.options,
                )?)
            })
            .map(|text| (name.clone(), text));
        Some(rendered)
    }
}
