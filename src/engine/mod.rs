//! Template engines and the registry that selects them.
//!
//! | Language | Identifiers | Engine | Options section |
//! |---|---|---|---|
//! | **simple** | `simple` | built in, `$name` substitution | none |
//! | **jinja2** | `jinja2`, `jinja` | `minijinja` (feature `jinja`) | `[jinja]` |
//! | **mako** | `mako` | none linked | none |
//! | **genshi** | `genshi` | none linked | `[genshi]` |
//!
//! Resolution mirrors [`crate::markup::MarkupRegistry`]: an unknown
//! identifier is [`EngineError::Unsupported`], a known language without a
//! linked engine is [`EngineError::MissingDependency`].

#[cfg(feature = "jinja")]
pub mod jinja;
pub mod simple;
pub mod stock;

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use thiserror::Error;

#[cfg(feature = "jinja")]
pub use jinja::JinjaEngine;
pub use simple::SimpleEngine;

/// Values visible to a template: at least `title` and `content`.
pub type Namespace = BTreeMap<String, String>;

/// Engine-specific options, taken verbatim from the language's config section.
pub type EngineOptions = BTreeMap<String, String>;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("unsupported template language `{0}`")]
    Unsupported(String),
    #[error("template language `{language}` is recognised but not installed (needs {package})")]
    MissingDependency {
        language: TemplateLanguage,
        package: &'static str,
    },
    #[error("invalid value `{value}` for {language} option `{key}`")]
    InvalidOption {
        language: TemplateLanguage,
        key: String,
        value: String,
    },
    #[error("{language} template failed to render: {message}")]
    Render {
        language: TemplateLanguage,
        message: String,
    },
}

/// The engine selection key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TemplateLanguage {
    Simple,
    Mako,
    Jinja2,
    Genshi,
}

impl TemplateLanguage {
    pub const ALL: [TemplateLanguage; 4] = [
        TemplateLanguage::Simple,
        TemplateLanguage::Mako,
        TemplateLanguage::Jinja2,
        TemplateLanguage::Genshi,
    ];

    /// Canonical identifier, the one written to `config.ini`.
    pub fn name(self) -> &'static str {
        match self {
            TemplateLanguage::Simple => "simple",
            TemplateLanguage::Mako => "mako",
            TemplateLanguage::Jinja2 => "jinja2",
            TemplateLanguage::Genshi => "genshi",
        }
    }

    pub fn identifiers(self) -> &'static [&'static str] {
        match self {
            TemplateLanguage::Simple => &["simple"],
            TemplateLanguage::Mako => &["mako"],
            TemplateLanguage::Jinja2 => &["jinja2", "jinja"],
            TemplateLanguage::Genshi => &["genshi"],
        }
    }

    /// Config section whose key/value pairs are passed as engine options.
    pub fn options_section(self) -> Option<&'static str> {
        match self {
            TemplateLanguage::Jinja2 => Some("jinja"),
            TemplateLanguage::Genshi => Some("genshi"),
            TemplateLanguage::Simple | TemplateLanguage::Mako => None,
        }
    }

    pub fn package(self) -> &'static str {
        match self {
            TemplateLanguage::Simple => "nothing (built in)",
            TemplateLanguage::Jinja2 => "the `jinja` feature (minijinja)",
            TemplateLanguage::Mako => "a mako engine",
            TemplateLanguage::Genshi => "a genshi engine",
        }
    }

    /// Look up a language by identifier, case-insensitively.
    pub fn from_identifier(identifier: &str) -> Result<Self, EngineError> {
        let wanted = identifier.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|lang| lang.identifiers().contains(&wanted.as_str()))
            .ok_or_else(|| EngineError::Unsupported(identifier.to_string()))
    }
}

impl fmt::Display for TemplateLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A template-rendering capability.
pub trait TemplateEngine {
    /// Render a template body against a namespace.
    fn render(
        &self,
        body: &str,
        namespace: &Namespace,
        options: &EngineOptions,
    ) -> Result<String, EngineError>;
}

/// Maps template languages to the engines linked into this build.
pub struct EngineRegistry {
    engines: HashMap<TemplateLanguage, Box<dyn TemplateEngine>>,
}

impl EngineRegistry {
    pub fn empty() -> Self {
        Self {
            engines: HashMap::new(),
        }
    }

    /// The simple engine plus every optional engine compiled in.
    pub fn with_builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(TemplateLanguage::Simple, Box::new(SimpleEngine));
        #[cfg(feature = "jinja")]
        registry.register(TemplateLanguage::Jinja2, Box::new(JinjaEngine));
        registry
    }

    pub fn register(&mut self, language: TemplateLanguage, engine: Box<dyn TemplateEngine>) {
        self.engines.insert(language, engine);
    }

    pub fn language(&self, identifier: &str) -> Result<TemplateLanguage, EngineError> {
        TemplateLanguage::from_identifier(identifier)
    }

    pub fn ensure_available(&self, identifier: &str) -> Result<TemplateLanguage, EngineError> {
        let language = self.language(identifier)?;
        if self.engines.contains_key(&language) {
            Ok(language)
        } else {
            Err(EngineError::MissingDependency {
                language,
                package: language.package(),
            })
        }
    }

    pub fn resolve(&self, identifier: &str) -> Result<&dyn TemplateEngine, EngineError> {
        let language = self.ensure_available(identifier)?;
        self.engine(language)
    }

    pub fn engine(&self, language: TemplateLanguage) -> Result<&dyn TemplateEngine, EngineError> {
        self.engines
            .get(&language)
            .map(|engine| engine.as_ref())
            .ok_or(EngineError::MissingDependency {
                language,
                package: language.package(),
            })
    }

    pub fn available(&self) -> Vec<TemplateLanguage> {
        TemplateLanguage::ALL
            .into_iter()
            .filter(|lang| self.engines.contains_key(lang))
            .collect()
    }
}

impl Default for EngineRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

impl fmt::Debug for EngineRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineRegistry")
            .field("available", &self.available())
            .finish()
    }
}

/// Build the `{title, content}` namespace every engine receives.
pub fn namespace(title: &str, content: &str) -> Namespace {
    let mut ns = Namespace::new();
    ns.insert("title".to_string(), title.to_string());
    ns.insert("content".to_string(), content.to_string());
    ns
}
