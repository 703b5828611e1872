//! Project configuration module.
//!
//! Every project carries a `config.ini` next to its content directories:
//!
//! ```ini
//! [general]
//! template language=simple       # simple | mako | jinja2 | genshi
//! default template=default.html  # relative to templates/
//! markup language=rest           # for source files without an extension
//!
//! [genshi]
//! method=html                    # html | xhtml
//! doctype=html5
//!
//! [jinja]
//! block_start_string={%
//! block_end_string=%}
//! variable_start_string={{
//! variable_end_string=}}
//! comment_start_string={#
//! comment_end_string=#}
//! trim_blocks=false
//! ```
//!
//! Sections other than `[general]` are passed verbatim as engine options to
//! the template language that owns them. A host-wide default file, when
//! present, replaces these built-in values wholesale at `init`.

use crate::engine::EngineOptions;
use ini::Ini;
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const GENERAL: &str = "general";
pub const TEMPLATE_LANGUAGE: &str = "template language";
pub const DEFAULT_TEMPLATE: &str = "default template";
pub const MARKUP_LANGUAGE: &str = "markup language";

const FALLBACK_DEFAULT_TEMPLATE: &str = "default.html";
const FALLBACK_MARKUP_LANGUAGE: &str = "rest";

/// Built-in defaults, section by section.
const STOCK: &[(&str, &[(&str, &str)])] = &[
    (
        GENERAL,
        &[
            (TEMPLATE_LANGUAGE, "simple"),
            (DEFAULT_TEMPLATE, FALLBACK_DEFAULT_TEMPLATE),
            (MARKUP_LANGUAGE, FALLBACK_MARKUP_LANGUAGE),
        ],
    ),
    ("genshi", &[("method", "html"), ("doctype", "html5")]),
    (
        "jinja",
        &[
            ("block_start_string", "{%"),
            ("block_end_string", "%}"),
            ("variable_start_string", "{{"),
            ("variable_end_string", "}}"),
            ("comment_start_string", "{#"),
            ("comment_end_string", "#}"),
            ("trim_blocks", "false"),
        ],
    ),
];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("INI error: {0}")]
    Ini(#[from] ini::Error),
    #[error("INI parse error: {0}")]
    Parse(#[from] ini::ParseError),
    #[error("config has no `{key}` in section [{section}]")]
    Missing { section: String, key: String },
}

/// Sectioned key/value configuration, backed by an INI document.
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    ini: Ini,
}

impl ProjectConfig {
    /// An empty configuration: no sections at all.
    pub fn empty() -> Self {
        Self { ini: Ini::new() }
    }

    /// The built-in defaults.
    pub fn stock() -> Self {
        let mut config = Self::empty();
        for (section, items) in STOCK {
            config.update(section, items.iter().copied());
        }
        config
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Ok(Self {
            ini: Ini::load_from_file(path)?,
        })
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            ini: Ini::load_from_str(text)?,
        })
    }

    /// Write the whole document to `path`, replacing it.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        self.ini.write_to_file(path)?;
        Ok(())
    }

    /// Serialised INI text.
    pub fn to_ini_string(&self) -> Result<String, ConfigError> {
        let mut buf = Vec::new();
        self.ini.write_to(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.ini.get_from(Some(section), key)
    }

    /// All pairs of one section; empty when the section is absent.
    pub fn section(&self, section: &str) -> EngineOptions {
        self.ini
            .section(Some(section))
            .map(|props| {
                props
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        self.ini.with_section(Some(section)).set(key, value);
    }

    /// Merge pairs into a section, creating it if needed.
    pub fn update<I, K, V>(&mut self, section: &str, items: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in items {
            self.set(section, key.as_ref(), value.as_ref());
        }
    }

    /// `general.template language`; required.
    pub fn template_language(&self) -> Result<&str, ConfigError> {
        self.get(GENERAL, TEMPLATE_LANGUAGE)
            .ok_or_else(|| ConfigError::Missing {
                section: GENERAL.to_string(),
                key: TEMPLATE_LANGUAGE.to_string(),
            })
    }

    /// `general.default template`, `default.html` when unset.
    pub fn default_template(&self) -> &str {
        self.get(GENERAL, DEFAULT_TEMPLATE)
            .unwrap_or(FALLBACK_DEFAULT_TEMPLATE)
    }

    /// `general.markup language`, `rest` when unset.
    pub fn markup_language(&self) -> &str {
        self.get(GENERAL, MARKUP_LANGUAGE)
            .unwrap_or(FALLBACK_MARKUP_LANGUAGE)
    }
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self::stock()
    }
}

/// Read a config file's raw bytes, `None` if it does not exist.
pub fn read_raw(path: &Path) -> Result<Option<Vec<u8>>, ConfigError> {
    if !path.is_file() {
        return Ok(None);
    }
    Ok(Some(fs::read(path)?))
}

/// A commented stock `config.ini`, for the `gen-config` command.
pub fn stock_config_ini() -> Result<String, ConfigError> {
    let header = "\
; swsg configuration
; ==================
; Save as config.ini in the swsg user config directory (for example
; ~/.config/swsg/config.ini) to have every new project start from it.
;
; [general]  template language: simple, mako, jinja2 or genshi
;            default template:  file in templates/ used when a source
;                               has no `template:` line
;            markup language:   markup for source files without extension
; [genshi]   options passed to the genshi engine
; [jinja]    delimiters and whitespace options for the jinja2 engine
";
    Ok(format!("{header}\n{}", ProjectConfig::stock().to_ini_string()?))
}
