//! Jinja-style engine backed by `minijinja`.
//!
//! Recognised options (all from the `[jinja]` config section, all optional):
//! `block_start_string`, `block_end_string`, `variable_start_string`,
//! `variable_end_string`, `comment_start_string`, `comment_end_string`,
//! `trim_blocks`. Unknown keys are ignored.

use super::{EngineError, EngineOptions, Namespace, TemplateEngine, TemplateLanguage};
use minijinja::Environment;
use minijinja::syntax::SyntaxConfig;

#[derive(Debug, Clone, Copy, Default)]
pub struct JinjaEngine;

impl TemplateEngine for JinjaEngine {
    fn render(
        &self,
        body: &str,
        namespace: &Namespace,
        options: &EngineOptions,
    ) -> Result<String, EngineError> {
        let mut env = Environment::new();
        env.set_syntax(syntax(options)?);
        if let Some(value) = options.get("trim_blocks") {
            env.set_trim_blocks(parse_bool("trim_blocks", value)?);
        }
        env.render_str(body, namespace).map_err(render_error)
    }
}

fn syntax(options: &EngineOptions) -> Result<SyntaxConfig, EngineError> {
    let opt = |key: &str, default: &str| {
        options
            .get(key)
            .cloned()
            .unwrap_or_else(|| default.to_string())
    };
    SyntaxConfig::builder()
        .block_delimiters(opt("block_start_string", "{%"), opt("block_end_string", "%}"))
        .variable_delimiters(
            opt("variable_start_string", "{{"),
            opt("variable_end_string", "}}"),
        )
        .comment_delimiters(
            opt("comment_start_string", "{#"),
            opt("comment_end_string", "#}"),
        )
        .build()
        .map_err(|err| EngineError::InvalidOption {
            language: TemplateLanguage::Jinja2,
            key: "delimiters".to_string(),
            value: err.to_string(),
        })
}

/// Config-file booleans: `1/yes/true/on` and `0/no/false/off`.
pub(crate) fn parse_bool(key: &str, value: &str) -> Result<bool, EngineError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "yes" | "true" | "on" => Ok(true),
        "0" | "no" | "false" | "off" => Ok(false),
        _ => Err(EngineError::InvalidOption {
            language: TemplateLanguage::Jinja2,
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

fn render_error(err: minijinja::Error) -> EngineError {
    EngineError::Render {
        language: TemplateLanguage::Jinja2,
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::namespace;

    #[test]
    fn default_delimiters() {
        let out = JinjaEngine
            .render(
                "<h1>{{ title }}</h1>{# note #}{% if content %}{{ content }}{% endif %}",
                &namespace("Hi", "<p>x</p>"),
                &EngineOptions::new(),
            )
            .unwrap();
        assert_eq!(out, "<h1>Hi</h1><p>x</p>");
    }

    #[test]
    fn content_is_not_escaped() {
        let out = JinjaEngine
            .render("{{ content }}", &namespace("", "<em>&</em>"), &EngineOptions::new())
            .unwrap();
        assert_eq!(out, "<em>&</em>");
    }

    #[test]
    fn custom_delimiters_from_options() {
        let mut options = EngineOptions::new();
        options.insert("variable_start_string".into(), "[[".into());
        options.insert("variable_end_string".into(), "]]".into());
        let out = JinjaEngine
            .render("[[ title ]] {{ title }}", &namespace("T", "C"), &options)
            .unwrap();
        assert_eq!(out, "T {{ title }}");
    }

    #[test]
    fn trim_blocks_option() {
        let mut options = EngineOptions::new();
        options.insert("trim_blocks".into(), "yes".into());
        let out = JinjaEngine
            .render("{% if title %}\n$title{% endif %}", &namespace("T", ""), &options)
            .unwrap();
        assert_eq!(out, "$title");
    }

    #[test]
    fn bad_boolean_is_invalid_option() {
        let mut options = EngineOptions::new();
        options.insert("trim_blocks".into(), "maybe".into());
        let err = JinjaEngine
            .render("x", &namespace("", ""), &options)
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidOption { ref key, .. } if key == "trim_blocks"));
    }

    #[test]
    fn syntax_error_is_render_error() {
        let err = JinjaEngine
            .render("{% if %}", &namespace("", ""), &EngineOptions::new())
            .unwrap_err();
        assert!(matches!(err, EngineError::Render { .. }));
    }

    #[test]
    fn parse_bool_accepts_config_spellings() {
        assert!(parse_bool("k", "On").unwrap());
        assert!(parse_bool("k", "1").unwrap());
        assert!(!parse_bool("k", "false").unwrap());
        assert!(!parse_bool("k", "no").unwrap());
    }
}
