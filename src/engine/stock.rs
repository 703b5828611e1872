//! The `default.html` written into every new project.

use super::{EngineOptions, TemplateLanguage};
use maud::{DOCTYPE, PreEscaped, html};

/// `(title, content)` placeholders in the given language's syntax.
fn placeholders(language: TemplateLanguage, options: &EngineOptions) -> (String, String) {
    match language {
        TemplateLanguage::Simple => ("$title".to_string(), "$content".to_string()),
        TemplateLanguage::Jinja2 => {
            let start = options
                .get("variable_start_string")
                .map_or("{{", String::as_str);
            let end = options
                .get("variable_end_string")
                .map_or("}}", String::as_str);
            (
                format!("{start} title {end}"),
                format!("{start} content {end}"),
            )
        }
        TemplateLanguage::Mako => ("${title}".to_string(), "${content | n}".to_string()),
        TemplateLanguage::Genshi => ("${title}".to_string(), "${Markup(content)}".to_string()),
    }
}

/// Render the stock page layout with placeholders for `language`.
pub fn default_template(language: TemplateLanguage, options: &EngineOptions) -> String {
    let (title, content) = placeholders(language, options);
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { (PreEscaped(&title)) }
            }
            body {
                h1 { (PreEscaped(&title)) }
                div class="content" { (PreEscaped(&content)) }
            }
        }
    }
    .into_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{SimpleEngine, TemplateEngine, namespace};

    #[test]
    fn simple_default_renders_title_and_content() {
        let body = default_template(TemplateLanguage::Simple, &EngineOptions::new());
        let out = SimpleEngine
            .render(&body, &namespace("Hi", "<p>x</p>"), &EngineOptions::new())
            .unwrap();
        assert!(out.starts_with("<!DOCTYPE html>"));
        assert!(out.contains("<title>Hi</title>"));
        assert!(out.contains("<h1>Hi</h1>"));
        assert!(out.contains("<div class=\"content\"><p>x</p></div>"));
    }

    #[test]
    fn jinja_default_uses_configured_delimiters() {
        let mut options = EngineOptions::new();
        options.insert("variable_start_string".into(), "[[".into());
        options.insert("variable_end_string".into(), "]]".into());
        let body = default_template(TemplateLanguage::Jinja2, &options);
        assert!(body.contains("<h1>[[ title ]]</h1>"));
        assert!(body.contains("[[ content ]]"));
    }

    #[test]
    fn mako_and_genshi_placeholders() {
        let mako = default_template(TemplateLanguage::Mako, &EngineOptions::new());
        assert!(mako.contains("${content | n}"));
        let genshi = default_template(TemplateLanguage::Genshi, &EngineOptions::new());
        assert!(genshi.contains("${Markup(content)}"));
    }
}
