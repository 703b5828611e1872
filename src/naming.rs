//! File-name conventions shared by sources, templates, and outputs.
//!
//! A source file name is `<stem>.<ext>`. The extension selects the markup
//! kind and the stem names the output:
//!
//! - `about.rest` → stem `about`, markup `rest`, output `about.html`
//! - `news.2024.md` → stem `news.2024`, markup `md`, output `news.2024.html`
//! - `README` → stem `README`, no extension (project's configured markup)
//!
//! Dotfiles (`.gitkeep`, editor swap files) are never treated as content.

/// Extension of every rendered output file.
pub const OUTPUT_EXTENSION: &str = "html";

/// Result of splitting a file name into stem and extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFileName {
    /// Everything before the last dot (the whole name if there is none).
    pub stem: String,
    /// Text after the last dot. `None` when there is no dot or nothing after it.
    pub extension: Option<String>,
}

/// Split a file name on its last dot.
///
/// A leading dot does not start an extension, matching how `Path::extension`
/// treats `.bashrc`.
pub fn parse_file_name(name: &str) -> ParsedFileName {
    match name.rfind('.') {
        Some(pos) if pos > 0 && pos + 1 < name.len() => ParsedFileName {
            stem: name[..pos].to_string(),
            extension: Some(name[pos + 1..].to_string()),
        },
        Some(pos) if pos > 0 => ParsedFileName {
            stem: name[..pos].to_string(),
            extension: None,
        },
        _ => ParsedFileName {
            stem: name.to_string(),
            extension: None,
        },
    }
}

/// Output file name for a source file name: the stem plus `.html`.
pub fn output_file_name(source_name: &str) -> String {
    format!("{}.{}", parse_file_name(source_name).stem, OUTPUT_EXTENSION)
}

/// Whether a directory entry should be skipped when enumerating content.
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_extension() {
        let p = parse_file_name("about.rest");
        assert_eq!(p.stem, "about");
        assert_eq!(p.extension.as_deref(), Some("rest"));
    }

    #[test]
    fn only_last_dot_splits() {
        let p = parse_file_name("news.2024.md");
        assert_eq!(p.stem, "news.2024");
        assert_eq!(p.extension.as_deref(), Some("md"));
    }

    #[test]
    fn no_extension() {
        let p = parse_file_name("README");
        assert_eq!(p.stem, "README");
        assert_eq!(p.extension, None);
    }

    #[test]
    fn trailing_dot_has_no_extension() {
        let p = parse_file_name("draft.");
        assert_eq!(p.stem, "draft");
        assert_eq!(p.extension, None);
    }

    #[test]
    fn leading_dot_is_not_an_extension() {
        let p = parse_file_name(".gitkeep");
        assert_eq!(p.stem, ".gitkeep");
        assert_eq!(p.extension, None);
        assert!(is_hidden(".gitkeep"));
    }

    #[test]
    fn output_name_replaces_extension() {
        assert_eq!(output_file_name("temp-source.rest"), "temp-source.html");
        assert_eq!(output_file_name("README"), "README.html");
        assert_eq!(output_file_name("a.b.markdown"), "a.b.html");
    }
}
