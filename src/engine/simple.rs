//! `$name` substitution engine.
//!
//! - `$$` is a literal `$`
//! - `$title` and `${title}` are replaced by namespace values; identifiers
//!   are `[_A-Za-z][_A-Za-z0-9]*`
//! - placeholders not in the namespace, and malformed ones, are left as
//!   written
//!
//! Rendering never fails.

use super::{EngineError, EngineOptions, Namespace, TemplateEngine};

#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleEngine;

impl TemplateEngine for SimpleEngine {
    fn render(
        &self,
        body: &str,
        namespace: &Namespace,
        _options: &EngineOptions,
    ) -> Result<String, EngineError> {
        Ok(substitute(body, namespace))
    }
}

pub fn substitute(body: &str, namespace: &Namespace) -> String {
    let mut out = String::with_capacity(body.len());
    let mut rest = body;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        if let Some(tail) = after.strip_prefix('$') {
            out.push('$');
            rest = tail;
            continue;
        }
        if let Some(braced) = after.strip_prefix('{') {
            let ident_len = identifier_len(braced);
            if ident_len > 0
                && braced[ident_len..].starts_with('}')
                && let Some(value) = namespace.get(&braced[..ident_len])
            {
                out.push_str(value);
                rest = &braced[ident_len + 1..];
                continue;
            }
        } else {
            let ident_len = identifier_len(after);
            if ident_len > 0
                && let Some(value) = namespace.get(&after[..ident_len])
            {
                out.push_str(value);
                rest = &after[ident_len..];
                continue;
            }
        }

        out.push('$');
        rest = after;
    }
    out.push_str(rest);
    out
}

fn identifier_len(text: &str) -> usize {
    let mut chars = text.char_indices();
    match chars.next() {
        Some((_, c)) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return 0,
    }
    chars
        .find(|(_, c)| !(*c == '_' || c.is_ascii_alphanumeric()))
        .map(|(idx, _)| idx)
        .unwrap_or(text.len())
}
