//! reStructuredText decoder (the subset content sites actually use).
//!
//! Body elements:
//!
//! - paragraphs (blank-line separated)
//! - section titles, underlined or over- and underlined; levels are assigned
//!   in order of first appearance of each adornment style
//! - transitions (a lone line of 4+ punctuation characters)
//! - bullet (`-`, `*`, `+`) and enumerated (`1.`, `#.`) lists
//! - literal blocks introduced by `::`
//! - block quotes (indented blocks)
//! - hyperlink targets (`.. _name: url`) and comments (`.. anything`),
//!   which produce no output
//!
//! Inline markup: `*emphasis*`, `**strong**`, ``` ``literal`` ```,
//! `` `cite` ``, `` `text <url>`_ ``, `` `name`_ ``, `name_`, standalone
//! `http(s)://` URIs, and backslash escapes.
//!
//! Output follows the docutils HTML writer's body markup, e.g.
//! `*x*` → `<p><em>x</em></p>\n`.

use super::{Decoder, MarkupError, escape_html};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Default)]
pub struct RestDecoder;

impl Decoder for RestDecoder {
    fn decode(&self, text: &str) -> Result<String, MarkupError> {
        let lines: Vec<&str> = text.lines().collect();
        let (lines, targets) = strip_explicit_markup(&lines);
        let mut writer = Writer {
            targets: &targets,
            title_styles: Vec::new(),
            html: String::new(),
        };
        writer.blocks(&lines);
        Ok(writer.html)
    }
}

/// Characters allowed to precede an inline start-string.
const START_PRECEDERS: &str = "'\"([{<-/:";
/// Characters allowed to follow an inline end-string.
const END_FOLLOWERS: &str = "'\")]}>-/:.,;!?\\_";

struct Writer<'t> {
    targets: &'t HashMap<String, String>,
    title_styles: Vec<(char, bool)>,
    html: String,
}

impl Writer<'_> {
    fn blocks(&mut self, lines: &[&str]) {
        let mut i = 0;
        while i < lines.len() {
            if is_blank(lines[i]) {
                i += 1;
                continue;
            }
            if let Some(consumed) = self.section_title(&lines[i..]) {
                i += consumed;
                continue;
            }
            if is_transition(lines, i) {
                self.html.push_str("<hr class=\"docutils\" />\n");
                i += 1;
                continue;
            }
            if indent_of(lines[i]) > 0 {
                let end = indented_block_end(lines, i);
                let inner = dedent(&lines[i..end]);
                self.html.push_str("<blockquote>\n");
                self.blocks(&inner);
                self.html.push_str("</blockquote>\n");
                i = end;
                continue;
            }
            if let Some(consumed) = self.list(&lines[i..]) {
                i += consumed;
                continue;
            }
            i += self.paragraph(&lines[i..]);
        }
    }

    fn section_title(&mut self, lines: &[&str]) -> Option<usize> {
        if lines.len() >= 3
            && let Some(ch) = adornment_char(lines[0])
            && !is_blank(lines[1])
            && lines[2].trim_end() == lines[0].trim_end()
        {
            self.heading(ch, true, lines[1].trim());
            return Some(3);
        }
        if lines.len() >= 2
            && indent_of(lines[0]) == 0
            && adornment_char(lines[0]).is_none()
            && let Some(ch) = adornment_char(lines[1])
            && lines[1].trim_end().chars().count() >= lines[0].trim_end().chars().count()
        {
            self.heading(ch, false, lines[0].trim());
            return Some(2);
        }
        None
    }

    fn heading(&mut self, ch: char, overline: bool, title: &str) {
        let style = (ch, overline);
        let position = match self.title_styles.iter().position(|s| *s == style) {
            Some(pos) => pos,
            None => {
                self.title_styles.push(style);
                self.title_styles.len() - 1
            }
        };
        let level = (position + 1).min(6);
        let inner = self.inline(title);
        self.html
            .push_str(&format!("<h{level}>{inner}</h{level}>\n"));
    }

    fn list(&mut self, lines: &[&str]) -> Option<usize> {
        let (ordered, _) = list_marker(lines[0])?;
        let mut items: Vec<String> = Vec::new();
        let mut i = 0;
        while let Some((kind, width)) = list_marker(lines[i]) {
            if kind != ordered {
                break;
            }
            let mut text = vec![lines[i][width..].trim()];
            i += 1;
            while i < lines.len() && !is_blank(lines[i]) && indent_of(lines[i]) > 0 {
                text.push(lines[i].trim());
                i += 1;
            }
            items.push(text.join("\n"));

            let mut next = i;
            while next < lines.len() && is_blank(lines[next]) {
                next += 1;
            }
            match lines.get(next).and_then(|line| list_marker(line)) {
                Some((kind, _)) if kind == ordered => i = next,
                _ => break,
            }
        }

        self.html.push_str(if ordered {
            "<ol class=\"arabic simple\">\n"
        } else {
            "<ul class=\"simple\">\n"
        });
        for item in &items {
            let inner = self.inline(item);
            self.html.push_str(&format!("<li>{inner}</li>\n"));
        }
        self.html
            .push_str(if ordered { "</ol>\n" } else { "</ul>\n" });
        Some(i)
    }

    fn paragraph(&mut self, lines: &[&str]) -> usize {
        let end = lines.iter().position(|l| is_blank(l)).unwrap_or(lines.len());
        let text = lines[..end].join("\n");
        let trimmed = text.trim_end();

        let (para, literal) = match trimmed.strip_suffix("::") {
            Some("") => (String::new(), true),
            Some(head) if head.ends_with(char::is_whitespace) => (head.trim_end().to_string(), true),
            Some(head) => (format!("{head}:"), true),
            None => (trimmed.to_string(), false),
        };
        if !para.is_empty() {
            let inner = self.inline(&para);
            self.html.push_str(&format!("<p>{inner}</p>\n"));
        }
        if !literal {
            return end;
        }

        let mut start = end;
        while start < lines.len() && is_blank(lines[start]) {
            start += 1;
        }
        if start >= lines.len() || indent_of(lines[start]) == 0 {
            return end;
        }
        let block_end = indented_block_end(lines, start);
        let body = dedent(&lines[start..block_end]).join("\n");
        self.html.push_str(&format!(
            "<pre class=\"literal-block\">\n{}\n</pre>\n",
            escape_html(&body)
        ));
        block_end
    }

    fn inline(&self, text: &str) -> String {
        let chars: Vec<char> = text.chars().collect();
        let mut out = String::new();
        let mut plain = String::new();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            if c == '\\' {
                if let Some(&next) = chars.get(i + 1)
                    && !next.is_whitespace()
                {
                    plain.push(next);
                }
                i += 2;
                continue;
            }
            if can_start(&chars, i)
                && let Some((html, next)) = self.markup_at(&chars, i)
            {
                out.push_str(&escape_html(&plain));
                plain.clear();
                out.push_str(&html);
                i = next;
                continue;
            }
            plain.push(c);
            i += 1;
        }
        out.push_str(&escape_html(&plain));
        out
    }

    /// Inline construct starting at `i`, as (html, index after it).
    fn markup_at(&self, chars: &[char], i: usize) -> Option<(String, usize)> {
        if starts_with(chars, i, "``") {
            let end = find_end(chars, i + 2, "``")?;
            let inner: String = chars[i + 2..end].iter().collect();
            return Some((
                format!(
                    "<tt class=\"docutils literal\">{}</tt>",
                    escape_html(&inner)
                ),
                end + 2,
            ));
        }
        if starts_with(chars, i, "**") {
            let end = find_end(chars, i + 2, "**")?;
            let inner: String = chars[i + 2..end].iter().collect();
            return Some((
                format!("<strong>{}</strong>", escape_html(&inner)),
                end + 2,
            ));
        }
        if chars[i] == '*' {
            let end = find_end(chars, i + 1, "*")?;
            let inner: String = chars[i + 1..end].iter().collect();
            return Some((format!("<em>{}</em>", escape_html(&inner)), end + 1));
        }
        if chars[i] == '`' {
            let end = find_end(chars, i + 1, "`")?;
            let inner: String = chars[i + 1..end].iter().collect();
            let mut next = end + 1;
            if chars.get(next) == Some(&'_') {
                next += 1;
                if chars.get(next) == Some(&'_') {
                    next += 1;
                }
                return Some((self.reference(&inner), next));
            }
            return Some((format!("<cite>{}</cite>", escape_html(&inner)), next));
        }
        if starts_with(chars, i, "http://") || starts_with(chars, i, "https://") {
            let mut end = i;
            while end < chars.len() && !chars[end].is_whitespace() && !"<>\"".contains(chars[end])
            {
                end += 1;
            }
            while end > i && ".,;:!?)'".contains(chars[end - 1]) {
                end -= 1;
            }
            let url: String = chars[i..end].iter().collect();
            return Some((external_link(&url, &url), end));
        }
        if chars[i].is_alphanumeric() {
            let mut end = i;
            while end < chars.len() && (chars[end].is_alphanumeric() || "-.".contains(chars[end])) {
                end += 1;
            }
            if chars.get(end) == Some(&'_') && can_end(chars, end + 1) {
                let name: String = chars[i..end].iter().collect();
                let url = self.targets.get(&normalize_name(&name))?;
                return Some((external_link(url, &name), end + 1));
            }
        }
        None
    }

    fn reference(&self, inner: &str) -> String {
        if let Some(stripped) = inner.strip_suffix('>')
            && let Some(pos) = stripped.rfind('<')
        {
            let url = stripped[pos + 1..].trim();
            let text = stripped[..pos].trim();
            let text = if text.is_empty() { url } else { text };
            return external_link(url, text);
        }
        match self.targets.get(&normalize_name(inner)) {
            Some(url) => external_link(url, inner),
            None => format!(
                "<a class=\"reference internal\" href=\"#{}\">{}</a>",
                escape_html(&slug(inner)),
                escape_html(inner)
            ),
        }
    }
}

fn external_link(url: &str, text: &str) -> String {
    format!(
        "<a class=\"reference external\" href=\"{}\">{}</a>",
        escape_html(url),
        escape_html(text)
    )
}

/// Remove hyperlink targets and comments, collecting the targets.
fn strip_explicit_markup<'a>(lines: &[&'a str]) -> (Vec<&'a str>, HashMap<String, String>) {
    let mut kept = Vec::new();
    let mut targets = HashMap::new();
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        if indent_of(line) != 0 || !(line.starts_with(".. ") || line.trim_end() == "..") {
            kept.push(line);
            i += 1;
            continue;
        }
        let mut end = i + 1;
        while end < lines.len() && !is_blank(lines[end]) && indent_of(lines[end]) > 0 {
            end += 1;
        }
        if let Some(target) = line.strip_prefix(".. _")
            && let Some((name, url)) = split_target(target)
        {
            let mut url = url.trim().to_string();
            for continuation in &lines[i + 1..end] {
                url.push_str(continuation.trim());
            }
            targets.insert(normalize_name(&name), url);
        }
        i = end;
    }
    (kept, targets)
}

/// Split `name: url` or `` `name with: colon`: url ``.
fn split_target(target: &str) -> Option<(String, &str)> {
    if let Some(quoted) = target.strip_prefix('`') {
        let close = quoted.find("`:")?;
        return Some((quoted[..close].to_string(), &quoted[close + 2..]));
    }
    let colon = target.find(':')?;
    Some((target[..colon].to_string(), &target[colon + 1..]))
}

fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn slug(name: &str) -> String {
    normalize_name(name).replace(' ', "-")
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start_matches([' ', '\t']).len()
}

/// The repeated punctuation character of an adornment line.
fn adornment_char(line: &str) -> Option<char> {
    let trimmed = line.trim_end();
    let first = trimmed.chars().next()?;
    if !first.is_ascii_punctuation()
        || trimmed.chars().count() < 2
        || !trimmed.chars().all(|c| c == first)
    {
        return None;
    }
    Some(first)
}

fn is_transition(lines: &[&str], i: usize) -> bool {
    adornment_char(lines[i]).is_some()
        && lines[i].trim_end().chars().count() >= 4
        && (i == 0 || is_blank(lines[i - 1]))
        && lines.get(i + 1).is_none_or(|next| is_blank(next))
}

/// `(ordered, marker width)` for a list item line.
fn list_marker(line: &str) -> Option<(bool, usize)> {
    if indent_of(line) != 0 {
        return None;
    }
    for bullet in ["- ", "* ", "+ "] {
        if line.starts_with(bullet) {
            return Some((false, bullet.len()));
        }
    }
    if line.starts_with("#. ") {
        return Some((true, 3));
    }
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 && line[digits..].starts_with(". ") {
        return Some((true, digits + 2));
    }
    None
}

/// End (exclusive) of the indented block starting at `start`, excluding
/// trailing blank lines.
fn indented_block_end(lines: &[&str], start: usize) -> usize {
    let mut end = start;
    let mut last_content = start;
    while end < lines.len() && (is_blank(lines[end]) || indent_of(lines[end]) > 0) {
        if !is_blank(lines[end]) {
            last_content = end;
        }
        end += 1;
    }
    last_content + 1
}

fn dedent<'a>(lines: &[&'a str]) -> Vec<&'a str> {
    let min = lines
        .iter()
        .filter(|l| !is_blank(l))
        .map(|l| indent_of(l))
        .min()
        .unwrap_or(0);
    lines
        .iter()
        .map(|l| if is_blank(l) { "" } else { &l[min..] })
        .collect()
}

fn starts_with(chars: &[char], i: usize, pattern: &str) -> bool {
    let mut idx = i;
    for p in pattern.chars() {
        if chars.get(idx) != Some(&p) {
            return false;
        }
        idx += 1;
    }
    true
}

fn can_start(chars: &[char], i: usize) -> bool {
    i == 0 || chars[i - 1].is_whitespace() || START_PRECEDERS.contains(chars[i - 1])
}

fn can_end(chars: &[char], after: usize) -> bool {
    after >= chars.len() || chars[after].is_whitespace() || END_FOLLOWERS.contains(chars[after])
}

/// Index of a valid end-string for an inline construct whose content
/// starts at `from`.
fn find_end(chars: &[char], from: usize, delim: &str) -> Option<usize> {
    if chars.get(from).is_none_or(|c| c.is_whitespace()) {
        return None;
    }
    let width = delim.chars().count();
    (from + 1..chars.len()).find(|&j| {
        starts_with(chars, j, delim) && !chars[j - 1].is_whitespace() && can_end(chars, j + width)
    })
}
