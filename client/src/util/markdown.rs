//! Markdown editing and rendering for the article editor.
//!
//! The editor is a plain textarea. Toolbar actions are pure text transforms
//! over the selected range, undo/redo is a bounded snapshot history, and the
//! HTML handed to the backend comes from `pulldown-cmark` with raw HTML
//! stripped. Stored HTML read back from the backend goes through
//! [`sanitize_html`] before it is mounted.
//!
//! Offsets are byte offsets into the text; [`utf16_to_byte`] and
//! [`byte_to_utf16`] convert from and to the textarea's UTF-16 selection.

#[cfg(test)]
#[path = "markdown_test.rs"]
mod markdown_test;

use pulldown_cmark::{Event, Options, Parser, html};

/// Snapshots kept for undo.
pub const HISTORY_LIMIT: usize = 100;

/// Render Markdown to HTML, dropping inline and block raw HTML.
pub fn render_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(markdown, options).filter_map(|event| match event {
        Event::Html(_) | Event::InlineHtml(_) => None,
        other => Some(other),
    });

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Tags [`render_html`] can emit. Everything else is dropped on sanitize.
const ALLOWED_TAGS: [&str; 27] = [
    "a", "blockquote", "br", "code", "del", "em", "h1", "h2", "h3", "h4", "h5", "h6", "hr", "img", "li", "ol", "p",
    "pre", "s", "strong", "sub", "sup", "table", "tbody", "td", "th", "thead",
];

/// Elements removed together with everything up to their closing tag.
const DROPPED_WITH_CONTENT: [&str; 12] = [
    "script", "style", "iframe", "object", "embed", "noscript", "template", "textarea", "title", "xmp", "svg", "math",
];

/// Reduce stored article HTML to the tags and attributes [`render_html`]
/// produces.
///
/// Unknown tags are removed but their text is kept; script-like elements go
/// with their content. Event handlers and any attribute outside a small
/// per-tag allowlist are dropped, and links or images may only point at
/// relative, `http`, `https` or `mailto` URLs.
pub fn sanitize_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        rest = &rest[open..];

        if let Some(after) = rest.strip_prefix("<!--") {
            rest = after.find("-->").map_or("", |end| &after[end + 3..]);
            continue;
        }
        let starts_markup = rest[1..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?'));
        let end = if starts_markup { tag_end(rest) } else { None };
        let Some(end) = end else {
            out.push_str("&lt;");
            rest = &rest[1..];
            continue;
        };

        let tag = parse_tag(&rest[1..end]);
        rest = &rest[end + 1..];
        let Some(tag) = tag else {
            continue;
        };
        if DROPPED_WITH_CONTENT.contains(&tag.name.as_str()) {
            if !tag.closing {
                rest = skip_past_close(rest, &tag.name);
            }
        } else if ALLOWED_TAGS.contains(&tag.name.as_str()) {
            write_tag(&mut out, &tag);
        }
    }
    out.push_str(rest);
    out
}

struct Tag {
    name: String,
    closing: bool,
    self_closing: bool,
    attrs: Vec<(String, String)>,
}

/// Index of the `>` closing the tag that starts at `text[0]`, ignoring any
/// inside quoted attribute values.
fn tag_end(text: &str) -> Option<usize> {
    let mut quote = None;
    for (i, c) in text.char_indices().skip(1) {
        match (quote, c) {
            (None, '"' | '\'') => quote = Some(c),
            (Some(q), _) if q == c => quote = None,
            (None, '>') => return Some(i),
            _ => {}
        }
    }
    None
}

/// Parse the text between `<` and `>`. `None` for declarations, processing
/// instructions and anything without a tag name.
fn parse_tag(body: &str) -> Option<Tag> {
    let (closing, body) = match body.strip_prefix('/') {
        Some(body) => (true, body),
        None => (false, body),
    };
    let name_len = body.find(|c: char| !c.is_ascii_alphanumeric()).unwrap_or(body.len());
    if name_len == 0 {
        return None;
    }
    let name = body[..name_len].to_ascii_lowercase();
    let mut rest = &body[name_len..];
    let self_closing = rest.trim_end().ends_with('/');

    let mut attrs = Vec::new();
    loop {
        rest = rest.trim_start_matches(|c: char| c.is_ascii_whitespace() || c == '/');
        if rest.is_empty() {
            break;
        }
        let key_len = rest
            .find(|c: char| c.is_ascii_whitespace() || c == '=' || c == '/')
            .unwrap_or(rest.len());
        let key = rest[..key_len].to_ascii_lowercase();
        rest = rest[key_len..].trim_start();

        let mut value = "";
        if let Some(after) = rest.strip_prefix('=') {
            let after = after.trim_start();
            (value, rest) = match after.chars().next() {
                Some(q @ ('"' | '\'')) => {
                    let quoted = &after[1..];
                    match quoted.find(q) {
                        Some(i) => (&quoted[..i], &quoted[i + 1..]),
                        None => (quoted, ""),
                    }
                }
                _ => {
                    let i = after.find(|c: char| c.is_ascii_whitespace()).unwrap_or(after.len());
                    after.split_at(i)
                }
            };
        }
        if !key.is_empty() {
            attrs.push((key, value.to_owned()));
        }
    }
    Some(Tag { name, closing, self_closing, attrs })
}

/// The text after the closing tag for `name`; empty when it never closes.
fn skip_past_close<'a>(text: &'a str, name: &str) -> &'a str {
    let lower = text.to_ascii_lowercase();
    let Some(start) = lower.find(&format!("</{name}")) else {
        return "";
    };
    let after = &text[start..];
    after.find('>').map_or("", |end| &after[end + 1..])
}

fn write_tag(out: &mut String, tag: &Tag) {
    out.push('<');
    if tag.closing {
        out.push('/');
        out.push_str(&tag.name);
        out.push('>');
        return;
    }
    out.push_str(&tag.name);
    for (key, value) in &tag.attrs {
        if !attribute_allowed(&tag.name, key, value) {
            continue;
        }
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        for c in value.chars() {
            match c {
                '"' => out.push_str("&quot;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                other => out.push(other),
            }
        }
        out.push('"');
    }
    if tag.self_closing {
        out.push_str(" /");
    }
    out.push('>');
}

fn attribute_allowed(tag: &str, key: &str, value: &str) -> bool {
    match (tag, key) {
        ("a", "href") | ("img", "src") => safe_url(value),
        ("a" | "img", "title") | ("img", "alt") | ("ol", "start") => true,
        ("code", "class") => value.starts_with("language-"),
        ("th" | "td", "style") => {
            matches!(value, "text-align: left" | "text-align: center" | "text-align: right")
        }
        _ => false,
    }
}

/// Relative URLs and `http`, `https` or `mailto` ones. A scheme hidden behind
/// a character reference counts as unsafe.
fn safe_url(value: &str) -> bool {
    let compact: String = value
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();
    let head_end = compact.find(['/', '?', '#']).unwrap_or(compact.len());
    let head = &compact[..head_end];
    if head.contains('&') {
        return false;
    }
    match head.split_once(':') {
        Some((scheme, _)) => matches!(scheme, "http" | "https" | "mailto"),
        None => true,
    }
}

/// Toolbar formatting actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Bold,
    Italic,
    Strike,
    BulletList,
    OrderedList,
    Blockquote,
}

impl Format {
    pub const ALL: [Format; 6] =
        [Format::Bold, Format::Italic, Format::Strike, Format::BulletList, Format::OrderedList, Format::Blockquote];

    pub fn label(self) -> &'static str {
        match self {
            Self::Bold => "B",
            Self::Italic => "I",
            Self::Strike => "S",
            Self::BulletList => "•",
            Self::OrderedList => "1.",
            Self::Blockquote => "❝",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Bold => "Bold",
            Self::Italic => "Italic",
            Self::Strike => "Strikethrough",
            Self::BulletList => "Bullet list",
            Self::OrderedList => "Numbered list",
            Self::Blockquote => "Quote",
        }
    }

    fn inline_marker(self) -> Option<&'static str> {
        match self {
            Self::Bold => Some("**"),
            Self::Italic => Some("*"),
            Self::Strike => Some("~~"),
            Self::BulletList | Self::OrderedList | Self::Blockquote => None,
        }
    }
}

/// Result of a transform: new text and the selection to restore.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Edit {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// Apply `format` to `text[start..end]`. Applying the same format twice
/// restores the original text.
pub fn apply_format(text: &str, start: usize, end: usize, format: Format) -> Edit {
    let (start, end) = clamp_range(text, start, end);
    match format.inline_marker() {
        Some(marker) => toggle_inline(text, start, end, marker),
        None => toggle_lines(text, start, end, format),
    }
}

fn toggle_inline(text: &str, start: usize, end: usize, marker: &str) -> Edit {
    let m = marker.len();
    let before = &text[..start];
    let after = &text[end..];
    // An odd run of `*` on both sides means italic; an even run is bold only.
    let wrapped = if marker == "*" {
        run_len(before.chars().rev()) % 2 == 1 && run_len(after.chars()) % 2 == 1
    } else {
        before.ends_with(marker) && after.starts_with(marker)
    };
    if wrapped {
        let mut out = String::with_capacity(text.len());
        out.push_str(&before[..before.len() - m]);
        out.push_str(&text[start..end]);
        out.push_str(&after[m..]);
        return Edit { text: out, start: start - m, end: end - m };
    }
    let mut out = String::with_capacity(text.len() + 2 * m);
    out.push_str(before);
    out.push_str(marker);
    out.push_str(&text[start..end]);
    out.push_str(marker);
    out.push_str(after);
    Edit { text: out, start: start + m, end: end + m }
}

fn run_len(chars: impl Iterator<Item = char>) -> usize {
    chars.take_while(|c| *c == '*').count()
}

fn toggle_lines(text: &str, start: usize, end: usize, format: Format) -> Edit {
    let block_start = text[..start].rfind('\n').map_or(0, |i| i + 1);
    let block_end = text[end..].find('\n').map_or(text.len(), |i| end + i);
    let lines: Vec<&str> = text[block_start..block_end].split('\n').collect();

    let all_prefixed = lines.iter().all(|line| strip_prefix(line, format).is_some());
    let rewritten: Vec<String> = lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            if all_prefixed {
                strip_prefix(line, format).unwrap_or(line).to_owned()
            } else {
                format!("{}{line}", line_prefix(format, i))
            }
        })
        .collect();
    let block = rewritten.join("\n");

    let mut out = String::with_capacity(text.len() + block.len());
    out.push_str(&text[..block_start]);
    out.push_str(&block);
    out.push_str(&text[block_end..]);
    Edit { text: out, start: block_start, end: block_start + block.len() }
}

fn line_prefix(format: Format, index: usize) -> String {
    match format {
        Format::OrderedList => format!("{}. ", index + 1),
        Format::Blockquote => "> ".to_owned(),
        _ => "- ".to_owned(),
    }
}

fn strip_prefix(line: &str, format: Format) -> Option<&str> {
    match format {
        Format::BulletList => line.strip_prefix("- "),
        Format::Blockquote => line.strip_prefix("> "),
        Format::OrderedList => {
            let digits = line.find(|c: char| !c.is_ascii_digit())?;
            if digits == 0 {
                return None;
            }
            line[digits..].strip_prefix(". ")
        }
        Format::Bold | Format::Italic | Format::Strike => None,
    }
}

fn clamp_range(text: &str, start: usize, end: usize) -> (usize, usize) {
    let floor = |mut i: usize| {
        i = i.min(text.len());
        while !text.is_char_boundary(i) {
            i -= 1;
        }
        i
    };
    let (a, b) = (floor(start), floor(end));
    (a.min(b), a.max(b))
}

/// Byte offset of the UTF-16 position `units` (clamped to the text).
pub fn utf16_to_byte(text: &str, units: usize) -> usize {
    let mut seen = 0;
    for (byte, ch) in text.char_indices() {
        if seen >= units {
            return byte;
        }
        seen += ch.len_utf16();
    }
    text.len()
}

/// UTF-16 position of byte offset `byte`.
pub fn byte_to_utf16(text: &str, byte: usize) -> usize {
    let (end, _) = clamp_range(text, byte, byte);
    text[..end].encode_utf16().count()
}

/// Bounded undo/redo history of text snapshots.
#[derive(Clone, Debug)]
pub struct EditHistory {
    undo: Vec<String>,
    redo: Vec<String>,
    limit: usize,
}

impl Default for EditHistory {
    fn default() -> Self {
        Self::with_limit(HISTORY_LIMIT)
    }
}

impl EditHistory {
    pub fn with_limit(limit: usize) -> Self {
        Self { undo: Vec::new(), redo: Vec::new(), limit: limit.max(1) }
    }

    /// Remember `previous` before a change; clears the redo stack.
    pub fn record(&mut self, previous: &str) {
        if self.undo.last().is_some_and(|last| last == previous) {
            return;
        }
        if self.undo.len() == self.limit {
            self.undo.remove(0);
        }
        self.undo.push(previous.to_owned());
        self.redo.clear();
    }

    /// Text to restore for undo, given the current text.
    pub fn undo(&mut self, current: &str) -> Option<String> {
        let previous = self.undo.pop()?;
        self.redo.push(current.to_owned());
        Some(previous)
    }

    /// Text to restore for redo, given the current text.
    pub fn redo(&mut self, current: &str) -> Option<String> {
        let next = self.redo.pop()?;
        self.undo.push(current.to_owned());
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}
