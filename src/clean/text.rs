use data_encoding::{BASE64, BASE64_NOPAD};

use crate::models::ExpandedBase64;

const KB: u64 = 1024;
const MB: u64 = KB * 1024;
const GB: u64 = MB * 1024;

/// Make a byte count human-readable: `0 bytes`, `1 byte`, `512 bytes`, `1.50 KB`, ...
pub fn format_bytes(bytes: u64) -> String {
    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else if bytes > 1 {
        format!("{} bytes", bytes)
    } else if bytes == 1 {
        "1 byte".to_string()
    } else {
        "0 bytes".to_string()
    }
}

/// Decode base64 (padded or not, whitespace ignored) into UTF-8, replacing invalid sequences.
pub fn decode_base64(encoded: &str) -> Option<String> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = BASE64
        .decode(compact.as_bytes())
        .or_else(|_| BASE64_NOPAD.decode(compact.trim_end_matches('=').as_bytes()))
        .ok()?;
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

/// Decode a base64 HTML field into its HTML and plain-text forms.
///
/// Content that is not valid base64 yields empty `html` and `text`.
pub fn expand_base64(encoded: &str) -> ExpandedBase64 {
    let html = decode_base64(encoded).unwrap_or_else(|| {
        tracing::warn!(len = encoded.len(), "Content is not valid base64");
        String::new()
    });
    let text = html_to_text(&html);
    ExpandedBase64 {
        original: encoded.to_string(),
        html,
        text,
    }
}

/// Render HTML as plain text, without word wrapping.
///
/// Block elements start new lines (paragraphs and headings leave a blank line), list
/// items get a `* ` bullet, comments and `script`/`style` bodies are dropped and
/// character references are decoded.
pub fn html_to_text(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut skipping: Option<&'static str> = None;
    let mut rest = html;

    while let Some(start) = find_markup(rest) {
        let (text, tail) = rest.split_at(start);
        if skipping.is_none() {
            push_text(&mut out, text);
        }

        // Comments, Word conditional blocks included.
        if let Some(comment) = tail.strip_prefix("<!--") {
            rest = comment
                .find("-->")
                .map_or("", |end| &comment[end + 3..]);
            continue;
        }

        let Some(end) = tag_end(tail) else {
            rest = tail;
            break;
        };
        let tag = &tail[1..end];
        rest = &tail[end + 1..];

        let closing = tag.starts_with('/');
        let name = tag
            .trim_start_matches('/')
            .split(|c: char| c.is_whitespace() || c == '/')
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        if let Some(skipped) = skipping {
            if closing && name == skipped {
                skipping = None;
            }
            continue;
        }

        match name.as_str() {
            "script" if !closing => skipping = Some("script"),
            "style" if !closing => skipping = Some("style"),
            "br" => out.push('\n'),
            "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "blockquote" | "pre" => {
                out.push_str("\n\n")
            }
            "div" | "ul" | "ol" | "table" | "tr" | "section" | "article" | "header"
            | "footer" | "hr" => out.push('\n'),
            "li" if !closing => out.push_str("\n* "),
            "td" | "th" if closing => out.push(' '),
            _ => {}
        }
    }
    if skipping.is_none() {
        push_text(&mut out, rest);
    }

    tidy_lines(&out)
}

/// Offset of the next `<` that opens a tag, a comment or a declaration.
/// A `<` followed by anything else (`3 < 4`) is text.
fn find_markup(s: &str) -> Option<usize> {
    s.match_indices('<').map(|(i, _)| i).find(|&i| {
        s[i + 1..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?'))
    })
}

/// Offset of the `>` closing the tag that starts `tail`, skipping quoted attribute values.
fn tag_end(tail: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in tail.char_indices().skip(1) {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == '>' => return Some(i),
            None => {}
        }
    }
    None
}

fn push_text(out: &mut String, raw: &str) {
    let decoded = html_escape::decode_html_entities(raw);
    let mut last_was_space = false;
    for c in decoded.chars() {
        if c.is_whitespace() {
            if !last_was_space {
                out.push(' ');
            }
            last_was_space = true;
        } else {
            out.push(c);
            last_was_space = false;
        }
    }
}

/// Trim every line, collapse inner whitespace, keep at most one blank line in a row.
fn tidy_lines(raw: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    for line in raw.lines() {
        let line = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if line.is_empty() && lines.last().map_or(true, |last| last.is_empty()) {
            continue;
        }
        lines.push(line);
    }
    while lines.last().is_some_and(|last| last.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}
