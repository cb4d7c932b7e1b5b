//! Plain-text ⇄ stored-HTML conversion for task descriptions.
//!
//! Descriptions are stored as escaped HTML: a single `<p>` with `<br>` line
//! breaks. Editors work in plain text; these helpers convert both ways.

/// Escape the HTML-significant characters in `text`.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Convert editor plain text to the stored HTML form.
///
/// Empty or whitespace-only input stores as an empty string, so "no
/// description" and "blank description" collapse to the same thing.
pub fn text_to_html(text: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }
    format!("<p>{}</p>", escape_html(text).replace('\n', "<br>"))
}

/// Convert stored HTML back to editor plain text.
///
/// `<br>` variants become newlines, remaining tags are stripped, and
/// entities are unescaped.
pub fn html_to_text(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }

    let mut text = String::with_capacity(html.len());
    let mut chars = html.chars();
    while let Some(ch) = chars.next() {
        if ch == '<' {
            let mut tag = String::new();
            for t in chars.by_ref() {
                if t == '>' {
                    break;
                }
                tag.push(t);
            }
            let name = tag.trim().trim_end_matches('/').trim_end().to_lowercase();
            if name == "br" {
                text.push('\n');
            }
        } else {
            text.push(ch);
        }
    }

    unescape_entities(&text)
}

fn unescape_entities(text: &str) -> String {
    // &amp; last, so "&amp;lt;" decodes to "&lt;" and not "<"
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
