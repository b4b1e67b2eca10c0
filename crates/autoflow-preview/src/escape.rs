//! Escaping for text that ends up inside the preview document.

use std::sync::LazyLock;

use regex::{Captures, Regex};

// Group 1 is set for an end tag; otherwise the match is a comment opener.
static SCRIPT_BREAKOUT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</(script)|<!--").expect("static pattern"));

static STYLE_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</(style)").expect("static pattern"));

/// Escape text for an HTML text node: `& < > " '`.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Escape text for a double-quoted attribute value.
pub fn escape_attribute(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}

/// Make JavaScript safe to place between `<script>` and `</script>`.
///
/// Every `</script` (any case) becomes `<\/script`, which the HTML tokenizer
/// does not treat as an end tag and JavaScript reads as the same string.
/// Every `<!--` becomes `<\!--`; a raw one followed by `<script` switches the
/// tokenizer into a state where the real `</script>` no longer closes the
/// element.
pub fn escape_inline_script(source: &str) -> String {
    SCRIPT_BREAKOUT
        .replace_all(source, |caps: &Captures| match caps.get(1) {
            Some(tag) => format!("<\\/{}", tag.as_str()),
            None => "<\\!--".to_string(),
        })
        .into_owned()
}

/// Make CSS safe to place between `<style>` and `</style>`.
pub fn escape_inline_style(source: &str) -> String {
    STYLE_CLOSE
        .replace_all(source, |caps: &Captures| format!("<\\/{}", &caps[1]))
        .into_owned()
}
