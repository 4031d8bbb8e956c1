//! Escaping and inline formatting of message text.
//!
//! Text is always escaped first; the formatting passes then only ever add
//! markup to already-safe text, so nothing they emit is escaped again and
//! nothing from the input can become live markup.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Emoji glyphs wrapped for consistent sizing. Longer sequences come first so
/// the alternation prefers them over their prefixes.
const EMOJI: &[&str] = &[
    "⚠️", "✅", "❌", "🤔", "💡", "🚗", "🔧", "📋", "📱", "📧", "📝", "💰", "👋", "🔍", "📦",
    "🛒", "🎉", "👑",
];

static BOLD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*\*(.+?)\*\*").expect("bold pattern is valid")
});

// After escaping, `&` only appears as an entity. `&amp;` may sit inside a URL
// (query strings); any other entity ends it. URLs and emoji share one pass so
// a URL is matched whole and emoji inside it stay part of the link.
static URL_OR_EMOJI: LazyLock<Regex> = LazyLock::new(|| {
    let emoji = EMOJI
        .iter()
        .map(|e| regex::escape(e))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?P<url>https?://(?:[^\s<&]|&amp;)+)|(?P<emoji>{emoji})"))
        .expect("url and emoji pattern is valid")
});

/// Escape the HTML-significant characters `& < > " '`.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render bot text as HTML: escaped, with `**bold**`, line breaks, links
/// for bare URLs and wrapped emoji.
#[must_use]
pub fn format_reply(text: &str) -> String {
    let escaped = escape_html(text);
    let bolded = BOLD.replace_all(&escaped, "<strong>$1</strong>");
    let broken = bolded.replace("\r\n", "\n").replace('\n', "<br>");
    URL_OR_EMOJI
        .replace_all(&broken, |caps: &Captures<'_>| match caps.name("url") {
            Some(url) => link(url.as_str()),
            None => format!(r#"<span class="emoji">{}</span>"#, &caps[0]),
        })
        .into_owned()
}

/// Render user text as HTML: escaped, with line breaks.
#[must_use]
pub fn format_plain(text: &str) -> String {
    escape_html(text).replace("\r\n", "\n").replace('\n', "<br>")
}

/// Turn an escaped URL into an anchor, leaving trailing sentence
/// punctuation outside the link.
fn link(url: &str) -> String {
    let trimmed = url.trim_end_matches(['.', ',', ';', ':', '!', '?', ')']);
    let rest = &url[trimmed.len()..];
    format!(r#"<a href="{trimmed}" target="_blank" rel="noopener noreferrer">{trimmed}</a>{rest}"#)
}
