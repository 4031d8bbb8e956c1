//! Turning server responses into message log fragments.
//!
//! The renderer is pure: it takes a decoded [`ServerResponse`] and returns
//! the fragments to append, in display order. It never fails; absent or
//! malformed fields simply produce fewer fragments.
//!
//! # Structure
//!
//! - [`markup`]: escaping and inline reply formatting
//! - [`cards`]: part result cards
//! - [`chips`]: suggestion chips
//! - [`page`]: the host page shell

pub mod cards;
pub mod chips;
pub mod markup;
pub mod page;

use serde::{Deserialize, Serialize};

use crate::wire::ServerResponse;

pub use cards::{PartCard, PartsBlock, StockTier};
pub use chips::{SuggestionChip, SuggestionRow};

/// Shown when a response carries neither a reply nor data.
pub const FALLBACK_MESSAGE: &str =
    "Sorry, I didn't understand that. Could you rephrase your request?";

/// Shown when the request could not be completed.
pub const CONNECTION_ERROR_MESSAGE: &str =
    "❌ Unable to reach the server. Please check your connection and try again.";

/// Bot message for a non-success HTTP status.
#[must_use]
pub fn server_error_message(status: u16) -> String {
    format!("❌ Sorry, the server returned an error ({status}). Please try again later.")
}

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Bot,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Bot => "bot",
        }
    }
}

/// A message in the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            role: Role::Bot,
            text: text.into(),
        }
    }

    /// Message body as HTML. Bot text gets inline formatting; user text is
    /// only escaped.
    #[must_use]
    pub fn body_html(&self) -> String {
        match self.role {
            Role::Bot => markup::format_reply(&self.text),
            Role::User => markup::format_plain(&self.text),
        }
    }

    #[must_use]
    pub fn to_html(&self) -> String {
        format!(
            r#"<div class="message {role}-message"><div class="message-content">{body}</div></div>"#,
            role = self.role.as_str(),
            body = self.body_html()
        )
    }
}

/// One element appended to the message log.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    Message(ChatMessage),
    Parts(PartsBlock),
    Suggestions(SuggestionRow),
}

impl Fragment {
    #[must_use]
    pub fn to_html(&self) -> String {
        match self {
            Self::Message(msg) => msg.to_html(),
            Self::Parts(block) => block.to_html(),
            Self::Suggestions(row) => row.to_html(),
        }
    }

    #[must_use]
    pub fn to_plain_text(&self) -> String {
        match self {
            Self::Message(msg) => match msg.role {
                Role::User => format!("you> {}", msg.text),
                Role::Bot => format!("bot> {}", msg.text),
            },
            Self::Parts(block) => block.to_plain_text(),
            Self::Suggestions(row) => row.to_plain_text(),
        }
    }
}

/// Fragments for a successful response, in display order: reply (or the
/// fallback), part cards, suggestion chips.
#[must_use]
pub fn render(response: &ServerResponse) -> Vec<Fragment> {
    let mut fragments = Vec::new();

    if let Some(reply) = response.reply.as_deref() {
        fragments.push(Fragment::Message(ChatMessage::bot(reply)));
    }

    if response.is_parts() {
        if let Some(block) = response.data.as_deref().and_then(PartsBlock::from_parts) {
            fragments.push(Fragment::Parts(block));
        }
    }

    if let Some(row) = SuggestionRow::from_labels(&response.suggestions) {
        fragments.push(Fragment::Suggestions(row));
    }

    if response.reply.is_none() && response.data.is_none() {
        fragments.insert(0, Fragment::Message(ChatMessage::bot(FALLBACK_MESSAGE)));
    }

    fragments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{Part, ResponseKind};
    use proptest::prelude::*;
    use regex::Regex;

    fn parts(n: usize) -> Vec<Part> {
        (0..n)
            .map(|i| Part {
                product_name: Some(format!("Part {i}")),
                sales_price: Some(100.0),
                quantity_on_hand: Some(10),
                ..Part::default()
            })
            .collect()
    }

    #[test]
    fn test_reply_only() {
        let fragments = render(&ServerResponse::reply("Found it"));

        assert_eq!(fragments, vec![Fragment::Message(ChatMessage::bot("Found it"))]);
    }

    #[test]
    fn test_empty_response_falls_back() {
        let fragments = render(&ServerResponse::default());

        assert_eq!(fragments, vec![Fragment::Message(ChatMessage::bot(FALLBACK_MESSAGE))]);
    }

    #[test]
    fn test_fallback_precedes_suggestions() {
        let response = ServerResponse {
            suggestions: vec!["Try Again".to_string()],
            ..ServerResponse::default()
        };
        let fragments = render(&response);

        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0], Fragment::Message(ChatMessage::bot(FALLBACK_MESSAGE)));
        assert!(matches!(fragments[1], Fragment::Suggestions(_)));
    }

    #[test]
    fn test_parts_response_in_display_order() {
        let response = ServerResponse {
            reply: Some("✅ **Found in our catalog!**".to_string()),
            kind: Some(ResponseKind::Parts),
            data: Some(parts(5)),
            suggestions: vec!["Yes".to_string(), "No".to_string()],
            ..ServerResponse::default()
        };
        let fragments = render(&response);

        assert_eq!(fragments.len(), 3);
        assert!(matches!(fragments[0], Fragment::Message(_)));
        let Fragment::Parts(block) = &fragments[1] else {
            panic!("expected part cards, got {:?}", fragments[1]);
        };
        assert_eq!(block.cards.len(), 3);
        assert_eq!(block.overflow, Some(2));
        assert!(matches!(fragments[2], Fragment::Suggestions(_)));
    }

    #[test]
    fn test_data_without_parts_type_shows_no_cards() {
        let response = ServerResponse {
            kind: Some(ResponseKind::Text),
            data: Some(parts(2)),
            ..ServerResponse::default()
        };

        assert!(render(&response).is_empty());
    }

    #[test]
    fn test_empty_parts_list_shows_no_cards() {
        let response = ServerResponse {
            reply: Some("Nothing matched".to_string()),
            kind: Some(ResponseKind::Parts),
            data: Some(Vec::new()),
            ..ServerResponse::default()
        };

        assert_eq!(render(&response).len(), 1);
    }

    #[test]
    fn test_message_html_by_role() {
        let bot = ChatMessage::bot("**Hi**").to_html();
        let user = ChatMessage::user("**Hi** <b>").to_html();

        assert!(bot.contains(r#"class="message bot-message""#));
        assert!(bot.contains("<strong>Hi</strong>"));
        assert!(user.contains(r#"class="message user-message""#));
        assert!(user.contains("**Hi** &lt;b&gt;"));
    }

    const TAGS: &[&str] = &["a", "br", "button", "div", "span", "strong"];
    const ATTRIBUTES: &[&str] = &["class", "data-suggestion", "href", "rel", "target", "type"];

    const HOSTILE_INPUTS: &[&str] = &[
        "<script>alert(1)</script>",
        "<img src=x onerror=alert(1)>",
        r#""><svg onload=alert(1)>"#,
        "' onmouseover='alert(1)",
        "**<b>bold</b>**",
        "https://x.example/\"onclick=\"alert(1)",
        "https://x.example/?a=<script>",
        "javascript:alert(1)",
        "&lt;script&gt; already escaped",
        "🔧<span class=emoji>🔧</span>",
        "**https://x.example/🔧\"><i>**",
        "</div></div><div onclick=x>",
        "\u{0}<\u{0}script>",
    ];

    /// Every tag in `html` is one the renderer emits, with only the
    /// attributes it emits, and links only point at http(s) URLs.
    fn assert_known_markup(html: &str) {
        let tag = Regex::new(r"<[^>]*>").unwrap();
        let open = Regex::new(r#"^<([a-z]+)((?:\s[a-z-]+="[^"]*")*)>$"#).unwrap();
        let close = Regex::new(r"^</([a-z]+)>$").unwrap();
        let attribute = Regex::new(r#"\s([a-z-]+)="([^"]*)""#).unwrap();

        let outside = tag.replace_all(html, "");
        assert!(!outside.contains('<') && !outside.contains('>'), "stray bracket in {html}");

        for m in tag.find_iter(html) {
            let t = m.as_str();
            if let Some(caps) = close.captures(t) {
                assert!(TAGS.contains(&&caps[1]), "unexpected tag {t} in {html}");
                continue;
            }
            let caps = open
                .captures(t)
                .unwrap_or_else(|| panic!("malformed tag {t} in {html}"));
            assert!(TAGS.contains(&&caps[1]), "unexpected tag {t} in {html}");
            for attr in attribute.captures_iter(&caps[2]) {
                assert!(ATTRIBUTES.contains(&&attr[1]), "unexpected attribute in {t}");
                if &attr[1] == "href" {
                    assert!(attr[2].starts_with("http"), "unexpected link target in {t}");
                }
            }
        }
    }

    fn render_all(text: &str) -> [String; 3] {
        let card = PartCard::from_part(&Part {
            product_name: Some(text.to_string()),
            internal_reference: Some(text.to_string()),
            product_description: Some(text.to_string()),
            ..Part::default()
        });
        let mut card_html = String::new();
        card.write_html(&mut card_html);

        let mut chip_html = String::new();
        SuggestionChip::new(text).write_html(&mut chip_html);

        [markup::format_reply(text), card_html, chip_html]
    }

    #[test]
    fn test_hostile_text_never_becomes_markup() {
        for input in HOSTILE_INPUTS {
            for html in render_all(input) {
                assert_known_markup(&html);
            }
        }
    }

    fn fragment() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("<".to_string()),
            Just(">".to_string()),
            Just("\"".to_string()),
            Just("'".to_string()),
            Just("&".to_string()),
            Just("**".to_string()),
            Just("\n".to_string()),
            Just("https://".to_string()),
            Just("🔧".to_string()),
            Just("⚠️".to_string()),
            Just(" onerror=".to_string()),
            Just("script".to_string()),
            "[a-z./ ]{0,4}",
        ]
    }

    proptest! {
        #[test]
        fn prop_rendered_text_has_only_known_markup(
            parts in prop::collection::vec(fragment(), 0..16),
        ) {
            let text = parts.concat();
            for html in render_all(&text) {
                assert_known_markup(&html);
            }
        }

        #[test]
        fn prop_arbitrary_text_has_only_known_markup(text in any::<String>()) {
            for html in render_all(&text) {
                assert_known_markup(&html);
            }
        }
    }

    #[test]
    fn test_server_error_message_names_status() {
        assert!(server_error_message(503).contains("503"));
    }
}
