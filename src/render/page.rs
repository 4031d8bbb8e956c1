//! Host page shell.
//!
//! The page carries every element the widget binds to: the message log, the
//! text input, the send button, the particle container and the panel
//! controls. Panel state is expressed as classes on the widget root.

use std::fmt::Write as _;

use super::Fragment;
use super::markup::escape_html;
use crate::widget::WidgetSnapshot;

/// Placeholder appended to the log while a response is pending.
pub const TYPING_INDICATOR: &str = r#"<div class="message bot-message typing-indicator" id="typingIndicator"><span></span><span></span><span></span></div>"#;

/// Render the message log, with the typing placeholder when `typing`.
#[must_use]
pub fn render_log(log: &[Fragment], typing: bool) -> String {
    let mut out = String::from(r#"<div class="chat-messages" id="chatMessages" aria-live="polite">"#);
    for fragment in log {
        out.push_str(&fragment.to_html());
    }
    if typing {
        out.push_str(TYPING_INDICATOR);
    }
    out.push_str("</div>");
    out
}

/// Render a complete HTML document embedding the widget in its current
/// state.
#[must_use]
pub fn widget_page(title: &str, snapshot: &WidgetSnapshot) -> String {
    let title = escape_html(title);
    let mut root_class = String::from("chat-widget");
    if snapshot.panel.open {
        root_class.push_str(" open");
    }
    if snapshot.panel.maximized {
        root_class.push_str(" maximized");
    }
    let disabled = if snapshot.busy { " disabled" } else { "" };
    let log = render_log(&snapshot.log, snapshot.busy);
    let input = escape_html(&snapshot.input);

    let mut page = String::new();
    let _ = write!(
        page,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title}</title>
    <link rel="stylesheet" href="/static/chat-widget.css">
</head>
<body>
    <div class="particles" id="particles" aria-hidden="true"></div>
    <button type="button" class="chat-toggle" id="chatToggle" aria-label="Open chat">💬</button>
    <section class="{root_class}" id="chatWidget" data-session-id="{session}">
        <header class="chat-header">
            <span class="chat-title">{title}</span>
            <button type="button" class="chat-resize" id="chatResize" aria-label="Resize chat">⤢</button>
            <button type="button" class="chat-close" id="chatClose" aria-label="Close chat">✕</button>
        </header>
        {log}
        <div class="chat-input-area">
            <input type="text" id="messageInput" class="message-input" placeholder="Type your message..." value="{input}" autocomplete="off"{disabled}>
            <button type="button" id="sendButton" class="send-button"{disabled}>Send</button>
        </div>
    </section>
</body>
</html>
"#,
        session = escape_html(&snapshot.session_id),
    );
    page
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::ChatMessage;
    use crate::widget::PanelState;

    fn snapshot(busy: bool, panel: PanelState) -> WidgetSnapshot {
        WidgetSnapshot {
            session_id: "session_1_abcdefgh".to_string(),
            log: vec![Fragment::Message(ChatMessage::user("<hello>"))],
            input: "draft \"text\"".to_string(),
            busy,
            send_count: 1,
            panel,
        }
    }

    #[test]
    fn test_log_with_typing_indicator() {
        let log = vec![Fragment::Message(ChatMessage::bot("Hi"))];

        assert!(render_log(&log, true).contains("typing-indicator"));
        assert!(!render_log(&log, false).contains("typing-indicator"));
    }

    #[test]
    fn test_page_contains_dom_surface() {
        let page = widget_page("Parts <Assistant>", &snapshot(false, PanelState::default()));

        for id in ["chatMessages", "messageInput", "sendButton", "particles", "chatToggle", "chatClose", "chatResize"] {
            assert!(page.contains(&format!(r#"id="{id}""#)), "missing #{id}");
        }
        assert!(page.contains("<title>Parts &lt;Assistant&gt;</title>"));
        assert!(page.contains("&lt;hello&gt;"));
        assert!(page.contains(r#"value="draft &quot;text&quot;""#));
        assert!(page.contains(r#"class="chat-widget""#));
        assert!(!page.contains(" disabled"));
    }

    #[test]
    fn test_page_reflects_panel_and_busy_state() {
        let panel = PanelState {
            open: true,
            maximized: true,
        };
        let page = widget_page("Chat", &snapshot(true, panel));

        assert!(page.contains(r#"class="chat-widget open maximized""#));
        assert!(page.contains("typing-indicator"));
        assert!(page.contains(r#"id="sendButton" class="send-button" disabled"#));
    }
}
