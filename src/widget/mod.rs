//! The chat widget.
//!
//! [`ChatWidget`] ties the session token, the transport and the renderer
//! together and owns all UI state. Every operation is a method call on a
//! scoped instance; nothing is global.
//!
//! At most one exchange is in flight. A send issued while a reply is pending
//! is dropped, not queued.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use parts_chat_widget::client::HttpTransport;
//! use parts_chat_widget::session::MemoryStorage;
//! use parts_chat_widget::widget::{ChatWidget, WidgetOptions};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = Arc::new(HttpTransport::new("http://localhost:5000/api/chat")?);
//! let widget = ChatWidget::new(transport, &MemoryStorage::new(), WidgetOptions::default());
//!
//! widget.send("Search Parts").await;
//! println!("{}", widget.render_log_html());
//! # Ok(())
//! # }
//! ```

mod state;

pub use state::{Notification, NotificationLevel, PanelState, WidgetSnapshot};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::client::{ChatTransport, HttpTransport};
use crate::config::WidgetConfig;
use crate::error::{Error, Result};
use crate::render::{self, ChatMessage, Fragment, SuggestionRow, page};
use crate::session::{FileStorage, LocalStorage, get_or_create_session_id};
use crate::wire::{ChatRequest, ServerResponse};
use state::WidgetState;

/// Constructor-injected widget settings.
#[derive(Debug, Clone)]
pub struct WidgetOptions {
    /// Local storage key holding the session token.
    pub storage_key: String,
    /// Lifetime of raised notifications.
    pub notification_ttl: Duration,
}

impl Default for WidgetOptions {
    fn default() -> Self {
        Self {
            storage_key: "imobot_session_id".to_string(),
            notification_ttl: Duration::from_secs(4),
        }
    }
}

/// Why a send was not performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Nothing left after trimming.
    EmptyMessage,
    /// Another exchange is pending.
    Busy,
}

/// Result of a send attempt. Every failure has already been reported in the
/// message log by the time this is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// No request was made.
    Ignored(IgnoreReason),
    /// The response was rendered.
    Delivered,
    /// The server answered with a non-success status.
    ServerError { status: u16 },
    /// No response arrived.
    ConnectionError,
}

/// A chat widget bound to one endpoint and one session.
pub struct ChatWidget {
    transport: Arc<dyn ChatTransport>,
    session_id: String,
    notification_ttl: Duration,
    state: Mutex<WidgetState>,
}

impl std::fmt::Debug for ChatWidget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatWidget")
            .field("session_id", &self.session_id)
            .field("notification_ttl", &self.notification_ttl)
            .finish_non_exhaustive()
    }
}

/// Clears the busy flag when the exchange ends, including when the pending
/// future is dropped.
struct InFlight<'a> {
    widget: &'a ChatWidget,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.widget.state().busy = false;
    }
}

impl ChatWidget {
    /// Create a widget. The session token is read from (or written to)
    /// `storage` once, here.
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        storage: &dyn LocalStorage,
        options: WidgetOptions,
    ) -> Self {
        let session_id = get_or_create_session_id(storage, &options.storage_key);
        Self {
            transport,
            session_id,
            notification_ttl: options.notification_ttl,
            state: Mutex::new(WidgetState::default()),
        }
    }

    /// Build an HTTP-backed widget with file storage from configuration.
    pub fn from_config(config: &WidgetConfig) -> Result<Self> {
        let endpoint = config.chat_url()?;
        let transport = match config.endpoint.request_timeout() {
            Some(timeout) => HttpTransport::with_timeout(endpoint.as_str(), timeout)?,
            None => HttpTransport::new(endpoint.as_str())?,
        };
        let storage = FileStorage::new(&config.storage.path);
        let options = WidgetOptions {
            storage_key: config.storage.key.clone(),
            notification_ttl: config.notifications.ttl(),
        };

        info!(
            name: "widget.configured",
            endpoint = %endpoint,
            hostname = %config.page.hostname,
            "Chat widget configured"
        );
        Ok(Self::new(Arc::new(transport), &storage, options))
    }

    fn state(&self) -> MutexGuard<'_, WidgetState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get the session token attached to every request.
    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Input
    // ─────────────────────────────────────────────────────────────────────────

    pub fn set_input(&self, text: impl Into<String>) {
        self.state().input = text.into();
    }

    #[must_use]
    pub fn input(&self) -> String {
        self.state().input.clone()
    }

    /// Send the current input text.
    pub async fn submit(&self) -> SendOutcome {
        let text = self.input();
        self.send(&text).await
    }

    /// Copy a suggestion label into the input and send it.
    pub async fn click_suggestion(&self, label: &str) -> SendOutcome {
        self.set_input(label);
        self.submit().await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Exchange
    // ─────────────────────────────────────────────────────────────────────────

    /// Send `text` to the chat endpoint and render the outcome.
    ///
    /// Blank text and sends while another exchange is pending are ignored
    /// without touching the log.
    pub async fn send(&self, text: &str) -> SendOutcome {
        let text = text.trim();
        if text.is_empty() {
            return SendOutcome::Ignored(IgnoreReason::EmptyMessage);
        }

        let send_count = {
            let mut st = self.state();
            if st.busy {
                return SendOutcome::Ignored(IgnoreReason::Busy);
            }
            st.log.push(Fragment::Message(ChatMessage::user(text)));
            st.input.clear();
            st.send_count += 1;
            st.busy = true;
            st.send_count
        };
        let in_flight = InFlight { widget: self };

        info!(
            name: "chat.exchange.started",
            session_id = %self.session_id,
            send_count,
            "Sending chat message"
        );

        let request = ChatRequest::new(text, &self.session_id);
        let result = self.transport.exchange(&request).await;

        let outcome = self.complete(result);
        drop(in_flight);
        outcome
    }

    fn complete(&self, result: Result<ServerResponse>) -> SendOutcome {
        let mut st = self.state();
        st.busy = false;

        match result {
            Ok(response) => {
                let fragments = render::render(&response);
                info!(
                    name: "chat.exchange.completed",
                    fragments = fragments.len(),
                    parts = response.data.as_ref().map_or(0, Vec::len),
                    "Chat response rendered"
                );
                st.log.extend(fragments);
                SendOutcome::Delivered
            }
            Err(Error::Server { status }) => {
                warn!(name: "chat.exchange.server_error", status, "Chat endpoint returned an error status");
                st.log
                    .push(Fragment::Message(ChatMessage::bot(render::server_error_message(status))));
                self.raise(&mut st, format!("Server error ({status})"));
                SendOutcome::ServerError { status }
            }
            Err(e) => {
                warn!(name: "chat.exchange.failed", error = %e, "Chat request did not complete");
                st.log
                    .push(Fragment::Message(ChatMessage::bot(render::CONNECTION_ERROR_MESSAGE)));
                self.raise(&mut st, "Connection error. Please try again.".to_string());
                SendOutcome::ConnectionError
            }
        }
    }

    fn raise(&self, st: &mut WidgetState, text: String) {
        let now = Instant::now();
        st.notifications.retain(|n| n.is_active(now));
        st.notifications.push(Notification {
            level: NotificationLevel::Error,
            text,
            raised_at: now,
            ttl: self.notification_ttl,
        });
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Panel
    // ─────────────────────────────────────────────────────────────────────────

    #[must_use]
    pub fn panel(&self) -> PanelState {
        self.state().panel
    }

    pub fn open(&self) {
        self.state().panel.open();
    }

    pub fn close(&self) {
        self.state().panel.close();
    }

    pub fn toggle(&self) {
        self.state().panel.toggle();
    }

    pub fn toggle_maximized(&self) {
        self.state().panel.toggle_maximized();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Views
    // ─────────────────────────────────────────────────────────────────────────

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.state().busy
    }

    /// Number of exchanges started so far.
    #[must_use]
    pub fn send_count(&self) -> u64 {
        self.state().send_count
    }

    #[must_use]
    pub fn log(&self) -> Vec<Fragment> {
        self.state().log.clone()
    }

    #[must_use]
    pub fn log_len(&self) -> usize {
        self.state().log.len()
    }

    /// Fragments appended at or after position `start`.
    #[must_use]
    pub fn fragments_since(&self, start: usize) -> Vec<Fragment> {
        self.state().log.get(start..).map(<[_]>::to_vec).unwrap_or_default()
    }

    /// The most recently rendered suggestion chips.
    #[must_use]
    pub fn latest_suggestions(&self) -> Option<SuggestionRow> {
        self.state().latest_suggestions().cloned()
    }

    /// Notifications still within their lifetime.
    #[must_use]
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications_at(Instant::now())
    }

    /// Notifications active at `now`; expired ones are discarded.
    #[must_use]
    pub fn notifications_at(&self, now: Instant) -> Vec<Notification> {
        let mut st = self.state();
        st.notifications.retain(|n| n.is_active(now));
        st.notifications.clone()
    }

    #[must_use]
    pub fn snapshot(&self) -> WidgetSnapshot {
        let st = self.state();
        WidgetSnapshot {
            session_id: self.session_id.clone(),
            log: st.log.clone(),
            input: st.input.clone(),
            busy: st.busy,
            send_count: st.send_count,
            panel: st.panel,
        }
    }

    /// The message log as HTML, with the typing placeholder while busy.
    #[must_use]
    pub fn render_log_html(&self) -> String {
        let st = self.state();
        page::render_log(&st.log, st.busy)
    }

    /// A full HTML page embedding the widget in its current state.
    #[must_use]
    pub fn render_page(&self, title: &str) -> String {
        page::widget_page(title, &self.snapshot())
    }
}
