//! Mutable widget state.

use std::time::{Duration, Instant};

use crate::render::{Fragment, SuggestionRow};

/// Open/maximized state of the chat panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PanelState {
    pub open: bool,
    pub maximized: bool,
}

impl PanelState {
    pub fn open(&mut self) {
        self.open = true;
    }

    /// Close the panel. A closed panel is never maximized.
    pub fn close(&mut self) {
        self.open = false;
        self.maximized = false;
    }

    pub fn toggle(&mut self) {
        if self.open {
            self.close();
        } else {
            self.open();
        }
    }

    /// Flip maximized, opening the panel if needed.
    pub fn toggle_maximized(&mut self) {
        self.maximized = !self.maximized;
        if self.maximized {
            self.open = true;
        }
    }
}

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Error,
}

/// A transient message for the host to surface, e.g. as a toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub text: String,
    pub raised_at: Instant,
    pub ttl: Duration,
}

impl Notification {
    #[must_use]
    pub fn is_active(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.raised_at) < self.ttl
    }
}

/// Point-in-time copy of the widget state.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetSnapshot {
    pub session_id: String,
    pub log: Vec<Fragment>,
    pub input: String,
    pub busy: bool,
    pub send_count: u64,
    pub panel: PanelState,
}

#[derive(Debug, Default)]
pub(crate) struct WidgetState {
    pub(crate) log: Vec<Fragment>,
    pub(crate) input: String,
    /// Set while an exchange is pending; also drives the typing placeholder.
    pub(crate) busy: bool,
    pub(crate) send_count: u64,
    pub(crate) panel: PanelState,
    pub(crate) notifications: Vec<Notification>,
}

impl WidgetState {
    pub(crate) fn latest_suggestions(&self) -> Option<&SuggestionRow> {
        self.log.iter().rev().find_map(|fragment| match fragment {
            Fragment::Suggestions(row) => Some(row),
            _ => None,
        })
    }
}
