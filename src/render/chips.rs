//! Suggestion chips.

use std::fmt::Write as _;

use super::markup::escape_html;

/// Keyword to icon table, tested in order against the lowercased label.
const CHIP_ICONS: &[(&str, &str)] = &[
    ("search", "🔍"),
    ("track", "📦"),
    ("report", "📝"),
    ("yes", "✅"),
    ("no", "❌"),
    ("skip", "⏭️"),
    ("order", "🛒"),
    ("continue", "➡️"),
    ("reference", "📋"),
    ("part", "🔧"),
];

/// Icon used when no keyword matches.
const DEFAULT_ICON: &str = "💬";

/// Pick the icon for a chip label. First matching keyword wins.
#[must_use]
pub fn icon_for(label: &str) -> &'static str {
    let label = label.to_lowercase();
    CHIP_ICONS
        .iter()
        .find(|&&(keyword, _)| label.contains(keyword))
        .map_or(DEFAULT_ICON, |&(_, icon)| icon)
}

/// A quick-reply button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionChip {
    pub label: String,
    pub icon: &'static str,
}

impl SuggestionChip {
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into();
        let icon = icon_for(&label);
        Self { label, icon }
    }

    pub fn write_html(&self, out: &mut String) {
        let label = escape_html(&self.label);
        let _ = write!(
            out,
            r#"<button type="button" class="suggestion-chip" data-suggestion="{label}"><span class="chip-icon">{}</span>{label}</button>"#,
            self.icon
        );
    }
}

/// The chips offered by one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionRow {
    pub chips: Vec<SuggestionChip>,
}

impl SuggestionRow {
    /// Build a row, or `None` when there are no labels.
    #[must_use]
    pub fn from_labels(labels: &[String]) -> Option<Self> {
        if labels.is_empty() {
            return None;
        }
        Some(Self {
            chips: labels.iter().map(SuggestionChip::new).collect(),
        })
    }

    /// Chip at 1-based `position`, as numbered in the terminal front-end.
    #[must_use]
    pub fn chip(&self, position: usize) -> Option<&SuggestionChip> {
        position.checked_sub(1).and_then(|i| self.chips.get(i))
    }

    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::from(r#"<div class="suggestions">"#);
        for chip in &self.chips {
            chip.write_html(&mut out);
        }
        out.push_str("</div>");
        out
    }

    #[must_use]
    pub fn to_plain_text(&self) -> String {
        self.chips
            .iter()
            .enumerate()
            .map(|(i, chip)| format!("[#{}] {} {}", i + 1, chip.icon, chip.label))
            .collect::<Vec<_>>()
            .join("  ")
    }
}
