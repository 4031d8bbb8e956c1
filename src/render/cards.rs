//! Part result cards.

use std::fmt::Write as _;

use super::markup::escape_html;
use crate::wire::Part;

/// Maximum number of cards shown for one response.
pub const MAX_CARDS: usize = 3;

/// Suffix appended to formatted prices.
pub const CURRENCY: &str = "DZD";

/// Shown instead of a price when the part has none.
pub const PRICE_PLACEHOLDER: &str = "Price on request";

/// Quantity below which stock is reported as low.
const LOW_STOCK_LIMIT: i64 = 5;

/// Stock level bucket of a part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockTier {
    /// Nothing on hand.
    OutOfStock,
    /// Between one and four units.
    Low,
    /// Five units or more.
    Available,
}

impl StockTier {
    #[must_use]
    pub fn for_quantity(quantity: i64) -> Self {
        match quantity {
            q if q <= 0 => Self::OutOfStock,
            q if q < LOW_STOCK_LIMIT => Self::Low,
            _ => Self::Available,
        }
    }

    /// CSS class for this tier, `None` when the tier is unqualified.
    #[must_use]
    pub fn class(self) -> Option<&'static str> {
        match self {
            Self::OutOfStock => Some("stock-out"),
            Self::Low => Some("stock-low"),
            Self::Available => None,
        }
    }

    /// Human-readable stock line.
    #[must_use]
    pub fn label(self, quantity: i64) -> String {
        match self {
            Self::OutOfStock => "Out of stock".to_string(),
            Self::Low => format!("Low stock: {quantity} left"),
            Self::Available => format!("In stock: {quantity}"),
        }
    }
}

/// Format a price with two decimals and the currency suffix.
#[must_use]
pub fn format_price(price: Option<f64>) -> String {
    match price {
        Some(p) if p.is_finite() => format!("{p:.2} {CURRENCY}"),
        _ => PRICE_PLACEHOLDER.to_string(),
    }
}

/// One rendered part.
#[derive(Debug, Clone, PartialEq)]
pub struct PartCard {
    pub name: String,
    pub reference: Option<String>,
    pub description: Option<String>,
    pub price: String,
    pub quantity: i64,
    pub tier: StockTier,
}

impl PartCard {
    /// Build a card, filling defaults for missing fields.
    #[must_use]
    pub fn from_part(part: &Part) -> Self {
        let quantity = part.quantity();
        Self {
            name: part
                .product_name
                .clone()
                .unwrap_or_else(|| "Spare part".to_string()),
            reference: part.internal_reference.clone(),
            description: part.product_description.clone(),
            price: format_price(part.sales_price),
            quantity,
            tier: StockTier::for_quantity(quantity),
        }
    }

    #[must_use]
    pub fn stock_label(&self) -> String {
        self.tier.label(self.quantity)
    }

    pub fn write_html(&self, out: &mut String) {
        out.push_str(r#"<div class="part-card">"#);
        let _ = write!(out, r#"<div class="part-name">{}</div>"#, escape_html(&self.name));
        if let Some(reference) = &self.reference {
            let _ = write!(
                out,
                r#"<div class="part-ref">Ref: {}</div>"#,
                escape_html(reference)
            );
        }
        if let Some(description) = &self.description {
            let _ = write!(
                out,
                r#"<div class="part-desc">{}</div>"#,
                escape_html(description)
            );
        }
        let stock_class = match self.tier.class() {
            Some(class) => format!("part-stock {class}"),
            None => "part-stock".to_string(),
        };
        let _ = write!(
            out,
            r#"<div class="part-footer"><span class="part-price">{}</span><span class="{stock_class}">{}</span></div>"#,
            escape_html(&self.price),
            escape_html(&self.stock_label()),
        );
        out.push_str("</div>");
    }
}

/// Cards for one response plus the count of results left out.
#[derive(Debug, Clone, PartialEq)]
pub struct PartsBlock {
    pub cards: Vec<PartCard>,
    /// Number of parts beyond [`MAX_CARDS`], `None` when all are shown.
    pub overflow: Option<usize>,
}

impl PartsBlock {
    /// Build the block for `parts`, or `None` when there is nothing to show.
    #[must_use]
    pub fn from_parts(parts: &[Part]) -> Option<Self> {
        if parts.is_empty() {
            return None;
        }
        let cards = parts.iter().take(MAX_CARDS).map(PartCard::from_part).collect();
        let overflow = (parts.len() > MAX_CARDS).then(|| parts.len() - MAX_CARDS);
        Some(Self { cards, overflow })
    }

    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::from(r#"<div class="parts-results">"#);
        for card in &self.cards {
            card.write_html(&mut out);
        }
        if let Some(more) = self.overflow {
            let _ = write!(out, r#"<div class="parts-more">+{more} more results</div>"#);
        }
        out.push_str("</div>");
        out
    }

    #[must_use]
    pub fn to_plain_text(&self) -> String {
        let mut lines = Vec::with_capacity(self.cards.len() + 1);
        for card in &self.cards {
            let mut line = format!("  - {}", card.name);
            if let Some(reference) = &card.reference {
                let _ = write!(line, " [{reference}]");
            }
            let _ = write!(line, " | {} | {}", card.price, card.stock_label());
            lines.push(line);
        }
        if let Some(more) = self.overflow {
            lines.push(format!("  +{more} more results"));
        }
        lines.join("\n")
    }
}
