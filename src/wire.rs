//! Request and response shapes exchanged with the chat endpoint.
//!
//! Responses are decoded leniently: any valid JSON document becomes a
//! [`ServerResponse`], and fields of the wrong type read as absent. The
//! renderer can then rely on every field having a usable default.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The user's message, already trimmed.
    pub message: String,
    /// Session token correlating the conversation.
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            session_id: session_id.into(),
        }
    }
}

/// Declared shape of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    /// Plain reply.
    Text,
    /// Reply accompanied by catalog parts in `data`.
    Parts,
    /// Any value this widget does not know about.
    #[serde(other)]
    Other,
}

/// Decoded chat endpoint response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct ServerResponse {
    /// Bot reply text, `None` when missing or empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
    /// Declared response shape.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ResponseKind>,
    /// Catalog parts; `None` when missing, null or not an array.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<Part>>,
    /// Quick-reply labels.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
    /// Session token echoed by the server.
    #[serde(rename = "sessionId", skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Diagnostic attached by the server to failed requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ServerResponse {
    /// Response carrying only a reply.
    pub fn reply(text: impl Into<String>) -> Self {
        Self {
            reply: Some(text.into()),
            ..Self::default()
        }
    }

    /// Whether the response declares a parts listing.
    #[must_use]
    pub fn is_parts(&self) -> bool {
        self.kind == Some(ResponseKind::Parts)
    }
}

impl From<Value> for ServerResponse {
    fn from(value: Value) -> Self {
        let Value::Object(obj) = value else {
            return Self::default();
        };

        let kind = obj
            .get("type")
            .and_then(Value::as_str)
            .map(|s| match s.to_ascii_lowercase().as_str() {
                "text" => ResponseKind::Text,
                "parts" => ResponseKind::Parts,
                _ => ResponseKind::Other,
            });

        let data = obj
            .get("data")
            .and_then(Value::as_array)
            .map(|items| items.iter().cloned().map(Part::from).collect());

        let suggestions = obj
            .get("suggestions")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            reply: text_field(&obj, "reply"),
            kind,
            data,
            suggestions,
            session_id: text_field(&obj, "sessionId"),
            error: text_field(&obj, "error"),
        }
    }
}

/// A spare-parts catalog item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_description: Option<String>,
    /// Unit price; the server may send it as a number or a decimal string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sales_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity_on_hand: Option<i64>,
}

impl Part {
    /// Units in stock, zero when unknown.
    #[must_use]
    pub fn quantity(&self) -> i64 {
        self.quantity_on_hand.unwrap_or(0)
    }
}

impl From<Value> for Part {
    fn from(value: Value) -> Self {
        let Value::Object(obj) = value else {
            return Self::default();
        };

        Self {
            product_name: text_field(&obj, "product_name"),
            internal_reference: text_field(&obj, "internal_reference"),
            product_description: text_field(&obj, "product_description"),
            sales_price: number_field(&obj, "sales_price"),
            quantity_on_hand: obj.get("quantity_on_hand").and_then(|v| match v {
                Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            }),
        }
    }
}

/// Body of `GET /api/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub database: Option<String>,
}

/// Non-empty string field; numbers are accepted in their string form.
fn text_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Finite number field; numeric strings are parsed.
fn number_field(obj: &Map<String, Value>, key: &str) -> Option<f64> {
    let n = match obj.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}
