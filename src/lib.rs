//! Spare-parts chat widget
//!
//! A headless chat widget that collects user text, posts it to a remote chat
//! endpoint and renders structured replies: formatted text, part result
//! cards and suggestion chips.
//!
//! # Architecture
//!
//! - **Session**: per-installation session token kept in local storage
//! - **Exchange**: single-flight JSON POST to the chat endpoint
//! - **Rendering**: escaped, formatted HTML fragments appended to a log
//!
//! # Modules
//!
//! - [`config`]: layered configuration and endpoint selection
//! - [`session`]: session token and local storage backends
//! - [`client`]: HTTP transport
//! - [`wire`]: request and response shapes
//! - [`render`]: response rendering and page shell
//! - [`widget`]: the widget state and operations
//! - [`telemetry`]: tracing setup for binaries

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]

pub mod client;
pub mod config;
pub mod error;
pub mod render;
pub mod session;
pub mod telemetry;
pub mod widget;
pub mod wire;

pub use client::{ChatTransport, HttpTransport};
pub use error::{Error, Result};
pub use widget::{ChatWidget, SendOutcome, WidgetOptions};
