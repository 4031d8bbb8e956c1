//! Session identifier management.
//!
//! Every request carries a session token that lets the server correlate the
//! conversation. The token is created once and kept in local storage; when
//! storage cannot be used the token still works, but only for the lifetime
//! of the current widget.
//!
//! # Example
//!
//! ```rust
//! use parts_chat_widget::session::{MemoryStorage, get_or_create_session_id};
//!
//! let storage = MemoryStorage::new();
//! let first = get_or_create_session_id(&storage, "chat_session");
//! let second = get_or_create_session_id(&storage, "chat_session");
//!
//! assert!(first.starts_with("session_"));
//! assert_eq!(first, second);
//! ```

mod storage;

pub use storage::{FileStorage, LocalStorage, MemoryStorage, UnavailableStorage};

use chrono::Utc;
use rand::Rng;
use rand::distributions::Alphanumeric;
use tracing::{debug, info, warn};

/// Length of the random suffix of a generated token.
const RANDOM_SUFFIX_LEN: usize = 8;

/// Return the stored session token, creating and persisting one if needed.
///
/// Storage failures are never fatal: a read failure is treated as "no token"
/// and a write failure leaves the fresh token valid for this process only.
pub fn get_or_create_session_id(storage: &dyn LocalStorage, key: &str) -> String {
    match storage.get_item(key) {
        Ok(Some(existing)) if !existing.trim().is_empty() => {
            debug!(name: "session.restored", key = %key, "Session token restored");
            return existing;
        }
        Ok(_) => {}
        Err(e) => {
            warn!(name: "session.storage.read_failed", key = %key, error = %e, "Local storage read failed");
        }
    }

    let token = generate_session_id();
    if let Err(e) = storage.set_item(key, &token) {
        warn!(
            name: "session.storage.write_failed",
            key = %key,
            error = %e,
            "Session token not persisted; valid for this page only"
        );
    }

    info!(name: "session.created", session_id = %token, "Session token created");
    token
}

/// Build a new token: `session_<unix millis>_<8 random alphanumerics>`.
#[must_use]
pub fn generate_session_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RANDOM_SUFFIX_LEN)
        .map(char::from)
        .collect();
    format!("session_{}_{suffix}", Utc::now().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;

    /// Storage that reads fine but refuses writes.
    struct ReadOnlyStorage;

    impl LocalStorage for ReadOnlyStorage {
        fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn set_item(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable)
        }
    }

    fn assert_token_shape(token: &str) {
        let mut parts = token.splitn(3, '_');
        assert_eq!(parts.next(), Some("session"));

        let millis = parts.next().unwrap();
        assert!(millis.parse::<i64>().unwrap() > 0);

        let suffix = parts.next().unwrap();
        assert_eq!(suffix.len(), RANDOM_SUFFIX_LEN);
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generated_token_shape() {
        assert_token_shape(&generate_session_id());
    }

    #[test]
    fn test_token_is_persisted_and_reused() {
        let storage = MemoryStorage::new();
        let first = get_or_create_session_id(&storage, "sid");

        assert_eq!(storage.get_item("sid").unwrap().as_deref(), Some(first.as_str()));
        assert_eq!(get_or_create_session_id(&storage, "sid"), first);
    }

    #[test]
    fn test_existing_token_is_returned_verbatim() {
        let storage = MemoryStorage::new();
        storage.set_item("sid", "legacy-token").unwrap();

        assert_eq!(get_or_create_session_id(&storage, "sid"), "legacy-token");
    }

    #[test]
    fn test_blank_token_is_replaced() {
        let storage = MemoryStorage::new();
        storage.set_item("sid", "   ").unwrap();

        let token = get_or_create_session_id(&storage, "sid");
        assert_token_shape(&token);
    }

    #[test]
    fn test_unavailable_storage_still_yields_token() {
        let token = get_or_create_session_id(&UnavailableStorage, "sid");
        assert_token_shape(&token);
    }

    #[test]
    fn test_write_failure_is_swallowed() {
        let token = get_or_create_session_id(&ReadOnlyStorage, "sid");
        assert_token_shape(&token);
    }
}
