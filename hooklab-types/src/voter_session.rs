//! Client-side voter identity.
//!
//! Every vote carries an opaque session id so that one voter's events can be
//! grouped without an account. The id is generated on first use, cached for
//! the lifetime of the process and only replaced after [`clear`].

use chrono::Utc;
use once_cell::sync::Lazy;
use std::sync::Mutex;
use uuid::Uuid;

static CURRENT: Lazy<Mutex<Option<String>>> = Lazy::new(|| Mutex::new(None));

/// Get the voter session id, generating one on first call
pub fn current() -> String {
    let mut guard = CURRENT.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.get_or_insert_with(generate).clone()
}

/// Forget the cached id; the next [`current`] call creates a new one
pub fn clear() {
    let mut guard = CURRENT.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = None;
}

/// Build a fresh id of the form `session-<unix millis>-<13 random chars>`
pub fn generate() -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!("session-{}-{}", Utc::now().timestamp_millis(), &random[..13])
}
