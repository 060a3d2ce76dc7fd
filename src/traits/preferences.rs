//! Preference storage trait abstraction.
//!
//! A small string key-value store for settings that outlive a session,
//! such as the chat theme.

use thiserror::Error;

/// Preference storage errors.
#[derive(Debug, Error)]
pub enum PreferenceError {
    /// The backing file could not be read or written
    #[error("preference file error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file is not valid JSON
    #[error("preference file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// No location is available to store preferences
    #[error("no configuration directory available")]
    NoConfigDir,
}

/// Trait for persisted user preferences.
///
/// Reads never fail: a missing or unreadable value is `None` and the caller
/// falls back to its default.
pub trait PreferenceStore: Send + Sync {
    /// Read a stored value.
    fn get(&self, key: &str) -> Option<String>;

    /// Store a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError>;
}
