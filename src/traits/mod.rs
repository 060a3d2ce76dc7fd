//! Trait abstractions for dependency injection and testability.
//!
//! # Traits
//!
//! - [`HttpClient`] - HTTP client operations (GET, POST, DELETE)
//! - [`SocketConnection`] - Socket.IO event channel
//! - [`PreferenceStore`] - Persisted user preferences

pub mod http;
pub mod preferences;
pub mod socket;

pub use http::{Headers, HttpClient, HttpError, Response};
pub use preferences::{PreferenceError, PreferenceStore};
pub use socket::SocketConnection;
