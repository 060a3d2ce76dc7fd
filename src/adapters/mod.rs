//! Concrete implementations of trait abstractions.
//!
//! # Adapters
//!
//! - [`ReqwestHttpClient`] - HTTP client using reqwest
//! - [`SocketIoConnection`] - Socket.IO channel over tokio-tungstenite
//! - [`FilePreferences`] - JSON file preference storage
//!
//! # Mock Implementations
//!
//! The [`mock`] submodule provides test doubles for all adapters:
//! - [`mock::MockHttpClient`] - Configurable HTTP responses
//! - [`mock::MockSocket`] - Event injection for testing
//! - [`mock::InMemoryPreferences`] - In-memory preference storage

pub mod file_preferences;
pub mod mock;
pub mod reqwest_http;
pub mod socketio_ws;

pub use file_preferences::FilePreferences;
pub use mock::{InMemoryPreferences, MockHttpClient, MockResponse, MockSocket};
pub use reqwest_http::ReqwestHttpClient;
pub use socketio_ws::SocketIoConnection;
