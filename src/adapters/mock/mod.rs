//! Mock implementations for testing.
//!
//! # Available Mocks
//!
//! - [`MockHttpClient`] - HTTP client with configurable responses
//! - [`MockSocket`] - Socket channel with event injection
//! - [`InMemoryPreferences`] - In-memory preference storage

pub mod http;
pub mod preferences;
pub mod socket;

pub use http::{MockHttpClient, MockResponse, RecordedRequest};
pub use preferences::InMemoryPreferences;
pub use socket::MockSocket;
