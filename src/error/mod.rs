//! Unified error handling for agentdeck.
//!
//! - **Error Categories**: high-level classification for handling decisions
//! - **Network Errors**: classified HTTP failures
//! - **Unified Error Type**: `DeckError` consolidates every error source
//! - **Result Type Alias**: `DeckResult<T>`
//!
//! Nothing here is fatal to a running session: controllers turn errors into
//! an inline chat message or a timeline error panel.
//!
//! | Category | Description | Retryable |
//! |----------|-------------|-----------|
//! | Network | Connection, timeout, socket loss | Yes |
//! | Server | Backend errors (5xx) | Yes |
//! | Protocol | Undecodable payloads | No |
//! | System | Filesystem errors | No |
//! | Configuration | Preference storage | No |

mod category;
mod deck_error;
mod network;
mod result;

pub use category::ErrorCategory;
pub use deck_error::DeckError;
pub use network::NetworkError;
pub use result::DeckResult;
