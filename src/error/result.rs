//! Result type alias for agentdeck operations.

use super::deck_error::DeckError;

/// Type alias for Results using [`DeckError`].
pub type DeckResult<T> = Result<T, DeckError>;
