//! Unified error type for agentdeck.

use std::fmt;

use super::category::ErrorCategory;
use super::network::NetworkError;
use crate::socket::codec::CodecError;
use crate::socket::SocketError;
use crate::traits::PreferenceError;

/// Unified error type for agentdeck.
///
/// Every fallible operation in the crate ends up here before it is shown
/// to the user as a single line of text.
#[derive(Debug)]
pub enum DeckError {
    /// HTTP-level failures talking to the agent server.
    Network(NetworkError),

    /// Socket.IO channel failures.
    Socket(SocketError),

    /// A payload that could not be decoded.
    Protocol { message: String },

    /// Preference storage failures.
    Preferences(PreferenceError),

    /// Local filesystem failures.
    Io(std::io::Error),
}

impl DeckError {
    /// Build a protocol error from anything printable.
    pub fn protocol(message: impl Into<String>) -> Self {
        DeckError::Protocol {
            message: message.into(),
        }
    }

    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            DeckError::Network(NetworkError::HttpStatus { status, .. }) if *status >= 500 => {
                ErrorCategory::Server
            }
            DeckError::Network(_) | DeckError::Socket(_) => ErrorCategory::Network,
            DeckError::Protocol { .. } => ErrorCategory::Protocol,
            DeckError::Preferences(_) => ErrorCategory::Configuration,
            DeckError::Io(_) => ErrorCategory::System,
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            DeckError::Network(err) => err.is_retryable(),
            DeckError::Socket(SocketError::SendFailed(_)) => false,
            DeckError::Socket(_) => true,
            _ => false,
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            DeckError::Network(err) => err.user_message(),
            DeckError::Socket(err) => format!("Socket error: {}", err),
            DeckError::Protocol { message } => {
                format!("Received an invalid response from the server: {}", message)
            }
            DeckError::Preferences(err) => format!("Could not save preferences: {}", err),
            DeckError::Io(err) => format!("File error: {}", err),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            DeckError::Network(err) => err.error_code(),
            DeckError::Socket(_) => "E_SOCKET",
            DeckError::Protocol { .. } => "E_PROTOCOL",
            DeckError::Preferences(_) => "E_PREFS",
            DeckError::Io(_) => "E_IO",
        }
    }

    /// Get the recovery hint for this error.
    pub fn recovery_hint(&self) -> &'static str {
        self.category().recovery_hint()
    }
}

impl fmt::Display for DeckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeckError::Network(err) => write!(f, "{}", err),
            DeckError::Socket(err) => write!(f, "{}", err),
            DeckError::Protocol { message } => write!(f, "Protocol error: {}", message),
            DeckError::Preferences(err) => write!(f, "{}", err),
            DeckError::Io(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for DeckError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DeckError::Network(err) => Some(err),
            DeckError::Socket(err) => Some(err),
            DeckError::Protocol { .. } => None,
            DeckError::Preferences(err) => Some(err),
            DeckError::Io(err) => Some(err),
        }
    }
}

impl From<NetworkError> for DeckError {
    fn from(err: NetworkError) -> Self {
        DeckError::Network(err)
    }
}

impl From<SocketError> for DeckError {
    fn from(err: SocketError) -> Self {
        DeckError::Socket(err)
    }
}

impl From<PreferenceError> for DeckError {
    fn from(err: PreferenceError) -> Self {
        DeckError::Preferences(err)
    }
}

impl From<CodecError> for DeckError {
    fn from(err: CodecError) -> Self {
        DeckError::protocol(err.to_string())
    }
}

impl From<std::io::Error> for DeckError {
    fn from(err: std::io::Error) -> Self {
        DeckError::Io(err)
    }
}

impl From<serde_json::Error> for DeckError {
    fn from(err: serde_json::Error) -> Self {
        DeckError::protocol(err.to_string())
    }
}
