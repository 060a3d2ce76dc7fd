//! Transcript messages.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};

/// Who a message is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
    Error,
}

impl Role {
    /// Map a history entry role; anything but `user` is the assistant.
    pub fn from_history(role: &str) -> Self {
        if role == "user" {
            Role::User
        } else {
            Role::Assistant
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Error => "error",
        }
    }

    /// Author label shown in the message header.
    pub fn author(&self) -> &'static str {
        match self {
            Role::User => "You",
            Role::Assistant | Role::Error => "Agent",
        }
    }
}

/// One entry in the chat transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub content: String,
    pub role: Role,
    pub timestamp: DateTime<Local>,
}

impl Message {
    /// Create a message, resolving the server timestamp (if any) now.
    pub fn new(content: impl Into<String>, role: Role, timestamp: Option<&str>) -> Self {
        Self {
            content: content.into(),
            role,
            timestamp: resolve_timestamp(timestamp),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(content, Role::User, None)
    }

    pub fn assistant(content: impl Into<String>, timestamp: Option<&str>) -> Self {
        Self::new(content, Role::Assistant, timestamp)
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self::new(content, Role::Error, None)
    }

    /// `HH:MM`, 24-hour clock.
    pub fn time_label(&self) -> String {
        self.timestamp.format("%H:%M").to_string()
    }
}

/// Parse a server timestamp.
///
/// RFC 3339 values are converted to local time. Naive ISO values (what the
/// server's `datetime.now().isoformat()` produces) are already local.
/// Missing or unparsable values fall back to the current time.
pub fn resolve_timestamp(timestamp: Option<&str>) -> DateTime<Local> {
    let Some(raw) = timestamp.map(str::trim).filter(|s| !s.is_empty()) else {
        return Local::now();
    };

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.with_timezone(&Local);
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
        .unwrap_or_else(Local::now)
}
