//! Runtime configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::api::DEFAULT_SERVER_URL;
use crate::socket::SocketClientConfig;

pub const DEFAULT_AGENT: &str = "oracle_agent";

/// Configuration shared by the chat and timeline front ends.
///
/// Use the builder methods to customize it.
///
/// # Example
///
/// ```ignore
/// use agentdeck::config::DeckConfig;
///
/// let config = DeckConfig::from_env()
///     .with_agent_name("tax_advisor_agent")
///     .with_poll_delay(Duration::from_secs(1));
/// ```
#[derive(Debug, Clone)]
pub struct DeckConfig {
    /// Agent server base URL (default: http://localhost:5000)
    pub server_url: String,
    /// Agent app to chat with
    pub agent_name: String,
    /// Session id; also used as the user id for session deletion
    pub session_id: String,
    pub max_reconnect_attempts: u8,
    pub reconnect_delay: Duration,
    /// Interval between keepalive pings while connected
    pub keepalive_interval: Duration,
    /// Re-poll delay while an analysis is pending
    pub poll_delay: Duration,
    /// Delay between triggering an analysis and the first poll
    pub trigger_delay: Duration,
    /// Where transcript exports are written
    pub export_dir: PathBuf,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            agent_name: DEFAULT_AGENT.to_string(),
            session_id: uuid::Uuid::new_v4().to_string(),
            max_reconnect_attempts: 5,
            reconnect_delay: Duration::from_millis(1000),
            keepalive_interval: Duration::from_secs(30),
            poll_delay: Duration::from_secs(3),
            trigger_delay: Duration::from_secs(2),
            export_dir: PathBuf::from("."),
        }
    }
}

impl DeckConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = url.into();
        self
    }

    pub fn with_agent_name(mut self, agent_name: impl Into<String>) -> Self {
        self.agent_name = agent_name.into();
        self
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }

    pub fn with_reconnect(mut self, max_attempts: u8, delay: Duration) -> Self {
        self.max_reconnect_attempts = max_attempts;
        self.reconnect_delay = delay;
        self
    }

    pub fn with_keepalive_interval(mut self, interval: Duration) -> Self {
        self.keepalive_interval = interval;
        self
    }

    pub fn with_poll_delay(mut self, delay: Duration) -> Self {
        self.poll_delay = delay;
        self
    }

    pub fn with_trigger_delay(mut self, delay: Duration) -> Self {
        self.trigger_delay = delay;
        self
    }

    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_dir = dir.into();
        self
    }

    /// Read `AGENTDECK_SERVER`, `AGENTDECK_AGENT`, `AGENTDECK_SESSION` and
    /// `AGENTDECK_EXPORT_DIR`; unset or empty variables keep the defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(url) = env_value("AGENTDECK_SERVER") {
            config = config.with_server_url(url);
        }
        if let Some(agent) = env_value("AGENTDECK_AGENT") {
            config = config.with_agent_name(agent);
        }
        if let Some(session) = env_value("AGENTDECK_SESSION") {
            config = config.with_session_id(session);
        }
        if let Some(dir) = env_value("AGENTDECK_EXPORT_DIR") {
            config = config.with_export_dir(dir);
        }

        config
    }

    /// Socket client settings derived from this configuration.
    pub fn socket_config(&self) -> SocketClientConfig {
        SocketClientConfig {
            server_url: self.server_url.clone(),
            max_reconnect_attempts: self.max_reconnect_attempts,
            reconnect_delay: self.reconnect_delay,
            ..SocketClientConfig::default()
        }
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
