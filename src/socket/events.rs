//! Typed Socket.IO events exchanged with the agent server.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::codec::encode_event;

/// `join_session` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinSession {
    pub session_id: String,
    pub agent_name: String,
}

/// `chat_message` payload. Same shape as the REST `POST /api/chat` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessageEvent {
    pub message: String,
    pub session_id: String,
    pub app_name: String,
}

/// Events sent to the server.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    JoinSession(JoinSession),
    ChatMessage(ChatMessageEvent),
    /// Keepalive; carries no payload
    Ping,
}

impl ClientEvent {
    /// Socket.IO event name.
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::JoinSession(_) => "join_session",
            ClientEvent::ChatMessage(_) => "chat_message",
            ClientEvent::Ping => "ping",
        }
    }

    /// Event argument, if any.
    pub fn payload(&self) -> Option<Value> {
        let value = match self {
            ClientEvent::JoinSession(join) => serde_json::to_value(join),
            ClientEvent::ChatMessage(msg) => serde_json::to_value(msg),
            ClientEvent::Ping => return None,
        };
        // Plain string structs always serialize
        value.ok()
    }

    /// Encode as a Socket.IO text frame.
    pub fn to_frame(&self) -> String {
        encode_event(self.name(), self.payload().as_ref())
    }
}

/// Initial server greeting.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Connected {
    #[serde(default)]
    pub status: Option<String>,
}

/// Acknowledgement of `join_session`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Joined {
    pub session_id: String,
    #[serde(default)]
    pub agent_name: Option<String>,
}

/// One message of a replayed session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: String,
    pub content: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Prior messages of the joined session.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionHistory {
    #[serde(default)]
    pub messages: Vec<HistoryEntry>,
}

/// A complete agent reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    pub response: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Typing indicator toggle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentTyping {
    pub typing: bool,
}

/// Agent-side failure while handling a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentError {
    pub error: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Descriptive agent metadata. Only `icon` is used for rendering.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AgentInfo {
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Server-side validation failure (`error` event).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerFault {
    pub error: String,
}

/// Events pushed by the server.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    Connected(Connected),
    Joined(Joined),
    SessionHistory(SessionHistory),
    AgentResponse(AgentResponse),
    AgentTyping(AgentTyping),
    AgentError(AgentError),
    AgentInfo(AgentInfo),
    Error(ServerFault),
    /// Any event name this client does not know
    Unknown { name: String, data: Value },
}

impl ServerEvent {
    /// Decode an event from its Socket.IO name and first argument.
    pub fn decode(name: &str, data: Value) -> Result<Self, serde_json::Error> {
        let event = match name {
            "connected" => ServerEvent::Connected(from_data(data)?),
            "joined" => ServerEvent::Joined(serde_json::from_value(data)?),
            "session_history" => ServerEvent::SessionHistory(from_data(data)?),
            "agent_response" => ServerEvent::AgentResponse(serde_json::from_value(data)?),
            "agent_typing" => ServerEvent::AgentTyping(serde_json::from_value(data)?),
            "agent_error" => ServerEvent::AgentError(serde_json::from_value(data)?),
            "agent_info" => ServerEvent::AgentInfo(from_data(data)?),
            "error" => ServerEvent::Error(serde_json::from_value(data)?),
            _ => ServerEvent::Unknown {
                name: name.to_string(),
                data,
            },
        };
        Ok(event)
    }

    /// Socket.IO event name.
    pub fn name(&self) -> &str {
        match self {
            ServerEvent::Connected(_) => "connected",
            ServerEvent::Joined(_) => "joined",
            ServerEvent::SessionHistory(_) => "session_history",
            ServerEvent::AgentResponse(_) => "agent_response",
            ServerEvent::AgentTyping(_) => "agent_typing",
            ServerEvent::AgentError(_) => "agent_error",
            ServerEvent::AgentInfo(_) => "agent_info",
            ServerEvent::Error(_) => "error",
            ServerEvent::Unknown { name, .. } => name,
        }
    }
}

/// Events whose payload is all-optional accept a missing argument.
fn from_data<T: serde::de::DeserializeOwned + Default>(data: Value) -> Result<T, serde_json::Error> {
    if data.is_null() {
        Ok(T::default())
    } else {
        serde_json::from_value(data)
    }
}
