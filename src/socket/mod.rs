//! Socket.IO event channel to the agent server.
//!
//! - [`codec`] - Engine.IO/Socket.IO text framing
//! - [`events`] - typed client and server events
//! - [`client`] - connection task with handshake, heartbeat and reconnection

pub mod client;
pub mod codec;
pub mod events;

pub use client::{SocketClient, SocketClientConfig, SocketError, SocketHandle, SocketState};
pub use codec::{CodecError, Frame};
pub use events::{
    AgentError, AgentInfo, AgentResponse, AgentTyping, ChatMessageEvent, ClientEvent, Connected,
    HistoryEntry, JoinSession, Joined, ServerEvent, ServerFault, SessionHistory,
};
