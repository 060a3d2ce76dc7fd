//! Socket channel trait abstraction.
//!
//! The chat controller only ever talks to the agent server's event channel
//! through [`SocketConnection`], so it can be driven by the real Socket.IO
//! client or by [`crate::adapters::mock::MockSocket`] in tests.

use async_trait::async_trait;
use tokio::sync::{broadcast, watch};

use crate::socket::{ClientEvent, ServerEvent, SocketError, SocketState};

/// Trait for a bidirectional event channel.
///
/// Incoming events are distributed through a broadcast channel so several
/// observers can watch the same connection; connection state is exposed
/// through a watch channel.
///
/// # Example
///
/// ```ignore
/// use agentdeck::traits::SocketConnection;
/// use agentdeck::socket::ClientEvent;
///
/// async fn keepalive<C: SocketConnection>(conn: &C) {
///     if conn.state().borrow().is_connected() {
///         let _ = conn.emit(ClientEvent::Ping).await;
///     }
/// }
/// ```
#[async_trait]
pub trait SocketConnection: Send + Sync {
    /// Emit an event to the server.
    async fn emit(&self, event: ClientEvent) -> Result<(), SocketError>;

    /// Subscribe to events pushed by the server.
    fn subscribe(&self) -> broadcast::Receiver<ServerEvent>;

    /// Get a receiver for connection state changes.
    fn state(&self) -> watch::Receiver<SocketState>;

    /// Close the channel. No reconnection is attempted afterwards.
    fn shutdown(&self);
}
