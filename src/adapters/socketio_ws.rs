//! Socket.IO over tokio-tungstenite adapter.
//!
//! Wraps [`SocketClient`] and implements the [`SocketConnection`] trait,
//! fanning incoming events out through a broadcast channel.

use async_trait::async_trait;
use tokio::sync::{broadcast, watch};
use tracing::debug;

use crate::socket::{
    ClientEvent, ServerEvent, SocketClient, SocketClientConfig, SocketError, SocketHandle,
    SocketState,
};
use crate::traits::SocketConnection;

/// Socket.IO connection adapter.
///
/// # Example
///
/// ```ignore
/// use agentdeck::adapters::SocketIoConnection;
/// use agentdeck::socket::SocketClientConfig;
/// use agentdeck::traits::SocketConnection;
///
/// let connection = SocketIoConnection::spawn(SocketClientConfig::default());
/// let mut events = connection.subscribe();
/// ```
pub struct SocketIoConnection {
    handle: SocketHandle,
    incoming_tx: broadcast::Sender<ServerEvent>,
}

impl SocketIoConnection {
    /// Connect, failing if the first handshake fails.
    pub async fn connect(config: SocketClientConfig) -> Result<Self, SocketError> {
        let client = SocketClient::connect(config).await?;
        Ok(Self::wrap(client))
    }

    /// Connect in the background, starting `Disconnected`.
    ///
    /// Subscribe before yielding to the runtime to observe the server's
    /// first events.
    pub fn spawn(config: SocketClientConfig) -> Self {
        Self::wrap(SocketClient::spawn(config))
    }

    fn wrap(client: SocketClient) -> Self {
        let (handle, mut incoming_rx) = client.into_parts();
        let (incoming_tx, _) = broadcast::channel(100);
        let forward_tx = incoming_tx.clone();

        tokio::spawn(async move {
            while let Some(event) = incoming_rx.recv().await {
                // Ignore send errors (no subscribers)
                let _ = forward_tx.send(event);
            }
            debug!("Socket event forwarder finished");
        });

        Self {
            handle,
            incoming_tx,
        }
    }
}

#[async_trait]
impl SocketConnection for SocketIoConnection {
    async fn emit(&self, event: ClientEvent) -> Result<(), SocketError> {
        self.handle.emit(event).await
    }

    fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.incoming_tx.subscribe()
    }

    fn state(&self) -> watch::Receiver<SocketState> {
        self.handle.state_receiver()
    }

    fn shutdown(&self) {
        self.handle.shutdown();
    }
}

impl Drop for SocketIoConnection {
    fn drop(&mut self) {
        self.handle.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_connect_refused() {
        let config = SocketClientConfig {
            server_url: "http://127.0.0.1:59996".to_string(),
            max_reconnect_attempts: 1,
            reconnect_delay: Duration::from_millis(10),
            handshake_timeout: Duration::from_secs(2),
        };
        assert!(SocketIoConnection::connect(config).await.is_err());
    }

    #[tokio::test]
    async fn test_spawn_starts_disconnected() {
        let config = SocketClientConfig {
            server_url: "http://127.0.0.1:59995".to_string(),
            max_reconnect_attempts: 1,
            reconnect_delay: Duration::from_millis(10),
            handshake_timeout: Duration::from_secs(2),
        };
        let connection = SocketIoConnection::spawn(config);
        assert!(!connection.state().borrow().is_connected());
        connection.shutdown();
    }
}
