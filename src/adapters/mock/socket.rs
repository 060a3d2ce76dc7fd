//! Mock socket connection for testing.
//!
//! Allows event injection, captures emitted events and lets tests drive the
//! connection state.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{broadcast, watch, Mutex};

use crate::socket::{ClientEvent, ServerEvent, SocketError, SocketState};
use crate::traits::SocketConnection;

/// Mock socket connection for testing.
///
/// # Example
///
/// ```ignore
/// use agentdeck::adapters::mock::MockSocket;
/// use agentdeck::socket::{ServerEvent, AgentTyping};
///
/// let mock = MockSocket::new();
/// let mut rx = mock.subscribe();
/// mock.inject_event(ServerEvent::AgentTyping(AgentTyping { typing: true }));
/// assert!(rx.recv().await.is_ok());
/// ```
#[derive(Clone)]
pub struct MockSocket {
    incoming_tx: broadcast::Sender<ServerEvent>,
    state_tx: Arc<watch::Sender<SocketState>>,
    state_rx: watch::Receiver<SocketState>,
    sent_events: Arc<Mutex<Vec<ClientEvent>>>,
    send_should_fail: Arc<Mutex<bool>>,
}

impl MockSocket {
    /// Create a new mock socket in connected state.
    pub fn new() -> Self {
        Self::with_state(SocketState::Connected)
    }

    /// Create a new mock socket in disconnected state.
    pub fn disconnected() -> Self {
        Self::with_state(SocketState::Disconnected)
    }

    fn with_state(state: SocketState) -> Self {
        let (incoming_tx, _) = broadcast::channel(100);
        let (state_tx, state_rx) = watch::channel(state);

        Self {
            incoming_tx,
            state_tx: Arc::new(state_tx),
            state_rx,
            sent_events: Arc::new(Mutex::new(Vec::new())),
            send_should_fail: Arc::new(Mutex::new(false)),
        }
    }

    /// Deliver an event to all subscribers.
    pub fn inject_event(&self, event: ServerEvent) {
        // Ignore send errors (no subscribers)
        let _ = self.incoming_tx.send(event);
    }

    /// Set the connection state.
    pub fn set_state(&self, state: SocketState) {
        let _ = self.state_tx.send(state);
    }

    pub fn simulate_disconnect(&self) {
        self.set_state(SocketState::Disconnected);
    }

    pub fn simulate_reconnecting(&self, attempt: u8) {
        self.set_state(SocketState::Reconnecting { attempt });
    }

    pub fn simulate_reconnected(&self) {
        self.set_state(SocketState::Connected);
    }

    /// Get all emitted events.
    pub async fn get_sent_events(&self) -> Vec<ClientEvent> {
        self.sent_events.lock().await.clone()
    }

    /// Names of emitted events, in order.
    pub async fn sent_event_names(&self) -> Vec<&'static str> {
        self.sent_events
            .lock()
            .await
            .iter()
            .map(ClientEvent::name)
            .collect()
    }

    pub async fn clear_sent_events(&self) {
        self.sent_events.lock().await.clear();
    }

    /// Configure whether emit should fail.
    pub async fn set_send_should_fail(&self, should_fail: bool) {
        *self.send_should_fail.lock().await = should_fail;
    }

    pub fn subscriber_count(&self) -> usize {
        self.incoming_tx.receiver_count()
    }
}

impl Default for MockSocket {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SocketConnection for MockSocket {
    async fn emit(&self, event: ClientEvent) -> Result<(), SocketError> {
        if *self.send_should_fail.lock().await {
            return Err(SocketError::SendFailed("Mock send failure".to_string()));
        }

        self.sent_events.lock().await.push(event);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.incoming_tx.subscribe()
    }

    fn state(&self) -> watch::Receiver<SocketState> {
        self.state_rx.clone()
    }

    fn shutdown(&self) {
        let _ = self.state_tx.send(SocketState::Disconnected);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::socket::AgentTyping;

    #[tokio::test]
    async fn test_inject_and_receive() {
        let mock = MockSocket::new();
        let mut rx = mock.subscribe();
        assert_eq!(mock.subscriber_count(), 1);

        mock.inject_event(ServerEvent::AgentTyping(AgentTyping { typing: true }));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.name(), "agent_typing");
    }

    #[tokio::test]
    async fn test_emit_records_events() {
        let mock = MockSocket::new();
        mock.emit(ClientEvent::Ping).await.unwrap();
        assert_eq!(mock.sent_event_names().await, vec!["ping"]);

        mock.clear_sent_events().await;
        assert!(mock.get_sent_events().await.is_empty());
    }

    #[tokio::test]
    async fn test_emit_failure() {
        let mock = MockSocket::new();
        mock.set_send_should_fail(true).await;
        assert!(mock.emit(ClientEvent::Ping).await.is_err());
        assert!(mock.get_sent_events().await.is_empty());
    }

    #[tokio::test]
    async fn test_state_transitions() {
        let mock = MockSocket::disconnected();
        let mut state = mock.state();
        assert!(!state.borrow().is_connected());

        mock.simulate_reconnecting(1);
        state.changed().await.unwrap();
        assert_eq!(*state.borrow(), SocketState::Reconnecting { attempt: 1 });

        mock.simulate_reconnected();
        state.changed().await.unwrap();
        assert!(state.borrow().is_connected());

        mock.shutdown();
        state.changed().await.unwrap();
        assert_eq!(*state.borrow(), SocketState::Disconnected);
    }
}
