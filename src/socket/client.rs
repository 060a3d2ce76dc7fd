use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep, timeout, Instant};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

use super::codec::{self, Frame, OpenHandshake};
use super::events::{ClientEvent, ServerEvent};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

/// Socket channel errors
#[derive(Debug, Clone, PartialEq)]
pub enum SocketError {
    ConnectionFailed(String),
    Handshake(String),
    Disconnected,
    SendFailed(String),
}

impl std::fmt::Display for SocketError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SocketError::ConnectionFailed(msg) => write!(f, "Connection failed: {}", msg),
            SocketError::Handshake(msg) => write!(f, "Handshake failed: {}", msg),
            SocketError::Disconnected => write!(f, "Disconnected from server"),
            SocketError::SendFailed(msg) => write!(f, "Send failed: {}", msg),
        }
    }
}

impl std::error::Error for SocketError {}

/// Socket connection state
#[derive(Debug, Clone, PartialEq)]
pub enum SocketState {
    Connected,
    Reconnecting { attempt: u8 },
    Disconnected,
}

impl SocketState {
    pub fn is_connected(&self) -> bool {
        matches!(self, SocketState::Connected)
    }
}

/// Configuration for the Socket.IO client
#[derive(Debug, Clone)]
pub struct SocketClientConfig {
    /// `http(s)://host:port` of the agent server
    pub server_url: String,
    pub max_reconnect_attempts: u8,
    /// Fixed wait before every reconnection attempt
    pub reconnect_delay: Duration,
    pub handshake_timeout: Duration,
}

impl Default for SocketClientConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:5000".to_string(),
            max_reconnect_attempts: 5,
            reconnect_delay: Duration::from_millis(1000),
            handshake_timeout: Duration::from_secs(10),
        }
    }
}

/// Cloneable sending side of a [`SocketClient`].
///
/// The connection task stops once every handle has been dropped.
#[derive(Clone)]
pub struct SocketHandle {
    outgoing_tx: mpsc::Sender<ClientEvent>,
    state_rx: watch::Receiver<SocketState>,
    shutdown_tx: Arc<watch::Sender<bool>>,
}

impl SocketHandle {
    /// Check if currently connected
    pub fn is_connected(&self) -> bool {
        self.state_rx.borrow().is_connected()
    }

    /// Get the current connection state
    pub fn connection_state(&self) -> SocketState {
        self.state_rx.borrow().clone()
    }

    /// Subscribe to connection state changes
    pub fn state_receiver(&self) -> watch::Receiver<SocketState> {
        self.state_rx.clone()
    }

    /// Queue an event for the server.
    ///
    /// Events queued while reconnecting are delivered once the channel is
    /// back up.
    pub async fn emit(&self, event: ClientEvent) -> Result<(), SocketError> {
        self.outgoing_tx
            .send(event)
            .await
            .map_err(|e| SocketError::SendFailed(e.to_string()))
    }

    /// Gracefully shutdown the connection
    pub fn shutdown(&self) {
        info!("Shutting down socket client");
        let _ = self.shutdown_tx.send(true);
    }
}

/// Socket.IO client for the agent server's event channel
pub struct SocketClient {
    handle: SocketHandle,
    incoming_rx: mpsc::Receiver<ServerEvent>,
}

impl SocketClient {
    /// Connect to the server, failing if the first handshake fails.
    pub async fn connect(config: SocketClientConfig) -> Result<Self, SocketError> {
        let url = codec::socket_url(&config.server_url);
        let channel = open_channel(&url, config.handshake_timeout).await?;
        info!("Connected to socket server at {}", url);
        Ok(Self::start(url, config, Some(channel)))
    }

    /// Start connecting in the background.
    ///
    /// The client begins `Disconnected` and follows the reconnection policy
    /// if the first attempt fails.
    pub fn spawn(config: SocketClientConfig) -> Self {
        let url = codec::socket_url(&config.server_url);
        Self::start(url, config, None)
    }

    fn start(url: String, config: SocketClientConfig, initial: Option<Channel>) -> Self {
        let initial_state = if initial.is_some() {
            SocketState::Connected
        } else {
            SocketState::Disconnected
        };

        let (incoming_tx, incoming_rx) = mpsc::channel::<ServerEvent>(100);
        let (outgoing_tx, outgoing_rx) = mpsc::channel::<ClientEvent>(100);
        let (state_tx, state_rx) = watch::channel(initial_state);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        tokio::spawn(async move {
            run_connection_loop(
                url,
                config,
                initial,
                incoming_tx,
                outgoing_rx,
                state_tx,
                shutdown_rx,
            )
            .await;
        });

        Self {
            handle: SocketHandle {
                outgoing_tx,
                state_rx,
                shutdown_tx: Arc::new(shutdown_tx),
            },
            incoming_rx,
        }
    }

    /// Get a cloneable handle for sending and state observation
    pub fn handle(&self) -> SocketHandle {
        self.handle.clone()
    }

    /// Split into the sending handle and the incoming event receiver
    pub fn into_parts(self) -> (SocketHandle, mpsc::Receiver<ServerEvent>) {
        (self.handle, self.incoming_rx)
    }

    pub fn is_connected(&self) -> bool {
        self.handle.is_connected()
    }

    pub fn connection_state(&self) -> SocketState {
        self.handle.connection_state()
    }

    pub fn state_receiver(&self) -> watch::Receiver<SocketState> {
        self.handle.state_receiver()
    }

    pub async fn emit(&self, event: ClientEvent) -> Result<(), SocketError> {
        self.handle.emit(event).await
    }

    /// Receive the next event pushed by the server
    pub async fn recv(&mut self) -> Option<ServerEvent> {
        self.incoming_rx.recv().await
    }

    pub fn shutdown(&self) {
        self.handle.shutdown();
    }
}

/// An open, handshaken WebSocket
struct Channel {
    sink: WsSink,
    source: WsSource,
    open: OpenHandshake,
}

impl Channel {
    /// The server pings every `pingInterval`; silence longer than
    /// `pingInterval + pingTimeout` means the link is dead.
    fn liveness_window(&self) -> Duration {
        Duration::from_millis(self.open.ping_interval + self.open.ping_timeout)
    }
}

async fn open_channel(url: &str, handshake_timeout: Duration) -> Result<Channel, SocketError> {
    let (ws, _) = timeout(handshake_timeout, connect_async(url))
        .await
        .map_err(|_| SocketError::ConnectionFailed(format!("timed out connecting to {}", url)))?
        .map_err(|e| SocketError::ConnectionFailed(e.to_string()))?;

    let (mut sink, mut source) = ws.split();
    let open = timeout(handshake_timeout, handshake(&mut sink, &mut source))
        .await
        .map_err(|_| SocketError::Handshake("timed out waiting for the server".to_string()))??;

    debug!("Socket.IO session {} established", open.sid);
    Ok(Channel { sink, source, open })
}

/// Engine.IO open, then Socket.IO namespace connect.
async fn handshake(sink: &mut WsSink, source: &mut WsSource) -> Result<OpenHandshake, SocketError> {
    let mut open: Option<OpenHandshake> = None;

    loop {
        let text = match source.next().await {
            Some(Ok(Message::Text(text))) => text,
            Some(Ok(Message::Close(_))) | None => {
                return Err(SocketError::Handshake("closed during handshake".to_string()))
            }
            Some(Ok(_)) => continue,
            Some(Err(e)) => return Err(SocketError::Handshake(e.to_string())),
        };

        match codec::decode_frame(&text) {
            Ok(Frame::Open(handshake)) => {
                open = Some(handshake);
                sink.send(Message::Text(codec::encode_connect()))
                    .await
                    .map_err(|e| SocketError::SendFailed(e.to_string()))?;
            }
            Ok(Frame::Ping) => {
                sink.send(Message::Text(codec::encode_pong()))
                    .await
                    .map_err(|e| SocketError::SendFailed(e.to_string()))?;
            }
            Ok(Frame::Connect(_)) => {
                return open.take().ok_or_else(|| {
                    SocketError::Handshake("namespace connect before engine open".to_string())
                });
            }
            Ok(Frame::ConnectError(data)) => {
                return Err(SocketError::Handshake(format!("connection refused: {}", data)));
            }
            Ok(other) => debug!("Ignoring frame during handshake: {:?}", other),
            Err(e) => warn!("Bad frame during handshake: {} - {}", e, text),
        }
    }
}

/// Why the inner read loop ended
enum LoopExit {
    /// Link lost, try to reconnect
    Lost,
    /// Shutdown requested or every handle dropped
    Stop,
}

/// Run the main connection loop with reconnection logic
async fn run_connection_loop(
    url: String,
    config: SocketClientConfig,
    initial: Option<Channel>,
    incoming_tx: mpsc::Sender<ServerEvent>,
    mut outgoing_rx: mpsc::Receiver<ClientEvent>,
    state_tx: watch::Sender<SocketState>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut channel = match initial {
        Some(channel) => Some(channel),
        None => match open_channel(&url, config.handshake_timeout).await {
            Ok(channel) => {
                info!("Connected to socket server at {}", url);
                Some(channel)
            }
            Err(e) => {
                warn!("Initial socket connection failed: {}", e);
                attempt_reconnect(&url, &config, &state_tx, &mut shutdown_rx).await
            }
        },
    };

    // An event whose write failed is replayed after reconnecting
    let mut pending: Option<ClientEvent> = None;

    while let Some(mut current) = channel.take() {
        let _ = state_tx.send(SocketState::Connected);

        if let Some(event) = pending.take() {
            if let Err(e) = current.sink.send(Message::Text(event.to_frame())).await {
                error!("Failed to replay {} after reconnect: {}", event.name(), e);
            }
        }

        let exit = read_loop(
            &mut current,
            &incoming_tx,
            &mut outgoing_rx,
            &mut shutdown_rx,
            &mut pending,
        )
        .await;

        match exit {
            LoopExit::Stop => {
                let _ = current.sink.send(Message::Text("41".to_string())).await;
                let _ = current.sink.close().await;
                break;
            }
            LoopExit::Lost => {
                let _ = state_tx.send(SocketState::Disconnected);
                channel = attempt_reconnect(&url, &config, &state_tx, &mut shutdown_rx).await;
            }
        }
    }

    info!("Socket connection loop ended");
    let _ = state_tx.send(SocketState::Disconnected);
}

async fn read_loop(
    channel: &mut Channel,
    incoming_tx: &mpsc::Sender<ServerEvent>,
    outgoing_rx: &mut mpsc::Receiver<ClientEvent>,
    shutdown_rx: &mut watch::Receiver<bool>,
    pending: &mut Option<ClientEvent>,
) -> LoopExit {
    let window = channel.liveness_window();
    let idle = sleep(window);
    tokio::pin!(idle);

    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => {
                debug!("Shutdown signal received, closing socket");
                return LoopExit::Stop;
            }
            msg = channel.source.next() => {
                idle.as_mut().reset(Instant::now() + window);
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(exit) = handle_frame(&text, channel, incoming_tx).await {
                            return exit;
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        info!("Received close frame from server");
                        return LoopExit::Lost;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = channel.sink.send(Message::Pong(data)).await;
                    }
                    Some(Ok(_)) => {
                        // Binary attachments are not used by this server
                    }
                    Some(Err(e)) => {
                        error!("WebSocket error: {}", e);
                        return LoopExit::Lost;
                    }
                    None => {
                        info!("WebSocket stream ended");
                        return LoopExit::Lost;
                    }
                }
            }
            event = outgoing_rx.recv() => {
                match event {
                    Some(event) => {
                        let frame = event.to_frame();
                        debug!("Emitting {}", frame);
                        if let Err(e) = channel.sink.send(Message::Text(frame)).await {
                            error!("Failed to emit {}: {}", event.name(), e);
                            *pending = Some(event);
                            return LoopExit::Lost;
                        }
                    }
                    None => {
                        debug!("All socket handles dropped, shutting down");
                        return LoopExit::Stop;
                    }
                }
            }
            _ = &mut idle => {
                warn!("No heartbeat from server in {:?}", window);
                return LoopExit::Lost;
            }
        }
    }
}

/// Returns `Some` when the frame ends the read loop.
async fn handle_frame(
    text: &str,
    channel: &mut Channel,
    incoming_tx: &mpsc::Sender<ServerEvent>,
) -> Option<LoopExit> {
    match codec::decode_frame(text) {
        Ok(Frame::Ping) => {
            if let Err(e) = channel.sink.send(Message::Text(codec::encode_pong())).await {
                error!("Failed to answer ping: {}", e);
                return Some(LoopExit::Lost);
            }
        }
        Ok(Frame::Event { name, data }) => match ServerEvent::decode(&name, data) {
            Ok(event) => {
                debug!("Received event {}", event.name());
                if incoming_tx.send(event).await.is_err() {
                    warn!("Incoming channel closed, shutting down");
                    return Some(LoopExit::Stop);
                }
            }
            Err(e) => warn!("Failed to decode {} event: {}", name, e),
        },
        Ok(Frame::Disconnect) | Ok(Frame::Close) => {
            info!("Server closed the session");
            return Some(LoopExit::Lost);
        }
        Ok(Frame::ConnectError(data)) => {
            warn!("Server refused namespace: {}", data);
            return Some(LoopExit::Lost);
        }
        Ok(Frame::Open(_)) | Ok(Frame::Connect(_)) | Ok(Frame::Pong) | Ok(Frame::Noop) => {}
        Err(e) => {
            // Skip malformed frames without dropping the connection
            warn!("Failed to parse frame: {} - {}", e, text);
        }
    }
    None
}

/// Attempt to reconnect, waiting a fixed delay before every attempt
async fn attempt_reconnect(
    url: &str,
    config: &SocketClientConfig,
    state_tx: &watch::Sender<SocketState>,
    shutdown_rx: &mut watch::Receiver<bool>,
) -> Option<Channel> {
    for attempt in 1..=config.max_reconnect_attempts {
        if *shutdown_rx.borrow() {
            debug!("Shutdown requested during reconnection");
            return None;
        }

        let _ = state_tx.send(SocketState::Reconnecting { attempt });
        info!(
            "Reconnection attempt {} of {}, waiting {:?}",
            attempt, config.max_reconnect_attempts, config.reconnect_delay
        );

        tokio::select! {
            _ = sleep(config.reconnect_delay) => {}
            _ = shutdown_rx.changed() => {
                debug!("Shutdown requested during backoff");
                return None;
            }
        }

        match open_channel(url, config.handshake_timeout).await {
            Ok(channel) => {
                info!("Reconnected successfully on attempt {}", attempt);
                return Some(channel);
            }
            Err(e) => {
                warn!("Reconnection attempt {} failed: {}", attempt, e);
            }
        }
    }

    error!(
        "Failed to reconnect after {} attempts, giving up",
        config.max_reconnect_attempts
    );
    let _ = state_tx.send(SocketState::Disconnected);
    None
}
