//! Chat front end.
//!
//! [`ChatController`] owns the transcript and all widget state. It talks to
//! the agent server over an injected [`SocketConnection`], falling back to
//! the REST chat endpoint whenever the socket is not connected.

pub mod files;
pub mod input;
pub mod message;
pub mod render;
pub mod theme;
pub mod transcript;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tracing::{debug, error, info, warn};

use crate::api::{ChatRequest, ServerApi};
use crate::config::DeckConfig;
use crate::error::{DeckError, DeckResult};
use crate::markdown::HtmlCache;
use crate::socket::{
    AgentInfo, ChatMessageEvent, ClientEvent, JoinSession, ServerEvent, SocketState,
};
use crate::traits::{HttpClient, PreferenceStore, SocketConnection};

pub use files::{format_file_size, FileStaging, StagedFile};
pub use input::{CharCount, CounterLevel, InputBox, MAX_CHARS};
pub use message::{Message, Role};
pub use theme::{Theme, THEME_KEY};

/// How a send request was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Empty or whitespace-only input; nothing happened
    Ignored,
    /// Emitted on the socket; the reply arrives as an event
    Socket,
    /// Sent through the REST endpoint; the reply (or error) is already in
    /// the transcript
    Rest,
}

/// Result of clearing the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClearOutcome {
    /// Server session deleted and transcript cleared; the page should reload
    Reloaded,
    /// Deletion failed; the transcript is untouched
    Failed(String),
}

/// Something the controller observed while waiting.
#[derive(Debug, Clone, PartialEq)]
pub enum Activity {
    Event(ServerEvent),
    State(SocketState),
}

/// Chat widget controller.
pub struct ChatController<H: HttpClient, S: SocketConnection, P: PreferenceStore> {
    agent_name: String,
    session_id: String,
    api: ServerApi<H>,
    socket: Arc<S>,
    preferences: Arc<P>,
    events: broadcast::Receiver<ServerEvent>,
    state_rx: watch::Receiver<SocketState>,
    socket_state: SocketState,
    connected: bool,
    messages: Vec<Message>,
    input: InputBox,
    typing: bool,
    theme: Theme,
    agent_info: Option<AgentInfo>,
    files: FileStaging,
    html_cache: HtmlCache,
}

impl<H: HttpClient, S: SocketConnection, P: PreferenceStore> ChatController<H, S, P> {
    /// Create a controller and subscribe to the socket.
    ///
    /// Nothing is emitted until [`initialize`](Self::initialize).
    pub fn new(config: &DeckConfig, api: ServerApi<H>, socket: Arc<S>, preferences: Arc<P>) -> Self {
        let events = socket.subscribe();
        let state_rx = socket.state();

        Self {
            agent_name: config.agent_name.clone(),
            session_id: config.session_id.clone(),
            api,
            socket,
            preferences,
            events,
            state_rx,
            socket_state: SocketState::Disconnected,
            connected: false,
            messages: Vec::new(),
            input: InputBox::default(),
            typing: false,
            theme: Theme::default(),
            agent_info: None,
            files: FileStaging::default(),
            html_cache: HtmlCache::new(),
        }
    }

    /// Restore the theme and sync with the current socket state, joining
    /// the session if already connected.
    pub async fn initialize(&mut self) {
        self.theme = self
            .preferences
            .get(THEME_KEY)
            .map(|value| Theme::parse(&value))
            .unwrap_or_default();
        debug!("Restored theme {}", self.theme);

        let state = self.state_rx.borrow_and_update().clone();
        self.handle_state(state).await;
    }

    /// Apply a socket state change. Every transition to connected joins
    /// the session again.
    pub async fn handle_state(&mut self, state: SocketState) {
        let was_connected = self.connected;
        self.connected = state.is_connected();
        self.socket_state = state;

        if self.connected && !was_connected {
            info!("Connected to server, joining session {}", self.session_id);
            let join = ClientEvent::JoinSession(JoinSession {
                session_id: self.session_id.clone(),
                agent_name: self.agent_name.clone(),
            });
            if let Err(e) = self.socket.emit(join).await {
                warn!("Failed to join session: {}", e);
            }
        } else if !self.connected && was_connected {
            info!("Disconnected from server");
        }
    }

    /// Apply one server event.
    pub fn handle_event(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::Connected(connected) => {
                debug!("Server greeting: {:?}", connected.status);
            }
            ServerEvent::Joined(joined) => {
                info!(
                    "Joined session {} (agent {})",
                    joined.session_id,
                    joined.agent_name.as_deref().unwrap_or("?")
                );
            }
            ServerEvent::SessionHistory(history) => {
                debug!("Replaying {} history message(s)", history.messages.len());
                for entry in history.messages {
                    self.messages.push(Message::new(
                        entry.content,
                        Role::from_history(&entry.role),
                        entry.timestamp.as_deref(),
                    ));
                }
            }
            ServerEvent::AgentResponse(response) => {
                self.messages.push(Message::assistant(
                    response.response,
                    response.timestamp.as_deref(),
                ));
                self.typing = false;
            }
            ServerEvent::AgentTyping(typing) => {
                self.typing = typing.typing;
            }
            ServerEvent::AgentError(err) => {
                self.messages.push(Message::error(format!("Error: {}", err.error)));
                self.typing = false;
            }
            ServerEvent::Error(fault) => {
                warn!("Server rejected request: {}", fault.error);
                self.messages.push(Message::error(format!("Error: {}", fault.error)));
            }
            ServerEvent::AgentInfo(info) => {
                debug!("Agent info: {:?}", info);
                self.agent_info = Some(info);
            }
            ServerEvent::Unknown { name, .. } => {
                debug!("Ignoring unknown event {}", name);
            }
        }
    }

    /// Wait for the next server event or state change.
    ///
    /// Returns `None` once the socket is gone for good.
    pub async fn next_activity(&mut self) -> Option<Activity> {
        loop {
            tokio::select! {
                event = self.events.recv() => match event {
                    Ok(event) => return Some(Activity::Event(event)),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("Dropped {} socket event(s)", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                },
                changed = self.state_rx.changed() => match changed {
                    Ok(()) => {
                        let state = self.state_rx.borrow_and_update().clone();
                        return Some(Activity::State(state));
                    }
                    Err(_) => return None,
                },
            }
        }
    }

    /// Wait for and apply the next activity. Returns `false` once the
    /// socket is gone.
    pub async fn pump(&mut self) -> bool {
        match self.next_activity().await {
            Some(activity) => {
                self.apply(activity).await;
                true
            }
            None => false,
        }
    }

    pub async fn apply(&mut self, activity: Activity) {
        match activity {
            Activity::Event(event) => self.handle_event(event),
            Activity::State(state) => self.handle_state(state).await,
        }
    }

    /// Emit a keepalive ping when connected.
    pub async fn keepalive(&self) {
        if self.connected {
            if let Err(e) = self.socket.emit(ClientEvent::Ping).await {
                debug!("Keepalive ping failed: {}", e);
            }
        }
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input.set(text);
    }

    /// Send the input box contents.
    pub async fn send_message(&mut self) -> SendOutcome {
        let Some(text) = self.input.take_message() else {
            return SendOutcome::Ignored;
        };

        self.messages.push(Message::user(text.clone()));

        if self.connected {
            let event = ClientEvent::ChatMessage(ChatMessageEvent {
                message: text.clone(),
                session_id: self.session_id.clone(),
                app_name: self.agent_name.clone(),
            });
            match self.socket.emit(event).await {
                Ok(()) => return SendOutcome::Socket,
                Err(e) => warn!("Socket emit failed, using REST fallback: {}", e),
            }
        }

        self.send_via_api(text).await;
        SendOutcome::Rest
    }

    async fn send_via_api(&mut self, text: String) {
        self.typing = true;

        let request = ChatRequest {
            message: text,
            session_id: self.session_id.clone(),
            app_name: self.agent_name.clone(),
        };

        match self.api.send_chat(&request).await {
            Ok(reply) if reply.success => {
                self.messages
                    .push(Message::assistant(reply.response.unwrap_or_default(), None));
            }
            Ok(reply) => {
                let detail = reply.error.unwrap_or_else(|| "Unknown error".to_string());
                self.messages.push(Message::error(format!("Error: {}", detail)));
            }
            Err(e) => {
                error!("REST chat failed [{}]: {}", e.error_code(), e);
                self.messages
                    .push(Message::error(format!("Connection error: {}", e.user_message())));
            }
        }

        self.typing = false;
    }

    /// Replace the input with `text` and send it.
    pub async fn send_text(&mut self, text: impl Into<String>) -> SendOutcome {
        self.input.set(text);
        self.send_message().await
    }

    /// Send one of the welcome screen's suggested prompts.
    pub async fn send_suggested_prompt(&mut self, prompt: &str) -> SendOutcome {
        self.send_text(prompt).await
    }

    /// Delete the server session and clear the transcript.
    pub async fn clear_session(&mut self) -> ClearOutcome {
        match self
            .api
            .delete_session(&self.agent_name, &self.session_id)
            .await
        {
            Ok(()) => {
                info!("Cleared session {}", self.session_id);
                self.messages.clear();
                self.html_cache.clear();
                ClearOutcome::Reloaded
            }
            Err(e) => {
                error!("Error clearing session: {}", e);
                ClearOutcome::Failed(e.user_message())
            }
        }
    }

    /// Path of a fresh chat with the same agent.
    pub fn new_chat_path(&self) -> String {
        format!("/chat/{}", self.agent_name)
    }

    /// Flip the theme and persist it. A failed write keeps the new theme
    /// for this run.
    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        if let Err(e) = self.preferences.set(THEME_KEY, self.theme.as_str()) {
            warn!("Failed to persist theme: {}", e);
        }
        self.theme
    }

    /// Write the transcript to a text file in `dir`.
    pub async fn export_transcript(&self, dir: &Path) -> DeckResult<PathBuf> {
        transcript::write_export(dir, &self.agent_name, &self.messages)
            .await
            .map_err(DeckError::from)
    }

    /// Stat and stage files for upload.
    pub async fn stage_paths(&mut self, paths: &[PathBuf]) -> DeckResult<()> {
        let mut staged = Vec::with_capacity(paths.len());
        for path in paths {
            staged.push(StagedFile::from_path(path).await?);
        }
        self.files.stage(staged);
        Ok(())
    }

    pub fn stage_files(&mut self, files: Vec<StagedFile>) {
        self.files.stage(files);
    }

    pub fn remove_staged_file(&mut self, index: usize) -> Option<StagedFile> {
        self.files.remove(index)
    }

    pub fn close_file_modal(&mut self) {
        self.files.close();
    }

    /// Upload is not wired to the server; this closes the dialog.
    pub fn upload_files(&mut self) -> usize {
        self.files.upload()
    }

    pub fn files(&self) -> &FileStaging {
        &self.files
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn input(&self) -> &InputBox {
        &self.input
    }

    pub fn char_count(&self) -> CharCount {
        self.input.char_count()
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn socket_state(&self) -> &SocketState {
        &self.socket_state
    }

    pub fn is_typing(&self) -> bool {
        self.typing
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn agent_info(&self) -> Option<&AgentInfo> {
        self.agent_info.as_ref()
    }

    pub fn agent_name(&self) -> &str {
        &self.agent_name
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    fn agent_icon(&self) -> Option<&str> {
        self.agent_info.as_ref().and_then(|info| info.icon.as_deref())
    }

    /// Markup of the whole transcript.
    pub fn render_messages_html(&mut self) -> String {
        let icon = self
            .agent_info
            .as_ref()
            .and_then(|info| info.icon.clone());
        let cache = &mut self.html_cache;
        self.messages
            .iter()
            .map(|m| render::render_message_html(m, icon.as_deref(), cache))
            .collect()
    }

    /// Markup of the most recent message.
    pub fn render_last_message_html(&mut self) -> Option<String> {
        let icon = self.agent_icon().map(str::to_string);
        let message = self.messages.last()?;
        Some(render::render_message_html(
            message,
            icon.as_deref(),
            &mut self.html_cache,
        ))
    }

    pub fn render_status_badge_html(&self) -> String {
        render::render_status_badge_html(self.connected)
    }

    pub fn render_message_text(&self, index: usize) -> Option<String> {
        self.messages.get(index).map(render::render_message_text)
    }

    /// Shut the socket down.
    pub fn shutdown(&self) {
        self.socket.shutdown();
    }
}
