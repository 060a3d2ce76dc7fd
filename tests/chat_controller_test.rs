//! Chat controller integration tests.
//!
//! Drive whole conversations through the controller with the mock socket,
//! mock HTTP client and in-memory preferences.

mod common;

use agentdeck::adapters::{InMemoryPreferences, MockResponse, MockSocket};
use agentdeck::chat::{ClearOutcome, Role, SendOutcome, Theme, THEME_KEY};
use agentdeck::socket::{
    AgentError, AgentInfo, AgentResponse, AgentTyping, ClientEvent, HistoryEntry, JoinSession,
    ServerEvent, SessionHistory, SocketState,
};
use agentdeck::traits::{PreferenceStore, Response};
use bytes::Bytes;
use common::{chat_harness, url, AGENT, SESSION_ID};
use serde_json::json;
use tempfile::TempDir;

fn join_event() -> ClientEvent {
    ClientEvent::JoinSession(JoinSession {
        session_id: SESSION_ID.to_string(),
        agent_name: AGENT.to_string(),
    })
}

fn reply(text: &str) -> ServerEvent {
    ServerEvent::AgentResponse(AgentResponse {
        response: text.to_string(),
        timestamp: Some("2024-01-15T10:30:00".to_string()),
    })
}

#[tokio::test]
async fn test_socket_conversation() {
    let mut h = chat_harness(MockSocket::new(), InMemoryPreferences::new());
    h.controller.initialize().await;
    assert_eq!(h.socket.get_sent_events().await, vec![join_event()]);

    h.socket.inject_event(ServerEvent::SessionHistory(SessionHistory {
        messages: vec![
            HistoryEntry {
                role: "user".to_string(),
                content: "Hi".to_string(),
                timestamp: None,
            },
            HistoryEntry {
                role: "model".to_string(),
                content: "Hello! How can I help?".to_string(),
                timestamp: Some("2024-01-15T10:00:00".to_string()),
            },
        ],
    }));
    assert!(h.controller.pump().await);
    assert_eq!(h.controller.messages().len(), 2);
    assert_eq!(h.controller.messages()[1].role, Role::Assistant);

    let outcome = h.controller.send_text("What is my net worth?").await;
    assert_eq!(outcome, SendOutcome::Socket);
    assert!(h.controller.input().value().is_empty());

    h.socket
        .inject_event(ServerEvent::AgentTyping(AgentTyping { typing: true }));
    h.controller.pump().await;
    assert!(h.controller.is_typing());

    h.socket.inject_event(reply("Your net worth is **₹12,97,285**."));
    h.controller.pump().await;
    assert!(!h.controller.is_typing());

    let roles: Vec<_> = h.controller.messages().iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![Role::User, Role::Assistant, Role::User, Role::Assistant]
    );
    let last = h.controller.render_last_message_html().unwrap();
    assert!(last.contains("<strong>₹12,97,285</strong>"));

    assert_eq!(
        h.socket.sent_event_names().await,
        vec!["join_session", "chat_message"]
    );
    assert!(h.http.get_requests().is_empty());
}

#[tokio::test]
async fn test_agent_error_and_avatar() {
    let mut h = chat_harness(MockSocket::new(), InMemoryPreferences::new());
    h.controller.initialize().await;

    h.socket.inject_event(ServerEvent::AgentInfo(AgentInfo {
        icon: Some("fa-chart-line".to_string()),
        name: Some("Oracle".to_string()),
        ..Default::default()
    }));
    h.controller.pump().await;

    h.socket.inject_event(ServerEvent::AgentError(AgentError {
        error: "Model overloaded".to_string(),
        timestamp: None,
    }));
    h.controller.pump().await;

    let last = h.controller.messages().last().unwrap();
    assert_eq!(last.role, Role::Error);
    assert_eq!(last.content, "Error: Model overloaded");
    assert!(h
        .controller
        .render_messages_html()
        .contains("fa-chart-line"));
}

#[tokio::test]
async fn test_disconnect_uses_rest_then_rejoins() {
    let mut h = chat_harness(MockSocket::new(), InMemoryPreferences::new());
    h.controller.initialize().await;
    h.socket.clear_sent_events().await;

    h.socket.simulate_disconnect();
    h.controller.pump().await;
    assert!(!h.controller.is_connected());

    h.http.set_response(
        &url("/api/chat"),
        MockResponse::Success(Response::json_body(
            200,
            &json!({"success": true, "response": "Answered over REST"}),
        )),
    );
    assert_eq!(
        h.controller.send_text("Are you there?").await,
        SendOutcome::Rest
    );
    assert_eq!(
        h.controller.messages().last().unwrap().content,
        "Answered over REST"
    );
    assert!(h.socket.get_sent_events().await.is_empty());

    h.socket.simulate_reconnecting(1);
    h.controller.pump().await;
    assert_eq!(
        h.controller.socket_state(),
        &SocketState::Reconnecting { attempt: 1 }
    );

    h.socket.simulate_reconnected();
    h.controller.pump().await;
    assert!(h.controller.is_connected());
    assert_eq!(h.socket.get_sent_events().await, vec![join_event()]);
}

#[tokio::test]
async fn test_failed_emit_falls_back_to_rest() {
    let mut h = chat_harness(MockSocket::new(), InMemoryPreferences::new());
    h.controller.initialize().await;
    h.socket.set_send_should_fail(true).await;

    h.http.set_response(
        &url("/api/chat"),
        MockResponse::Success(Response::json_body(
            400,
            &json!({"success": false, "error": "Message is required"}),
        )),
    );
    assert_eq!(h.controller.send_text("hello").await, SendOutcome::Rest);

    let last = h.controller.messages().last().unwrap();
    assert_eq!(last.role, Role::Error);
    assert_eq!(last.content, "Error: Message is required");
    assert!(!h.controller.is_typing());
    assert_eq!(h.http.requests_with_method("POST").len(), 1);
}

#[tokio::test]
async fn test_clear_session() {
    let mut h = chat_harness(MockSocket::new(), InMemoryPreferences::new());
    h.controller.initialize().await;
    h.socket.inject_event(reply("Earlier answer"));
    h.controller.pump().await;

    let delete_url = url(&format!(
        "/apps/{}/users/{}/sessions/{}",
        AGENT, SESSION_ID, SESSION_ID
    ));
    h.http.set_response(
        &delete_url,
        MockResponse::Sequence(vec![
            Response::new(500, Bytes::new()),
            Response::new(200, Bytes::from("{}")),
        ]),
    );

    match h.controller.clear_session().await {
        ClearOutcome::Failed(message) => assert!(message.contains("server")),
        other => panic!("unexpected outcome {:?}", other),
    }
    assert_eq!(h.controller.messages().len(), 1);

    assert_eq!(h.controller.clear_session().await, ClearOutcome::Reloaded);
    assert!(h.controller.messages().is_empty());
    assert_eq!(h.http.requests_with_method("DELETE").len(), 2);
}

#[tokio::test]
async fn test_theme_survives_new_controller() {
    let prefs = InMemoryPreferences::new();
    let mut first = chat_harness(MockSocket::new(), prefs.clone());
    first.controller.initialize().await;
    assert_eq!(first.controller.theme(), Theme::Light);
    assert_eq!(first.controller.toggle_theme(), Theme::Dark);
    assert_eq!(prefs.get(THEME_KEY).as_deref(), Some("dark"));

    let mut second = chat_harness(MockSocket::disconnected(), prefs);
    second.controller.initialize().await;
    assert_eq!(second.controller.theme(), Theme::Dark);
    assert!(second.socket.get_sent_events().await.is_empty());
}

#[tokio::test]
async fn test_export_transcript() {
    let dir = TempDir::new().unwrap();
    let mut h = chat_harness(MockSocket::new(), InMemoryPreferences::new());
    h.controller.initialize().await;

    h.controller.send_text("Summarize my spending").await;
    h.socket.inject_event(reply("You spent **less** than last year."));
    h.controller.pump().await;

    let path = h.controller.export_transcript(dir.path()).await.unwrap();
    let file_name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(file_name.starts_with("oracle_agent-chat-export-"));
    assert!(file_name.ends_with(".txt"));

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("Chat Export - oracle_agent - "));
    assert!(text.contains("You:\nSummarize my spending\n"));
    assert!(text.contains("Agent:\nYou spent less than last year."));
}

#[tokio::test]
async fn test_stage_and_remove_files() {
    let dir = TempDir::new().unwrap();
    let statement = dir.path().join("statement.pdf");
    let notes = dir.path().join("notes.txt");
    std::fs::write(&statement, vec![0u8; 1536]).unwrap();
    std::fs::write(&notes, "rent").unwrap();

    let mut h = chat_harness(MockSocket::new(), InMemoryPreferences::new());
    h.controller
        .stage_paths(&[statement.clone(), notes.clone()])
        .await
        .unwrap();
    assert!(h.controller.files().is_open());
    assert_eq!(
        h.controller.files().render_text(),
        "1. statement.pdf (1.5 KB)\n2. notes.txt (4 Bytes)"
    );

    let removed = h.controller.remove_staged_file(0).unwrap();
    assert_eq!(removed.name, "statement.pdf");
    assert!(h.controller.remove_staged_file(5).is_none());

    assert_eq!(h.controller.upload_files(), 1);
    assert!(!h.controller.files().is_open());
    assert!(h.controller.files().files().is_empty());

    let missing = dir.path().join("missing.csv");
    assert!(h.controller.stage_paths(&[missing]).await.is_err());
}
