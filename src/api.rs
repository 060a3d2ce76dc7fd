//! REST client for the agent server.
//!
//! Covers the chat fallback endpoint, session deletion and the parallel
//! universe analysis endpoints. All requests go through an injected
//! [`HttpClient`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{DeckError, DeckResult, NetworkError};
use crate::traits::{Headers, HttpClient, Response};

pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000";

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: String,
    pub app_name: String,
}

/// Reply of `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Reply of `GET /api/parallel-universe-data`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct AnalysisEnvelope {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Agent server REST client.
pub struct ServerApi<H: HttpClient> {
    base_url: String,
    http: Arc<H>,
}

impl<H: HttpClient> Clone for ServerApi<H> {
    fn clone(&self) -> Self {
        Self {
            base_url: self.base_url.clone(),
            http: Arc::clone(&self.http),
        }
    }
}

impl<H: HttpClient> ServerApi<H> {
    pub fn new(base_url: impl Into<String>, http: Arc<H>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn http(&self) -> &Arc<H> {
        &self.http
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn json_headers() -> Headers {
        let mut headers = Headers::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers
    }

    /// Send a chat message over REST.
    ///
    /// The server answers validation failures with a 4xx status and a JSON
    /// body, so the body is decoded whatever the status.
    pub async fn send_chat(&self, request: &ChatRequest) -> DeckResult<ChatReply> {
        let url = self.url("/api/chat");
        let body = serde_json::to_string(request)?;
        debug!("POST {}", url);

        let response = self
            .http
            .post(&url, &body, &Self::json_headers())
            .await
            .map_err(|e| NetworkError::from_http(e, &url))?;

        match response.json::<ChatReply>() {
            Ok(reply) => Ok(reply),
            Err(e) if response.is_success() => Err(DeckError::protocol(format!(
                "unexpected chat reply: {}",
                e
            ))),
            Err(_) => Err(status_error(&response).into()),
        }
    }

    /// Delete the server-side session.
    pub async fn delete_session(&self, agent_name: &str, session_id: &str) -> DeckResult<()> {
        let agent = urlencoding::encode(agent_name);
        let session = urlencoding::encode(session_id);
        let url = self.url(&format!(
            "/apps/{}/users/{}/sessions/{}",
            agent, session, session
        ));
        debug!("DELETE {}", url);

        let response = self
            .http
            .delete(&url, &Headers::new())
            .await
            .map_err(|e| NetworkError::from_http(e, &url))?;

        if response.is_success() {
            Ok(())
        } else {
            warn!("Session delete returned HTTP {}", response.status);
            Err(status_error(&response).into())
        }
    }

    /// Fetch the current analysis status and payload.
    pub async fn fetch_analysis(&self) -> DeckResult<AnalysisEnvelope> {
        let url = self.url("/api/parallel-universe-data");
        debug!("GET {}", url);

        let response = self
            .http
            .get(&url, &Headers::new())
            .await
            .map_err(|e| NetworkError::from_http(e, &url))?;

        response.json::<AnalysisEnvelope>().map_err(|e| {
            if response.is_success() {
                DeckError::protocol(format!("unexpected analysis reply: {}", e))
            } else {
                status_error(&response).into()
            }
        })
    }

    /// Ask the server to start a new analysis.
    pub async fn trigger_analysis(&self) -> DeckResult<()> {
        let url = self.url("/api/trigger-parallel-analysis");
        debug!("POST {}", url);

        let response = self
            .http
            .post(&url, "", &Headers::new())
            .await
            .map_err(|e| NetworkError::from_http(e, &url))?;

        if response.is_success() {
            Ok(())
        } else {
            Err(status_error(&response).into())
        }
    }
}

fn status_error(response: &Response) -> NetworkError {
    NetworkError::HttpStatus {
        status: response.status,
        message: response.text().unwrap_or_default(),
    }
}
