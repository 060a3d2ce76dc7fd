//! Mock HTTP client for testing.
//!
//! Provides a configurable mock HTTP client that can return predefined
//! responses or errors for testing purposes.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::traits::{Headers, HttpClient, HttpError, Response};

/// A recorded HTTP request for verification in tests.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// HTTP method (GET, POST or DELETE)
    pub method: String,
    /// Request URL
    pub url: String,
    /// Request headers
    pub headers: Headers,
    /// Request body (for POST requests)
    pub body: Option<String>,
}

/// Configuration for a mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return a response
    Success(Response),
    /// Return an error
    Error(HttpError),
    /// Return each response in turn; the last one repeats
    Sequence(Vec<Response>),
}

/// Mock HTTP client for testing.
///
/// Responses are matched by exact URL, then by URL prefix, then the default
/// response.
///
/// # Example
///
/// ```ignore
/// use agentdeck::adapters::mock::{MockHttpClient, MockResponse};
/// use agentdeck::traits::{HttpClient, Response, Headers};
///
/// let client = MockHttpClient::new();
/// client.set_response(
///     "http://localhost:5000/api/chat",
///     MockResponse::Success(Response::json_body(200, &json!({"success": true}))),
/// );
///
/// client.post("http://localhost:5000/api/chat", "{}", &Headers::new()).await?;
/// assert_eq!(client.get_requests().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockHttpClient {
    /// Configured responses by URL pattern
    responses: Arc<Mutex<HashMap<String, MockResponse>>>,
    /// Default response when no specific match
    default_response: Arc<Mutex<Option<MockResponse>>>,
    /// Recorded requests for verification
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    /// How many times each sequenced URL pattern was served
    served: Arc<Mutex<HashMap<String, usize>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockHttpClient {
    /// Create a new mock HTTP client.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            default_response: Arc::new(Mutex::new(None)),
            requests: Arc::new(Mutex::new(Vec::new())),
            served: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Set a response for a URL or URL prefix.
    pub fn set_response(&self, url: &str, response: MockResponse) {
        lock(&self.responses).insert(url.to_string(), response);
        lock(&self.served).remove(url);
    }

    /// Set a default response for URLs without specific matches.
    pub fn set_default_response(&self, response: MockResponse) {
        *lock(&self.default_response) = Some(response);
    }

    /// Get all recorded requests.
    pub fn get_requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }

    /// Recorded requests with the given method.
    pub fn requests_with_method(&self, method: &str) -> Vec<RecordedRequest> {
        lock(&self.requests)
            .iter()
            .filter(|r| r.method == method)
            .cloned()
            .collect()
    }

    /// Clear all recorded requests.
    pub fn clear_requests(&self) {
        lock(&self.requests).clear();
    }

    /// Clear all configured responses.
    pub fn clear_responses(&self) {
        lock(&self.responses).clear();
        lock(&self.served).clear();
    }

    fn record_request(&self, method: &str, url: &str, headers: &Headers, body: Option<String>) {
        lock(&self.requests).push(RecordedRequest {
            method: method.to_string(),
            url: url.to_string(),
            headers: headers.clone(),
            body,
        });
    }

    fn find_response(&self, url: &str) -> Option<(String, MockResponse)> {
        let responses = lock(&self.responses);

        if let Some(response) = responses.get(url) {
            return Some((url.to_string(), response.clone()));
        }

        // Longest prefix wins so specific routes shadow generic ones
        let mut prefixed: Vec<_> = responses
            .iter()
            .filter(|(pattern, _)| url.starts_with(pattern.as_str()))
            .collect();
        prefixed.sort_by_key(|(pattern, _)| std::cmp::Reverse(pattern.len()));
        if let Some((pattern, response)) = prefixed.first() {
            return Some(((*pattern).clone(), (*response).clone()));
        }

        lock(&self.default_response)
            .clone()
            .map(|response| (String::new(), response))
    }

    fn respond(&self, url: &str) -> Result<Response, HttpError> {
        match self.find_response(url) {
            Some((_, MockResponse::Success(response))) => Ok(response),
            Some((_, MockResponse::Error(err))) => Err(err),
            Some((pattern, MockResponse::Sequence(responses))) => {
                let mut served = lock(&self.served);
                let count = served.entry(pattern).or_insert(0);
                let index = (*count).min(responses.len().saturating_sub(1));
                *count += 1;
                responses
                    .get(index)
                    .cloned()
                    .ok_or_else(|| HttpError::Other(format!("Empty response sequence for URL: {}", url)))
            }
            None => Err(HttpError::Other(format!("No mock response for URL: {}", url))),
        }
    }
}

impl Default for MockHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn get(&self, url: &str, headers: &Headers) -> Result<Response, HttpError> {
        self.record_request("GET", url, headers, None);
        self.respond(url)
    }

    async fn post(&self, url: &str, body: &str, headers: &Headers) -> Result<Response, HttpError> {
        self.record_request("POST", url, headers, Some(body.to_string()));
        self.respond(url)
    }

    async fn delete(&self, url: &str, headers: &Headers) -> Result<Response, HttpError> {
        self.record_request("DELETE", url, headers, None);
        self.respond(url)
    }
}
