//! Parallel universe timeline.
//!
//! [`TimelineController`] polls the analysis endpoint until the analysis is
//! ready, failed, or absent, and derives a [`TimelineView`] from the
//! result. Polling is sequential inside the controller, so a retry can never
//! race an older poll.

pub mod currency;
pub mod models;
pub mod render;
pub mod view;

use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::ServerApi;
use crate::config::DeckConfig;
use crate::traits::HttpClient;

pub use currency::{format_amount, format_currency, format_date, parse_currency};
pub use models::{InvalidData, TimelineData};
pub use render::{render_html, render_text};
pub use view::{build_view, TimelineView};

pub const PROCESSING_MESSAGE: &str = "Processing your financial data... This may take a moment.";
pub const STARTING_MESSAGE: &str = "Starting analysis...";
pub const LOADING_MESSAGE: &str = "Loading timeline...";
pub const INVALID_DATA_MESSAGE: &str = "Invalid data format received from analysis";
pub const ANALYSIS_FAILED_MESSAGE: &str = "Failed to load timeline data";
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load timeline data. Please try again.";
pub const TRIGGER_FAILED_MESSAGE: &str = "Failed to start analysis. Please try again.";
pub const NO_ANALYSIS_MESSAGE: &str = "No analysis found. Click below to start.";

/// What the timeline page is showing.
#[derive(Debug, Clone, PartialEq)]
pub enum TimelineState {
    Loading { message: String },
    Ready(Box<TimelineView>),
    Error(String),
    /// No analysis exists yet; the user has to start one
    AwaitingTrigger,
}

impl TimelineState {
    fn loading(message: &str) -> Self {
        Self::Loading {
            message: message.to_string(),
        }
    }

    /// Ready, Error and AwaitingTrigger need user action to change.
    pub fn is_settled(&self) -> bool {
        !matches!(self, Self::Loading { .. })
    }

    pub fn view(&self) -> Option<&TimelineView> {
        match self {
            Self::Ready(view) => Some(view),
            _ => None,
        }
    }
}

/// Timeline page controller.
pub struct TimelineController<H: HttpClient> {
    api: ServerApi<H>,
    state: TimelineState,
    data: Option<TimelineData>,
    poll_delay: Duration,
    trigger_delay: Duration,
    /// Delay before the next scheduled poll, if one is scheduled
    next_poll: Option<Duration>,
    max_polls: Option<u32>,
    cancel: Option<watch::Receiver<bool>>,
}

impl<H: HttpClient> TimelineController<H> {
    pub fn new(config: &DeckConfig, api: ServerApi<H>) -> Self {
        Self {
            api,
            state: TimelineState::loading(LOADING_MESSAGE),
            data: None,
            poll_delay: config.poll_delay,
            trigger_delay: config.trigger_delay,
            next_poll: None,
            max_polls: None,
            cancel: None,
        }
    }

    /// Give up polling after this many scheduled polls.
    pub fn with_max_polls(mut self, max_polls: u32) -> Self {
        self.max_polls = Some(max_polls);
        self
    }

    /// Stop polling once `cancel` turns true.
    pub fn with_cancel(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// A handle on the cancel signal, if one was attached.
    pub fn cancel_signal(&self) -> Option<watch::Receiver<bool>> {
        self.cancel.clone()
    }

    pub fn state(&self) -> &TimelineState {
        &self.state
    }

    /// The last analysis that reached `Ready`.
    pub fn data(&self) -> Option<&TimelineData> {
        self.data.as_ref()
    }

    /// Whether a poll is scheduled.
    pub fn poll_pending(&self) -> Option<Duration> {
        self.next_poll
    }

    /// Show an analysis directly.
    pub fn show(&mut self, data: TimelineData) -> &TimelineState {
        self.next_poll = None;
        self.state = TimelineState::Ready(Box::new(build_view(&data)));
        self.data = Some(data);
        &self.state
    }

    /// Fetch the analysis once and move to the state its status implies.
    pub async fn load(&mut self) -> &TimelineState {
        self.next_poll = None;

        let envelope = match self.api.fetch_analysis().await {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!("Failed to fetch analysis: {}", e);
                self.state = TimelineState::Error(LOAD_FAILED_MESSAGE.to_string());
                return &self.state;
            }
        };

        let status = envelope.status.as_deref().unwrap_or_default();
        debug!("Analysis status: {:?}", status);

        match (status, envelope.data) {
            ("completed", Some(data)) if !data.is_null() => match TimelineData::from_analysis(data) {
                Ok(data) => {
                    info!(
                        "Analysis ready: {} decision(s), {} universe(s)",
                        data.financial_timeline.key_decisions.len(),
                        data.alternative_universes.len()
                    );
                    return self.show(data);
                }
                Err(e) => {
                    warn!("{}", e);
                    self.state = TimelineState::Error(INVALID_DATA_MESSAGE.to_string());
                }
            },
            ("pending" | "processing", _) => {
                self.state = TimelineState::loading(PROCESSING_MESSAGE);
                self.next_poll = Some(self.poll_delay);
            }
            ("error", _) => {
                let message = envelope
                    .error
                    .filter(|e| !e.is_empty())
                    .unwrap_or_else(|| ANALYSIS_FAILED_MESSAGE.to_string());
                warn!("Analysis failed on the server: {}", message);
                self.state = TimelineState::Error(message);
            }
            _ => {
                self.state = TimelineState::AwaitingTrigger;
            }
        }
        &self.state
    }

    /// Start a new analysis and schedule the first poll.
    pub async fn trigger_analysis(&mut self) -> &TimelineState {
        self.next_poll = None;
        self.state = TimelineState::loading(STARTING_MESSAGE);

        match self.api.trigger_analysis().await {
            Ok(()) => {
                info!("Analysis started");
                self.next_poll = Some(self.trigger_delay);
            }
            Err(e) => {
                warn!("Failed to start analysis: {}", e);
                self.state = TimelineState::Error(TRIGGER_FAILED_MESSAGE.to_string());
            }
        }
        &self.state
    }

    /// Re-run the analysis and load right away.
    ///
    /// A failed trigger is logged and leaves the current state alone.
    pub async fn retry_analysis(&mut self) -> &TimelineState {
        match self.api.trigger_analysis().await {
            Ok(()) => self.load().await,
            Err(e) => {
                warn!("Failed to restart analysis: {}", e);
                &self.state
            }
        }
    }

    /// Same as [`retry_analysis`](Self::retry_analysis).
    pub async fn refresh(&mut self) -> &TimelineState {
        self.retry_analysis().await
    }

    /// Run scheduled polls until the state settles, polling is cancelled,
    /// or the poll limit is hit.
    pub async fn poll_until_settled(&mut self) -> &TimelineState {
        let mut polls = 0u32;
        while let Some(delay) = self.next_poll {
            if self.max_polls.is_some_and(|max| polls >= max) {
                warn!("Giving up after {} poll(s)", polls);
                break;
            }
            if !self.wait(delay).await {
                debug!("Polling cancelled");
                break;
            }
            polls += 1;
            self.load().await;
        }
        &self.state
    }

    /// Load the page: fetch, then keep polling while the analysis runs.
    pub async fn run(&mut self) -> &TimelineState {
        self.load().await;
        self.poll_until_settled().await
    }

    /// Trigger an analysis and poll until it settles.
    pub async fn start_analysis(&mut self) -> &TimelineState {
        self.trigger_analysis().await;
        self.poll_until_settled().await
    }

    /// Sleep for `delay`; false when cancelled first.
    async fn wait(&mut self, delay: Duration) -> bool {
        let Some(cancel) = self.cancel.as_mut() else {
            tokio::time::sleep(delay).await;
            return true;
        };
        if *cancel.borrow() {
            return false;
        }
        tokio::select! {
            _ = tokio::time::sleep(delay) => true,
            changed = cancel.changed() => match changed {
                Ok(()) => !*cancel.borrow(),
                // Sender gone: nobody can cancel any more
                Err(_) => {
                    tokio::time::sleep(delay).await;
                    true
                }
            },
        }
    }
}
