//! Common test utilities for integration tests.
//!
//! Fixtures mirror the payloads the agent server produces, and helpers wire
//! controllers to the crate's mock adapters.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use agentdeck::adapters::{InMemoryPreferences, MockHttpClient, MockSocket};
use agentdeck::api::ServerApi;
use agentdeck::chat::ChatController;
use agentdeck::config::DeckConfig;
use agentdeck::timeline::TimelineController;
use serde_json::{json, Value};

pub const BASE_URL: &str = "http://agents.test";
pub const SESSION_ID: &str = "session-123";
pub const AGENT: &str = "oracle_agent";

pub fn url(path: &str) -> String {
    format!("{}{}", BASE_URL, path)
}

/// Configuration with zero polling delays and a fixed session.
pub fn test_config() -> DeckConfig {
    DeckConfig::default()
        .with_server_url(BASE_URL)
        .with_agent_name(AGENT)
        .with_session_id(SESSION_ID)
        .with_poll_delay(Duration::ZERO)
        .with_trigger_delay(Duration::ZERO)
}

pub type TestChat = ChatController<MockHttpClient, MockSocket, InMemoryPreferences>;

pub struct ChatHarness {
    pub controller: TestChat,
    pub http: Arc<MockHttpClient>,
    pub socket: MockSocket,
    pub preferences: Arc<InMemoryPreferences>,
}

/// A chat controller over mocks; the socket starts in `socket`'s state.
pub fn chat_harness(socket: MockSocket, preferences: InMemoryPreferences) -> ChatHarness {
    let config = test_config();
    let http = Arc::new(MockHttpClient::new());
    let preferences = Arc::new(preferences);
    let controller = ChatController::new(
        &config,
        ServerApi::new(BASE_URL, Arc::clone(&http)),
        Arc::new(socket.clone()),
        Arc::clone(&preferences),
    );
    ChatHarness {
        controller,
        http,
        socket,
        preferences,
    }
}

pub fn timeline_controller(http: Arc<MockHttpClient>) -> TimelineController<MockHttpClient> {
    TimelineController::new(&test_config(), ServerApi::new(BASE_URL, http))
}

/// A complete analysis: two decisions, four universes (one of them the
/// actual path), and summary insights.
pub fn sample_analysis() -> Value {
    json!({
        "metadata": {
            "analysis_date": "2024-01-15",
            "data_period": "2018-08-07 to 2025-07-15",
            "total_decisions_analyzed": 2,
            "universes_generated": 4,
            "currency": "INR"
        },
        "financial_timeline": {
            "actual_journey": {
                "start_date": "2018-08-07",
                "end_date": "2025-07-15",
                "starting_net_worth": "N/A",
                "current_net_worth": "₹12,97,285",
                "wealth_created": "₹12,97,285 (based on available data)",
                "cagr": "N/A"
            },
            "key_decisions": [
                {
                    "decision_id": "dp_20210324_job_change",
                    "date": "2021-03-24",
                    "description": "Started New Job at KARZA TECHNOLOGIES",
                    "category": "Career",
                    "amount": "₹0",
                    "current_value": "N/A",
                    "roi": "N/A",
                    "decision_quality_score": 8.5,
                    "market_context": "Foundational career move."
                },
                {
                    "decision_id": "dp_20220309_investment",
                    "date": "2022-03-09",
                    "description": "Invested in ICICI Prudential Nifty 50 Index Fund",
                    "category": "Investment",
                    "amount": "₹10,027",
                    "current_value": "₹1,77,605",
                    "roi": "1671%",
                    "decision_quality_score": 9.8,
                    "market_context": "Post-COVID recovery phase."
                }
            ]
        },
        "alternative_universes": [
            {
                "universe_id": "actual_timeline",
                "name": "Your Actual Path",
                "final_net_worth": "₹12,97,285",
                "wealth_difference": "₹0 (0%)",
                "key_characteristics": ["Career progression as lived"]
            },
            {
                "universe_id": "conservative",
                "name": "The Conservative Path",
                "description": "Capital preservation and low risk.",
                "final_net_worth": "₹11,31,764",
                "wealth_difference": "-₹1,65,521 (-12.76%)",
                "key_characteristics": [
                    "Invested in Fixed Deposits instead of equity funds",
                    "Held cash instead of buying stocks"
                ]
            },
            {
                "universe_id": "aggressive",
                "name": "The Aggressive Investor",
                "final_net_worth": "₹25,94,570",
                "wealth_difference": "+₹12,97,285 (+100%)",
                "key_characteristics": [
                    "Doubled monthly INVESTMENT through SIPs",
                    "Switched career to product management"
                ]
            },
            {
                "universe_id": "spender",
                "name": "The Lifestyle Spender",
                "final_net_worth": "₹6,48,642",
                "wealth_difference": "-₹6,48,643 (-50%)",
                "key_characteristics": ["Upgraded lifestyle with every career raise"]
            }
        ],
        "summary_insights": {
            "overall_performance": "Good (7.5/10)",
            "transformation_potential": {
                "from_current": "₹12,97,285",
                "to_optimal": "₹18,00,000+",
                "improvement": "+₹5,00,000+ (+38.5%)",
                "timeline": "Next 5 years with a disciplined, diversified strategy."
            }
        }
    })
}

/// `GET /api/parallel-universe-data` body for a finished analysis.
pub fn completed_envelope(data: Value) -> Value {
    json!({"status": "completed", "data": data})
}
