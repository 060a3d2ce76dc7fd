//! agentdeck - chat and timeline client for the ADK agent server
//!
//! This library exposes modules for use in integration tests.

pub mod adapters;
pub mod api;
pub mod chat;
pub mod cli;
pub mod config;
pub mod error;
pub mod markdown;
pub mod socket;
pub mod timeline;
pub mod traits;
