//! CLI module for agentdeck.
//!
//! This module provides the command-line front ends:
//! - Argument parsing
//! - Version display
//! - Interactive chat
//! - Timeline polling and printing
//!
//! # Usage
//!
//! ```ignore
//! use agentdeck::cli::{parse_args, run_cli_command};
//!
//! let command = parse_args(std::env::args());
//! run_cli_command(command, DeckConfig::from_env()).await?;
//! ```

pub mod args;
pub mod chat;
pub mod timeline;
pub mod version;

pub use args::{parse_args, CliCommand, USAGE};
pub use chat::run_chat;
pub use timeline::run_timeline;
pub use version::{handle_version_command, VERSION};

use color_eyre::Result;

use crate::config::DeckConfig;

/// Run a parsed CLI command.
pub async fn run_cli_command(command: CliCommand, config: DeckConfig) -> Result<()> {
    match command {
        CliCommand::Version => {
            handle_version_command();
            Ok(())
        }
        CliCommand::Help => {
            println!("{}", USAGE);
            Ok(())
        }
        CliCommand::Chat { agent } => {
            let config = match agent {
                Some(agent) => config.with_agent_name(agent),
                None => config,
            };
            run_chat(config).await
        }
        CliCommand::Timeline { html } => run_timeline(config, html).await,
    }
}
