//! Command-line argument parsing for agentdeck.

use std::path::PathBuf;

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Show usage
    Help,
    /// Interactive chat with an agent (default)
    Chat { agent: Option<String> },
    /// Poll and print the parallel universe timeline
    Timeline { html: Option<PathBuf> },
}

pub const USAGE: &str = "\
Usage:
  agentdeck [chat] [AGENT]          Chat with an agent (default: oracle_agent)
  agentdeck timeline [--html PATH]  Show the parallel universe timeline
  agentdeck --version | -V
  agentdeck --help | -h

Environment:
  AGENTDECK_SERVER      Agent server URL (default: http://localhost:5000)
  AGENTDECK_AGENT       Default agent
  AGENTDECK_SESSION     Session id (default: random)
  AGENTDECK_EXPORT_DIR  Where /export writes transcripts
  RUST_LOG              Log filter (default: warn)";

/// Parse command-line arguments and return the appropriate command.
///
/// `--version` and `--help` win wherever they appear. Unknown arguments
/// fall back to the default chat command, the same way a bare invocation
/// does.
///
/// # Examples
///
/// ```
/// use agentdeck::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["agentdeck".to_string(), "--version".to_string()];
/// assert_eq!(parse_args(args.into_iter()), CliCommand::Version);
/// ```
pub fn parse_args<I>(args: I) -> CliCommand
where
    I: Iterator<Item = String>,
{
    // Skip the program name
    let args: Vec<String> = args.skip(1).collect();

    for arg in &args {
        match arg.as_str() {
            "--version" | "-V" => return CliCommand::Version,
            "--help" | "-h" => return CliCommand::Help,
            _ => {}
        }
    }

    let mut rest = args.into_iter();
    match rest.next().as_deref() {
        Some("timeline") => {
            let mut html = None;
            while let Some(arg) = rest.next() {
                if arg == "--html" {
                    html = rest.next().map(PathBuf::from);
                } else if let Some(path) = arg.strip_prefix("--html=") {
                    html = Some(PathBuf::from(path));
                }
            }
            CliCommand::Timeline { html }
        }
        Some("chat") => CliCommand::Chat {
            agent: rest.find(|a| !a.starts_with('-')),
        },
        Some(agent) if !agent.starts_with('-') => CliCommand::Chat {
            agent: Some(agent.to_string()),
        },
        _ => CliCommand::Chat { agent: None },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliCommand {
        let mut all = vec!["agentdeck".to_string()];
        all.extend(args.iter().map(|a| a.to_string()));
        parse_args(all.into_iter())
    }

    #[test]
    fn test_parse_version_flag() {
        assert_eq!(parse(&["--version"]), CliCommand::Version);
        assert_eq!(parse(&["-V"]), CliCommand::Version);
        assert_eq!(parse(&["timeline", "-V"]), CliCommand::Version);
    }

    #[test]
    fn test_parse_help_flag() {
        assert_eq!(parse(&["--help"]), CliCommand::Help);
        assert_eq!(parse(&["chat", "-h"]), CliCommand::Help);
    }

    #[test]
    fn test_parse_no_args() {
        assert_eq!(parse(&[]), CliCommand::Chat { agent: None });
    }

    #[test]
    fn test_parse_chat() {
        assert_eq!(parse(&["chat"]), CliCommand::Chat { agent: None });
        assert_eq!(
            parse(&["chat", "tax_advisor_agent"]),
            CliCommand::Chat {
                agent: Some("tax_advisor_agent".to_string())
            }
        );
        assert_eq!(
            parse(&["stock_analyst_agent"]),
            CliCommand::Chat {
                agent: Some("stock_analyst_agent".to_string())
            }
        );
    }

    #[test]
    fn test_parse_timeline() {
        assert_eq!(parse(&["timeline"]), CliCommand::Timeline { html: None });
        assert_eq!(
            parse(&["timeline", "--html", "out.html"]),
            CliCommand::Timeline {
                html: Some(PathBuf::from("out.html"))
            }
        );
        assert_eq!(
            parse(&["timeline", "--html=t.html"]),
            CliCommand::Timeline {
                html: Some(PathBuf::from("t.html"))
            }
        );
    }

    #[test]
    fn test_parse_unknown_flag() {
        assert_eq!(parse(&["--unknown"]), CliCommand::Chat { agent: None });
    }
}
