//! Plain-text transcript export.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::info;

use super::message::Message;
use super::render::message_body_text;

/// Build the export text.
pub fn export_text(agent_name: &str, messages: &[Message], now: DateTime<Local>) -> String {
    let mut text = format!(
        "Chat Export - {} - {}\n\n",
        agent_name,
        now.format("%-m/%-d/%Y, %-I:%M:%S %p")
    );

    for message in messages {
        text.push_str(&format!(
            "[{}] {}:\n{}\n\n",
            message.time_label(),
            message.role.author(),
            message_body_text(message)
        ));
    }
    text
}

/// `{agent}-chat-export-{epoch millis}.txt`
pub fn export_file_name(agent_name: &str, now: DateTime<Local>) -> String {
    format!("{}-chat-export-{}.txt", agent_name, now.timestamp_millis())
}

/// Write the export into `dir`, returning the file path.
pub async fn write_export(
    dir: &Path,
    agent_name: &str,
    messages: &[Message],
) -> std::io::Result<PathBuf> {
    let now = Local::now();
    let path = dir.join(export_file_name(agent_name, now));
    tokio::fs::create_dir_all(dir).await?;
    tokio::fs::write(&path, export_text(agent_name, messages, now)).await?;
    info!("Exported {} message(s) to {}", messages.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::message::Role;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 1, 15, 14, 5, 9).unwrap()
    }

    #[test]
    fn test_export_text_layout() {
        let messages = vec![
            Message::new("What is my score?", Role::User, Some("2024-01-15T10:30:00")),
            Message::assistant("Your score is **72**.", Some("2024-01-15T10:31:00")),
        ];

        let text = export_text("oracle_agent", &messages, fixed_now());
        assert_eq!(
            text,
            "Chat Export - oracle_agent - 1/15/2024, 2:05:09 PM\n\n\
             [10:30] You:\nWhat is my score?\n\n\
             [10:31] Agent:\nYour score is 72.\n\n"
        );
    }

    #[test]
    fn test_export_file_name() {
        let now = fixed_now();
        assert_eq!(
            export_file_name("tax_advisor_agent", now),
            format!("tax_advisor_agent-chat-export-{}.txt", now.timestamp_millis())
        );
    }

    #[tokio::test]
    async fn test_write_export() {
        let dir = tempfile::TempDir::new().unwrap();
        let messages = vec![Message::user("hello")];

        let path = write_export(dir.path(), "oracle_agent", &messages).await.unwrap();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("oracle_agent-chat-export-"));
        assert!(name.ends_with(".txt"));

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("Chat Export - oracle_agent - "));
        assert!(contents.contains("] You:\nhello\n\n"));
    }
}
