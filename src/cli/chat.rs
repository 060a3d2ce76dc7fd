//! Terminal chat front end.
//!
//! Reads lines from stdin, sends them through a [`ChatController`], and
//! prints transcript entries as they arrive. Lines starting with `/` are
//! commands.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use color_eyre::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

use crate::adapters::{FilePreferences, ReqwestHttpClient, SocketIoConnection};
use crate::api::ServerApi;
use crate::chat::{ChatController, ClearOutcome, CounterLevel, SendOutcome};
use crate::config::DeckConfig;
use crate::socket::SocketState;
use crate::traits::{HttpClient, PreferenceStore, SocketConnection};

pub const COMMANDS_HELP: &str = "\
Commands:
  /clear           Delete this session on the server and clear the transcript
  /new             Start a new chat with the same agent
  /export          Save the transcript to a text file
  /theme           Toggle light/dark theme
  /attach PATH...  Stage files for upload
  /files           List staged files
  /remove N        Unstage file N
  /upload          Clear staged files (upload is not supported)
  /help            Show this help
  /quit            Leave";

/// A `/command` line.
#[derive(Debug, Clone, PartialEq)]
pub enum SlashCommand {
    Clear,
    New,
    Export,
    Theme,
    Attach(Vec<PathBuf>),
    Files,
    Remove(usize),
    Upload,
    Help,
    Quit,
    Unknown(String),
}

impl SlashCommand {
    /// `None` when the line is a chat message.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let rest = line.strip_prefix('/')?;
        let mut words = rest.split_whitespace();
        let name = words.next().unwrap_or_default();

        Some(match name {
            "clear" => Self::Clear,
            "new" => Self::New,
            "export" => Self::Export,
            "theme" => Self::Theme,
            "attach" => Self::Attach(words.map(PathBuf::from).collect()),
            "files" => Self::Files,
            "remove" => match words.next().and_then(|n| n.parse::<usize>().ok()) {
                Some(n) if n > 0 => Self::Remove(n - 1),
                _ => Self::Unknown(line.to_string()),
            },
            "upload" => Self::Upload,
            "help" => Self::Help,
            "quit" | "exit" => Self::Quit,
            _ => Self::Unknown(line.to_string()),
        })
    }
}

/// How a chat session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    Quit,
    NewChat,
}

enum Flow {
    Continue,
    End(SessionEnd),
}

/// Prints transcript entries not shown yet.
#[derive(Debug, Default)]
struct Printer {
    printed: usize,
}

impl Printer {
    fn flush<H, S, P, W>(&mut self, controller: &ChatController<H, S, P>, out: &mut W) -> Result<()>
    where
        H: HttpClient,
        S: SocketConnection,
        P: PreferenceStore,
        W: Write,
    {
        let count = controller.messages().len();
        if count < self.printed {
            self.printed = 0;
        }
        for index in self.printed..count {
            if let Some(text) = controller.render_message_text(index) {
                writeln!(out, "{}\n", text)?;
            }
        }
        self.printed = count;
        out.flush()?;
        Ok(())
    }
}

fn describe_state(state: &SocketState) -> String {
    match state {
        SocketState::Connected => "● Connected".to_string(),
        SocketState::Reconnecting { attempt } => format!("◌ Reconnecting (attempt {})", attempt),
        SocketState::Disconnected => "○ Disconnected".to_string(),
    }
}

async fn handle_command<H, S, P, W>(
    command: SlashCommand,
    controller: &mut ChatController<H, S, P>,
    config: &DeckConfig,
    out: &mut W,
) -> Result<Flow>
where
    H: HttpClient,
    S: SocketConnection,
    P: PreferenceStore,
    W: Write,
{
    match command {
        SlashCommand::Clear => match controller.clear_session().await {
            ClearOutcome::Reloaded => writeln!(out, "Session cleared.")?,
            ClearOutcome::Failed(reason) => writeln!(out, "Failed to clear session: {}", reason)?,
        },
        SlashCommand::New => return Ok(Flow::End(SessionEnd::NewChat)),
        SlashCommand::Export => match controller.export_transcript(&config.export_dir).await {
            Ok(path) => writeln!(out, "Exported to {}", path.display())?,
            Err(e) => writeln!(out, "Export failed: {}", e.user_message())?,
        },
        SlashCommand::Theme => {
            let theme = controller.toggle_theme();
            writeln!(out, "Theme: {}", theme)?;
        }
        SlashCommand::Attach(paths) if paths.is_empty() => {
            writeln!(out, "Usage: /attach PATH...")?;
        }
        SlashCommand::Attach(paths) => match controller.stage_paths(&paths).await {
            Ok(()) => writeln!(out, "{}", controller.files().render_text())?,
            Err(e) => writeln!(out, "Cannot attach: {}", e)?,
        },
        SlashCommand::Files => {
            if controller.files().files().is_empty() {
                writeln!(out, "No files staged.")?;
            } else {
                writeln!(out, "{}", controller.files().render_text())?;
            }
        }
        SlashCommand::Remove(index) => match controller.remove_staged_file(index) {
            Some(file) => writeln!(out, "Removed {}", file.name)?,
            None => writeln!(out, "No staged file #{}", index + 1)?,
        },
        SlashCommand::Upload => {
            let count = controller.upload_files();
            writeln!(out, "Upload is not supported; cleared {} staged file(s).", count)?;
        }
        SlashCommand::Help => writeln!(out, "{}", COMMANDS_HELP)?,
        SlashCommand::Quit => return Ok(Flow::End(SessionEnd::Quit)),
        SlashCommand::Unknown(line) => writeln!(out, "Unknown command {} (try /help)", line)?,
    }
    Ok(Flow::Continue)
}

async fn handle_line<H, S, P, W>(
    line: &str,
    controller: &mut ChatController<H, S, P>,
    config: &DeckConfig,
    out: &mut W,
) -> Result<Flow>
where
    H: HttpClient,
    S: SocketConnection,
    P: PreferenceStore,
    W: Write,
{
    if let Some(command) = SlashCommand::parse(line) {
        return handle_command(command, controller, config, out).await;
    }

    controller.set_input(line);
    let count = controller.char_count();
    if count.level == CounterLevel::Error {
        writeln!(out, "({})", count.label())?;
    }

    if controller.send_message().await == SendOutcome::Socket {
        debug!("Message sent over socket");
    }
    Ok(Flow::Continue)
}

/// Drive one chat session until the input ends, `/quit`, or `/new`.
pub async fn run_session<H, S, P, R, W>(
    controller: &mut ChatController<H, S, P>,
    config: &DeckConfig,
    input: R,
    out: &mut W,
) -> Result<SessionEnd>
where
    H: HttpClient,
    S: SocketConnection,
    P: PreferenceStore,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    controller.initialize().await;

    writeln!(
        out,
        "Chatting with {} (session {}). Type /help for commands.",
        controller.agent_name(),
        controller.session_id()
    )?;
    writeln!(out, "{}", describe_state(controller.socket_state()))?;

    let mut printer = Printer::default();
    printer.flush(controller, out)?;

    let mut lines = input.lines();
    let period = config.keepalive_interval;
    let mut keepalive = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    let mut socket_open = true;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    return Ok(SessionEnd::Quit);
                };
                if let Flow::End(end) = handle_line(&line, controller, config, out).await? {
                    return Ok(end);
                }
                printer.flush(controller, out)?;
            }
            activity = controller.next_activity(), if socket_open => {
                let Some(activity) = activity else {
                    warn!("Socket closed; continuing over REST");
                    socket_open = false;
                    continue;
                };
                let was_typing = controller.is_typing();
                let before = controller.socket_state().clone();
                controller.apply(activity).await;

                if *controller.socket_state() != before {
                    writeln!(out, "{}", describe_state(controller.socket_state()))?;
                }
                if controller.is_typing() && !was_typing {
                    writeln!(out, "Agent is typing...")?;
                }
                printer.flush(controller, out)?;
            }
            _ = keepalive.tick() => controller.keepalive().await,
        }
    }
}

/// `agentdeck chat`: connect and chat on stdin/stdout until `/quit`.
pub async fn run_chat(mut config: DeckConfig) -> Result<()> {
    let http = Arc::new(ReqwestHttpClient::new());
    let api = ServerApi::new(config.server_url.clone(), http);
    let preferences = Arc::new(match FilePreferences::new() {
        Ok(preferences) => preferences,
        Err(e) => {
            warn!("Preferences unavailable ({}); using a temporary file", e);
            FilePreferences::at(std::env::temp_dir().join("agentdeck-preferences.json"))
        }
    });

    // One reader for every session so lines buffered before `/new` survive it
    let mut stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();

    loop {
        let socket = Arc::new(SocketIoConnection::spawn(config.socket_config()));
        let mut controller = ChatController::new(&config, api.clone(), socket, Arc::clone(&preferences));

        let end = run_session(&mut controller, &config, &mut stdin, &mut stdout).await;
        controller.shutdown();

        match end? {
            SessionEnd::Quit => return Ok(()),
            SessionEnd::NewChat => {
                config = config.with_session_id(uuid::Uuid::new_v4().to_string());
                writeln!(stdout, "\nNew chat ({})\n", controller.new_chat_path())?;
            }
        }
    }
}
