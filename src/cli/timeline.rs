//! Terminal timeline front end.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use color_eyre::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::adapters::ReqwestHttpClient;
use crate::api::ServerApi;
use crate::config::DeckConfig;
use crate::timeline::{
    render_html, render_text, TimelineController, TimelineState, TimelineView, LOADING_MESSAGE,
    NO_ANALYSIS_MESSAGE, STARTING_MESSAGE,
};
use crate::traits::HttpClient;

/// Standalone page around the timeline fragment.
pub fn render_page(view: &TimelineView) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Parallel Universe Timeline</title>\n</head>\n<body>\n{}</body>\n</html>\n",
        render_html(view)
    )
}

/// Resolves once `cancel` holds true; never resolves without a sender.
async fn cancelled(cancel: Option<watch::Receiver<bool>>) {
    let Some(mut cancel) = cancel else {
        return std::future::pending().await;
    };
    loop {
        if *cancel.borrow_and_update() {
            return;
        }
        if cancel.changed().await.is_err() {
            return std::future::pending().await;
        }
    }
}

/// Ask a yes/no question. Cancelling while waiting answers no.
async fn confirm<R, W>(
    prompt: &str,
    lines: &mut tokio::io::Lines<R>,
    cancel: Option<watch::Receiver<bool>>,
    out: &mut W,
) -> Result<bool>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    write!(out, "{} [y/N] ", prompt)?;
    out.flush()?;
    let answer = tokio::select! {
        line = lines.next_line() => line?.unwrap_or_default(),
        _ = cancelled(cancel) => {
            writeln!(out)?;
            return Ok(false);
        }
    };
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

async fn write_page(path: &Path, view: &TimelineView) -> std::io::Result<()> {
    tokio::fs::write(path, render_page(view)).await?;
    info!("Wrote timeline page to {}", path.display());
    Ok(())
}

/// Load the timeline, offering to start or retry the analysis, and print
/// the result.
pub async fn run_session<H, R, W>(
    controller: &mut TimelineController<H>,
    html: Option<&Path>,
    input: R,
    out: &mut W,
) -> Result<()>
where
    H: HttpClient,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();

    writeln!(out, "{}", LOADING_MESSAGE)?;
    let mut state = controller.run().await.clone();

    loop {
        match state {
            TimelineState::Ready(view) => {
                write!(out, "{}", render_text(&view))?;
                if let Some(path) = html {
                    write_page(path, &view).await?;
                    writeln!(out, "\nTimeline page written to {}", path.display())?;
                }
                return Ok(());
            }
            TimelineState::Loading { message } => {
                writeln!(out, "{}", message)?;
                writeln!(out, "Stopped waiting for the analysis.")?;
                return Ok(());
            }
            TimelineState::AwaitingTrigger => {
                writeln!(out, "{}", NO_ANALYSIS_MESSAGE)?;
                if !confirm("Start analysis?", &mut lines, controller.cancel_signal(), out).await? {
                    return Ok(());
                }
                writeln!(out, "{}", STARTING_MESSAGE)?;
                state = controller.start_analysis().await.clone();
            }
            TimelineState::Error(message) => {
                writeln!(out, "{}", message)?;
                if !confirm("Retry analysis?", &mut lines, controller.cancel_signal(), out).await? {
                    return Ok(());
                }
                controller.retry_analysis().await;
                state = controller.poll_until_settled().await.clone();
            }
        }
    }
}

/// `agentdeck timeline`: poll the analysis and print it. The first Ctrl-C
/// stops polling and declines any open prompt; a second one exits.
pub async fn run_timeline(config: DeckConfig, html: Option<PathBuf>) -> Result<()> {
    let http = Arc::new(ReqwestHttpClient::new());
    let api = ServerApi::new(config.server_url.clone(), http);

    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        warn!("Interrupted; stopping");
        let _ = cancel_tx.send(true);
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted again; exiting");
            std::process::exit(130);
        }
    });

    let mut controller = TimelineController::new(&config, api).with_cancel(cancel_rx);
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    run_session(&mut controller, html.as_deref(), stdin, &mut stdout).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{MockHttpClient, MockResponse};
    use crate::traits::Response;
    use bytes::Bytes;
    use serde_json::json;
    use std::time::Duration;

    const DATA_URL: &str = "http://test/api/parallel-universe-data";
    const TRIGGER_URL: &str = "http://test/api/trigger-parallel-analysis";

    fn completed() -> Response {
        Response::json_body(
            200,
            &json!({
                "status": "completed",
                "data": {
                    "financial_timeline": {
                        "actual_journey": {"current_net_worth": "₹12,97,285"},
                        "key_decisions": []
                    },
                    "alternative_universes": []
                }
            }),
        )
    }

    fn controller(http: Arc<MockHttpClient>) -> TimelineController<MockHttpClient> {
        let config = DeckConfig::default()
            .with_poll_delay(Duration::ZERO)
            .with_trigger_delay(Duration::ZERO);
        TimelineController::new(&config, ServerApi::new("http://test", http))
    }

    async fn session(c: &mut TimelineController<MockHttpClient>, html: Option<&Path>, input: &str) -> String {
        let mut out = Vec::new();
        run_session(c, html, input.as_bytes(), &mut out).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn test_ready_prints_summary_and_page() {
        let http = Arc::new(MockHttpClient::new());
        http.set_response(DATA_URL, MockResponse::Success(completed()));
        let dir = tempfile::TempDir::new().unwrap();
        let page = dir.path().join("timeline.html");

        let out = session(&mut controller(http), Some(&page), "").await;
        assert!(out.contains("Current net worth:  ₹13.0L"));
        assert!(out.contains("Timeline page written to"));

        let html = std::fs::read_to_string(&page).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("id=\"comparisonGrid\""));
    }

    #[tokio::test]
    async fn test_missing_analysis_declined() {
        let http = Arc::new(MockHttpClient::new());
        http.set_response(DATA_URL, MockResponse::Success(Response::json_body(200, &json!({"status": "none"}))));

        let out = session(&mut controller(Arc::clone(&http)), None, "n\n").await;
        assert!(out.contains(NO_ANALYSIS_MESSAGE));
        assert!(http.requests_with_method("POST").is_empty());
    }

    #[tokio::test]
    async fn test_missing_analysis_started() {
        let http = Arc::new(MockHttpClient::new());
        http.set_response(
            DATA_URL,
            MockResponse::Sequence(vec![
                Response::json_body(200, &json!({"status": "none"})),
                Response::json_body(200, &json!({"status": "processing"})),
                completed(),
            ]),
        );
        http.set_response(TRIGGER_URL, MockResponse::Success(Response::new(200, Bytes::new())));

        let out = session(&mut controller(Arc::clone(&http)), None, "y\n").await;
        assert!(out.contains(STARTING_MESSAGE));
        assert!(out.contains("Your Path: ₹12,97,285 100%"));
        assert_eq!(http.requests_with_method("POST").len(), 1);
    }

    #[tokio::test]
    async fn test_error_then_eof() {
        let http = Arc::new(MockHttpClient::new());
        http.set_response(
            DATA_URL,
            MockResponse::Success(Response::json_body(200, &json!({"status": "error", "error": "No data"}))),
        );
        let out = session(&mut controller(http), None, "").await;
        assert!(out.contains("No data"));
        assert!(out.contains("Retry analysis? [y/N]"));
    }

    #[tokio::test]
    async fn test_cancel_declines_prompt_without_input() {
        let http = Arc::new(MockHttpClient::new());
        http.set_response(DATA_URL, MockResponse::Success(Response::json_body(200, &json!({"status": "none"}))));
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let mut c = controller(Arc::clone(&http)).with_cancel(cancel_rx);

        // Stdin stays open with nothing typed
        let (_typing, stdin) = tokio::io::duplex(64);
        let stdin = tokio::io::BufReader::new(stdin);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            let _ = cancel_tx.send(true);
            // Keep the sender alive so the prompt sees the change
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let mut out = Vec::new();
        tokio::time::timeout(Duration::from_secs(2), run_session(&mut c, None, stdin, &mut out))
            .await
            .expect("prompt ignored cancel")
            .unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("Start analysis? [y/N]"));
        assert!(http.requests_with_method("POST").is_empty());
    }

    #[tokio::test]
    async fn test_confirm_without_cancel_reads_answer() {
        let mut lines = tokio::io::BufReader::new("yes\n".as_bytes()).lines();
        let mut out = Vec::new();
        assert!(confirm("Go?", &mut lines, None, &mut out).await.unwrap());
    }
}
