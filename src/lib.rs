pub mod config;
pub mod dashboard;
pub mod db;
pub mod errors;
pub mod models;
pub mod project;
pub mod query;
pub mod render;
pub mod source;

use crate::config::DashboardConfig;
use crate::dashboard::{spawn_dispatcher, Dashboard};
use crate::db::{Database, MemoryPreferences, PreferenceStore};
use crate::errors::AppResult;
use crate::models::{DashboardEvent, DashboardIntent};
use crate::source::JsonFileSource;
use anyhow::Context;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing_appender::non_blocking::WorkerGuard;

static LOG_GUARD: std::sync::OnceLock<WorkerGuard> = std::sync::OnceLock::new();

const CHANNEL_CAPACITY: usize = 256;

/// Loads configuration and logging, then serves intents from stdin and
/// writes events to stdout, one JSON document per line.
pub fn run() -> anyhow::Result<()> {
    let config = DashboardConfig::from_env().context("failed to load dashboard configuration")?;
    if let Err(error) = init_tracing(&config) {
        eprintln!("failed to initialize logging: {error}");
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(serve(config))
}

async fn serve(config: DashboardConfig) -> anyhow::Result<()> {
    let preferences = open_preferences(&config);
    let mut dashboard = Dashboard::new(preferences);

    let source = JsonFileSource::new(&config.data_path);
    tracing::info!(path = %source.path().display(), "loading projects");
    let initial = dashboard.load(&source).await;

    let mut stdout = tokio::io::stdout();
    write_event(&mut stdout, &DashboardEvent::ViewUpdated(initial)).await?;

    let (intent_tx, intent_rx) = mpsc::channel::<DashboardIntent>(CHANNEL_CAPACITY);
    let (event_tx, mut event_rx) = mpsc::channel::<DashboardEvent>(CHANNEL_CAPACITY);
    let dispatcher = spawn_dispatcher(dashboard, intent_rx, event_tx);

    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let Some(intent) = parse_intent(&line) else {
                        continue;
                    };
                    if intent_tx.send(intent).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(error) => {
                    tracing::error!(error = %error, "failed to read intent stream");
                    break;
                }
            }
        }
    });

    while let Some(event) = event_rx.recv().await {
        write_event(&mut stdout, &event).await?;
    }

    dispatcher.await.context("dispatcher task failed")?;
    tracing::info!("intent stream closed, shutting down");
    Ok(())
}

fn open_preferences(config: &DashboardConfig) -> Arc<dyn PreferenceStore> {
    match Database::new(&config.database_path()) {
        Ok(db) => Arc::new(db),
        Err(error) => {
            tracing::warn!(error = %error, "preference database unavailable, filter will not persist");
            Arc::new(MemoryPreferences::new())
        }
    }
}

/// `None` for a blank line.
pub fn decode_intent(line: &str) -> AppResult<Option<DashboardIntent>> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let intent = serde_json::from_str::<DashboardIntent>(trimmed)?;
    Ok(Some(intent))
}

/// Malformed lines are logged and skipped.
pub fn parse_intent(line: &str) -> Option<DashboardIntent> {
    match decode_intent(line) {
        Ok(intent) => intent,
        Err(error) => {
            tracing::warn!(error = %error, line = %line.trim(), "ignoring malformed intent");
            None
        }
    }
}

pub async fn write_event<W: AsyncWrite + Unpin>(writer: &mut W, event: &DashboardEvent) -> anyhow::Result<()> {
    let mut encoded = serde_json::to_vec(event).context("failed to encode event")?;
    encoded.push(b'\n');
    writer.write_all(&encoded).await?;
    writer.flush().await?;
    Ok(())
}

fn init_tracing(config: &DashboardConfig) -> Result<(), String> {
    let log_dir = config.log_dir();
    std::fs::create_dir_all(&log_dir).map_err(|error| error.to_string())?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "dashboard.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_new(&config.log_filter)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .json()
        .with_writer(non_blocking)
        .try_init()
        .map_err(|error| error.to_string())
}

#[cfg(test)]
mod tests {
    use super::{decode_intent, parse_intent, write_event};
    use crate::errors::AppError;
    use crate::models::{DashboardEvent, DashboardIntent, ProjectDetailView};

    #[test]
    fn malformed_intent_is_invalid_input() {
        assert!(matches!(decode_intent("{not json"), Err(AppError::Invalid(_))));
        assert!(matches!(decode_intent(r#"{"type":"pageSelected"}"#), Err(AppError::Invalid(_))));
        assert!(matches!(decode_intent("   "), Ok(None)));
        assert!(matches!(
            decode_intent(r#"{"type":"cardSelected","id":4}"#),
            Ok(Some(DashboardIntent::CardSelected { id: 4 }))
        ));
    }

    #[test]
    fn parses_intent_lines() {
        assert_eq!(
            parse_intent(r#" {"type":"pageSelected","page":2} "#),
            Some(DashboardIntent::PageSelected { page: 2 })
        );
        assert_eq!(parse_intent(r#"{"type":"refresh"}"#), Some(DashboardIntent::Refresh));
        assert_eq!(parse_intent(""), None);
        assert_eq!(parse_intent("{not json"), None);
        assert_eq!(parse_intent(r#"{"type":"launchRocket"}"#), None);
    }

    #[tokio::test]
    async fn writes_one_event_per_line() {
        let detail = ProjectDetailView {
            id: 1,
            name: "Uno".to_string(),
            status: "paused".to_string(),
            status_label: Some("Pausado".to_string()),
            status_style: Some("status-paused".to_string()),
            last_updated: "2025-02-10".to_string(),
            formatted_date: "10 de febrero de 2025".to_string(),
            technologies: Vec::new(),
            description: String::new(),
        };
        let mut buffer: Vec<u8> = Vec::new();
        write_event(&mut buffer, &DashboardEvent::DetailOpened(detail))
            .await
            .expect("write event");

        let text = String::from_utf8(buffer).expect("utf8");
        assert!(text.ends_with('\n'));
        let value: serde_json::Value = serde_json::from_str(text.trim()).expect("json");
        assert_eq!(value["type"], "detailOpened");
        assert_eq!(value["payload"]["statusLabel"], "Pausado");
    }
}
