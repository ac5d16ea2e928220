//! ClaimDesk Notifier - realtime task notifications for the claims portal
//!
//! Runs the notification core for one signed-in user against a live
//! backend and logs everything the UI layer would render.

use std::sync::Arc;

use clap::Parser;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{EnvFilter, fmt};

use claimdesk_client::HttpTicketApi;
use claimdesk_core::config::AppConfig;
use claimdesk_core::error::AppError;
use claimdesk_realtime::{
    Identity, NotificationCenter, NotificationEngine, RealtimeMetrics, UiEvent, WsConnector,
};
use claimdesk_storage::{FileStore, MemoryStore};

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "claimdesk-notifier", version, about = "ClaimDesk notification daemon")]
struct Cli {
    /// Configuration overlay to load from `config/<env>`.
    #[arg(long, default_value = "development")]
    env: String,

    /// User to deliver notifications for. Without it nothing connects.
    #[arg(long)]
    user_id: Option<String>,

    /// Bearer token for the REST API.
    #[arg(long)]
    token: Option<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::load(&cli.env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(cli, config).await {
        tracing::error!("Notifier error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main run function
async fn run(cli: Cli, config: AppConfig) -> Result<(), AppError> {
    tracing::info!(env = %cli.env, "Starting ClaimDesk notifier v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: REST client ──────────────────────────────────────
    let api = HttpTicketApi::new(&config.api)?;
    api.set_token(cli.token.clone());
    let api = Arc::new(api);
    tracing::info!(base_url = %config.api.base_url, "REST client ready");

    // ── Step 2: Client storage ───────────────────────────────────
    let durable_path = config.storage.durable_path();
    let durable = Arc::new(FileStore::open(&durable_path)?);
    let session = Arc::new(MemoryStore::new());
    tracing::info!(path = %durable_path.display(), "Durable store opened");

    // ── Step 3: Notification core ────────────────────────────────
    let metrics = Arc::new(RealtimeMetrics::new());
    let center = Arc::new(NotificationCenter::new(
        durable,
        session,
        config.notifications.clone(),
        config.storage.clone(),
        Arc::clone(&metrics),
    ));
    let engine = NotificationEngine::new(
        &config,
        api,
        Arc::new(WsConnector::new()?),
        Arc::clone(&center),
    )?;

    let logger = tokio::spawn(log_ui_events(Arc::clone(&center)));

    // ── Step 4: Identity ─────────────────────────────────────────
    match cli.user_id {
        Some(user_id) => {
            engine.set_identity(Some(Identity::new(user_id))).await?;
        }
        None => {
            tracing::warn!("No --user-id given; notifications stay inactive");
        }
    }

    // ── Step 5: Graceful shutdown ────────────────────────────────
    shutdown_signal().await;
    tracing::info!("Shutdown signal received, stopping notifications...");

    engine.shutdown().await;
    logger.abort();

    let snapshot = metrics.snapshot();
    tracing::info!(
        connects = snapshot.connects,
        reconnects = snapshot.reconnects,
        messages = snapshot.messages_received,
        malformed = snapshot.malformed_messages,
        toasts = snapshot.toasts_shown,
        "ClaimDesk notifier shut down"
    );
    Ok(())
}

/// Log every UI event the way a renderer would receive it.
async fn log_ui_events(center: Arc<NotificationCenter>) {
    let mut events = center.subscribe();
    loop {
        match events.recv().await {
            Ok(UiEvent::PopupShown { task }) => {
                tracing::info!(task_id = %task.id, title = %task.title, status = %task.status, "Popup shown");
            }
            Ok(UiEvent::PopupClosed { task_id, reason }) => {
                tracing::info!(task_id = %task_id, %reason, "Popup closed");
            }
            Ok(UiEvent::UnseenCountChanged { count }) => {
                tracing::info!(count, "Unseen tasks");
            }
            Ok(UiEvent::Toast(toast)) => {
                tracing::info!(kind = ?toast.kind, message = %toast.message, "Toast");
            }
            Ok(UiEvent::LoadFailed { message }) => {
                tracing::warn!(%message, "Couldn't load tasks");
            }
            Ok(UiEvent::Invalidated(invalidation)) => {
                tracing::debug!(key = %invalidation, "Cache invalidated");
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "UI event log lagged");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
