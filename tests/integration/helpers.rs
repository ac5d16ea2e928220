//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, mpsc};
use tokio::time::Instant;

use claimdesk_client::InMemoryTicketApi;
use claimdesk_core::config::AppConfig;
use claimdesk_core::error::AppError;
use claimdesk_core::result::AppResult;
use claimdesk_core::traits::KeyValueStore;
use claimdesk_core::types::{TaskId, TicketId, UserId};
use claimdesk_entity::{Task, TaskStatus, Ticket, TicketPriority, TicketStatus};
use claimdesk_realtime::{
    Connector, EventStream, Identity, NotificationCenter, NotificationEngine, RealtimeMetrics,
    UiEvent,
};
use claimdesk_storage::MemoryStore;

// ── Fixtures ───────────────────────────────────────────────

/// A ticket owned by `owner`.
pub fn ticket(id: &str, owner: &str) -> Ticket {
    Ticket {
        id: TicketId::new(id),
        title: format!("Claim {id}"),
        description: String::new(),
        service_id: None,
        service_name: Some("Car insurance".to_string()),
        user_id: UserId::new(owner),
        status: TicketStatus::New,
        priority: TicketPriority::Medium,
        created_at: Utc::now(),
        updated_at: None,
    }
}

/// A task of `ticket_id` created at `created_at`.
pub fn task(id: &str, ticket_id: &str, created_at: DateTime<Utc>, status: TaskStatus) -> Task {
    Task {
        id: TaskId::new(id),
        ticket_id: TicketId::new(ticket_id),
        title: format!("Task {id}"),
        description: String::new(),
        status,
        due_date: None,
        assignee_id: None,
        created_at,
        updated_at: None,
    }
}

// ── Scripted socket ────────────────────────────────────────

/// Test side of an accepted connection: frames sent here reach the client.
/// Dropping it closes the socket.
pub struct ServerHandle {
    tx: mpsc::UnboundedSender<String>,
}

impl ServerHandle {
    /// Push a raw text frame.
    pub fn send(&self, frame: &str) {
        let _ = self.tx.send(frame.to_string());
    }
}

struct ScriptedStream {
    rx: mpsc::UnboundedReceiver<String>,
    sent: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl EventStream for ScriptedStream {
    async fn send_text(&mut self, text: String) -> AppResult<()> {
        self.sent.lock().unwrap().push(text);
        Ok(())
    }

    async fn next_text(&mut self) -> Option<AppResult<String>> {
        self.rx.recv().await.map(Ok)
    }

    async fn close(&mut self) {
        self.rx.close();
    }
}

/// Connector following a script. Connects beyond the script are refused.
#[derive(Debug, Default)]
pub struct ScriptedConnector {
    accepts: Mutex<VecDeque<Option<mpsc::UnboundedReceiver<String>>>>,
    attempts: Mutex<Vec<Instant>>,
    urls: Mutex<Vec<String>>,
    sent: Arc<Mutex<Vec<String>>>,
}

impl ScriptedConnector {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Accept the next connect.
    pub fn accept(&self) -> ServerHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        self.accepts.lock().unwrap().push_back(Some(rx));
        ServerHandle { tx }
    }

    /// Refuse the next connect.
    pub fn refuse(&self) {
        self.accepts.lock().unwrap().push_back(None);
    }

    /// Number of connect calls so far.
    pub fn attempts(&self) -> usize {
        self.attempts.lock().unwrap().len()
    }

    /// Gaps between consecutive connect calls.
    pub fn gaps(&self) -> Vec<Duration> {
        let attempts = self.attempts.lock().unwrap();
        attempts.windows(2).map(|w| w[1] - w[0]).collect()
    }

    /// URLs connected to.
    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }

    /// Frames the client sent.
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    async fn connect(&self, url: &str) -> AppResult<Box<dyn EventStream>> {
        self.attempts.lock().unwrap().push(Instant::now());
        self.urls.lock().unwrap().push(url.to_string());

        let next = self.accepts.lock().unwrap().pop_front().flatten();
        match next {
            Some(rx) => Ok(Box::new(ScriptedStream {
                rx,
                sent: self.sent.clone(),
            })),
            None => Err(AppError::transport("connection refused")),
        }
    }
}

// ── Application ────────────────────────────────────────────

/// Notification core wired to in-memory collaborators.
pub struct TestApp {
    pub config: AppConfig,
    pub api: Arc<InMemoryTicketApi>,
    pub connector: Arc<ScriptedConnector>,
    pub durable: Arc<MemoryStore>,
    pub session: Arc<MemoryStore>,
    pub center: Arc<NotificationCenter>,
    pub engine: NotificationEngine,
}

impl TestApp {
    /// Create an app with default configuration.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Create an app with the given configuration.
    pub fn with_config(config: AppConfig) -> Self {
        let api = Arc::new(InMemoryTicketApi::new());
        let connector = ScriptedConnector::new();
        let durable = Arc::new(MemoryStore::new());
        let session = Arc::new(MemoryStore::new());

        let center = Arc::new(NotificationCenter::new(
            durable.clone(),
            session.clone(),
            config.notifications.clone(),
            config.storage.clone(),
            Arc::new(RealtimeMetrics::new()),
        ));
        let engine = NotificationEngine::new(&config, api.clone(), connector.clone(), center.clone())
            .expect("Failed to build engine");

        Self {
            config,
            api,
            connector,
            durable,
            session,
            center,
            engine,
        }
    }

    /// Sign `user_id` in and let the first poll finish.
    pub async fn login(&self, user_id: &str) {
        self.engine
            .set_identity(Some(Identity::new(user_id)))
            .await
            .expect("Failed to set identity");
        settle().await;
    }

    /// Seen ids persisted for `user_id`.
    pub fn persisted_seen(&self, user_id: &str) -> Vec<String> {
        let key = format!("claimdesk:seen_tasks:{user_id}");
        self.durable
            .get(&key)
            .unwrap()
            .map(|raw| serde_json::from_str(&raw).unwrap())
            .unwrap_or_default()
    }
}

/// Let spawned tasks run without moving the clock noticeably.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}

/// Collect the events received so far.
pub fn drain(rx: &mut broadcast::Receiver<UiEvent>) -> Vec<UiEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Ids of the popups shown in `events`.
pub fn shown(events: &[UiEvent]) -> Vec<TaskId> {
    events
        .iter()
        .filter_map(|e| match e {
            UiEvent::PopupShown { task } => Some(task.id.clone()),
            _ => None,
        })
        .collect()
}
