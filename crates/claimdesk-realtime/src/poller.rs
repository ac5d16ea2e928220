//! Periodic task poll, the fallback source of truth for the reconciliation
//! store.
//!
//! The poller refetches every ticket's tasks on a fixed interval and reacts
//! to invalidation signals in between. While the user has no tickets it
//! idles until the ticket list is invalidated.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use claimdesk_client::TicketApi;
use claimdesk_core::error::{AppError, ErrorKind};
use claimdesk_core::result::AppResult;
use claimdesk_core::types::TicketId;

use crate::invalidation::Invalidation;
use crate::notification::center::NotificationCenter;

/// What to do after a wake-up.
enum Wake {
    FullRefresh,
    Ticket(TicketId),
    Stop,
}

/// Fetches tickets and tasks into a [`NotificationCenter`].
#[derive(Debug, Clone)]
pub struct TaskPoller {
    api: Arc<dyn TicketApi>,
    center: Arc<NotificationCenter>,
    interval: Duration,
}

impl TaskPoller {
    /// Create a poller refreshing every `interval`.
    pub fn new(api: Arc<dyn TicketApi>, center: Arc<NotificationCenter>, interval: Duration) -> Self {
        Self {
            api,
            center,
            interval,
        }
    }

    /// Fetch the ticket list and every ticket's tasks. Returns the number of
    /// tickets.
    ///
    /// A failing ticket does not stop the others; the last failure is
    /// returned after all tickets were tried.
    pub async fn refresh_all(&self) -> AppResult<usize> {
        let tickets = self.api.list_tickets().await?;
        let ids: Vec<TicketId> = tickets.iter().map(|t| t.id.clone()).collect();
        self.center.retain_tickets(&ids);

        let mut failure = None;
        for ticket_id in &ids {
            if let Err(e) = self.refresh_ticket(ticket_id).await {
                warn!(ticket_id = %ticket_id, error = %e, "Failed to fetch tasks");
                failure = Some(e);
            }
        }

        debug!(tickets = ids.len(), unseen = self.center.unseen_count(), "Task poll complete");
        match failure {
            Some(e) => Err(e),
            None => Ok(ids.len()),
        }
    }

    /// Fetch one ticket's tasks.
    pub async fn refresh_ticket(&self, ticket_id: &TicketId) -> AppResult<()> {
        let tasks = self.api.list_tasks(ticket_id).await?;
        self.center.ingest_ticket_tasks(ticket_id, tasks);
        Ok(())
    }

    /// Poll until `cancel` fires.
    pub async fn run(
        self,
        mut invalidations: broadcast::Receiver<Invalidation>,
        cancel: CancellationToken,
    ) {
        info!(interval_secs = self.interval.as_secs(), "Task poller started");

        'poll: loop {
            let idle = match self.refresh_all().await {
                Ok(0) => {
                    debug!("No tickets, poller idle until the ticket list changes");
                    true
                }
                Ok(_) => false,
                Err(e) => {
                    self.report(&e);
                    false
                }
            };

            let deadline = Instant::now() + self.interval;
            loop {
                match self.wait(idle, deadline, &mut invalidations, &cancel).await {
                    Wake::Stop => break 'poll,
                    Wake::FullRefresh => continue 'poll,
                    Wake::Ticket(ticket_id) => match self.refresh_ticket(&ticket_id).await {
                        Ok(()) => {}
                        Err(e) if e.kind == ErrorKind::NotFound => {
                            debug!(ticket_id = %ticket_id, "Ticket gone, refreshing list");
                            continue 'poll;
                        }
                        Err(e) => self.report(&e),
                    },
                }
            }
        }

        info!("Task poller stopped");
    }

    async fn wait(
        &self,
        idle: bool,
        deadline: Instant,
        invalidations: &mut broadcast::Receiver<Invalidation>,
        cancel: &CancellationToken,
    ) -> Wake {
        let timer = async {
            if idle {
                std::future::pending::<()>().await;
            } else {
                tokio::time::sleep_until(deadline).await;
            }
        };

        tokio::select! {
            _ = cancel.cancelled() => Wake::Stop,
            _ = timer => Wake::FullRefresh,
            signal = invalidations.recv() => match signal {
                Ok(Invalidation::TicketTasks(ticket_id)) if !idle => Wake::Ticket(ticket_id),
                Ok(_) => Wake::FullRefresh,
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "Missed invalidations, refreshing everything");
                    Wake::FullRefresh
                }
                Err(RecvError::Closed) => Wake::Stop,
            },
        }
    }

    fn report(&self, error: &AppError) {
        warn!(error = %error, "Couldn't load tasks");
        self.center.report_load_failure(error);
    }
}
