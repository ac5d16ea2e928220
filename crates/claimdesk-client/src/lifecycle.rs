//! Validated, idempotent status changes on top of a [`TicketApi`].

use std::sync::Arc;

use tracing::{debug, info};

use claimdesk_core::config::TransitionPolicy;
use claimdesk_core::result::AppResult;
use claimdesk_core::types::{TaskId, TicketId};
use claimdesk_entity::lifecycle::{TransitionOutcome, plan_transition};
use claimdesk_entity::{Task, TaskDraft, TaskStatus, Ticket, TicketPriority, TicketStatus};

use crate::api::TicketApi;

/// Applies status transitions as `(entity id, target status)` requests.
///
/// Raw targets are parsed before any network call, so values outside the
/// status domain fail with a validation error. Requesting the current
/// status returns the entity unchanged without writing.
#[derive(Debug, Clone)]
pub struct LifecycleService {
    api: Arc<dyn TicketApi>,
    policy: TransitionPolicy,
}

impl LifecycleService {
    /// Create a service checking transitions with `policy`.
    pub fn new(api: Arc<dyn TicketApi>, policy: TransitionPolicy) -> Self {
        Self { api, policy }
    }

    /// Active transition policy.
    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    /// Move a ticket to `raw_status`.
    pub async fn transition_ticket(&self, id: &TicketId, raw_status: &str) -> AppResult<Ticket> {
        let target: TicketStatus = raw_status.parse()?;
        let current = self.api.get_ticket(id).await?;

        match plan_transition(current.status, target, self.policy)? {
            TransitionOutcome::Unchanged(status) => {
                debug!(ticket_id = %id, %status, "Ticket already in requested status");
                Ok(current)
            }
            TransitionOutcome::Apply { from, to } => {
                let updated = self.api.update_ticket_status(id, to).await?;
                info!(ticket_id = %id, %from, %to, "Ticket status changed");
                Ok(updated)
            }
        }
    }

    /// Move a task to `raw_status`.
    pub async fn transition_task(&self, id: &TaskId, raw_status: &str) -> AppResult<Task> {
        let target: TaskStatus = raw_status.parse()?;
        let current = self.api.get_task(id).await?;

        match plan_transition(current.status, target, self.policy)? {
            TransitionOutcome::Unchanged(status) => {
                debug!(task_id = %id, %status, "Task already in requested status");
                Ok(current)
            }
            TransitionOutcome::Apply { from, to } => {
                let updated = self.api.update_task_status(id, to).await?;
                info!(task_id = %id, ticket_id = %updated.ticket_id, %from, %to, "Task status changed");
                Ok(updated)
            }
        }
    }

    /// Set a ticket's priority. Priorities have no transition rules.
    pub async fn set_ticket_priority(&self, id: &TicketId, raw_priority: &str) -> AppResult<Ticket> {
        let priority: TicketPriority = raw_priority.parse()?;
        let current = self.api.get_ticket(id).await?;
        if current.priority == priority {
            return Ok(current);
        }
        self.api.update_ticket_priority(id, priority).await
    }

    /// Create a task for a ticket, assigning it to the ticket owner unless
    /// the draft names someone.
    pub async fn create_task(&self, ticket_id: &TicketId, draft: TaskDraft) -> AppResult<Task> {
        draft.check()?;
        let ticket = self.api.get_ticket(ticket_id).await?;
        let draft = draft.resolve_assignee(&ticket);
        let task = self.api.create_task(ticket_id, &draft).await?;
        info!(task_id = %task.id, ticket_id = %ticket_id, "Task created");
        Ok(task)
    }
}
