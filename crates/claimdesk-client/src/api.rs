//! The ticket/task API trait.

use async_trait::async_trait;

use claimdesk_core::result::AppResult;
use claimdesk_core::types::{TaskId, TicketId};
use claimdesk_entity::{Task, TaskDraft, TaskStatus, Ticket, TicketPriority, TicketStatus};

/// Operations offered by the ticket/task store.
///
/// The store owns persistence and authorization; implementations only
/// translate calls and map failures into [`AppError`](claimdesk_core::AppError).
#[async_trait]
pub trait TicketApi: Send + Sync + std::fmt::Debug + 'static {
    /// All tickets visible to the current identity.
    async fn list_tickets(&self) -> AppResult<Vec<Ticket>>;

    /// A single ticket.
    async fn get_ticket(&self, id: &TicketId) -> AppResult<Ticket>;

    /// Tasks of one ticket.
    async fn list_tasks(&self, ticket_id: &TicketId) -> AppResult<Vec<Task>>;

    /// A single task.
    async fn get_task(&self, id: &TaskId) -> AppResult<Task>;

    /// Write a new ticket status.
    async fn update_ticket_status(&self, id: &TicketId, status: TicketStatus) -> AppResult<Ticket>;

    /// Write a new ticket priority.
    async fn update_ticket_priority(
        &self,
        id: &TicketId,
        priority: TicketPriority,
    ) -> AppResult<Ticket>;

    /// Write a new task status.
    async fn update_task_status(&self, id: &TaskId, status: TaskStatus) -> AppResult<Task>;

    /// Create a task under a ticket.
    async fn create_task(&self, ticket_id: &TicketId, draft: &TaskDraft) -> AppResult<Task>;
}
