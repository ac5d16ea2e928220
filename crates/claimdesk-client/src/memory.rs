//! Process-local [`TicketApi`] backend.
//!
//! Behaves like the REST store (last write wins, any in-domain status is
//! accepted) and can be switched offline to exercise failure paths.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use claimdesk_core::error::AppError;
use claimdesk_core::result::AppResult;
use claimdesk_core::types::{TaskId, TicketId};
use claimdesk_entity::{Task, TaskDraft, TaskStatus, Ticket, TicketPriority, TicketStatus};

use crate::api::TicketApi;

#[derive(Debug, Default)]
struct MemoryState {
    tickets: BTreeMap<TicketId, Ticket>,
    tasks: BTreeMap<TaskId, Task>,
    offline: bool,
    reads: usize,
    writes: usize,
    next_task: u64,
}

/// In-memory ticket/task store.
#[derive(Debug, Default)]
pub struct InMemoryTicketApi {
    state: Mutex<MemoryState>,
}

impl InMemoryTicketApi {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn online(&self) -> AppResult<MutexGuard<'_, MemoryState>> {
        let state = self.lock();
        if state.offline {
            return Err(AppError::external_service("ticket store unreachable"));
        }
        Ok(state)
    }

    /// Insert or replace a ticket.
    pub fn upsert_ticket(&self, ticket: Ticket) {
        self.lock().tickets.insert(ticket.id.clone(), ticket);
    }

    /// Insert or replace a task.
    pub fn upsert_task(&self, task: Task) {
        self.lock().tasks.insert(task.id.clone(), task);
    }

    /// Delete a ticket together with its tasks.
    pub fn delete_ticket(&self, id: &TicketId) {
        let mut state = self.lock();
        state.tickets.remove(id);
        state.tasks.retain(|_, task| &task.ticket_id != id);
    }

    /// Make every call fail (or succeed again).
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// Number of successful read calls so far.
    pub fn read_count(&self) -> usize {
        self.lock().reads
    }

    /// Number of successful write calls so far.
    pub fn write_count(&self) -> usize {
        self.lock().writes
    }
}

#[async_trait]
impl TicketApi for InMemoryTicketApi {
    async fn list_tickets(&self) -> AppResult<Vec<Ticket>> {
        let mut state = self.online()?;
        state.reads += 1;
        Ok(state.tickets.values().cloned().collect())
    }

    async fn get_ticket(&self, id: &TicketId) -> AppResult<Ticket> {
        let mut state = self.online()?;
        state.reads += 1;
        state
            .tickets
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("ticket {id} not found")))
    }

    async fn list_tasks(&self, ticket_id: &TicketId) -> AppResult<Vec<Task>> {
        let mut state = self.online()?;
        if !state.tickets.contains_key(ticket_id) {
            return Err(AppError::not_found(format!("ticket {ticket_id} not found")));
        }
        state.reads += 1;
        let mut tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| &task.ticket_id == ticket_id)
            .cloned()
            .collect();
        tasks.sort_by_key(|task| task.created_at);
        Ok(tasks)
    }

    async fn get_task(&self, id: &TaskId) -> AppResult<Task> {
        let mut state = self.online()?;
        state.reads += 1;
        state
            .tasks
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("task {id} not found")))
    }

    async fn update_ticket_status(&self, id: &TicketId, status: TicketStatus) -> AppResult<Ticket> {
        let mut state = self.online()?;
        let ticket = state
            .tickets
            .get_mut(id)
            .ok_or_else(|| AppError::not_found(format!("ticket {id} not found")))?;
        ticket.status = status;
        ticket.updated_at = Some(Utc::now());
        let updated = ticket.clone();
        state.writes += 1;
        Ok(updated)
    }

    async fn update_ticket_priority(
        &self,
        id: &TicketId,
        priority: TicketPriority,
    ) -> AppResult<Ticket> {
        let mut state = self.online()?;
        let ticket = state
            .tickets
            .get_mut(id)
            .ok_or_else(|| AppError::not_found(format!("ticket {id} not found")))?;
        ticket.priority = priority;
        ticket.updated_at = Some(Utc::now());
        let updated = ticket.clone();
        state.writes += 1;
        Ok(updated)
    }

    async fn update_task_status(&self, id: &TaskId, status: TaskStatus) -> AppResult<Task> {
        let mut state = self.online()?;
        let task = state
            .tasks
            .get_mut(id)
            .ok_or_else(|| AppError::not_found(format!("task {id} not found")))?;
        task.status = status;
        task.updated_at = Some(Utc::now());
        let updated = task.clone();
        state.writes += 1;
        Ok(updated)
    }

    async fn create_task(&self, ticket_id: &TicketId, draft: &TaskDraft) -> AppResult<Task> {
        let mut state = self.online()?;
        if !state.tickets.contains_key(ticket_id) {
            return Err(AppError::not_found(format!("ticket {ticket_id} not found")));
        }

        state.next_task += 1;
        let now = Utc::now();
        let task = Task {
            id: TaskId::new(format!("task-{}", state.next_task)),
            ticket_id: ticket_id.clone(),
            title: draft.title.clone(),
            description: draft.description.clone(),
            status: draft.status,
            due_date: draft.due_date,
            assignee_id: draft.assignee_id.clone(),
            created_at: now,
            updated_at: Some(now),
        };
        state.tasks.insert(task.id.clone(), task.clone());
        state.writes += 1;
        Ok(task)
    }
}
