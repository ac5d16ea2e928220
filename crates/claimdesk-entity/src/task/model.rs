//! Task entity model and notification ordering.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use claimdesk_core::types::{TaskId, TicketId, UserId};
use claimdesk_core::{AppError, AppResult};

use super::status::TaskStatus;
use crate::ticket::Ticket;

/// A unit of follow-up work attached to exactly one ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique task identifier.
    #[serde(alias = "_id")]
    pub id: TaskId,
    /// Parent ticket. Never changes after creation.
    pub ticket_id: TicketId,
    /// Short title.
    pub title: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Progress status.
    pub status: TaskStatus,
    /// Optional deadline.
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    /// User the task is assigned to.
    #[serde(default)]
    pub assignee_id: Option<UserId>,
    /// When the task was created.
    pub created_at: DateTime<Utc>,
    /// When the task was last updated, if the backend reports it.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Whether this snapshot should replace `existing` for the same task.
    ///
    /// Compares `updated_at` when both snapshots carry it; otherwise the
    /// later arrival wins.
    pub fn supersedes(&self, existing: &Task) -> bool {
        match (self.updated_at, existing.updated_at) {
            (Some(incoming), Some(current)) => incoming >= current,
            _ => true,
        }
    }
}

/// Ordering that puts the most notification-worthy task first:
/// newest `created_at`, then highest status weight.
pub fn notification_order(a: &Task, b: &Task) -> Ordering {
    b.created_at.cmp(&a.created_at).then_with(|| {
        b.status
            .notification_weight()
            .cmp(&a.status.notification_weight())
    })
}

/// Pick the task that should be surfaced first, if any.
pub fn most_notification_worthy<'a, I>(tasks: I) -> Option<&'a Task>
where
    I: IntoIterator<Item = &'a Task>,
{
    tasks.into_iter().min_by(|a, b| notification_order(a, b))
}

/// Data required to create a task for a ticket.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    /// Task title.
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,
    /// Task description.
    #[serde(default)]
    #[validate(length(max = 5000, message = "description must be at most 5000 characters"))]
    pub description: String,
    /// Initial status.
    pub status: TaskStatus,
    /// Optional deadline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    /// Assignee. Resolved to the ticket owner when left empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<UserId>,
}

impl TaskDraft {
    /// Start a pending task draft with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            status: TaskStatus::Pending,
            due_date: None,
            assignee_id: None,
        }
    }

    /// Set the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the deadline.
    pub fn due(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Set an explicit assignee.
    pub fn assign_to(mut self, user_id: UserId) -> Self {
        self.assignee_id = Some(user_id);
        self
    }

    /// Fill in the assignee from the ticket when none was given.
    ///
    /// The portal assigns new tasks to the user who filed the ticket, so the
    /// assignee reads as "who the task is for" rather than "who performs it".
    pub fn resolve_assignee(mut self, ticket: &Ticket) -> Self {
        if self.assignee_id.is_none() {
            self.assignee_id = Some(ticket.user_id.clone());
        }
        self
    }

    /// Validate field constraints.
    pub fn check(&self) -> AppResult<()> {
        self.validate()
            .map_err(|e| AppError::validation(format!("Invalid task draft: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn task(id: &str, created_minute: u32, status: TaskStatus) -> Task {
        Task {
            id: TaskId::new(id),
            ticket_id: TicketId::new("t1"),
            title: id.to_string(),
            description: String::new(),
            status,
            due_date: None,
            assignee_id: None,
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, created_minute, 0).unwrap(),
            updated_at: None,
        }
    }

    #[test]
    fn test_newer_task_wins_over_weight() {
        let a = task("A", 0, TaskStatus::Pending);
        let b = task("B", 5, TaskStatus::InProgress);
        let picked = most_notification_worthy([&a, &b]).unwrap();
        assert_eq!(picked.id.as_str(), "B");
    }

    #[test]
    fn test_weight_breaks_timestamp_ties() {
        let a = task("A", 0, TaskStatus::Completed);
        let b = task("B", 0, TaskStatus::Pending);
        let c = task("C", 0, TaskStatus::InProgress);
        let picked = most_notification_worthy([&a, &b, &c]).unwrap();
        assert_eq!(picked.id.as_str(), "B");
    }

    #[test]
    fn test_empty_has_no_pick() {
        assert!(most_notification_worthy(std::iter::empty::<&Task>()).is_none());
    }

    #[test]
    fn test_supersedes_compares_updated_at() {
        let mut older = task("A", 0, TaskStatus::Pending);
        let mut newer = task("A", 0, TaskStatus::Completed);
        older.updated_at = Some(Utc.with_ymd_and_hms(2024, 5, 1, 13, 0, 0).unwrap());
        newer.updated_at = Some(Utc.with_ymd_and_hms(2024, 5, 1, 14, 0, 0).unwrap());
        assert!(newer.supersedes(&older));
        assert!(!older.supersedes(&newer));

        older.updated_at = None;
        assert!(older.supersedes(&newer));
    }

    #[test]
    fn test_draft_assignee_defaults_to_ticket_owner() {
        let ticket: Ticket = serde_json::from_value(serde_json::json!({
            "id": "t1",
            "title": "Claim",
            "userId": "owner-1",
            "status": "processing",
            "createdAt": "2024-05-01T12:00:00Z"
        }))
        .unwrap();

        let draft = TaskDraft::new("Upload police report").resolve_assignee(&ticket);
        assert_eq!(draft.assignee_id, Some(UserId::new("owner-1")));

        let explicit = TaskDraft::new("Call back")
            .assign_to(UserId::new("staff-9"))
            .resolve_assignee(&ticket);
        assert_eq!(explicit.assignee_id, Some(UserId::new("staff-9")));
    }

    #[test]
    fn test_draft_requires_title() {
        assert!(TaskDraft::new("").check().unwrap_err().is_validation());
        assert!(TaskDraft::new("Sign form").check().is_ok());
    }
}
