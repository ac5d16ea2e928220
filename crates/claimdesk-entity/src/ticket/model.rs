//! Ticket entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use claimdesk_core::types::{TicketId, UserId};

use super::status::{TicketPriority, TicketStatus};

/// A claim request filed by a portal user through a service application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    /// Unique ticket identifier.
    #[serde(alias = "_id")]
    pub id: TicketId,
    /// Short title.
    pub title: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Service the user applied for.
    #[serde(default)]
    pub service_id: Option<String>,
    /// Display name of the service.
    #[serde(default)]
    pub service_name: Option<String>,
    /// User who filed the ticket and owns it for reading.
    pub user_id: UserId,
    /// Processing status.
    pub status: TicketStatus,
    /// Urgency.
    #[serde(default)]
    pub priority: TicketPriority,
    /// When the ticket was created.
    pub created_at: DateTime<Utc>,
    /// When the ticket was last updated.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Ticket {
    /// Whether staff can still act on the ticket.
    pub fn is_open(&self) -> bool {
        !matches!(self.status, TicketStatus::Completed | TicketStatus::Rejected)
    }
}
