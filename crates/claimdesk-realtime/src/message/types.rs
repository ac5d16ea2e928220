//! Inbound event and outbound frame definitions.

use serde::{Deserialize, Serialize};

use claimdesk_core::types::{TaskId, TicketId, UserId};

/// Severity tag carried by a `notification` event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// Neutral information.
    #[default]
    Info,
    /// Something went well.
    Success,
    /// Needs attention.
    Warning,
    /// Something failed.
    Error,
}

/// Events pushed by the server, discriminated by the `type` field.
///
/// Unknown `type` values decode to [`ServerEvent::Unknown`] so newer servers
/// can add event kinds without breaking older clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// A message meant to be shown to the user.
    #[serde(rename = "notification", rename_all = "camelCase")]
    Notification {
        /// Text to display.
        message: String,
        /// Severity tag.
        #[serde(default)]
        notification_type: NotificationKind,
        /// Task the message is about.
        #[serde(default)]
        task_id: Option<TaskId>,
    },
    /// A task changed; its ticket's task list is stale.
    #[serde(rename = "TASK_UPDATE", rename_all = "camelCase")]
    TaskUpdate {
        /// Optional text to display.
        #[serde(default)]
        message: Option<String>,
        /// Changed task.
        #[serde(default)]
        task_id: Option<TaskId>,
        /// Owning ticket.
        #[serde(default)]
        ticket_id: Option<TicketId>,
    },
    /// A ticket changed; ticket data is stale.
    #[serde(rename = "TICKET_UPDATE", rename_all = "camelCase")]
    TicketUpdate {
        /// Optional text to display.
        #[serde(default)]
        message: Option<String>,
        /// Related task.
        #[serde(default)]
        task_id: Option<TaskId>,
        /// Changed ticket.
        #[serde(default)]
        ticket_id: Option<TicketId>,
    },
    /// The user's whole ticket list is stale.
    #[serde(rename = "TICKETS_UPDATE")]
    TicketsUpdate,
    /// Any event kind this client does not know.
    #[serde(other)]
    Unknown,
}

impl ServerEvent {
    /// Short name for logging.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Notification { .. } => "notification",
            Self::TaskUpdate { .. } => "TASK_UPDATE",
            Self::TicketUpdate { .. } => "TICKET_UPDATE",
            Self::TicketsUpdate => "TICKETS_UPDATE",
            Self::Unknown => "unknown",
        }
    }
}

/// Frames sent by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    /// Announces the authenticated user right after the socket opens.
    #[serde(rename_all = "camelCase")]
    Auth {
        /// Authenticated user.
        user_id: UserId,
    },
}
