//! Task status enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use claimdesk_core::AppError;

use crate::lifecycle::Lifecycle;

/// Progress of a task attached to a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started.
    Pending,
    /// Being worked on.
    InProgress,
    /// Done.
    Completed,
}

impl TaskStatus {
    /// Return the status as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    /// How much a task in this status deserves the user's attention
    /// (higher = more).
    pub fn notification_weight(&self) -> u8 {
        match self {
            Self::Pending => 3,
            Self::InProgress => 2,
            Self::Completed => 1,
        }
    }
}

impl Lifecycle for TaskStatus {
    const ENTITY: &'static str = "task";

    fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::InProgress | Self::Completed)
                | (Self::InProgress, Self::Completed)
        )
    }

    fn is_terminal(self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            _ => Err(AppError::validation(format!(
                "Invalid task status: '{s}'. Expected one of: pending, in_progress, completed"
            ))),
        }
    }
}
