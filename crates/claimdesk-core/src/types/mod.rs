//! Shared value types.

pub mod id;

pub use id::{SessionToken, TaskId, TicketId, UserId};
