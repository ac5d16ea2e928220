//! Task entity and related types.

pub mod model;
pub mod status;

pub use model::{Task, TaskDraft, most_notification_worthy, notification_order};
pub use status::TaskStatus;
