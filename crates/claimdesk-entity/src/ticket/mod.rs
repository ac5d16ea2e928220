//! Ticket entity and related types.

pub mod model;
pub mod status;

pub use model::Ticket;
pub use status::{TicketPriority, TicketStatus};
