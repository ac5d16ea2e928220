//! # claimdesk-entity
//!
//! Domain models for ClaimDesk. A [`Ticket`](ticket::Ticket) is a claim
//! request filed by a portal user; staff attach [`Task`](task::Task)s to
//! it. The [`lifecycle`] module holds the status transition rules shared
//! by both.

pub mod lifecycle;
pub mod task;
pub mod ticket;

pub use lifecycle::{Lifecycle, TransitionOutcome, TransitionPolicy};
pub use task::{Task, TaskDraft, TaskStatus};
pub use ticket::{Ticket, TicketPriority, TicketStatus};
