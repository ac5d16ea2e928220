//! # claimdesk-client
//!
//! Access to the external ticket/task REST API:
//!
//! - [`TicketApi`] is the seam every consumer depends on
//! - [`HttpTicketApi`] talks to the real backend with `reqwest`
//! - [`InMemoryTicketApi`] is a process-local backend for demos and tests
//! - [`LifecycleService`] applies idempotent, validated status transitions

pub mod api;
pub mod http;
pub mod lifecycle;
pub mod memory;

pub use api::TicketApi;
pub use http::HttpTicketApi;
pub use lifecycle::LifecycleService;
pub use memory::InMemoryTicketApi;
