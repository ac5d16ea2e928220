//! JSON-file backed durable store.

pub mod store;
