//! # claimdesk-storage
//!
//! Client-side key-value stores implementing
//! [`KeyValueStore`](claimdesk_core::traits::KeyValueStore):
//!
//! - [`FileStore`] survives restarts (the device's durable storage)
//! - [`MemoryStore`] lives as long as the process (the session storage)
//!
//! [`keys`] centralises every key the notifier writes.

pub mod file;
pub mod keys;
pub mod memory;

pub use file::store::FileStore;
pub use memory::store::MemoryStore;
