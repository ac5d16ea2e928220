//! Trait seams between the core and its backends.

pub mod store;

pub use store::{KeyValueStore, KeyValueStoreExt};
