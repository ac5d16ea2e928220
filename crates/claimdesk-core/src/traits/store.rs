//! Key-value storage trait for client-side persistence.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::result::AppResult;

/// A string key-value store, modelled on browser `localStorage` and
/// `sessionStorage`.
///
/// Writes are synchronous: when `set` returns `Ok`, a durable backend has
/// flushed the value. Values are JSON strings.
pub trait KeyValueStore: Send + Sync + std::fmt::Debug + 'static {
    /// Get a value by key.
    fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Set a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> AppResult<()>;

    /// Remove a key. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> AppResult<()>;

    /// Remove every key.
    fn clear(&self) -> AppResult<()>;

    /// Short backend name for logging.
    fn backend(&self) -> &'static str;
}

/// Typed JSON helpers over any [`KeyValueStore`].
pub trait KeyValueStoreExt: KeyValueStore {
    /// Get a typed value by deserializing from JSON.
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        match self.get(key)? {
            Some(value) => Ok(Some(serde_json::from_str(&value)?)),
            None => Ok(None),
        }
    }

    /// Set a typed value by serializing to JSON.
    fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> AppResult<()> {
        let json = serde_json::to_string(value)?;
        self.set(key, &json)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStoreExt for S {}
