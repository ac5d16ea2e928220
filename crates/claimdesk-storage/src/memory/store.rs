//! In-memory session store backed by `dashmap`.

use std::sync::Arc;

use dashmap::DashMap;

use claimdesk_core::result::AppResult;
use claimdesk_core::traits::KeyValueStore;

/// Session-scoped store: contents vanish when the process (the "tab")
/// ends.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<DashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty session store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn clear(&self) -> AppResult<()> {
        self.entries.clear();
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
