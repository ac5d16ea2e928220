//! Durable record of acknowledged task ids.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use tracing::{debug, warn};

use claimdesk_core::error::ErrorKind;
use claimdesk_core::result::AppResult;
use claimdesk_core::traits::{KeyValueStore, KeyValueStoreExt};
use claimdesk_core::types::TaskId;

/// Set of task ids the user has acknowledged on this device.
///
/// Every change is written to the durable store before the call returns.
/// Ids only leave the record through [`SeenRecord::clear`] or, when a cap
/// is configured, through oldest-first eviction.
#[derive(Debug)]
pub struct SeenRecord {
    store: Arc<dyn KeyValueStore>,
    key: String,
    /// Insertion order, oldest first.
    order: VecDeque<TaskId>,
    members: HashSet<TaskId>,
    cap: Option<usize>,
}

impl SeenRecord {
    /// Load the record stored under `key`.
    ///
    /// A corrupt value is logged and treated as empty; it is overwritten on
    /// the next mark.
    pub fn load(
        store: Arc<dyn KeyValueStore>,
        key: impl Into<String>,
        cap: Option<usize>,
    ) -> AppResult<Self> {
        let key = key.into();
        let stored: Vec<TaskId> = match store.get_json(&key) {
            Ok(ids) => ids.unwrap_or_default(),
            Err(e) if e.kind == ErrorKind::Serialization => {
                warn!(key = %key, error = %e, "Seen record is corrupt, starting empty");
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        let mut record = Self {
            store,
            key,
            order: VecDeque::with_capacity(stored.len()),
            members: HashSet::with_capacity(stored.len()),
            // the id just marked must survive its own eviction
            cap: cap.map(|cap| cap.max(1)),
        };
        for id in stored {
            if record.members.insert(id.clone()) {
                record.order.push_back(id);
            }
        }
        record.evict_overflow();

        debug!(key = %record.key, count = record.len(), backend = record.store.backend(), "Seen record loaded");
        Ok(record)
    }

    /// Storage key of this record.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether `task_id` has been acknowledged.
    pub fn contains(&self, task_id: &TaskId) -> bool {
        self.members.contains(task_id)
    }

    /// Number of remembered ids.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether no id is remembered.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Add `task_id` and flush. Returns `false` if it was already present.
    ///
    /// If the flush fails the in-memory record is left unchanged.
    pub fn mark(&mut self, task_id: &TaskId) -> AppResult<bool> {
        if self.members.contains(task_id) {
            return Ok(false);
        }

        let mut next: Vec<&TaskId> = self.order.iter().collect();
        next.push(task_id);
        let overflow = self.overflow_after(next.len());
        self.store.set_json(&self.key, &next[overflow..])?;

        self.members.insert(task_id.clone());
        self.order.push_back(task_id.clone());
        self.evict_overflow();
        Ok(true)
    }

    /// Forget every id, in memory and on disk.
    pub fn clear(&mut self) -> AppResult<()> {
        self.store.remove(&self.key)?;
        self.order.clear();
        self.members.clear();
        debug!(key = %self.key, "Seen record cleared");
        Ok(())
    }

    fn overflow_after(&self, len: usize) -> usize {
        self.cap.map_or(0, |cap| len.saturating_sub(cap))
    }

    fn evict_overflow(&mut self) {
        for _ in 0..self.overflow_after(self.order.len()) {
            if let Some(evicted) = self.order.pop_front() {
                self.members.remove(&evicted);
            }
        }
    }
}
