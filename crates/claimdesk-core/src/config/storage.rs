//! Client-side storage configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Durable (device) and session storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the durable store file.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// File name of the durable store inside `data_dir`.
    #[serde(default = "default_durable_file")]
    pub durable_file: String,
    /// Keep a separate seen record per account instead of one per device.
    #[serde(default = "default_true")]
    pub namespace_by_account: bool,
    /// Optional cap on remembered seen ids; oldest are evicted first.
    #[serde(default)]
    pub max_seen_entries: Option<usize>,
}

impl StorageConfig {
    /// Full path of the durable store file.
    pub fn durable_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(&self.durable_file)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            durable_file: default_durable_file(),
            namespace_by_account: true,
            max_seen_entries: None,
        }
    }
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_durable_file() -> String {
    "local_storage.json".to_string()
}

fn default_true() -> bool {
    true
}
