//! Realtime channel configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Realtime (WebSocket) channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Fixed path appended to the page origin.
    #[serde(default = "default_path")]
    pub path: String,
    /// Send an explicit auth frame with the user id after connecting.
    #[serde(default = "default_true")]
    pub send_auth_frame: bool,
    /// Base reconnect delay in milliseconds.
    #[serde(default = "default_base_delay")]
    pub base_delay_ms: u64,
    /// Upper bound for a single reconnect delay in milliseconds.
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,
    /// Consecutive failed reconnects before giving up.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Buffer between the socket reader and the event dispatcher.
    #[serde(default = "default_event_buffer")]
    pub event_buffer_size: usize,
}

impl RealtimeConfig {
    /// Base reconnect delay.
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    /// Reconnect delay cap.
    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            send_auth_frame: true,
            base_delay_ms: default_base_delay(),
            max_delay_ms: default_max_delay(),
            max_retries: default_max_retries(),
            event_buffer_size: default_event_buffer(),
        }
    }
}

fn default_path() -> String {
    "/ws".to_string()
}

fn default_true() -> bool {
    true
}

fn default_base_delay() -> u64 {
    1000
}

fn default_max_delay() -> u64 {
    30_000
}

fn default_max_retries() -> u32 {
    5
}

fn default_event_buffer() -> usize {
    256
}
