//! REST backend configuration.

use serde::{Deserialize, Serialize};

/// Settings for the ticket/task REST API and the page origin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Origin the portal is served from; the realtime URL is derived from it.
    #[serde(default = "default_origin")]
    pub origin: String,
    /// Base URL of the REST API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Connect timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    /// How status transitions requested through the client are checked.
    #[serde(default)]
    pub transition_policy: TransitionPolicy,
}

/// Transition checking mode for ticket and task status changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionPolicy {
    /// Only edges of the documented lifecycle graph are allowed.
    #[default]
    Strict,
    /// Any in-domain status is accepted, as the backend itself does.
    Lenient,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
            transition_policy: TransitionPolicy::default(),
        }
    }
}

fn default_origin() -> String {
    "http://localhost:5000".to_string()
}

fn default_base_url() -> String {
    "http://localhost:5000/api".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}
