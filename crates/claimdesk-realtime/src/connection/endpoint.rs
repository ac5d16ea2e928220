//! Realtime endpoint derivation from the page origin.

use claimdesk_core::error::AppError;
use claimdesk_core::result::AppResult;

/// Build the WebSocket URL for `path` on `origin`.
///
/// `http` becomes `ws` and `https` becomes `wss`; origins that already use a
/// WebSocket scheme are kept as they are.
pub fn endpoint_url(origin: &str, path: &str) -> AppResult<String> {
    let origin = origin.trim().trim_end_matches('/');

    let (scheme, rest) = origin
        .split_once("://")
        .ok_or_else(|| AppError::configuration(format!("Origin '{origin}' has no scheme")))?;

    let ws_scheme = match scheme.to_ascii_lowercase().as_str() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(AppError::configuration(format!(
                "Unsupported origin scheme '{other}'"
            )));
        }
    };

    if rest.is_empty() {
        return Err(AppError::configuration(format!("Origin '{origin}' has no host")));
    }

    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };

    Ok(format!("{ws_scheme}://{rest}{path}"))
}
