//! Inbound frame validation rules.

use claimdesk_core::error::AppError;

/// Maximum accepted frame size in bytes.
const MAX_MESSAGE_SIZE: usize = 65_536;

/// Reject frames that cannot be a valid event before decoding them.
pub fn validate_inbound(raw: &str) -> Result<(), AppError> {
    if raw.len() > MAX_MESSAGE_SIZE {
        return Err(AppError::validation(format!(
            "Message exceeds maximum size of {} bytes",
            MAX_MESSAGE_SIZE
        )));
    }

    if raw.trim().is_empty() {
        return Err(AppError::validation("Empty message"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_and_oversized() {
        assert!(validate_inbound("  ").is_err());
        assert!(validate_inbound(&"x".repeat(MAX_MESSAGE_SIZE + 1)).is_err());
        assert!(validate_inbound("{\"type\":\"TICKETS_UPDATE\"}").is_ok());
    }
}
