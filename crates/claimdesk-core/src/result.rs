//! Convenience result type alias for ClaimDesk.

use crate::error::AppError;

/// A specialized `Result` type for ClaimDesk operations.
pub type AppResult<T> = Result<T, AppError>;
