//! Convenience result type alias for BrickHub.

use crate::error::AppError;

/// A specialized `Result` type for BrickHub operations.
pub type AppResult<T> = Result<T, AppError>;
