//! Error types for the rating seeder
//!
//! Errors propagate as `anyhow::Error`; the typed variants below are wrapped
//! with `.into()` so callers can recover them with `downcast_ref`.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific seeding failures
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Store connection failed: {message}")]
    ConnectionFailed { message: String },

    #[error("Failed to write ratings for user {user_id}: {message}")]
    WriteFailed { user_id: String, message: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Serialization failed: {message}")]
    SerializationError { message: String },
}

impl SeedError {
    /// True for errors caused by the store being unreachable
    pub fn is_connection(&self) -> bool {
        matches!(self, SeedError::ConnectionFailed { .. })
    }
}
