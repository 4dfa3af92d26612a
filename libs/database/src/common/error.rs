/// Connector-level error type
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// Driver error surfaced while building or using a client
    #[cfg(feature = "mongodb")]
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    /// The server could not be reached when verifying a new client
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Health check failed
    #[error("Health check failed: {0}")]
    HealthCheckFailed(String),
}

/// Result type alias for connector operations
pub type DatabaseResult<T> = Result<T, DatabaseError>;
