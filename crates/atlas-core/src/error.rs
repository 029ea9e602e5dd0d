use thiserror::Error;

/// Application-wide error types for Atlas.
#[derive(Error, Debug)]
pub enum AppError {
    /// The requested resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The operation clashes with existing state (duplicate key, dangling reference).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A required field is missing or malformed.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// The request body exceeds the accepted size.
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// The request body has a content type the endpoint does not accept.
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// Credentials are missing or could not be verified.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Credentials are valid but lack the required authority.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Outbound HTTP request failed or returned an unexpected status.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// TLS material (key store, certificates) could not be loaded.
    #[error("TLS error: {0}")]
    TlsError(String),

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Network/connection error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic error.
    #[error("{0}")]
    Generic(String),
}

impl AppError {
    /// Returns true if this error comes from talking to another system
    /// (database, remote service) rather than from the caller's input.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            AppError::HttpError(_)
                | AppError::Timeout(_)
                | AppError::NetworkError(_)
                | AppError::DatabaseError(_)
                | AppError::TlsError(_)
        )
    }
}
