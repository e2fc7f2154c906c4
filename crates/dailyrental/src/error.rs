use thiserror::Error;

#[derive(Debug, Error)]
pub enum RentalError {
    #[error("Invalid rental: {reason}")]
    InvalidRental { reason: String },

    #[error("Rental not found: {id}")]
    RentalNotFound { id: String },

    #[error("Storage error during {operation}: {source}")]
    StorageError {
        operation: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },
}

impl RentalError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidRental {
            reason: reason.into(),
        }
    }

    pub fn storage(
        operation: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::StorageError {
            operation: operation.into(),
            source: source.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RentalError>;
