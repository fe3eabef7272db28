use thiserror::Error;

// Database modules
pub mod connection;
pub mod migrations;

// Re-export backend configuration and pool helpers
pub use connection::*;

/// Database error enum
#[derive(Debug, Clone, Error)]
pub enum DatabaseError {
    /// Connection error
    #[error("Failed to connect to database: {0}")]
    ConnectionError(String),

    /// Migration error
    #[error("Database migration error: {0}")]
    MigrationError(String),

    /// Unsupported backend type
    #[error("Unsupported storage backend: {0}")]
    UnsupportedBackend(String),
}
