//! # Error Types
//!
//! Structured error handling for the queue engine.
//!
//! Only genuine failures are errors. Outcomes that are part of the normal
//! operating envelope are encoded in return types instead: an operator at
//! its concurrency limit gets `Ok(None)` from next-ticket selection, and a
//! lost assignment race gets `Ok(false)` from the conditional claim.

use thiserror::Error;

/// Error taxonomy for queue operations
#[derive(Debug, Error)]
pub enum QueueError {
    /// A referenced ticket does not exist in the store
    #[error("Ticket not found: {ticket_id}")]
    TicketNotFound { ticket_id: i64 },

    /// Store-level failure (connectivity, constraint violations, etc.)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Malformed configuration from environment or file
    #[error("Configuration error: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, QueueError>;
