//! Unified error handling with Sentry integration.
//!
//! Cart mutations return [`StoreError`] only when the durable write fails.
//! The in-memory change has already been applied at that point, so callers
//! surface the error to the user rather than roll anything back.

use thiserror::Error;

use crate::cart::storage::StorageError;

/// Error returned by cart store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Writing the cart to its durable slot failed.
    #[error("Failed to save cart: {0}")]
    Persist(#[from] StorageError),
}

impl StoreError {
    /// Capture the error to Sentry and log it.
    ///
    /// Sentry capture is a no-op when the host has not initialised a client.
    pub fn report(&self) {
        let event_id = sentry::capture_error(self);
        tracing::error!(
            error = %self,
            sentry_event_id = %event_id,
            "Cart persistence failed"
        );
    }

    /// Message suitable for a user-facing notification.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::Persist(StorageError::Io(_) | StorageError::Unavailable(_)) => {
                "Your cart could not be saved on this device."
            }
            Self::Persist(StorageError::Corrupt(_)) => "Your cart could not be saved.",
        }
    }
}

/// Result type alias for `StoreError`.
pub type Result<T> = std::result::Result<T, StoreError>;
