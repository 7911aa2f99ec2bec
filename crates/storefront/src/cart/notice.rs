//! User-facing cart notifications.
//!
//! Each user action on the cart produces at most one [`Notice`]. Views
//! render them as transient toasts; nothing here blocks or asks for input.

use std::sync::{Arc, Mutex, PoisonError};

/// Transient feedback for a cart action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A new book entered the cart.
    Added { title: String },
    /// A book already in the cart was added again.
    QuantityIncreased { title: String, quantity: u32 },
    /// A book left the cart.
    Removed { title: String },
    /// The cart was emptied.
    Cleared,
    /// The change applied in memory but could not be saved.
    SaveFailed { reason: String },
}

impl Notice {
    /// Toast text for this notice.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Added { .. } => "Book added to cart!",
            Self::QuantityIncreased { .. } => "Quantity updated in cart!",
            Self::Removed { .. } => "Book removed from cart!",
            Self::Cleared => "Cart cleared!",
            Self::SaveFailed { reason } => reason,
        }
    }

    /// Returns `true` for failure notices.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::SaveFailed { .. })
    }
}

/// Sink for cart notices.
pub trait Notifier: Send {
    fn notify(&self, notice: &Notice);
}

impl<N: Notifier + ?Sized> Notifier for Box<N> {
    fn notify(&self, notice: &Notice) {
        (**self).notify(notice);
    }
}

/// Notifier that writes notices to the `tracing` log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: &Notice) {
        if notice.is_error() {
            tracing::warn!(notice = ?notice, "{}", notice.message());
        } else {
            tracing::info!(notice = ?notice, "{}", notice.message());
        }
    }
}

/// Notifier that records every notice, for tests and previews.
///
/// Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct MemoryNotifier {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl MemoryNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Notices recorded so far.
    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drain the recorded notices.
    #[must_use]
    pub fn take(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.notices.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notice: &Notice) {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notice.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let title = "Dune".to_string();
        assert_eq!(
            Notice::Added {
                title: title.clone()
            }
            .message(),
            "Book added to cart!"
        );
        assert_eq!(
            Notice::QuantityIncreased { title, quantity: 2 }.message(),
            "Quantity updated in cart!"
        );
        assert_eq!(Notice::Cleared.message(), "Cart cleared!");
        assert_eq!(
            Notice::SaveFailed {
                reason: "disk full".to_string()
            }
            .message(),
            "disk full"
        );
    }

    #[test]
    fn test_memory_notifier_take_drains() {
        let notifier = MemoryNotifier::new();
        notifier.notify(&Notice::Cleared);
        notifier.notify(&Notice::Cleared);
        assert_eq!(notifier.take().len(), 2);
        assert!(notifier.notices().is_empty());
    }

    #[test]
    fn test_tracing_notifier_accepts_all_kinds() {
        let notifier = TracingNotifier;
        notifier.notify(&Notice::Cleared);
        notifier.notify(&Notice::SaveFailed {
            reason: "quota exceeded".to_string(),
        });
    }
}
