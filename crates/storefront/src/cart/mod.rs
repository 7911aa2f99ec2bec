//! Session-scoped cart store.
//!
//! [`CartStore`] owns the current [`Cart`], applies the four user
//! mutations, fans new snapshots out to subscribers and mirrors every change
//! to a [`CartStorage`] slot. It is driven from a single thread of control;
//! each call runs to completion before the next one starts.
//!
//! # Snapshots
//!
//! The cart is held as an `Arc<Cart>`. Subscribers may keep the `Arc` they
//! are handed; the next mutation copies the cart instead of changing a
//! snapshot someone else still holds.
//!
//! # Persistence
//!
//! The slot is read once in [`CartStore::open`] and written after every
//! mutation that changed the cart. A failed write leaves the in-memory
//! change in place, emits [`Notice::SaveFailed`] and returns
//! [`StoreError::Persist`]; the next successful write brings the slot back
//! in line.

pub mod notice;
pub mod observer;
pub mod storage;

use std::fmt;
use std::sync::Arc;

use bookshelf_core::{AddOutcome, Book, BookId, Cart, OrderSummary, Price};
use rust_decimal::Decimal;
use tracing::instrument;

use crate::error::{Result, StoreError};

pub use notice::{MemoryNotifier, Notice, Notifier, TracingNotifier};
pub use observer::{Observers, SubscriptionId};
pub use storage::{CartStorage, FileStorage, MemoryStorage, StorageError};

/// The cart for one user session.
pub struct CartStore {
    cart: Arc<Cart>,
    storage: Box<dyn CartStorage>,
    notifier: Box<dyn Notifier>,
    observers: Observers,
}

impl CartStore {
    /// Open the store, hydrating the cart from `storage`.
    ///
    /// A missing slot yields an empty cart. A slot that cannot be read or
    /// parsed is logged and also yields an empty cart; opening never fails.
    pub fn open<S, N>(storage: S, notifier: N) -> Self
    where
        S: CartStorage + 'static,
        N: Notifier + 'static,
    {
        let cart = hydrate(&storage);
        Self {
            cart: Arc::new(cart),
            storage: Box::new(storage),
            notifier: Box::new(notifier),
            observers: Observers::new(),
        }
    }

    /// Current snapshot.
    #[must_use]
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Current snapshot as a shareable handle.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Cart> {
        Arc::clone(&self.cart)
    }

    /// Sum of `price * quantity`, unrounded.
    #[must_use]
    pub fn total(&self) -> Price {
        self.cart.total()
    }

    /// Total number of units, for the header badge.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.cart.count()
    }

    /// Checkout figures at `tax_rate`.
    #[must_use]
    pub fn summary(&self, tax_rate: Decimal) -> OrderSummary {
        OrderSummary::new(&self.cart, tax_rate)
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    /// Receive every new snapshot until unsubscribed.
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&Arc<Cart>) + Send + 'static,
    {
        self.observers.subscribe(observer)
    }

    /// Stop a subscription. Returns `false` if it was not active.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.observers.len()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add one unit of `book`.
    ///
    /// A book already in the cart has its quantity raised by one and keeps
    /// the snapshot taken when it was first added.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Persist` if the cart could not be saved. The
    /// book is in the cart regardless.
    #[instrument(skip(self, book), fields(book_id = %book.id))]
    pub fn add_item(&mut self, book: Book) -> Result<()> {
        let title = book.display_title().to_owned();
        let notice = match Arc::make_mut(&mut self.cart).add(book) {
            AddOutcome::Added => {
                tracing::debug!("book added to cart");
                Notice::Added { title }
            }
            AddOutcome::QuantityIncreased { quantity } => {
                tracing::debug!(quantity, "cart quantity increased");
                Notice::QuantityIncreased { title, quantity }
            }
        };
        self.commit(Some(notice))
    }

    /// Remove the book with `id`. Absent IDs are ignored.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Persist` if the cart could not be saved.
    #[instrument(skip(self, id), fields(book_id = %id))]
    pub fn remove_item(&mut self, id: &BookId) -> Result<()> {
        let Some(item) = self.cart.get(id) else {
            tracing::debug!("remove ignored, book not in cart");
            return Ok(());
        };
        let title = item.book.display_title().to_owned();
        Arc::make_mut(&mut self.cart).remove(id);
        self.commit(Some(Notice::Removed { title }))
    }

    /// Set the quantity of `id` to exactly `quantity`.
    ///
    /// Anything below 1 removes the book, with a single removal notice.
    /// Absent IDs are ignored.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Persist` if the cart could not be saved.
    #[instrument(skip(self, id), fields(book_id = %id))]
    pub fn update_quantity(&mut self, id: &BookId, quantity: i64) -> Result<()> {
        let Some(item) = self.cart.get(id) else {
            tracing::debug!("update ignored, book not in cart");
            return Ok(());
        };

        if quantity < 1 {
            let title = item.book.display_title().to_owned();
            Arc::make_mut(&mut self.cart).remove(id);
            return self.commit(Some(Notice::Removed { title }));
        }

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        let previous = item.quantity;
        if previous == quantity {
            return Ok(());
        }
        Arc::make_mut(&mut self.cart).set_quantity(id, i64::from(quantity));
        tracing::debug!(previous, quantity, "cart quantity set");
        self.commit(None)
    }

    /// Empty the cart. Always confirms with [`Notice::Cleared`].
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Persist` if the cart could not be saved.
    #[instrument(skip(self))]
    pub fn clear_cart(&mut self) -> Result<()> {
        if self.cart.is_empty() {
            self.notifier.notify(&Notice::Cleared);
            return Ok(());
        }
        self.cart = Arc::new(Cart::new());
        self.commit(Some(Notice::Cleared))
    }

    /// Write the current cart to the slot even if nothing changed.
    ///
    /// Used to retry after a failed save.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Persist` if the cart could not be saved.
    pub fn sync(&mut self) -> Result<()> {
        self.persist()
    }

    /// End the session: drop every subscription and return the final cart.
    #[must_use]
    pub fn close(mut self) -> Arc<Cart> {
        self.observers.clear();
        self.cart
    }

    /// Publish the new snapshot, save it, then report the outcome.
    fn commit(&mut self, notice: Option<Notice>) -> Result<()> {
        self.observers.publish(&self.cart);
        self.persist()?;
        if let Some(notice) = notice {
            self.notifier.notify(&notice);
        }
        Ok(())
    }

    fn persist(&mut self) -> Result<()> {
        if let Err(e) = self.storage.save(&self.cart) {
            let err = StoreError::from(e);
            err.report();
            self.notifier.notify(&Notice::SaveFailed {
                reason: err.user_message().to_string(),
            });
            return Err(err);
        }
        Ok(())
    }
}

impl fmt::Debug for CartStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartStore")
            .field("cart", &self.cart)
            .field("observers", &self.observers)
            .finish_non_exhaustive()
    }
}

/// Read the initial cart, falling back to empty on any failure.
fn hydrate(storage: &dyn CartStorage) -> Cart {
    match storage.load() {
        Ok(Some(cart)) => {
            tracing::debug!(items = cart.len(), "cart restored");
            cart
        }
        Ok(None) => Cart::new(),
        Err(e) => {
            tracing::warn!(error = %e, "discarding unreadable cart slot");
            Cart::new()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    }

    fn book(id: &str, cents: i64) -> Book {
        Book {
            title: Some(format!("Title {id}")),
            ..Book::new(id, Price::from_cents(cents))
        }
    }

    fn open() -> (CartStore, MemoryStorage, MemoryNotifier) {
        init_tracing();
        let storage = MemoryStorage::new();
        let notifier = MemoryNotifier::new();
        let store = CartStore::open(storage.clone(), notifier.clone());
        (store, storage, notifier)
    }

    #[test]
    fn test_walkthrough() {
        let (mut store, _, _) = open();
        let b1 = BookId::new("b1");
        let b2 = BookId::new("b2");

        store.add_item(book("b1", 1000)).unwrap();
        assert_eq!((store.total(), store.count()), (Price::from_cents(1000), 1));

        store.add_item(book("b1", 1000)).unwrap();
        assert_eq!(store.cart().get(&b1).unwrap().quantity, 2);
        assert_eq!((store.total(), store.count()), (Price::from_cents(2000), 2));

        store.add_item(book("b2", 500)).unwrap();
        assert_eq!((store.total(), store.count()), (Price::from_cents(2500), 3));

        store.update_quantity(&b1, 1).unwrap();
        assert_eq!((store.total(), store.count()), (Price::from_cents(1500), 2));

        store.remove_item(&b2).unwrap();
        assert_eq!((store.total(), store.count()), (Price::from_cents(1000), 1));

        store.clear_cart().unwrap();
        assert_eq!((store.total(), store.count()), (Price::ZERO, 0));
    }

    #[test]
    fn test_one_notice_per_action() {
        let (mut store, _, notifier) = open();
        let b1 = BookId::new("b1");

        store.add_item(book("b1", 1000)).unwrap();
        store.add_item(book("b1", 1000)).unwrap();
        store.update_quantity(&b1, 4).unwrap();
        store.update_quantity(&b1, 0).unwrap();
        store.remove_item(&b1).unwrap();
        store.clear_cart().unwrap();

        assert_eq!(
            notifier.take(),
            vec![
                Notice::Added {
                    title: "Title b1".to_string()
                },
                Notice::QuantityIncreased {
                    title: "Title b1".to_string(),
                    quantity: 2
                },
                Notice::Removed {
                    title: "Title b1".to_string()
                },
                Notice::Cleared,
            ]
        );
    }

    #[test]
    fn test_writes_only_on_change() {
        let (mut store, storage, _) = open();
        let b1 = BookId::new("b1");

        store.add_item(book("b1", 1000)).unwrap();
        assert_eq!(storage.writes(), 1);

        store.remove_item(&BookId::new("missing")).unwrap();
        store.update_quantity(&BookId::new("missing"), 3).unwrap();
        store.update_quantity(&b1, 1).unwrap();
        store.clear_cart().unwrap();
        assert_eq!(storage.writes(), 2);

        store.clear_cart().unwrap();
        assert_eq!(storage.writes(), 2);
        assert_eq!(storage.raw().as_deref(), Some("[]"));
    }

    #[test]
    fn test_observers_see_change_before_return() {
        let (mut store, _, _) = open();
        let seen = Arc::new(Mutex::new(Vec::new()));
        {
            let seen = Arc::clone(&seen);
            store.subscribe(move |cart| seen.lock().unwrap().push(cart.count()));
        }

        store.add_item(book("b1", 1000)).unwrap();
        assert_eq!(*seen.lock().unwrap(), [1]);
        store.add_item(book("b2", 1000)).unwrap();
        store.update_quantity(&BookId::new("b2"), 5).unwrap();
        assert_eq!(*seen.lock().unwrap(), [1, 2, 6]);
    }

    #[test]
    fn test_held_snapshot_is_not_mutated() {
        let (mut store, _, _) = open();
        store.add_item(book("b1", 1000)).unwrap();

        let held = store.snapshot();
        store.add_item(book("b1", 1000)).unwrap();
        store.add_item(book("b2", 1000)).unwrap();

        assert_eq!(held.count(), 1);
        assert_eq!(store.count(), 3);
    }

    #[test]
    fn test_unsubscribed_observer_is_silent() {
        let (mut store, _, _) = open();
        let calls = Arc::new(Mutex::new(0_u32));
        let id = {
            let calls = Arc::clone(&calls);
            store.subscribe(move |_| *calls.lock().unwrap() += 1)
        };
        assert_eq!(store.subscriber_count(), 1);
        assert!(store.unsubscribe(id));

        store.add_item(book("b1", 1000)).unwrap();
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[test]
    fn test_close_drops_subscribers() {
        let (mut store, _, _) = open();
        let captured = Arc::new(Mutex::new(0_u64));
        {
            let captured = Arc::clone(&captured);
            store.subscribe(move |cart| *captured.lock().unwrap() = cart.count());
        }
        store.add_item(book("b1", 1000)).unwrap();
        assert_eq!(Arc::strong_count(&captured), 2);

        let cart = store.close();
        assert_eq!(Arc::strong_count(&captured), 1);
        assert_eq!(*captured.lock().unwrap(), cart.count());
    }

    #[test]
    fn test_clamped_quantity_at_max_is_unchanged() {
        let (mut store, storage, notifier) = open();
        let b1 = BookId::new("b1");
        store.add_item(book("b1", 1)).unwrap();
        store.update_quantity(&b1, i64::MAX).unwrap();
        assert_eq!(store.cart().get(&b1).unwrap().quantity, u32::MAX);
        assert_eq!(storage.writes(), 2);

        store.update_quantity(&b1, i64::from(u32::MAX) + 1).unwrap();
        store.update_quantity(&b1, i64::from(u32::MAX)).unwrap();
        assert_eq!(storage.writes(), 2);
        assert_eq!(notifier.take().len(), 1);
    }

    #[test]
    fn test_reopen_restores_cart() {
        let (mut store, storage, _) = open();
        store.add_item(book("b1", 1999)).unwrap();
        store.add_item(book("b1", 1999)).unwrap();
        store.add_item(book("b2", 500)).unwrap();
        let before = store.close();

        let reopened = CartStore::open(storage, MemoryNotifier::new());
        assert_eq!(reopened.cart(), &*before);
    }

    #[test]
    fn test_corrupt_slot_opens_empty() {
        init_tracing();
        let storage = MemoryStorage::new();
        storage.set_raw("{\"not\": \"an array\"}");

        let store = CartStore::open(storage.clone(), MemoryNotifier::new());
        assert!(store.cart().is_empty());
        // The corrupt value stays until the next change overwrites it.
        assert_eq!(storage.writes(), 0);
    }

    #[test]
    fn test_save_failure_keeps_memory_state() {
        let (mut store, storage, notifier) = open();
        storage.fail_writes(true);

        let err = store.add_item(book("b1", 1000)).unwrap_err();
        assert!(matches!(err, StoreError::Persist(StorageError::Unavailable(_))));
        assert_eq!(store.count(), 1);
        assert!(storage.raw().is_none());

        let notices = notifier.take();
        assert_eq!(notices.len(), 1);
        assert!(notices[0].is_error());

        storage.fail_writes(false);
        store.sync().unwrap();
        assert_eq!(
            CartStore::open(storage, MemoryNotifier::new()).count(),
            1
        );
    }

    #[test]
    fn test_negative_quantity_removes() {
        let (mut store, _, _) = open();
        store.add_item(book("b1", 1000)).unwrap();
        store.add_item(book("b2", 1000)).unwrap();
        store.update_quantity(&BookId::new("b1"), -3).unwrap();

        assert!(store.cart().get(&BookId::new("b1")).is_none());
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_summary_uses_rate() {
        let (mut store, _, _) = open();
        store.add_item(book("b1", 2000)).unwrap();
        let summary = store.summary(Decimal::new(5, 2));
        assert_eq!(summary.tax, Price::from_cents(100));
        assert_eq!(summary.total, Price::from_cents(2100));
    }
}
