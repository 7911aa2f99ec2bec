//! Per-session state handed to views.
//!
//! One [`SessionState`] is created when a session starts and passed to the
//! views that need the cart. There is no global cart; dropping or closing
//! the session ends its subscriptions.

use std::sync::Arc;

use bookshelf_core::{Cart, OrderSummary};

use crate::cart::{CartStorage, CartStore, FileStorage, Notifier};
use crate::config::CartConfig;

/// Cart store plus the configuration it was opened with.
#[derive(Debug)]
pub struct SessionState {
    config: CartConfig,
    store: CartStore,
}

impl SessionState {
    /// Open a session backed by the file slot named in `config`.
    pub fn open<N>(config: CartConfig, notifier: N) -> Self
    where
        N: Notifier + 'static,
    {
        let storage = FileStorage::new(&config.data_dir, &config.cart_slot);
        tracing::info!(slot = %storage.path().display(), "opening cart session");
        Self::with_storage(config, storage, notifier)
    }

    /// Open a session over an arbitrary storage adapter.
    pub fn with_storage<S, N>(config: CartConfig, storage: S, notifier: N) -> Self
    where
        S: CartStorage + 'static,
        N: Notifier + 'static,
    {
        Self {
            store: CartStore::open(storage, notifier),
            config,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &CartConfig {
        &self.config
    }

    #[must_use]
    pub const fn store(&self) -> &CartStore {
        &self.store
    }

    pub const fn store_mut(&mut self) -> &mut CartStore {
        &mut self.store
    }

    /// Checkout figures at the configured tax rate.
    #[must_use]
    pub fn summary(&self) -> OrderSummary {
        self.store.summary(self.config.tax_rate)
    }

    /// End the session and return the final cart.
    #[must_use]
    pub fn close(self) -> Arc<Cart> {
        tracing::debug!(items = self.store.cart().len(), "closing cart session");
        self.store.close()
    }
}
