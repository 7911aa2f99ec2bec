//! Bookshelf Storefront library.
//!
//! Client-side cart state for the bookstore: the [`cart::CartStore`] with
//! its persistence, observer and notification ports, the configuration
//! that locates the durable slot, and the per-session [`state::SessionState`]
//! that views receive explicitly.
//!
//! # Example
//!
//! ```rust
//! use bookshelf_core::{Book, BookId, Price};
//! use bookshelf_storefront::cart::{CartStore, MemoryNotifier, MemoryStorage};
//!
//! let mut store = CartStore::open(MemoryStorage::new(), MemoryNotifier::new());
//! store.add_item(Book::new("b1", Price::from_cents(1000)))?;
//! store.add_item(Book::new("b1", Price::from_cents(1000)))?;
//! store.update_quantity(&BookId::new("b1"), 5)?;
//!
//! assert_eq!(store.count(), 5);
//! assert_eq!(store.total(), Price::from_cents(5000));
//! # Ok::<(), bookshelf_storefront::error::StoreError>(())
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod config;
pub mod error;
pub mod state;
