//! Core types for Bookshelf.
//!
//! This module provides type-safe wrappers and records for the cart domain.

pub mod book;
pub mod cart;
pub mod id;
pub mod price;
pub mod summary;

pub use book::{Book, BookError, filter_books};
pub use cart::{AddOutcome, Cart, CartError, CartItem, QuantityOutcome};
pub use id::*;
pub use price::Price;
pub use summary::{DEFAULT_TAX_RATE, OrderSummary};
