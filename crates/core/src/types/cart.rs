//! Cart contents and the pure operations over them.
//!
//! A [`Cart`] is an ordered list of [`CartItem`]s with at most one entry per
//! book ID and every quantity at least 1. The operations here only touch
//! memory; persistence and notifications live in the storefront store.
//!
//! The serialized form is a JSON array of item objects:
//!
//! ```json
//! [{ "id": "b1", "title": "Dune", "price": 9.99, "quantity": 2 }]
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::book::Book;
use super::id::BookId;
use super::price::Price;

/// Errors raised when a list of items breaks the cart invariants.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    /// Two entries share the same book ID.
    #[error("duplicate cart entry for book {0}")]
    DuplicateItem(BookId),
    /// An entry has a quantity of zero.
    #[error("cart entry for book {0} has zero quantity")]
    ZeroQuantity(BookId),
}

/// One book snapshot plus a purchase quantity.
///
/// The snapshot is copied when the book is first added and is never
/// refreshed from the catalog afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(flatten)]
    pub book: Book,
    pub quantity: u32,
}

impl CartItem {
    /// The book ID this entry is keyed by.
    #[must_use]
    pub const fn id(&self) -> &BookId {
        &self.book.id
    }

    /// Unit price captured at add time.
    #[must_use]
    pub const fn price(&self) -> Price {
        self.book.price
    }

    /// `price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.book.price.times(self.quantity)
    }
}

/// Result of [`Cart::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new entry was appended with quantity 1.
    Added,
    /// An existing entry's quantity went up by one.
    QuantityIncreased {
        /// Quantity after the increment.
        quantity: u32,
    },
}

/// Result of [`Cart::set_quantity`].
#[derive(Debug, Clone, PartialEq)]
pub enum QuantityOutcome {
    /// The quantity changed.
    Updated {
        /// Quantity before the change.
        previous: u32,
    },
    /// The entry already had the requested quantity.
    Unchanged,
    /// The requested quantity was below 1, so the entry was dropped.
    Removed(CartItem),
    /// No entry has that ID.
    Missing,
}

/// The ordered, ID-deduplicated collection of items a user intends to buy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CartItem>", into = "Vec<CartItem>")]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Entries in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Look up the entry for `id`.
    #[must_use]
    pub fn get(&self, id: &BookId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Number of distinct books.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add one unit of `book`.
    ///
    /// If the book is already present its quantity goes up by one and the
    /// stored snapshot is kept as is; otherwise the full record is appended
    /// with quantity 1.
    pub fn add(&mut self, book: Book) -> AddOutcome {
        if let Some(item) = self.items.iter_mut().find(|item| item.book.id == book.id) {
            item.quantity = item.quantity.saturating_add(1);
            return AddOutcome::QuantityIncreased {
                quantity: item.quantity,
            };
        }
        self.items.push(CartItem { book, quantity: 1 });
        AddOutcome::Added
    }

    /// Remove the entry for `id`, returning it if it was present.
    pub fn remove(&mut self, id: &BookId) -> Option<CartItem> {
        let pos = self.position(id)?;
        Some(self.items.remove(pos))
    }

    /// Set the entry's quantity to exactly `quantity`.
    ///
    /// Anything below 1 removes the entry. Values above `u32::MAX` are
    /// clamped.
    pub fn set_quantity(&mut self, id: &BookId, quantity: i64) -> QuantityOutcome {
        let Some(pos) = self.position(id) else {
            return QuantityOutcome::Missing;
        };

        if quantity < 1 {
            return QuantityOutcome::Removed(self.items.remove(pos));
        }

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        match self.items.get_mut(pos) {
            Some(item) if item.quantity != quantity => {
                let previous = item.quantity;
                item.quantity = quantity;
                QuantityOutcome::Updated { previous }
            }
            Some(_) => QuantityOutcome::Unchanged,
            None => QuantityOutcome::Missing,
        }
    }

    /// Remove every entry. Returns `true` if anything was removed.
    pub fn clear(&mut self) -> bool {
        let had_items = !self.items.is_empty();
        self.items.clear();
        had_items
    }

    /// Sum of `price * quantity` over all entries, unrounded.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Sum of quantities over all entries.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    fn position(&self, id: &BookId) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }
}

impl TryFrom<Vec<CartItem>> for Cart {
    type Error = CartError;

    fn try_from(items: Vec<CartItem>) -> Result<Self, Self::Error> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if item.quantity == 0 {
                return Err(CartError::ZeroQuantity(item.id().clone()));
            }
            if !seen.insert(item.id()) {
                return Err(CartError::DuplicateItem(item.id().clone()));
            }
        }
        Ok(Self { items })
    }
}

impl From<Cart> for Vec<CartItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}
