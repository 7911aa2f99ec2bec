//! Checkout panel figures derived from a cart.

use rust_decimal::Decimal;
use serde::Serialize;

use super::cart::Cart;
use super::price::Price;

/// Default sales tax rate applied at checkout (10%).
pub const DEFAULT_TAX_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

/// Subtotal, shipping, tax and grand total for a cart.
///
/// All amounts are exact; round with [`Price::display`] when rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderSummary {
    /// Total number of units in the cart.
    pub item_count: u64,
    pub subtotal: Price,
    /// Shipping is free on every order.
    pub shipping: Price,
    pub tax: Price,
    pub total: Price,
}

impl OrderSummary {
    /// Compute the summary for `cart` at the given tax rate.
    #[must_use]
    pub fn new(cart: &Cart, tax_rate: Decimal) -> Self {
        let subtotal = cart.total();
        let shipping = Price::ZERO;
        let tax = subtotal.scale(tax_rate);
        Self {
            item_count: cart.count(),
            subtotal,
            shipping,
            tax,
            total: subtotal + shipping + tax,
        }
    }
}
