//! # Order Totals
//!
//! Sums over a cart's lines. The order total is always `Σ line_total`, so it
//! reflects quantities and any applied promotion.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::{Cart, CartItem};
use crate::money::Money;

/// What the order charges: the sum of every line's `line_total`.
pub fn order_total(items: &[CartItem]) -> Money {
    items.iter().map(|item| item.line_total).sum()
}

/// What the order would charge with every promotion removed.
pub fn undiscounted_total(items: &[CartItem]) -> Money {
    items
        .iter()
        .map(|item| item.original_line_total.unwrap_or(item.line_total))
        .sum()
}

/// Summary of a cart for the cart view and the final charge.
///
/// ## Invariant
/// `undiscounted_total - discount_total == total`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub item_count: usize,
    pub total_quantity: u32,
    pub undiscounted_total: Money,
    pub discount_total: Money,
    pub total: Money,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        let total = order_total(&cart.items);
        let undiscounted_total = undiscounted_total(&cart.items);
        CartTotals {
            item_count: cart.item_count(),
            total_quantity: cart.total_quantity(),
            undiscounted_total,
            discount_total: undiscounted_total - total,
            total,
        }
    }
}
