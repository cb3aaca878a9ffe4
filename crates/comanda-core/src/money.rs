//! # Money Module
//!
//! Provides the `Money` type for every price in the order engine.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  A 20% coupon on a $105.00 Boneless line in floating point:             │
//! │    105.0 * (1 - 20 / 100) = 84.00000000000001  ❌                       │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    10500 cents, 2000 bps → discount 2100 → 8400 cents  ✅               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use comanda_core::money::Money;
//!
//! let sushi = Money::from_cents(11500); // $115.00
//!
//! let two = sushi.multiply_quantity(2);          // $230.00
//! let with_oyster = sushi + Money::from_cents(1000); // $125.00
//! assert_eq!(two.cents(), 23000);
//! assert_eq!(with_oyster.to_string(), "$125.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: intermediate differences may go negative before they
///   are floored (fixed-amount coupons larger than a line)
/// - **Single field tuple struct**: zero-cost abstraction over i64
///
/// ## Where Money is Used
/// ```text
/// PriceCatalog ──► CartItem.unit_price ──► CartItem.line_total ──► Cart total
///                                               ▲
///                      PromotionEngine ─────────┘ (rewrites line_total only)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use comanda_core::money::Money;
    ///
    /// let price = Money::from_cents(2500); // Represents $25.00
    /// assert_eq!(price.cents(), 2500);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a line quantity.
    ///
    /// ## Example
    /// ```rust
    /// use comanda_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(2500);
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 7500);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: u32) -> Self {
        Money(self.0 * qty as i64)
    }

    /// Divides a line amount back into a per-unit amount.
    ///
    /// Truncates toward zero. A quantity of zero is treated as one so a
    /// malformed line never divides by zero.
    ///
    /// ## Example
    /// ```rust
    /// use comanda_core::money::Money;
    ///
    /// let line_total = Money::from_cents(1000);
    /// assert_eq!(line_total.divide_quantity(3).cents(), 333);
    /// ```
    #[inline]
    pub const fn divide_quantity(&self, qty: u32) -> Self {
        let qty = if qty == 0 { 1 } else { qty as i64 };
        Money(self.0 / qty)
    }

    /// Applies a percentage discount and returns the discounted amount.
    ///
    /// ## Arguments
    /// * `discount_bps` - Discount in basis points (2000 = 20%)
    ///
    /// The discount amount is rounded half-up to the cent, then subtracted.
    /// Anything above [`MAX_DISCOUNT_BPS`](crate::MAX_DISCOUNT_BPS) counts as
    /// 100%, so the result is never negative for a non-negative amount.
    ///
    /// ## Example
    /// ```rust
    /// use comanda_core::money::Money;
    ///
    /// let boneless = Money::from_cents(10500); // $105.00
    /// let discounted = boneless.apply_percentage_discount(2000); // 20% off
    /// assert_eq!(discounted.cents(), 8400); // $84.00
    /// ```
    pub fn apply_percentage_discount(&self, discount_bps: u32) -> Money {
        let discount_bps = discount_bps.min(crate::MAX_DISCOUNT_BPS);
        // i128 so large line totals times bps cannot overflow
        let discount_amount = (self.0 as i128 * discount_bps as i128 + 5000) / 10000;
        Money::from_cents(self.0 - discount_amount as i64)
    }

    /// Subtracts `other`, flooring the result at zero.
    ///
    /// ## Example
    /// ```rust
    /// use comanda_core::money::Money;
    ///
    /// let line = Money::from_cents(2500);
    /// assert_eq!(line.saturating_sub_floor_zero(Money::from_cents(5000)), Money::zero());
    /// ```
    #[inline]
    pub fn saturating_sub_floor_zero(&self, other: Money) -> Money {
        Money(self.0.saturating_sub(other.0).max(0))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money as `$12.34` for labels and logs.
///
/// ## Note
/// Localized display formatting is the calling layer's job.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by a quantity.
impl Mul<u32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: u32) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(11050);
        assert_eq!(money.cents(), 11050);
        assert_eq!(money.dollars(), 110);
        assert_eq!(money.cents_part(), 50);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(11500)), "$115.00");
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::zero()), "$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);
    }

    #[test]
    fn test_percentage_discount_is_exact_in_cents() {
        assert_eq!(Money::from_cents(10500).apply_percentage_discount(2000).cents(), 8400);
        // 15% of $25.00 = $3.75
        assert_eq!(Money::from_cents(2500).apply_percentage_discount(1500).cents(), 2125);
        // 100% off
        assert!(Money::from_cents(2500).apply_percentage_discount(10000).is_zero());
        // more than 100% is treated as 100%
        assert!(Money::from_cents(2500).apply_percentage_discount(12000).is_zero());
    }

    #[test]
    fn test_percentage_discount_rounds_half_up() {
        // 12.5% of 99 cents = 12.375 cents → 12 cents discount
        assert_eq!(Money::from_cents(99).apply_percentage_discount(1250).cents(), 87);
        // 50% of 1 cent = 0.5 cent → 1 cent discount
        assert_eq!(Money::from_cents(1).apply_percentage_discount(5000).cents(), 0);
    }

    #[test]
    fn test_floor_at_zero() {
        let line = Money::from_cents(2500);
        assert_eq!(line.saturating_sub_floor_zero(Money::from_cents(1000)).cents(), 1500);
        assert!(line.saturating_sub_floor_zero(Money::from_cents(9999)).is_zero());
    }

    #[test]
    fn test_divide_quantity_truncates() {
        assert_eq!(Money::from_cents(23000).divide_quantity(2).cents(), 11500);
        assert_eq!(Money::from_cents(1000).divide_quantity(3).cents(), 333);
        assert_eq!(Money::from_cents(1000).divide_quantity(0).cents(), 1000);
    }

    #[test]
    fn test_sum() {
        let lines = [Money::from_cents(10500), Money::from_cents(2500)];
        let total: Money = lines.iter().sum();
        assert_eq!(total.cents(), 13000);

        let empty: Vec<Money> = Vec::new();
        assert!(empty.into_iter().sum::<Money>().is_zero());
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        assert!(Money::from_cents(100).is_positive());
        assert!(Money::from_cents(-100).is_negative());
    }
}
