//! # Promotions
//!
//! Promotion codes and the engine that rewrites cart lines for them.
//!
//! ## Promotion Kinds
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Kind      Rule                         Effect                          │
//! │  ───────   ──────────────────────────   ─────────────────────────────── │
//! │  Special   FreeUnit {threshold,         cheapest target line loses      │
//! │             free_count, target}         free_count × its unit price     │
//! │                                                                         │
//! │  Regular   Percentage {bps,             every applicable line priced    │
//! │             applies_to}                 at original × (1 − bps/10000)   │
//! │                                                                         │
//! │  Regular   FixedAmount {amount,         every applicable line priced    │
//! │             applies_to}                 at max(0, original − amount)    │
//! │                                                                         │
//! │  Empty `applies_to` means every item type.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Application Flow
//! ```text
//! apply_promotion(cart, code, lookup)
//!      │
//!      ├── normalize code ──► lookup.find_active_promotion() ── None ──► InvalidOrExpiredCode
//!      │
//!      ├── cart total < min_purchase ──────────────────────────────────► MinimumPurchaseNotMet
//!      │
//!      ├── FreeUnit: target quantity < threshold ──────────────────────► InsufficientQuantityForPromotion
//!      │
//!      └── rewrite lines in place ──► Ok(promotion)
//! ```
//!
//! Every rejection leaves the cart untouched. Application is NOT idempotent:
//! applying a free-unit promotion twice takes a second unit off the same line.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::cart::Cart;
use crate::error::PromotionRejection;
use crate::money::Money;
use crate::types::ItemType;
use crate::MAX_DISCOUNT_BPS;

// =============================================================================
// Promotion Model
// =============================================================================

/// Broad family of a promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PromotionKind {
    /// Buy-N-get-some-free on one item type.
    Special,
    /// Percentage or fixed-amount discount.
    Regular,
}

/// How a promotion computes its discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DiscountMethod {
    BuyXGetYFree,
    Percentage,
    FixedAmount,
}

/// What a promotion does to a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum PromotionRule {
    /// Once `threshold` units of `target` are in the cart, `free_count` of
    /// them are free.
    #[serde(rename_all = "camelCase")]
    FreeUnit {
        threshold: u32,
        free_count: u32,
        target: ItemType,
    },

    /// Percentage off, in basis points (`2000` = 20%).
    #[serde(rename_all = "camelCase")]
    Percentage {
        bps: u32,
        applies_to: BTreeSet<ItemType>,
    },

    /// Fixed amount off each applicable line.
    #[serde(rename_all = "camelCase")]
    FixedAmount {
        amount: Money,
        applies_to: BTreeSet<ItemType>,
    },
}

/// A configured promotion code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Promotion {
    /// Upper-case, trimmed code customers type in.
    pub code: String,
    pub description: String,
    pub active: bool,
    /// Cart total required before the promotion applies. Zero means none.
    pub min_purchase: Money,
    pub rule: PromotionRule,
}

impl Promotion {
    /// Creates an active buy-N-get-free promotion with no minimum purchase.
    pub fn free_unit(
        code: &str,
        description: &str,
        threshold: u32,
        free_count: u32,
        target: ItemType,
    ) -> Self {
        Self::with_rule(
            code,
            description,
            PromotionRule::FreeUnit {
                threshold,
                free_count,
                target,
            },
        )
    }

    /// Creates an active percentage promotion with no minimum purchase.
    ///
    /// `bps` above [`MAX_DISCOUNT_BPS`] is clamped to 100%.
    pub fn percentage(
        code: &str,
        description: &str,
        bps: u32,
        applies_to: impl IntoIterator<Item = ItemType>,
    ) -> Self {
        Self::with_rule(
            code,
            description,
            PromotionRule::Percentage {
                bps: bps.min(MAX_DISCOUNT_BPS),
                applies_to: applies_to.into_iter().collect(),
            },
        )
    }

    /// Creates an active fixed-amount promotion with no minimum purchase.
    pub fn fixed_amount(
        code: &str,
        description: &str,
        amount: Money,
        applies_to: impl IntoIterator<Item = ItemType>,
    ) -> Self {
        Self::with_rule(
            code,
            description,
            PromotionRule::FixedAmount {
                amount,
                applies_to: applies_to.into_iter().collect(),
            },
        )
    }

    fn with_rule(code: &str, description: &str, rule: PromotionRule) -> Self {
        Promotion {
            code: normalize_code(code),
            description: description.to_string(),
            active: true,
            min_purchase: Money::zero(),
            rule,
        }
    }

    /// Sets the minimum purchase.
    pub fn with_min_purchase(mut self, min_purchase: Money) -> Self {
        self.min_purchase = min_purchase;
        self
    }

    pub fn kind(&self) -> PromotionKind {
        match self.rule {
            PromotionRule::FreeUnit { .. } => PromotionKind::Special,
            PromotionRule::Percentage { .. } | PromotionRule::FixedAmount { .. } => {
                PromotionKind::Regular
            }
        }
    }

    pub fn method(&self) -> DiscountMethod {
        match self.rule {
            PromotionRule::FreeUnit { .. } => DiscountMethod::BuyXGetYFree,
            PromotionRule::Percentage { .. } => DiscountMethod::Percentage,
            PromotionRule::FixedAmount { .. } => DiscountMethod::FixedAmount,
        }
    }

    /// The rule's headline number, as stored.
    ///
    /// Basis points for percentage, cents for fixed amount, and the number
    /// of paid units (`threshold - free_count`) for free-unit promotions.
    pub fn value(&self) -> i64 {
        match &self.rule {
            PromotionRule::FreeUnit {
                threshold,
                free_count,
                ..
            } => i64::from(threshold.saturating_sub(*free_count)),
            PromotionRule::Percentage { bps, .. } => i64::from(*bps),
            PromotionRule::FixedAmount { amount, .. } => amount.cents(),
        }
    }

    /// The item types a line must have to be discounted. Empty means all.
    pub fn applicable_types(&self) -> BTreeSet<ItemType> {
        match &self.rule {
            PromotionRule::FreeUnit { target, .. } => BTreeSet::from([*target]),
            PromotionRule::Percentage { applies_to, .. }
            | PromotionRule::FixedAmount { applies_to, .. } => applies_to.clone(),
        }
    }

    /// Text shown on a discounted line.
    ///
    /// ## Example
    /// ```rust
    /// use comanda_core::promotions::default_promotions;
    ///
    /// let sushi = &default_promotions()[0];
    /// assert_eq!(sushi.discount_label(), "4-for-3 — 1 FREE");
    /// ```
    pub fn discount_label(&self) -> String {
        match &self.rule {
            PromotionRule::FreeUnit {
                threshold,
                free_count,
                ..
            } => format!(
                "{}-for-{} — {} FREE",
                threshold,
                threshold.saturating_sub(*free_count),
                free_count
            ),
            PromotionRule::Percentage { bps, .. } => format!("{}% off", format_bps(*bps)),
            PromotionRule::FixedAmount { amount, .. } => format!("{} off", amount),
        }
    }
}

/// Renders basis points as a percentage without trailing zeros.
fn format_bps(bps: u32) -> String {
    let whole = bps / 100;
    let frac = bps % 100;
    if frac == 0 {
        whole.to_string()
    } else if frac % 10 == 0 {
        format!("{}.{}", whole, frac / 10)
    } else {
        format!("{}.{:02}", whole, frac)
    }
}

/// Canonical form of a promotion code: trimmed and upper-cased.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// The promotions the restaurant ships with.
pub fn default_promotions() -> Vec<Promotion> {
    vec![
        Promotion::free_unit("SUSHI4X3", "4-for-3 on Sushi rolls", 4, 1, ItemType::Sushi),
        Promotion::free_unit("RICEBALL2X1", "2-for-1 on Rice Balls", 2, 1, ItemType::RiceBall),
    ]
}

// =============================================================================
// Promotion Lookup
// =============================================================================

/// Source of active promotions, keyed by normalized code.
///
/// ## Implementations
/// - [`PromotionBook`]: in-memory, used directly or loaded from the store
/// - comanda-db's `PromotionRepository` fills a `PromotionBook`
pub trait PromotionLookup {
    /// Returns the active promotion for an already-normalized code.
    ///
    /// Returning `None` for a failed lookup is correct: the caller reports it
    /// as an invalid code.
    fn find_active_promotion(&self, code: &str) -> Option<Promotion>;
}

/// In-memory promotion table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionBook {
    promotions: BTreeMap<String, Promotion>,
}

impl PromotionBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// A book holding [`default_promotions`].
    pub fn with_defaults() -> Self {
        default_promotions().into_iter().collect()
    }

    /// Adds or replaces a promotion. Returns the one it replaced.
    pub fn insert(&mut self, promotion: Promotion) -> Option<Promotion> {
        self.promotions.insert(normalize_code(&promotion.code), promotion)
    }

    /// Returns a promotion by code, active or not.
    pub fn get(&self, code: &str) -> Option<&Promotion> {
        self.promotions.get(&normalize_code(code))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Promotion> {
        self.promotions.values()
    }

    pub fn len(&self) -> usize {
        self.promotions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.promotions.is_empty()
    }
}

impl FromIterator<Promotion> for PromotionBook {
    fn from_iter<I: IntoIterator<Item = Promotion>>(iter: I) -> Self {
        let mut book = PromotionBook::new();
        for promotion in iter {
            book.insert(promotion);
        }
        book
    }
}

impl PromotionLookup for PromotionBook {
    fn find_active_promotion(&self, code: &str) -> Option<Promotion> {
        self.get(code).filter(|p| p.active).cloned()
    }
}

// =============================================================================
// Promotion Engine
// =============================================================================

/// Applies a promotion code to the cart in place.
///
/// ## Returns
/// The promotion that was applied. On any rejection the cart is unchanged.
///
/// ## Line Rewrites
/// - A discounted line records its pre-discount `line_total` the first time
///   only (`original_line_total`)
/// - Free-unit: one line, the cheapest of the target type by unit price
///   (first in cart order on ties), loses `free_count` units' worth, floored
///   at zero. Exactly that many units are free however far the threshold is
///   exceeded.
/// - Percentage / fixed: every applicable line is repriced from its original
///   total, so only the latest regular promotion shows.
pub fn apply_promotion(
    cart: &mut Cart,
    code: &str,
    lookup: &impl PromotionLookup,
) -> Result<Promotion, PromotionRejection> {
    let code = normalize_code(code);
    let promotion = lookup
        .find_active_promotion(&code)
        .filter(|p| p.active)
        .ok_or_else(|| PromotionRejection::InvalidOrExpiredCode { code: code.clone() })?;

    let cart_total = cart.total();
    debug!(code = %code, cart_total = %cart_total, "Applying promotion");

    if promotion.min_purchase.is_positive() && cart_total < promotion.min_purchase {
        debug!(
            code = %code,
            min_purchase = %promotion.min_purchase,
            "Cart below minimum purchase"
        );
        return Err(PromotionRejection::MinimumPurchaseNotMet {
            required: promotion.min_purchase,
        });
    }

    let label = promotion.discount_label();
    match &promotion.rule {
        PromotionRule::FreeUnit {
            threshold,
            free_count,
            target,
        } => apply_free_unit(cart, *threshold, *free_count, *target, label)?,
        PromotionRule::Percentage { bps, applies_to } => {
            apply_to_lines(cart, applies_to, label, |original| {
                original.apply_percentage_discount(*bps)
            })
        }
        PromotionRule::FixedAmount { amount, applies_to } => {
            apply_to_lines(cart, applies_to, label, |original| {
                original.saturating_sub_floor_zero(*amount)
            })
        }
    }

    debug!(code = %code, total = %cart.total(), "Promotion applied");
    Ok(promotion)
}

fn apply_free_unit(
    cart: &mut Cart,
    threshold: u32,
    free_count: u32,
    target: ItemType,
    label: String,
) -> Result<(), PromotionRejection> {
    let insufficient = PromotionRejection::InsufficientQuantityForPromotion {
        required: threshold,
        item_type: target,
    };

    let quantity = cart.quantity_of(target);
    debug!(item_type = %target, quantity, threshold, "Checking free-unit threshold");
    if quantity < threshold {
        return Err(insufficient);
    }

    // min_by_key keeps the first of equal minimums
    let cheapest = cart
        .items
        .iter()
        .enumerate()
        .filter(|(_, line)| line.item_type() == target)
        .min_by_key(|(_, line)| line.unit_price())
        .map(|(index, _)| index);
    let Some(index) = cheapest else {
        return Err(insufficient);
    };

    let line = &mut cart.items[index];
    let free = line.unit_price().multiply_quantity(free_count);
    let discounted = line.line_total.saturating_sub_floor_zero(free);
    debug!(line = index, free = %free, "Granting free units");
    line.apply_discount(discounted, label);
    Ok(())
}

fn apply_to_lines(
    cart: &mut Cart,
    applies_to: &BTreeSet<ItemType>,
    label: String,
    reprice: impl Fn(Money) -> Money,
) {
    let mut touched = 0usize;
    for line in cart
        .items
        .iter_mut()
        .filter(|line| applies_to.is_empty() || applies_to.contains(&line.item_type()))
    {
        let original = line.original_line_total.unwrap_or(line.line_total);
        line.apply_discount(reprice(original), label.clone());
        touched += 1;
    }
    debug!(lines = touched, "Discounted lines");
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PriceCatalog;
    use crate::totals::CartTotals;
    use crate::types::ItemRequest;

    fn sushi(preparation: &str) -> ItemRequest {
        ItemRequest {
            ingredients: vec!["Salmon".into(), "Tuna".into(), "Crab".into()],
            style: Some("Cold".into()),
            preparation: Some(preparation.into()),
            ..Default::default()
        }
    }

    fn beverage(name: &str) -> ItemRequest {
        ItemRequest {
            beverage: Some(name.into()),
            ..Default::default()
        }
    }

    fn boneless() -> ItemRequest {
        ItemRequest {
            sauces: vec!["BBQ".into()],
            ..Default::default()
        }
    }

    fn cart_with_sushi(lines: &[(&str, u32)]) -> Cart {
        let menu = PriceCatalog::default();
        let mut cart = Cart::new();
        for (preparation, quantity) in lines {
            let index = cart.add_request(ItemType::Sushi, &sushi(preparation), &menu).unwrap();
            cart.set_quantity(index, *quantity).unwrap();
        }
        cart
    }

    fn discounted_lines(cart: &Cart) -> usize {
        cart.items.iter().filter(|l| l.is_discounted()).count()
    }

    #[test]
    fn test_four_for_three_takes_one_unit_off() {
        let book = PromotionBook::with_defaults();
        let mut cart = cart_with_sushi(&[("Prepared", 2), ("Prepared", 1), ("Prepared", 1)]);
        let before = cart.total();

        apply_promotion(&mut cart, "SUSHI4X3", &book).unwrap();

        assert_eq!(before - cart.total(), Money::from_cents(11500));
        assert_eq!(discounted_lines(&cart), 1);
        let line = &cart.items[0];
        assert_eq!(line.discount_label.as_deref(), Some("4-for-3 — 1 FREE"));
        assert_eq!(line.original_line_total, Some(Money::from_cents(23000)));
    }

    #[test]
    fn test_three_units_rejected_and_cart_unchanged() {
        let book = PromotionBook::with_defaults();
        let mut cart = cart_with_sushi(&[("Prepared", 3)]);
        let before = cart.clone();

        let result = apply_promotion(&mut cart, "SUSHI4X3", &book);

        assert_eq!(
            result,
            Err(PromotionRejection::InsufficientQuantityForPromotion {
                required: 4,
                item_type: ItemType::Sushi,
            })
        );
        assert_eq!(cart, before);
    }

    #[test]
    fn test_cheapest_line_gets_the_free_unit() {
        let book = PromotionBook::with_defaults();
        let mut cart = cart_with_sushi(&[("Prepared", 2), ("Dry", 2)]);

        apply_promotion(&mut cart, "SUSHI4X3", &book).unwrap();

        assert!(!cart.items[0].is_discounted());
        assert_eq!(cart.items[1].line_total.cents(), 11000);
        assert_eq!(cart.total().cents(), 23000 + 11000);
    }

    #[test]
    fn test_first_cheapest_line_wins_ties() {
        let book = PromotionBook::with_defaults();
        let mut cart = cart_with_sushi(&[("Prepared", 1), ("Dry", 1), ("Dry", 2)]);

        apply_promotion(&mut cart, "SUSHI4X3", &book).unwrap();

        assert!(cart.items[1].is_discounted());
        assert!(!cart.items[2].is_discounted());
        assert!(cart.items[1].line_total.is_zero());
    }

    #[test]
    fn test_exceeding_threshold_still_grants_one_unit() {
        let book = PromotionBook::with_defaults();
        let mut cart = cart_with_sushi(&[("Prepared", 8)]);

        apply_promotion(&mut cart, "SUSHI4X3", &book).unwrap();

        assert_eq!(cart.total().cents(), 7 * 11500);
    }

    #[test]
    fn test_free_count_above_one() {
        let promo = Promotion::free_unit("SUSHI6X4", "6-for-4", 6, 2, ItemType::Sushi);
        let book: PromotionBook = std::iter::once(promo).collect();
        let mut cart = cart_with_sushi(&[("Dry", 6)]);

        apply_promotion(&mut cart, "sushi6x4", &book).unwrap();

        assert_eq!(cart.total().cents(), 4 * 11000);
        assert_eq!(cart.items[0].discount_label.as_deref(), Some("6-for-4 — 2 FREE"));
    }

    #[test]
    fn test_rice_ball_two_for_one() {
        let menu = PriceCatalog::default();
        let book = PromotionBook::with_defaults();
        let mut cart = Cart::new();
        let rice_ball = ItemRequest {
            ingredients: vec!["Salmon".into()],
            style: Some("Breaded".into()),
            sauce: Some("Eel".into()),
            ..Default::default()
        };
        cart.add_request(ItemType::RiceBall, &rice_ball, &menu).unwrap();
        cart.add_request(ItemType::RiceBall, &rice_ball, &menu).unwrap();

        apply_promotion(&mut cart, "RICEBALL2X1", &book).unwrap();

        assert_eq!(cart.total().cents(), 11500);
        assert_eq!(cart.items[0].discount_label.as_deref(), Some("2-for-1 — 1 FREE"));
    }

    #[test]
    fn test_minimum_purchase_gate() {
        let menu = PriceCatalog::default();
        let promo = Promotion::percentage("BIG10", "10% off orders over $100", 1000, [])
            .with_min_purchase(Money::from_cents(10000));
        let book: PromotionBook = std::iter::once(promo).collect();
        let mut cart = Cart::new();
        cart.add_request(ItemType::Beverage, &beverage("Coca Cola"), &menu).unwrap();
        cart.add_request(ItemType::Beverage, &beverage("Coca Cola"), &menu).unwrap();
        let before = cart.clone();
        assert_eq!(cart.total().cents(), 5000);

        let result = apply_promotion(&mut cart, "BIG10", &book);

        assert_eq!(
            result,
            Err(PromotionRejection::MinimumPurchaseNotMet {
                required: Money::from_cents(10000)
            })
        );
        assert_eq!(cart, before);
    }

    #[test]
    fn test_minimum_purchase_applies_to_free_unit() {
        let promo = Promotion::free_unit("SUSHI4X3", "4-for-3", 4, 1, ItemType::Sushi)
            .with_min_purchase(Money::from_cents(100000));
        let book: PromotionBook = std::iter::once(promo).collect();
        let mut cart = cart_with_sushi(&[("Prepared", 4)]);

        let result = apply_promotion(&mut cart, "SUSHI4X3", &book);
        assert!(matches!(result, Err(PromotionRejection::MinimumPurchaseNotMet { .. })));
    }

    #[test]
    fn test_percentage_scoped_to_boneless() {
        let menu = PriceCatalog::default();
        let promo = Promotion::percentage("WINGS20", "20% off Boneless", 2000, [ItemType::Boneless]);
        let book: PromotionBook = std::iter::once(promo).collect();
        let mut cart = Cart::new();
        cart.add_request(ItemType::Boneless, &boneless(), &menu).unwrap();
        cart.add_request(ItemType::Beverage, &beverage("Sprite"), &menu).unwrap();

        apply_promotion(&mut cart, "wings20", &book).unwrap();

        let wings = &cart.items[0];
        assert_eq!(wings.line_total.cents(), 8400);
        assert_eq!(wings.original_line_total, Some(Money::from_cents(10500)));
        assert_eq!(wings.discount_label.as_deref(), Some("20% off"));

        let soda = &cart.items[1];
        assert_eq!(soda.line_total.cents(), 2500);
        assert!(soda.original_line_total.is_none());
        assert!(!soda.is_discounted());
    }

    #[test]
    fn test_empty_scope_applies_to_every_line() {
        let menu = PriceCatalog::default();
        let promo = Promotion::fixed_amount("FIVE", "$5 off each item", Money::from_cents(500), []);
        let book: PromotionBook = std::iter::once(promo).collect();
        let mut cart = Cart::new();
        cart.add_request(ItemType::Boneless, &boneless(), &menu).unwrap();
        cart.add_request(ItemType::Beverage, &beverage("Water"), &menu).unwrap();

        apply_promotion(&mut cart, "FIVE", &book).unwrap();

        assert_eq!(cart.items[0].line_total.cents(), 10000);
        assert_eq!(cart.items[1].line_total.cents(), 500);
        assert_eq!(cart.items[1].discount_label.as_deref(), Some("$5.00 off"));
    }

    #[test]
    fn test_fixed_amount_floors_at_zero() {
        let menu = PriceCatalog::default();
        let drinks = [ItemType::Beverage];
        let promo = Promotion::fixed_amount("FIFTY", "$50 off drinks", Money::from_cents(5000), drinks);
        let book: PromotionBook = std::iter::once(promo).collect();
        let mut cart = Cart::new();
        cart.add_request(ItemType::Beverage, &beverage("Fanta"), &menu).unwrap();

        apply_promotion(&mut cart, "FIFTY", &book).unwrap();
        assert!(cart.items[0].line_total.is_zero());
    }

    #[test]
    fn test_unknown_and_inactive_codes_rejected() {
        let mut book = PromotionBook::with_defaults();
        let mut retired = Promotion::percentage("OLD", "retired", 1000, []);
        retired.active = false;
        book.insert(retired);
        let mut cart = cart_with_sushi(&[("Prepared", 4)]);
        let before = cart.clone();

        assert_eq!(
            apply_promotion(&mut cart, " nope ", &book),
            Err(PromotionRejection::InvalidOrExpiredCode { code: "NOPE".into() })
        );
        assert!(matches!(
            apply_promotion(&mut cart, "old", &book),
            Err(PromotionRejection::InvalidOrExpiredCode { .. })
        ));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_quantity_change_then_reapply_discounts_new_quantity() {
        let menu = PriceCatalog::default();
        let promo = Promotion::percentage("WINGS20", "20% off Boneless", 2000, [ItemType::Boneless]);
        let book: PromotionBook = std::iter::once(promo).collect();
        let mut cart = Cart::new();
        cart.add_request(ItemType::Boneless, &boneless(), &menu).unwrap();
        apply_promotion(&mut cart, "WINGS20", &book).unwrap();

        cart.set_quantity(0, 3).unwrap();

        let line = &cart.items[0];
        assert_eq!(line.line_total.cents(), 3 * 10500);
        assert!(line.discount_label.is_none());
        assert!(line.original_line_total.is_none());
        let totals = CartTotals::from(&cart);
        assert_eq!(totals.undiscounted_total.cents(), 31500);
        assert!(totals.discount_total.is_zero());

        apply_promotion(&mut cart, "WINGS20", &book).unwrap();

        let line = &cart.items[0];
        assert_eq!(line.line_total.cents(), 25200);
        assert_eq!(line.original_line_total, Some(Money::from_cents(31500)));
        assert_eq!(CartTotals::from(&cart).discount_total.cents(), 6300);
    }

    #[test]
    fn test_percentage_above_hundred_clamps_to_free() {
        let menu = PriceCatalog::default();
        let promo = Promotion::percentage("ALLFREE", "on the house", 15_000, []);
        assert_eq!(promo.value(), i64::from(MAX_DISCOUNT_BPS));
        assert_eq!(promo.discount_label(), "100% off");

        let mut oversized = Promotion::percentage("RAW", "", 0, []);
        oversized.rule = PromotionRule::Percentage {
            bps: 25_000,
            applies_to: BTreeSet::new(),
        };
        let book: PromotionBook = [promo, oversized].into_iter().collect();

        for code in ["ALLFREE", "RAW"] {
            let mut cart = Cart::new();
            cart.add_request(ItemType::Boneless, &boneless(), &menu).unwrap();
            apply_promotion(&mut cart, code, &book).unwrap();
            assert!(cart.total().is_zero());
        }
    }

    #[test]
    fn test_repeated_free_unit_compounds() {
        let book = PromotionBook::with_defaults();
        let mut cart = cart_with_sushi(&[("Prepared", 4)]);

        apply_promotion(&mut cart, "SUSHI4X3", &book).unwrap();
        apply_promotion(&mut cart, "SUSHI4X3", &book).unwrap();

        let line = &cart.items[0];
        assert_eq!(line.line_total.cents(), 2 * 11500);
        assert_eq!(line.original_line_total, Some(Money::from_cents(4 * 11500)));
    }

    #[test]
    fn test_edit_after_discount_clears_it() {
        let menu = PriceCatalog::default();
        let book = PromotionBook::with_defaults();
        let mut cart = cart_with_sushi(&[("Prepared", 4)]);
        apply_promotion(&mut cart, "SUSHI4X3", &book).unwrap();

        cart.edit_request(0, &sushi("Prepared"), &menu).unwrap();

        let line = &cart.items[0];
        assert!(line.discount_label.is_none());
        assert!(line.original_line_total.is_none());
        assert_eq!(line.line_total.cents(), 4 * 11500);
    }

    #[test]
    fn test_promotion_accessors() {
        let promos = default_promotions();
        let sushi = &promos[0];
        assert_eq!(sushi.kind(), PromotionKind::Special);
        assert_eq!(sushi.method(), DiscountMethod::BuyXGetYFree);
        assert_eq!(sushi.value(), 3);
        assert_eq!(sushi.applicable_types(), BTreeSet::from([ItemType::Sushi]));

        let pct = Promotion::percentage("HALF", "", 2050, []);
        assert_eq!(pct.kind(), PromotionKind::Regular);
        assert_eq!(pct.value(), 2050);
        assert_eq!(pct.discount_label(), "20.5% off");
        assert_eq!(format_bps(1025), "10.25");
    }

    #[test]
    fn test_promotion_serializes_rule_tag() {
        let json = serde_json::to_value(&default_promotions()[1]).unwrap();
        assert_eq!(json["code"], "RICEBALL2X1");
        assert_eq!(json["rule"]["method"], "free_unit");
        assert_eq!(json["rule"]["freeCount"], 1);
        assert_eq!(json["rule"]["target"], "rice_ball");
    }
}
