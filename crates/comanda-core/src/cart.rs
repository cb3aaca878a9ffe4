//! # Cart
//!
//! The order being built: an ordered list of priced, validated lines.
//!
//! ## Ownership
//! A `Cart` is a plain value. The calling layer keeps it in its session store
//! between requests and hands it back for each operation; nothing in this
//! crate holds cart state. Every mutating operation is a read-modify-write of
//! the whole value, so the caller must run at most one at a time per cart.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Request                  Operation               Cart Change           │
//! │  ───────                  ─────────               ───────────           │
//! │                                                                         │
//! │  Submit customization ──► add_request() ────────► items.push(line)     │
//! │                                                                         │
//! │  Change quantity ───────► set_quantity() ───────► line repriced from   │
//! │                                                   its undiscounted     │
//! │                                                   unit price           │
//! │                                                                         │
//! │  Re-edit line ──────────► edit_request() ───────► line rebuilt from    │
//! │                                                   scratch (discount    │
//! │                                                   dropped)             │
//! │                                                                         │
//! │  Remove ────────────────► remove_line() ────────► items.remove(i)      │
//! │                                                                         │
//! │  Order placed ──────────► clear() ──────────────► empty, new order id  │
//! │                                                                         │
//! │  NOTE: a failed operation leaves the cart exactly as it was.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::catalog::{PriceCatalog, PriceComponent, PriceQuote};
use crate::error::{CartError, ValidationError, ValidationErrors};
use crate::money::Money;
use crate::totals;
use crate::types::{ItemAttributes, ItemRequest, ItemType};
use crate::validation::{self, validate_customer_name};

// =============================================================================
// Cart Item
// =============================================================================

/// One customized product on the order.
///
/// ## Price Fields
/// - `unit_price`: undiscounted price of one unit, fixed when the line is
///   created or re-edited. Optional only so carts serialized without it still
///   load; [`CartItem::unit_price`] derives it when absent.
/// - `line_total`: what this line charges. Equals `unit_price × quantity`
///   unless a promotion rewrote it.
/// - `original_line_total`: the pre-discount `line_total`, captured the
///   first time a promotion touches the line and never overwritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[serde(default, rename = "unitPrice")]
    pub stored_unit_price: Option<Money>,

    pub quantity: u32,

    pub line_total: Money,

    #[serde(default)]
    pub original_line_total: Option<Money>,

    /// Present iff a promotion discounted this line.
    #[serde(default)]
    pub discount_label: Option<String>,

    pub attributes: ItemAttributes,

    /// How the unit price was built, for the ticket.
    #[serde(default)]
    pub breakdown: Vec<PriceComponent>,

    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    /// Creates a single-unit line from validated attributes and their quote.
    pub fn new(attributes: ItemAttributes, quote: PriceQuote) -> Self {
        CartItem {
            stored_unit_price: Some(quote.unit_price),
            quantity: 1,
            line_total: quote.unit_price,
            original_line_total: None,
            discount_label: None,
            attributes,
            breakdown: quote.breakdown,
            added_at: Utc::now(),
        }
    }

    /// Which menu item this line is.
    pub fn item_type(&self) -> ItemType {
        self.attributes.item_type()
    }

    /// Price of one unit: the stored value, or `line_total / quantity`.
    pub fn unit_price(&self) -> Money {
        self.stored_unit_price
            .unwrap_or_else(|| self.line_total.divide_quantity(self.quantity))
    }

    /// Whether a promotion has discounted this line.
    pub fn is_discounted(&self) -> bool {
        self.discount_label.is_some()
    }

    /// How much the applied promotion took off this line.
    pub fn discount_amount(&self) -> Money {
        self.original_line_total
            .map(|original| original - self.line_total)
            .unwrap_or_default()
    }

    /// Records a promotion's new price for this line.
    ///
    /// The first discount captures the current `line_total` as the original;
    /// later ones leave that capture alone.
    pub(crate) fn apply_discount(&mut self, line_total: Money, label: String) {
        if self.original_line_total.is_none() {
            self.original_line_total = Some(self.line_total);
        }
        self.line_total = line_total;
        self.discount_label = Some(label);
    }

    /// Reprices the line for a new quantity from the undiscounted unit price.
    ///
    /// Any promotion on the line is dropped along with its label and the
    /// captured original.
    fn requantify(&mut self, quantity: u32) {
        let unit_price = self.unit_price();
        self.stored_unit_price = Some(unit_price);
        self.quantity = quantity;
        self.line_total = unit_price.multiply_quantity(quantity);
        self.original_line_total = None;
        self.discount_label = None;
    }
}

// =============================================================================
// Cart
// =============================================================================

/// An order in progress.
///
/// ## Invariants
/// - Lines keep insertion order; identical customizations are never merged
/// - Every line has `quantity >= 1`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Short ticket number shown to the kitchen and the customer.
    pub order_id: String,

    pub customer_name: Option<String>,

    pub items: Vec<CartItem>,

    /// When the cart was created/last cleared
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

fn new_order_id() -> String {
    Uuid::new_v4().simple().to_string().chars().take(8).collect()
}

impl Cart {
    /// Creates a new empty cart with a fresh order id.
    pub fn new() -> Self {
        Cart {
            order_id: new_order_id(),
            customer_name: None,
            items: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Prices validated attributes and appends them as a new line.
    ///
    /// ## Returns
    /// The index of the new line.
    pub fn add_line(&mut self, attributes: ItemAttributes, catalog: &PriceCatalog) -> usize {
        let quote = catalog.quote(&attributes);
        self.items.push(CartItem::new(attributes, quote));
        self.items.len() - 1
    }

    /// Validates a raw customization, prices it and appends it.
    ///
    /// ## User Workflow
    /// ```text
    /// Sushi form submitted
    ///      │
    ///      ▼
    /// validate(Sushi, request) ──► Err ──► cart untouched, errors shown
    ///      │
    ///      ▼ Ok
    /// catalog.quote(attrs) ──► CartItem { qty 1 } pushed
    /// ```
    pub fn add_request(
        &mut self,
        item_type: ItemType,
        request: &ItemRequest,
        catalog: &PriceCatalog,
    ) -> Result<usize, ValidationErrors> {
        let attributes = validation::validate(item_type, request)?;
        Ok(self.add_line(attributes, catalog))
    }

    /// Replaces a line's customization and price from scratch.
    ///
    /// Quantity is kept; `unit_price` and `line_total` are recomputed and any
    /// promotion discount on the line is dropped.
    pub fn edit_line(
        &mut self,
        index: usize,
        attributes: ItemAttributes,
        catalog: &PriceCatalog,
    ) -> Result<(), CartError> {
        let len = self.items.len();
        let line = self
            .items
            .get_mut(index)
            .ok_or(CartError::LineNotFound { index, len })?;

        let existing = line.item_type();
        let requested = attributes.item_type();
        if existing != requested {
            return Err(CartError::ItemTypeMismatch {
                index,
                existing,
                requested,
            });
        }

        let quantity = line.quantity;
        let quote = catalog.quote(&attributes);
        let mut replacement = CartItem::new(attributes, quote);
        replacement.quantity = quantity;
        replacement.line_total = replacement.unit_price().multiply_quantity(quantity);
        *line = replacement;
        Ok(())
    }

    /// Re-validates a raw customization against the line's item type and
    /// replaces the line with it.
    pub fn edit_request(
        &mut self,
        index: usize,
        request: &ItemRequest,
        catalog: &PriceCatalog,
    ) -> Result<(), CartError> {
        let item_type = self
            .line(index)
            .map(CartItem::item_type)
            .ok_or(CartError::LineNotFound {
                index,
                len: self.items.len(),
            })?;
        let attributes = validation::validate(item_type, request)?;
        self.edit_line(index, attributes, catalog)
    }

    /// Changes a line's quantity.
    ///
    /// ## Behavior
    /// - Quantities below 1 are clamped to 1
    /// - `line_total` becomes `unit_price × quantity` using the UNDISCOUNTED
    ///   unit price
    /// - A promotion on this line is discarded; re-apply the code afterwards
    pub fn set_quantity(&mut self, index: usize, quantity: u32) -> Result<(), CartError> {
        let len = self.items.len();
        let line = self
            .items
            .get_mut(index)
            .ok_or(CartError::LineNotFound { index, len })?;
        line.requantify(quantity.max(1));
        Ok(())
    }

    /// Removes a line, shifting later lines down by one.
    pub fn remove_line(&mut self, index: usize) -> Result<CartItem, CartError> {
        if index >= self.items.len() {
            return Err(CartError::LineNotFound {
                index,
                len: self.items.len(),
            });
        }
        Ok(self.items.remove(index))
    }

    /// Returns the line at `index`.
    pub fn line(&self, index: usize) -> Option<&CartItem> {
        self.items.get(index)
    }

    /// Sets the name printed on the ticket.
    pub fn set_customer_name(&mut self, name: &str) -> Result<(), ValidationError> {
        self.customer_name = Some(validate_customer_name(name)?);
        Ok(())
    }

    /// Resets the cart after an order is placed: no lines, no customer name,
    /// a new order id.
    pub fn clear(&mut self) {
        self.items.clear();
        self.customer_name = None;
        self.order_id = new_order_id();
        self.created_at = Utc::now();
    }

    /// Returns the number of lines in the cart.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns the total quantity across all lines.
    pub fn total_quantity(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Total units of one item type across all lines.
    pub fn quantity_of(&self, item_type: ItemType) -> u32 {
        self.items
            .iter()
            .filter(|i| i.item_type() == item_type)
            .map(|i| i.quantity)
            .sum()
    }

    /// What the order charges right now.
    pub fn total(&self) -> Money {
        totals::order_total(&self.items)
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RollAttributes;

    fn beverage(name: &str) -> ItemRequest {
        ItemRequest {
            beverage: Some(name.to_string()),
            ..Default::default()
        }
    }

    fn sushi_request(preparation: &str) -> ItemRequest {
        ItemRequest {
            ingredients: vec!["Salmon".into(), "Tuna".into(), "Crab".into()],
            style: Some("Cold".into()),
            preparation: Some(preparation.into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_add_request_creates_single_unit_line() {
        let menu = PriceCatalog::default();
        let mut cart = Cart::new();

        let index = cart.add_request(ItemType::Beverage, &beverage("Coca Cola"), &menu).unwrap();

        assert_eq!(index, 0);
        let line = cart.line(0).unwrap();
        assert_eq!(line.quantity, 1);
        assert_eq!(line.unit_price().cents(), 2500);
        assert_eq!(line.line_total.cents(), 2500);
        assert!(!line.is_discounted());
    }

    #[test]
    fn test_identical_lines_are_not_merged() {
        let menu = PriceCatalog::default();
        let mut cart = Cart::new();
        cart.add_request(ItemType::Beverage, &beverage("Water"), &menu).unwrap();
        cart.add_request(ItemType::Beverage, &beverage("Water"), &menu).unwrap();

        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.total().cents(), 2000);
    }

    #[test]
    fn test_rejected_request_leaves_cart_unchanged() {
        let menu = PriceCatalog::default();
        let mut cart = Cart::new();
        cart.add_request(ItemType::Beverage, &beverage("Water"), &menu).unwrap();
        let before = cart.clone();

        let result = cart.add_request(ItemType::Boneless, &ItemRequest::default(), &menu);

        assert!(result.is_err());
        assert_eq!(cart, before);
    }

    #[test]
    fn test_set_quantity_keeps_line_total_invariant() {
        let menu = PriceCatalog::default();
        let mut cart = Cart::new();
        cart.add_request(ItemType::Sushi, &sushi_request("Dry"), &menu).unwrap();

        cart.set_quantity(0, 3).unwrap();
        let line = cart.line(0).unwrap();
        assert_eq!(line.quantity, 3);
        assert_eq!(line.line_total, line.unit_price().multiply_quantity(3));
        assert_eq!(line.line_total.cents(), 33000);
    }

    #[test]
    fn test_set_quantity_clamps_to_one() {
        let menu = PriceCatalog::default();
        let mut cart = Cart::new();
        cart.add_request(ItemType::Beverage, &beverage("Pepsi"), &menu).unwrap();
        cart.set_quantity(0, 4).unwrap();

        cart.set_quantity(0, 0).unwrap();
        assert_eq!(cart.line(0).unwrap().quantity, 1);
        assert_eq!(cart.total().cents(), 2500);
    }

    #[test]
    fn test_set_quantity_derives_missing_unit_price() {
        let mut cart = Cart::new();
        let mut line = CartItem::new(
            ItemAttributes::Beverage {
                beverage: "Fanta".into(),
                notes: None,
            },
            PriceCatalog::default().quote(&ItemAttributes::Beverage {
                beverage: "Fanta".into(),
                notes: None,
            }),
        );
        line.stored_unit_price = None;
        line.quantity = 2;
        line.line_total = Money::from_cents(5000);
        cart.items.push(line);

        cart.set_quantity(0, 3).unwrap();
        let line = cart.line(0).unwrap();
        assert_eq!(line.stored_unit_price, Some(Money::from_cents(2500)));
        assert_eq!(line.line_total.cents(), 7500);
    }

    #[test]
    fn test_set_quantity_drops_discount_from_total() {
        let menu = PriceCatalog::default();
        let mut cart = Cart::new();
        cart.add_request(ItemType::Beverage, &beverage("Sprite"), &menu).unwrap();
        cart.set_quantity(0, 2).unwrap();
        cart.items[0].apply_discount(Money::from_cents(2500), "2-for-1".to_string());

        cart.set_quantity(0, 2).unwrap();
        let line = cart.line(0).unwrap();
        assert_eq!(line.line_total.cents(), 5000);
        assert!(!line.is_discounted());
        assert_eq!(line.original_line_total, None);
        assert!(line.discount_amount().is_zero());
    }

    #[test]
    fn test_out_of_range_index_is_an_error() {
        let mut cart = Cart::new();
        assert_eq!(
            cart.set_quantity(2, 1),
            Err(CartError::LineNotFound { index: 2, len: 0 })
        );
        assert!(cart.remove_line(0).is_err());
    }

    #[test]
    fn test_edit_reprices_and_clears_discount() {
        let menu = PriceCatalog::default();
        let mut cart = Cart::new();
        cart.add_request(ItemType::Sushi, &sushi_request("Prepared"), &menu).unwrap();
        cart.set_quantity(0, 2).unwrap();
        cart.items[0].apply_discount(Money::from_cents(11500), "4-for-3".to_string());

        cart.edit_request(0, &sushi_request("Dry"), &menu).unwrap();

        let line = cart.line(0).unwrap();
        assert_eq!(line.quantity, 2);
        assert_eq!(line.unit_price().cents(), 11000);
        assert_eq!(line.line_total.cents(), 22000);
        assert!(line.discount_label.is_none());
        assert!(line.original_line_total.is_none());
    }

    #[test]
    fn test_invalid_edit_leaves_line_alone() {
        let menu = PriceCatalog::default();
        let mut cart = Cart::new();
        cart.add_request(ItemType::Sushi, &sushi_request("Prepared"), &menu).unwrap();
        let before = cart.clone();

        let mut bad = sushi_request("Prepared");
        bad.ingredients.push("Avocado".into());
        let result = cart.edit_request(0, &bad, &menu);

        assert!(matches!(result, Err(CartError::Invalid(_))));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_edit_line_rejects_other_item_type() {
        let menu = PriceCatalog::default();
        let mut cart = Cart::new();
        cart.add_request(ItemType::Beverage, &beverage("Water"), &menu).unwrap();

        let roll = ItemAttributes::RiceBall(RollAttributes {
            base: Vec::new(),
            ingredients: vec!["Salmon".into()],
            exception_ingredient: false,
            style: "Cold".into(),
            sauce: "Eel".into(),
            preparation: None,
            toppings: Vec::new(),
            notes: None,
        });
        assert!(matches!(
            cart.edit_line(0, roll, &menu),
            Err(CartError::ItemTypeMismatch { .. })
        ));
    }

    #[test]
    fn test_remove_line_preserves_order() {
        let menu = PriceCatalog::default();
        let mut cart = Cart::new();
        cart.add_request(ItemType::Beverage, &beverage("Water"), &menu).unwrap();
        cart.add_request(ItemType::Beverage, &beverage("Sprite"), &menu).unwrap();
        cart.add_request(ItemType::Beverage, &beverage("Fanta"), &menu).unwrap();

        let removed = cart.remove_line(1).unwrap();
        assert_eq!(removed.line_total.cents(), 2500);
        assert_eq!(cart.item_count(), 2);
        assert!(matches!(
            &cart.line(1).unwrap().attributes,
            ItemAttributes::Beverage { beverage, .. } if beverage == "Fanta"
        ));
    }

    #[test]
    fn test_clear_starts_a_new_order() {
        let menu = PriceCatalog::default();
        let mut cart = Cart::new();
        cart.add_request(ItemType::Beverage, &beverage("Water"), &menu).unwrap();
        cart.set_customer_name("Ana").unwrap();
        let old_id = cart.order_id.clone();

        cart.clear();

        assert!(cart.is_empty());
        assert!(cart.customer_name.is_none());
        assert_eq!(cart.order_id.len(), 8);
        assert_ne!(cart.order_id, old_id);
    }

    #[test]
    fn test_cart_survives_json_round_trip() {
        let menu = PriceCatalog::default();
        let mut cart = Cart::new();
        cart.add_request(ItemType::Sushi, &sushi_request("Dry"), &menu).unwrap();

        let json = serde_json::to_string(&cart).unwrap();
        let restored: Cart = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, cart);
    }
}
