//! # Price Catalog
//!
//! Base unit prices for everything on the menu.
//!
//! ## Price Table
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Item                         Qualifier              Unit price         │
//! │  ───────────────────────────  ─────────────────────  ──────────         │
//! │  Beverage                     "Water"                $10.00             │
//! │  Beverage                     "Coca Cola", "Sprite",                    │
//! │                               "Pepsi", "Fanta"       $25.00             │
//! │  Boneless                     -                      $105.00            │
//! │  Rice Ball                    -                      $115.00            │
//! │  Sushi                        dry / sauce on side    $110.00            │
//! │  Sushi                        anything else          $115.00            │
//! │  Extra Sauces                 per sauce              $10.00             │
//! │  Exception ingredient         per roll (max one)     +$10.00            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Lookups never fail: an unknown beverage prices at zero. Callers only pass
//! names from the menu they rendered.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{ItemAttributes, ItemType, Preparation};

/// Name of the scarce ingredient that may only take the overflow slot.
pub const EXCEPTION_INGREDIENT: &str = "Oyster";

// =============================================================================
// Price Quote
// =============================================================================

/// One labelled part of a unit price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PriceComponent {
    pub label: String,
    pub amount: Money,
}

/// A priced customization: the unit price and how it was built.
///
/// ## Invariant
/// `breakdown` amounts always sum to `unit_price`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    pub unit_price: Money,
    pub breakdown: Vec<PriceComponent>,
}

impl PriceQuote {
    fn from_components(breakdown: Vec<PriceComponent>) -> Self {
        PriceQuote {
            unit_price: breakdown.iter().map(|c| c.amount).sum(),
            breakdown,
        }
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// The menu's price table. Pure data; every method is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceCatalog {
    /// Beverage prices keyed by upper-cased name.
    beverages: BTreeMap<String, Money>,
    boneless: Money,
    rice_ball: Money,
    sushi_standard: Money,
    sushi_reduced: Money,
    sauce_unit: Money,
    exception_surcharge: Money,
}

impl Default for PriceCatalog {
    /// The restaurant's current menu.
    fn default() -> Self {
        let beverages = [
            ("Water", 1000),
            ("Coca Cola", 2500),
            ("Sprite", 2500),
            ("Pepsi", 2500),
            ("Fanta", 2500),
        ]
        .into_iter()
        .map(|(name, cents)| (beverage_key(name), Money::from_cents(cents)))
        .collect();

        PriceCatalog {
            beverages,
            boneless: Money::from_cents(10500),
            rice_ball: Money::from_cents(11500),
            sushi_standard: Money::from_cents(11500),
            sushi_reduced: Money::from_cents(11000),
            sauce_unit: Money::from_cents(1000),
            exception_surcharge: Money::from_cents(1000),
        }
    }
}

fn beverage_key(name: &str) -> String {
    name.trim().to_uppercase()
}

impl PriceCatalog {
    /// Base unit price for an item type.
    ///
    /// ## Qualifier
    /// - Beverage: the beverage name. Unknown or absent → zero.
    /// - Sushi: the preparation. Dry or sauce-on-the-side → lower tier,
    ///   anything else (including absent) → standard tier.
    /// - Extra Sauces: ignored; returns the per-sauce price.
    /// - Everything else: ignored.
    ///
    /// ## Example
    /// ```rust
    /// use comanda_core::catalog::PriceCatalog;
    /// use comanda_core::types::ItemType;
    ///
    /// let menu = PriceCatalog::default();
    /// assert_eq!(menu.base_price(ItemType::Sushi, Some("Dry")).cents(), 11000);
    /// assert_eq!(menu.base_price(ItemType::Sushi, None).cents(), 11500);
    /// assert_eq!(menu.base_price(ItemType::Beverage, Some("sprite")).cents(), 2500);
    /// ```
    pub fn base_price(&self, item_type: ItemType, qualifier: Option<&str>) -> Money {
        match item_type {
            ItemType::Beverage => qualifier
                .and_then(|name| self.beverages.get(&beverage_key(name)))
                .copied()
                .unwrap_or_default(),
            ItemType::Boneless => self.boneless,
            ItemType::SauceAddOn => self.sauce_unit,
            ItemType::RiceBall => self.rice_ball,
            ItemType::Sushi => {
                let tier = qualifier.map(Preparation::from_qualifier).unwrap_or_default();
                self.sushi_price(tier)
            }
        }
    }

    fn sushi_price(&self, tier: Preparation) -> Money {
        if tier.is_reduced_tier() {
            self.sushi_reduced
        } else {
            self.sushi_standard
        }
    }

    /// Flat surcharge for the exception ingredient.
    pub fn exception_surcharge(&self) -> Money {
        self.exception_surcharge
    }

    /// Prices a validated customization.
    ///
    /// ## Pricing Rules
    /// ```text
    /// Beverage      = table[beverage]
    /// Boneless      = base (all sauces included)
    /// Extra Sauces  = sauces × per-sauce price
    /// Rice Ball     = base                 (+ surcharge if exception slot used)
    /// Sushi         = base[preparation]    (+ surcharge if exception slot used)
    /// ```
    pub fn quote(&self, attributes: &ItemAttributes) -> PriceQuote {
        let item_type = attributes.item_type();
        let components = match attributes {
            ItemAttributes::Beverage { beverage, .. } => vec![PriceComponent {
                label: beverage.clone(),
                amount: self.base_price(item_type, Some(beverage)),
            }],
            ItemAttributes::Boneless { .. } => vec![PriceComponent {
                label: item_type.label().to_string(),
                amount: self.boneless,
            }],
            ItemAttributes::SauceAddOn { sauces, .. } => {
                let count = sauces.len() as u32;
                vec![PriceComponent {
                    label: format!("{} sauces x {}", count, self.sauce_unit),
                    amount: self.sauce_unit.multiply_quantity(count),
                }]
            }
            ItemAttributes::RiceBall(roll) | ItemAttributes::Sushi(roll) => {
                let base = match item_type {
                    ItemType::Sushi => self.sushi_price(roll.preparation_tier()),
                    _ => self.rice_ball,
                };
                let mut parts = vec![PriceComponent {
                    label: item_type.label().to_string(),
                    amount: base,
                }];
                if roll.exception_ingredient {
                    parts.push(PriceComponent {
                        label: EXCEPTION_INGREDIENT.to_string(),
                        amount: self.exception_surcharge,
                    });
                }
                parts
            }
        };
        PriceQuote::from_components(components)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
