//! # Domain Types
//!
//! Menu item types and the customization payloads that flow through the
//! order engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌──────────────────────┐   ┌─────────────────┐  │
//! │  │    ItemType     │   │     ItemRequest      │   │ ItemAttributes  │  │
//! │  │  ─────────────  │   │  ──────────────────  │   │  ─────────────  │  │
//! │  │  Beverage       │   │  raw form fields     │──►│  Beverage {..}  │  │
//! │  │  Boneless       │   │  (untrusted, every   │   │  Boneless {..}  │  │
//! │  │  SauceAddOn     │   │   field optional)    │   │  SauceAddOn{..} │  │
//! │  │  RiceBall       │   └──────────────────────┘   │  RiceBall(Roll) │  │
//! │  │  Sushi          │          validate()          │  Sushi(Roll)    │  │
//! │  └─────────────────┘                              └─────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `ItemAttributes` can only be produced by [`crate::validation::validate`],
//! or deserialized from a cart the engine itself serialized earlier.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

// =============================================================================
// Item Type
// =============================================================================

/// The closed set of things the kitchen sells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    /// Bottled drinks, priced per beverage.
    Beverage,
    /// Boneless wings with one or more sauces.
    Boneless,
    /// Extra sauce cups, priced per sauce.
    SauceAddOn,
    /// Rice ball with up to 6 regular ingredients.
    RiceBall,
    /// Sushi roll with up to 3 regular ingredients.
    Sushi,
}

impl ItemType {
    /// Human-readable name for tickets and messages.
    pub const fn label(&self) -> &'static str {
        match self {
            ItemType::Beverage => "Beverage",
            ItemType::Boneless => "Boneless",
            ItemType::SauceAddOn => "Extra Sauces",
            ItemType::RiceBall => "Rice Ball",
            ItemType::Sushi => "Sushi",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Sushi Preparation
// =============================================================================

/// How a sushi roll is finished. Drives the sushi price tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Preparation {
    /// Sauced in the kitchen (standard tier).
    #[default]
    Prepared,
    /// No sauce at all (lower tier).
    Dry,
    /// Sauces served in a cup next to the roll (lower tier).
    SauceOnTheSide,
}

impl Preparation {
    /// Interprets a free-form preparation qualifier.
    ///
    /// Matching is case-insensitive and by substring, so "Dry, no sesame"
    /// still counts as dry. Anything unrecognised is `Prepared`.
    ///
    /// ## Example
    /// ```rust
    /// use comanda_core::types::Preparation;
    ///
    /// assert_eq!(Preparation::from_qualifier("Dry"), Preparation::Dry);
    /// assert_eq!(Preparation::from_qualifier("sauce on the side"), Preparation::SauceOnTheSide);
    /// assert_eq!(Preparation::from_qualifier("house style"), Preparation::Prepared);
    /// ```
    pub fn from_qualifier(qualifier: &str) -> Self {
        let q = qualifier.trim().to_lowercase();
        if q.contains("dry") {
            Preparation::Dry
        } else if q.contains("on the side") || q.contains("aside") || q.contains("on side") {
            Preparation::SauceOnTheSide
        } else {
            Preparation::Prepared
        }
    }

    /// Whether this preparation is priced at the lower sushi tier.
    pub const fn is_reduced_tier(&self) -> bool {
        matches!(self, Preparation::Dry | Preparation::SauceOnTheSide)
    }
}

// =============================================================================
// Raw Customization Request
// =============================================================================

/// A customization form exactly as submitted by the calling layer.
///
/// Every field is optional; which ones matter depends on the item type the
/// request is validated against. Unused fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemRequest {
    /// Beverage name (beverages only).
    pub beverage: Option<String>,
    /// Selected sauces (boneless, sauce add-on).
    pub sauces: Vec<String>,
    /// Side dish (boneless only).
    pub accompaniment: Option<String>,
    /// Base selections (rolls).
    pub base: Vec<String>,
    /// Ingredient selections, possibly including the exception ingredient (rolls).
    pub ingredients: Vec<String>,
    /// Cold or breaded (rolls).
    pub style: Option<String>,
    /// Single sauce (rolls).
    pub sauce: Option<String>,
    /// Preparation qualifier (sushi only).
    pub preparation: Option<String>,
    /// Toppings (rolls).
    pub toppings: Vec<String>,
    /// Free-text kitchen notes.
    pub notes: Option<String>,
}

// =============================================================================
// Validated Attributes
// =============================================================================

/// Validated customization of a rice ball or sushi roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RollAttributes {
    pub base: Vec<String>,
    /// Regular ingredients, in submission order.
    pub ingredients: Vec<String>,
    /// Whether the one exception slot is taken.
    pub exception_ingredient: bool,
    pub style: String,
    pub sauce: String,
    /// Sushi only.
    pub preparation: Option<String>,
    pub toppings: Vec<String>,
    pub notes: Option<String>,
}

impl RollAttributes {
    /// Preparation tier for pricing. Rolls without a qualifier are `Prepared`.
    pub fn preparation_tier(&self) -> Preparation {
        self.preparation
            .as_deref()
            .map(Preparation::from_qualifier)
            .unwrap_or_default()
    }
}

/// A customization that passed its item type's construction rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemAttributes {
    Beverage {
        beverage: String,
        notes: Option<String>,
    },
    Boneless {
        sauces: Vec<String>,
        accompaniment: Option<String>,
        notes: Option<String>,
    },
    SauceAddOn {
        sauces: Vec<String>,
        notes: Option<String>,
    },
    RiceBall(RollAttributes),
    Sushi(RollAttributes),
}

impl ItemAttributes {
    /// The item type these attributes belong to.
    pub const fn item_type(&self) -> ItemType {
        match self {
            ItemAttributes::Beverage { .. } => ItemType::Beverage,
            ItemAttributes::Boneless { .. } => ItemType::Boneless,
            ItemAttributes::SauceAddOn { .. } => ItemType::SauceAddOn,
            ItemAttributes::RiceBall(_) => ItemType::RiceBall,
            ItemAttributes::Sushi(_) => ItemType::Sushi,
        }
    }

    /// Kitchen notes, if any.
    pub fn notes(&self) -> Option<&str> {
        match self {
            ItemAttributes::Beverage { notes, .. }
            | ItemAttributes::Boneless { notes, .. }
            | ItemAttributes::SauceAddOn { notes, .. } => notes.as_deref(),
            ItemAttributes::RiceBall(roll) | ItemAttributes::Sushi(roll) => roll.notes.as_deref(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
