//! # Error Types
//!
//! Domain-specific error types for comanda-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  comanda-core errors (this file)                                       │
//! │  ├── ValidationError     - One broken construction rule                │
//! │  ├── ValidationErrors    - Every rule a submission broke               │
//! │  ├── CartError           - Line addressing / re-edit failures          │
//! │  └── PromotionRejection  - Why a coupon did not apply                  │
//! │                                                                         │
//! │  comanda-db errors (separate crate)                                    │
//! │  └── DbError             - Promotion store failures                    │
//! │                                                                         │
//! │  Every error here is returned as a value alongside an untouched cart.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (ceiling, index, minimum)
//! 3. Errors are enum variants, never String

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use crate::money::Money;
use crate::types::ItemType;

// =============================================================================
// Validation Error
// =============================================================================

/// A single construction rule a customization broke.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum ValidationError {
    /// More regular ingredients than the item's ceiling.
    #[error("at most {max} regular ingredients are allowed, got {found}")]
    TooManyRegularIngredients { max: usize, found: usize },

    /// A roll needs at least one regular ingredient.
    #[error("select at least 1 ingredient")]
    NoRegularIngredients,

    /// The exception ingredient only fits once the regular slots are full.
    ///
    /// ## User Workflow
    /// ```text
    /// Sushi: salmon, avocado + Oyster
    ///      │
    ///      ▼
    /// regular = 2 < ceiling 3
    ///      │
    ///      ▼
    /// ExceptionIngredientNotYetEligible { required: 3 }
    ///      │
    ///      ▼
    /// UI shows: "Oyster can only be added once you have 3 regular ingredients"
    /// ```
    #[error("{ingredient} can only be added once you have {required} regular ingredients")]
    ExceptionIngredientNotYetEligible { ingredient: String, required: usize },

    /// The exception ingredient was selected more than once.
    #[error("only one {ingredient} is allowed")]
    ExceptionIngredientDuplicate { ingredient: String },

    /// A selection the item type cannot be made without.
    #[error("{field} is required")]
    MissingRequiredSelection { field: String },

    /// Kitchen notes over the length limit.
    #[error("notes must be at most {max} characters")]
    NotesTooLong { max: usize },

    /// A required free-text field is missing or blank.
    #[error("{field} is required")]
    Required { field: String },

    /// A free-text field is over its length limit.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },
}

impl ValidationError {
    /// Creates a MissingRequiredSelection error for a field.
    pub fn missing(field: impl Into<String>) -> Self {
        ValidationError::MissingRequiredSelection {
            field: field.into(),
        }
    }
}

/// Every rule one submission broke, in the order they were checked.
///
/// Never empty when returned as an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    /// The individual violations.
    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    /// Whether a given violation is among them.
    pub fn contains(&self, error: &ValidationError) -> bool {
        self.0.contains(error)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl From<ValidationError> for ValidationErrors {
    fn from(err: ValidationError) -> Self {
        ValidationErrors(vec![err])
    }
}

// =============================================================================
// Cart Error
// =============================================================================

/// Cart mutation failures. The cart is unchanged whenever one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// No line at the given index.
    #[error("cart line {index} not found (cart has {len} lines)")]
    LineNotFound { index: usize, len: usize },

    /// A re-edit targeted a line of a different item type.
    #[error("line {index} is a {existing}, cannot be edited as a {requested}")]
    ItemTypeMismatch {
        index: usize,
        existing: ItemType,
        requested: ItemType,
    },

    /// The resubmitted customization broke its construction rules.
    #[error("invalid customization: {0}")]
    Invalid(#[from] ValidationErrors),
}

// =============================================================================
// Promotion Rejection
// =============================================================================

/// Why a promotion code did not apply.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum PromotionRejection {
    /// No active promotion under that code (or the lookup failed).
    #[error("invalid or expired promotion code: {code}")]
    InvalidOrExpiredCode { code: String },

    /// Cart total below the promotion's minimum purchase.
    #[error("a minimum purchase of {required} is required for this promotion")]
    MinimumPurchaseNotMet { required: Money },

    /// Not enough units of the target item type for a free-unit promotion.
    #[error("at least {required} {item_type} items are needed for this promotion")]
    InsufficientQuantityForPromotion { required: u32, item_type: ItemType },
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::TooManyRegularIngredients { max: 6, found: 7 };
        assert_eq!(err.to_string(), "at most 6 regular ingredients are allowed, got 7");

        let err = ValidationError::missing("sauce");
        assert_eq!(err.to_string(), "sauce is required");
    }

    #[test]
    fn test_validation_errors_join() {
        let errs = ValidationErrors(vec![
            ValidationError::missing("style"),
            ValidationError::NotesTooLong { max: 200 },
        ]);
        assert_eq!(errs.len(), 2);
        assert_eq!(
            errs.to_string(),
            "style is required; notes must be at most 200 characters"
        );
    }

    #[test]
    fn test_validation_converts_to_cart_error() {
        let errs: ValidationErrors = ValidationError::NoRegularIngredients.into();
        let cart_err: CartError = errs.into();
        assert!(matches!(cart_err, CartError::Invalid(_)));
    }

    #[test]
    fn test_rejection_messages() {
        let err = PromotionRejection::MinimumPurchaseNotMet {
            required: Money::from_cents(10000),
        };
        assert_eq!(
            err.to_string(),
            "a minimum purchase of $100.00 is required for this promotion"
        );

        let err = PromotionRejection::InsufficientQuantityForPromotion {
            required: 4,
            item_type: ItemType::Sushi,
        };
        assert_eq!(err.to_string(), "at least 4 Sushi items are needed for this promotion");
    }
}
