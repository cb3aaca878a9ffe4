//! # Validation Module
//!
//! Construction rules for every item on the menu.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Flow                                    │
//! │                                                                         │
//! │  ItemRequest (raw form)                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate(item_type, request) ← THIS MODULE                             │
//! │       │                                                                 │
//! │       ├── required selections present?                                  │
//! │       ├── ingredient counts within the ceiling?                         │
//! │       ├── exception ingredient only in the overflow slot?               │
//! │       └── notes within the length limit?                                │
//! │       │                                                                 │
//! │       ├── any failure → Err(ValidationErrors) with EVERY violation      │
//! │       │                                                                 │
//! │       └── all pass → Ok(ItemAttributes) ready for the price catalog     │
//! │                                                                         │
//! │  Accept or reject atomically: no half-validated attributes escape.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use comanda_core::types::{ItemRequest, ItemType};
//! use comanda_core::validation::validate;
//!
//! let request = ItemRequest {
//!     beverage: Some("Sprite".to_string()),
//!     ..Default::default()
//! };
//! let attrs = validate(ItemType::Beverage, &request).unwrap();
//! assert_eq!(attrs.item_type(), ItemType::Beverage);
//! ```

use crate::catalog::EXCEPTION_INGREDIENT;
use crate::error::{ValidationError, ValidationErrors};
use crate::types::{ItemAttributes, ItemRequest, ItemType, RollAttributes};
use crate::{MAX_CUSTOMER_NAME_LEN, MAX_NOTES_LEN, RICE_BALL_MAX_REGULAR, SUSHI_MAX_REGULAR};

/// Result type for single-field validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Entry Point
// =============================================================================

/// Validates a raw customization against an item type's rules.
///
/// ## Returns
/// - `Ok(ItemAttributes)` when every rule passes
/// - `Err(ValidationErrors)` listing every rule that failed
pub fn validate(item_type: ItemType, request: &ItemRequest) -> Result<ItemAttributes, ValidationErrors> {
    match item_type {
        ItemType::Beverage => validate_beverage(request),
        ItemType::Boneless => validate_boneless(request),
        ItemType::SauceAddOn => validate_sauce_add_on(request),
        ItemType::RiceBall => validate_rice_ball(request),
        ItemType::Sushi => validate_sushi(request),
    }
}

/// Collects violations while a validator runs.
#[derive(Debug, Default)]
struct Violations(Vec<ValidationError>);

impl Violations {
    fn push(&mut self, err: ValidationError) {
        self.0.push(err);
    }

    fn finish<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.0.is_empty() {
            Ok(value)
        } else {
            Err(ValidationErrors(self.0))
        }
    }
}

// =============================================================================
// Per-Type Validators
// =============================================================================

/// Beverage: a beverage must be selected.
pub fn validate_beverage(request: &ItemRequest) -> Result<ItemAttributes, ValidationErrors> {
    let mut violations = Violations::default();

    let beverage = required_choice(request.beverage.as_deref(), "beverage", &mut violations);
    let notes = clean_notes(request.notes.as_deref(), &mut violations);

    violations.finish(ItemAttributes::Beverage {
        beverage: beverage.unwrap_or_default(),
        notes,
    })
}

/// Boneless: at least one sauce. Every sauce is covered by the base price.
pub fn validate_boneless(request: &ItemRequest) -> Result<ItemAttributes, ValidationErrors> {
    let mut violations = Violations::default();

    let sauces = clean_selections(&request.sauces);
    if sauces.is_empty() {
        violations.push(ValidationError::missing("sauces"));
    }
    let accompaniment = optional_choice(request.accompaniment.as_deref());
    let notes = clean_notes(request.notes.as_deref(), &mut violations);

    violations.finish(ItemAttributes::Boneless {
        sauces,
        accompaniment,
        notes,
    })
}

/// Extra sauces: at least one sauce, no ceiling.
pub fn validate_sauce_add_on(request: &ItemRequest) -> Result<ItemAttributes, ValidationErrors> {
    let mut violations = Violations::default();

    let sauces = clean_selections(&request.sauces);
    if sauces.is_empty() {
        violations.push(ValidationError::missing("sauces"));
    }
    let notes = clean_notes(request.notes.as_deref(), &mut violations);

    violations.finish(ItemAttributes::SauceAddOn { sauces, notes })
}

/// Rice ball: style and sauce required, up to 6 regular ingredients.
pub fn validate_rice_ball(request: &ItemRequest) -> Result<ItemAttributes, ValidationErrors> {
    let mut violations = Violations::default();

    let style = required_choice(request.style.as_deref(), "style", &mut violations);
    let sauce = required_choice(request.sauce.as_deref(), "sauce", &mut violations);
    let (ingredients, exception_ingredient) =
        check_roll_ingredients(&request.ingredients, RICE_BALL_MAX_REGULAR, &mut violations);
    let notes = clean_notes(request.notes.as_deref(), &mut violations);

    violations.finish(ItemAttributes::RiceBall(RollAttributes {
        base: clean_selections(&request.base),
        ingredients,
        exception_ingredient,
        style: style.unwrap_or_default(),
        sauce: sauce.unwrap_or_default(),
        preparation: None,
        toppings: clean_selections(&request.toppings),
        notes,
    }))
}

/// Sushi: style and preparation required, up to 3 regular ingredients.
///
/// Without an explicit sauce, the preparation is recorded as the sauce so the
/// kitchen ticket always says how the roll is finished.
pub fn validate_sushi(request: &ItemRequest) -> Result<ItemAttributes, ValidationErrors> {
    let mut violations = Violations::default();

    let style = required_choice(request.style.as_deref(), "style", &mut violations);
    let preparation = required_choice(request.preparation.as_deref(), "preparation", &mut violations);
    let (ingredients, exception_ingredient) =
        check_roll_ingredients(&request.ingredients, SUSHI_MAX_REGULAR, &mut violations);
    let notes = clean_notes(request.notes.as_deref(), &mut violations);

    let sauce = optional_choice(request.sauce.as_deref())
        .or_else(|| preparation.clone())
        .unwrap_or_default();

    violations.finish(ItemAttributes::Sushi(RollAttributes {
        base: clean_selections(&request.base),
        ingredients,
        exception_ingredient,
        style: style.unwrap_or_default(),
        sauce,
        preparation,
        toppings: clean_selections(&request.toppings),
        notes,
    }))
}

// =============================================================================
// Shared Rules
// =============================================================================

/// Applies the ingredient rules shared by rice balls and sushi.
///
/// ## Rules
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  ingredients ──► partition ──► regular[]     exception count            │
/// │                                                                         │
/// │  regular > ceiling               → TooManyRegularIngredients            │
/// │  regular == 0                    → NoRegularIngredients                 │
/// │  exception > 1                   → ExceptionIngredientDuplicate         │
/// │  exception ≥ 1, regular < ceiling → ExceptionIngredientNotYetEligible   │
/// │                                                                         │
/// │  The exception ingredient may only take the one slot past a full        │
/// │  ceiling: 6 + 1 for rice balls, 3 + 1 for sushi.                        │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
///
/// ## Returns
/// The regular ingredients and whether the exception slot is taken.
fn check_roll_ingredients(
    ingredients: &[String],
    ceiling: usize,
    violations: &mut Violations,
) -> (Vec<String>, bool) {
    let (exception, regular): (Vec<String>, Vec<String>) = clean_selections(ingredients)
        .into_iter()
        .partition(|i| is_exception_ingredient(i));

    if regular.len() > ceiling {
        violations.push(ValidationError::TooManyRegularIngredients {
            max: ceiling,
            found: regular.len(),
        });
    }
    if regular.is_empty() {
        violations.push(ValidationError::NoRegularIngredients);
    }
    if exception.len() > 1 {
        violations.push(ValidationError::ExceptionIngredientDuplicate {
            ingredient: EXCEPTION_INGREDIENT.to_string(),
        });
    }
    if !exception.is_empty() && regular.len() < ceiling {
        violations.push(ValidationError::ExceptionIngredientNotYetEligible {
            ingredient: EXCEPTION_INGREDIENT.to_string(),
            required: ceiling,
        });
    }

    (regular, !exception.is_empty())
}

/// Whether a selection names the exception ingredient (case-insensitive).
pub fn is_exception_ingredient(ingredient: &str) -> bool {
    ingredient.trim().eq_ignore_ascii_case(EXCEPTION_INGREDIENT)
}

/// Trims entries and drops blanks.
fn clean_selections(selections: &[String]) -> Vec<String> {
    selections
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn optional_choice(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn required_choice(value: Option<&str>, field: &str, violations: &mut Violations) -> Option<String> {
    let choice = optional_choice(value);
    if choice.is_none() {
        violations.push(ValidationError::missing(field));
    }
    choice
}

/// Trims notes; blank notes become `None`.
fn clean_notes(notes: Option<&str>, violations: &mut Violations) -> Option<String> {
    let notes = optional_choice(notes)?;
    if notes.chars().count() > MAX_NOTES_LEN {
        violations.push(ValidationError::NotesTooLong { max: MAX_NOTES_LEN });
    }
    Some(notes)
}

// =============================================================================
// Order Ticket Validators
// =============================================================================

/// Validates the customer name printed on the order ticket.
///
/// ## Rules
/// - Must not be blank
/// - At most 50 characters after trimming
///
/// ## Returns
/// The trimmed name.
///
/// ## Example
/// ```rust
/// use comanda_core::validation::validate_customer_name;
///
/// assert_eq!(validate_customer_name("  Ana ").unwrap(), "Ana");
/// assert!(validate_customer_name("").is_err());
/// ```
pub fn validate_customer_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "customer name".to_string(),
        });
    }

    if name.chars().count() > MAX_CUSTOMER_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "customer name".to_string(),
            max: MAX_CUSTOMER_NAME_LEN,
        });
    }

    Ok(name.to_string())
}

// =============================================================================
// Unit Tests
// =============================================================================
