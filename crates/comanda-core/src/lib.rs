//! # comanda-core: Pure Order Engine for Comanda
//!
//! This crate is the **heart** of Comanda. It turns customization forms into
//! priced order lines, applies promotion codes and totals the ticket, with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Comanda Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │          Calling Layer (web handlers, session store)            │   │
//! │  │    Menu form ──► Cart view ──► Coupon box ──► Place order      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ Cart value in, Cart value out          │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ comanda-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │validation │─►│  catalog  │─►│   cart    │◄─│promotions │  │   │
//! │  │   │ItemRequest│  │PriceQuote │  │ CartItem  │  │ Promotion │  │   │
//! │  │   └───────────┘  └───────────┘  └─────┬─────┘  └─────┬─────┘  │   │
//! │  │                                       ▼              │        │   │
//! │  │                                 ┌───────────┐        │        │   │
//! │  │                                 │  totals   │        │        │   │
//! │  │                                 └───────────┘        │        │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • NO SESSIONS    │        │   │
//! │  └──────────────────────────────────────────────────────┼────────┘   │
//! │                                      PromotionLookup    │             │
//! │  ┌──────────────────────────────────────────────────────▼────────┐   │
//! │  │                  comanda-db (Promotion Store)                 │   │
//! │  │              SQLite table, migrations, seed data              │   │
//! │  └───────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Item types, raw requests and validated attributes
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`catalog`] - Menu prices
//! - [`validation`] - Per-item construction rules
//! - [`cart`] - Cart and its lines
//! - [`promotions`] - Promotion codes and how they rewrite a cart
//! - [`totals`] - Order totals
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: pricing, validation and promotions are deterministic
//! 2. **No I/O**: the promotion store is reached only through a trait
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use comanda_core::{apply_promotion, Cart, ItemRequest, ItemType, PriceCatalog, PromotionBook};
//!
//! let menu = PriceCatalog::default();
//! let promotions = PromotionBook::with_defaults();
//! let mut cart = Cart::new();
//!
//! let sushi = ItemRequest {
//!     ingredients: vec!["Salmon".into(), "Tuna".into(), "Crab".into()],
//!     style: Some("Cold".into()),
//!     preparation: Some("Prepared".into()),
//!     ..Default::default()
//! };
//! let line = cart.add_request(ItemType::Sushi, &sushi, &menu).unwrap();
//! cart.set_quantity(line, 4).unwrap();
//! assert_eq!(cart.total().cents(), 46000);
//!
//! // 4-for-3: one roll is free
//! apply_promotion(&mut cart, " sushi4x3 ", &promotions).unwrap();
//! assert_eq!(cart.total().cents(), 34500);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod error;
pub mod money;
pub mod promotions;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use comanda_core::Money` instead of
// `use comanda_core::money::Money`

pub use cart::{Cart, CartItem};
pub use catalog::{PriceCatalog, PriceComponent, PriceQuote};
pub use error::{CartError, PromotionRejection, ValidationError, ValidationErrors};
pub use money::Money;
pub use promotions::{
    apply_promotion, default_promotions, DiscountMethod, Promotion, PromotionBook, PromotionKind,
    PromotionLookup, PromotionRule,
};
pub use totals::CartTotals;
pub use types::*;
pub use validation::validate;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Regular-ingredient ceiling for a rice ball.
pub const RICE_BALL_MAX_REGULAR: usize = 6;

/// Regular-ingredient ceiling for a sushi roll.
pub const SUSHI_MAX_REGULAR: usize = 3;

/// Maximum length of free-text kitchen notes, in characters.
///
/// ## Business Reason
/// Notes are printed on the kitchen ticket, which has limited width.
pub const MAX_NOTES_LEN: usize = 200;

/// Maximum length of the customer name printed on the ticket.
pub const MAX_CUSTOMER_NAME_LEN: usize = 50;

/// A percentage promotion never takes off more than 100%.
pub const MAX_DISCOUNT_BPS: u32 = 10_000;
