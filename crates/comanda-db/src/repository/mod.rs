//! # Repository Module
//!
//! Database repository implementations for Comanda.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Calling layer                                                          │
//! │       │                                                                 │
//! │       │  db.promotions().load_book()                                   │
//! │       ▼                                                                 │
//! │  PromotionRepository                                                   │
//! │  ├── find_active(&self, code)                                          │
//! │  ├── list_active(&self)                                                │
//! │  ├── upsert(&self, promotion)                                          │
//! │  └── seed_defaults(&self)                                              │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`promotion::PromotionRepository`] - Promotion codes

pub mod promotion;
