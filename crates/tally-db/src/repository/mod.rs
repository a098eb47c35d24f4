//! # Repository Module
//!
//! Database repository implementations for Tally.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  HTTP handler / checkout adapter                                       │
//! │       │                                                                 │
//! │       │  db.products().get_by_id(3)                                    │
//! │       │  db.products().decrement_qty(&mut tx, 3, 2)                    │
//! │       ▼                                                                 │
//! │  ProductRepository / PromotionRepository / OrderRepository            │
//! │       │                                                                 │
//! │       │  SQL Query (pool, or the caller's transaction)                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Methods ending in `_in` and the checkout writes take `&mut DbTransaction`, so a
//! checkout reads and writes through one connection.
//!
//! ## Available Repositories
//!
//! - [`order::OrderRepository`] - Order headers, lines, transaction control
//! - [`product::ProductRepository`] - Product lookups and stock
//! - [`promotion::PromotionRepository`] - Promotion lookups

pub mod order;
pub mod product;
pub mod promotion;
