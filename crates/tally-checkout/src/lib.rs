//! # tally-checkout: Transactional Checkout
//!
//! Turns a list of `(product_id, qty)` requests into one committed order
//! and a [`Receipt`](tally_core::Receipt), or into nothing at all.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Tally Architecture                             │
//! │                                                                         │
//! │   apps/tally-api ── POST /checkout ──┐                                  │
//! │                                      ▼                                  │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               ★ tally-checkout (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   service.rs   CheckoutService<O, P, R>                         │   │
//! │  │   store.rs     OrderStore / ProductStore / PromotionStore       │   │
//! │  │   sqlite.rs    SqliteOrders / SqliteProducts / SqlitePromotions │   │
//! │  │   error.rs     CheckoutError                                    │   │
//! │  └───────────────┬───────────────────────────────┬─────────────────┘   │
//! │                  ▼                               ▼                      │
//! │        tally-core (pricing)            tally-db (SQLite)                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Guarantees
//!
//! - All writes of a checkout share one transaction.
//! - Any failure (including the deadline) rolls that transaction back.
//! - A line's stock is decremented only after the check against the
//!   transaction's own view, so a product requested on two lines cannot
//!   oversell.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod service;
pub mod sqlite;
pub mod store;

#[cfg(test)]
mod fake;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{CheckoutError, CheckoutResult};
pub use service::CheckoutService;
pub use sqlite::{SqliteCheckout, SqliteOrders, SqliteProducts, SqlitePromotions};
pub use store::{OrderStore, ProductStore, PromotionStore, StoreError, StoreResult};
