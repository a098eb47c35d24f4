//! # tally-core: Pure Business Logic for Tally
//!
//! This crate is the **heart** of Tally. It contains the checkout domain
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Tally Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    HTTP API (apps/tally-api)                    │   │
//! │  │    POST /checkout ──► [LineItemRequest] ──► Receipt JSON        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 tally-checkout (orchestrator)                   │   │
//! │  │    begin tx ─► order ─► per line: price + reserve ─► commit     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tally-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ promotion │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │   Rule    │  │   rules   │  │   │
//! │  │   │  Receipt  │  │ discounts │  │ PricedLine│  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Promotion, LineItemRecord, Receipt, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`promotion`] - The promotion engine (per-line pricing rules)
//! - [`error`] - Domain error types
//! - [`validation`] - Checkout request validation
//!
//! ## Example Usage
//!
//! ```rust
//! use tally_core::money::Money;
//! use tally_core::promotion::{price_line, PromotionRule};
//!
//! let unit_price = Money::from_cents(10950); // 109.50
//! let priced = price_line(&PromotionRule::PercentageDiscount { percent: 10 }, unit_price, 3)?;
//!
//! assert_eq!(priced.price.cents(), 29565); // 3 × 109.50 − 10%
//! # Ok::<(), tally_core::CoreError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod promotion;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use promotion::{PricedLine, PromotionRule};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single checkout request.
///
/// ## Business Reason
/// Bounds the size of a single transaction (and of the batch line insert).
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Highest unit price the catalog accepts, in cents.
///
/// A full cart of maximum-quantity lines at this price still fits in `i64`.
pub const MAX_UNIT_PRICE_CENTS: i64 = i64::MAX / (MAX_ITEM_QUANTITY * MAX_CART_ITEMS as i64);
