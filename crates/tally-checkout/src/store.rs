//! # Store Capabilities
//!
//! The three persistence contracts the checkout consumes.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  OrderStore            owns the transaction type `Tx`                   │
//! │  ├── begin()                          → Tx                              │
//! │  ├── create_order(&mut Tx, header)    → order_id                        │
//! │  ├── create_order_lines(&mut Tx, ..)                                    │
//! │  ├── finalize_total(&mut Tx, id, total)                                 │
//! │  └── commit(Tx) / rollback(Tx)        (consume the handle)              │
//! │                                                                         │
//! │  ProductStore<Tx>                                                       │
//! │  ├── get_by_id(&mut Tx, id)           → Option<Product>                 │
//! │  ├── decrement_qty(&mut Tx, id, qty)  (conditional)                     │
//! │  └── list_all()                                                         │
//! │                                                                         │
//! │  PromotionStore<Tx>                                                     │
//! │  ├── get_by_product_id(&mut Tx, id)   → Option<Promotion>               │
//! │  └── list_all()                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Lookups take the transaction so a checkout reads what it has already
//! reserved. `commit` and `rollback` take `Tx` by value: once released, a
//! handle cannot be used again.

use async_trait::async_trait;
use thiserror::Error;

use tally_core::{LineItemRecord, Money, NewOrder, Product, Promotion};

/// What a store reports back to the orchestrator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The referenced row does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A conditional stock decrement found fewer units than requested.
    #[error("stock exhausted for product {product_id}")]
    StockExhausted { product_id: i64 },

    /// Any other failure of the backing store.
    #[error("store failure: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        StoreError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn backend(message: impl Into<String>) -> Self {
        StoreError::Backend(message.into())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Order headers, order lines and the transaction lifecycle.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Transaction handle threaded through every call of one checkout.
    type Tx: Send;

    async fn begin(&self) -> StoreResult<Self::Tx>;

    /// Inserts the header and returns the new order id.
    async fn create_order(&self, tx: &mut Self::Tx, order: &NewOrder) -> StoreResult<i64>;

    /// Persists all lines in one batch.
    async fn create_order_lines(&self, tx: &mut Self::Tx, lines: &[LineItemRecord])
        -> StoreResult<()>;

    /// Writes the final total to the header.
    async fn finalize_total(&self, tx: &mut Self::Tx, order_id: i64, total: Money)
        -> StoreResult<()>;

    async fn commit(&self, tx: Self::Tx) -> StoreResult<()>;

    async fn rollback(&self, tx: Self::Tx) -> StoreResult<()>;
}

/// Catalog reads and stock reservation.
#[async_trait]
pub trait ProductStore<Tx: Send>: Send + Sync {
    /// `Ok(None)` when no product has this id.
    async fn get_by_id(&self, tx: &mut Tx, product_id: i64) -> StoreResult<Option<Product>>;

    /// Whole catalog, outside any checkout.
    async fn list_all(&self) -> StoreResult<Vec<Product>>;

    /// Takes `qty` units, or fails with [`StoreError::StockExhausted`]
    /// without writing anything.
    async fn decrement_qty(&self, tx: &mut Tx, product_id: i64, qty: i64) -> StoreResult<()>;
}

/// Promotion reads. `Ok(None)` is the "no promotion" answer, not an error.
#[async_trait]
pub trait PromotionStore<Tx: Send>: Send + Sync {
    async fn get_by_product_id(&self, tx: &mut Tx, product_id: i64)
        -> StoreResult<Option<Promotion>>;

    async fn list_all(&self) -> StoreResult<Vec<Promotion>>;
}
