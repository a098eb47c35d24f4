//! # Checkout Errors
//!
//! One variant per way a checkout can fail. Every variant means the same
//! thing to the caller: nothing was committed.
//!
//! ```text
//! ┌───────────────────────────┬──────────────────────────────┬─────────────┐
//! │ Variant                   │ Raised when                  │ Client's?   │
//! ├───────────────────────────┼──────────────────────────────┼─────────────┤
//! │ InvalidRequest            │ before any store call        │ yes         │
//! │ TransactionStart          │ begin()                      │ no          │
//! │ OrderCreation             │ header insert                │ no          │
//! │ PromotionLookup           │ per line                     │ no          │
//! │ ProductLookup             │ per line / free gift         │ no          │
//! │ ProductNotFound           │ per line                     │ yes         │
//! │ InsufficientStock         │ per line, before pricing     │ yes         │
//! │ InvalidPromotion          │ per line, qualifying only    │ no          │
//! │ AmountOverflow            │ per line pricing and total   │ no          │
//! │ StockReservation          │ per line decrement           │ no          │
//! │ LineBatchPersist          │ after all lines              │ no          │
//! │ OrderTotal                │ after the batch              │ no          │
//! │ Commit                    │ commit()                     │ no          │
//! │ TimedOut                  │ deadline elapsed             │ no          │
//! └───────────────────────────┴──────────────────────────────┴─────────────┘
//! ```

use std::time::Duration;
use thiserror::Error;

use crate::store::StoreError;
use tally_core::{CoreError, ValidationError};

/// The wrapped store or core error is exposed through `source()`, not
/// repeated in the message.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error(transparent)]
    InvalidRequest(#[from] ValidationError),

    #[error("Could not start the checkout transaction")]
    TransactionStart(#[source] StoreError),

    #[error("Could not create the order")]
    OrderCreation(#[source] StoreError),

    #[error("Promotion lookup failed for product {product_id}")]
    PromotionLookup {
        product_id: i64,
        #[source]
        source: StoreError,
    },

    #[error("Product lookup failed for product {product_id}")]
    ProductLookup {
        product_id: i64,
        #[source]
        source: StoreError,
    },

    #[error("Product {product_id} does not exist")]
    ProductNotFound { product_id: i64 },

    /// Requested quantity exceeds what is left. `available` is `None` when
    /// another checkout took the stock between the read and the reservation.
    #[error(
        "The product {name} qty is not enough to fulfill the request: {}",
        stock_shortfall(.available, .requested)
    )]
    InsufficientStock {
        product_id: i64,
        name: String,
        available: Option<i64>,
        requested: i64,
    },

    #[error(transparent)]
    InvalidPromotion(CoreError),

    /// The line price or the order total left the cent range.
    #[error("Amount out of range while pricing product {product_id}")]
    AmountOverflow {
        product_id: i64,
        #[source]
        source: CoreError,
    },

    #[error("Could not reserve stock for product {product_id}")]
    StockReservation {
        product_id: i64,
        #[source]
        source: StoreError,
    },

    #[error("Could not persist the order lines")]
    LineBatchPersist(#[source] StoreError),

    #[error("Could not record the order total")]
    OrderTotal(#[source] StoreError),

    #[error("Could not commit the checkout")]
    Commit(#[source] StoreError),

    #[error("Checkout did not finish within {after:?}")]
    TimedOut { after: Duration },
}

fn stock_shortfall(available: &Option<i64>, requested: &i64) -> String {
    match available {
        Some(available) => format!("{available} available, {requested} requested"),
        None => format!("{requested} requested, stock was taken by a concurrent order"),
    }
}

impl CheckoutError {
    /// True for failures caused by the request rather than the system.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            CheckoutError::InvalidRequest(_)
                | CheckoutError::ProductNotFound { .. }
                | CheckoutError::InsufficientStock { .. }
        )
    }

    /// Short stable name, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            CheckoutError::InvalidRequest(_) => "invalid_request",
            CheckoutError::TransactionStart(_) => "transaction_start",
            CheckoutError::OrderCreation(_) => "order_creation",
            CheckoutError::PromotionLookup { .. } => "promotion_lookup",
            CheckoutError::ProductLookup { .. } => "product_lookup",
            CheckoutError::ProductNotFound { .. } => "product_not_found",
            CheckoutError::InsufficientStock { .. } => "insufficient_stock",
            CheckoutError::InvalidPromotion(_) => "invalid_promotion",
            CheckoutError::AmountOverflow { .. } => "amount_overflow",
            CheckoutError::StockReservation { .. } => "stock_reservation",
            CheckoutError::LineBatchPersist(_) => "line_batch_persist",
            CheckoutError::OrderTotal(_) => "order_total",
            CheckoutError::Commit(_) => "commit",
            CheckoutError::TimedOut { .. } => "timed_out",
        }
    }
}

pub type CheckoutResult<T> = Result<T, CheckoutError>;
