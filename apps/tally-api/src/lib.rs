//! # Tally API
//!
//! HTTP request layer over the checkout service.
//!
//! ## Endpoints
//! ```text
//! ┌────────┬──────────────────┬──────────────────────────────────────────┐
//! │ Method │ Path             │ Returns                                  │
//! ├────────┼──────────────────┼──────────────────────────────────────────┤
//! │ GET    │ /ping            │ "pong"                                   │
//! │ POST   │ /checkout        │ receipt: order_id, items, total          │
//! │ GET    │ /products        │ catalog                                  │
//! │ GET    │ /products/{id}   │ one product                              │
//! │ GET    │ /promotions      │ all promotions                           │
//! │ GET    │ /orders/{id}     │ order header and its lines               │
//! └────────┴──────────────────┴──────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::{ApiConfig, ConfigError};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use routes::router;
pub use state::AppState;
