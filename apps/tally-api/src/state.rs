//! Shared application state.

use std::sync::Arc;
use std::time::Duration;

use tally_checkout::SqliteCheckout;
use tally_db::Database;

/// State handed to every handler.
#[derive(Debug)]
pub struct AppState {
    pub db: Database,
    pub checkout: SqliteCheckout,
}

impl AppState {
    /// Wires the checkout service to `db`, bounded by `checkout_timeout`.
    pub fn new(db: Database, checkout_timeout: Option<Duration>) -> Arc<Self> {
        let mut checkout = SqliteCheckout::sqlite(&db);
        if let Some(limit) = checkout_timeout {
            checkout = checkout.with_timeout(limit);
        }
        Arc::new(AppState { db, checkout })
    }
}
