//! # SQLite Adapters
//!
//! Binds the store traits to the tally-db repositories. The transaction
//! type is [`DbTransaction`]; dropping one without commit rolls it back.

use async_trait::async_trait;

use crate::service::CheckoutService;
use crate::store::{OrderStore, ProductStore, PromotionStore, StoreError, StoreResult};
use tally_core::{LineItemRecord, Money, NewOrder, Product, Promotion};
use tally_db::{
    Database, DbError, DbTransaction, OrderRepository, ProductRepository, PromotionRepository,
};

/// Checkout service wired to SQLite.
pub type SqliteCheckout = CheckoutService<SqliteOrders, SqliteProducts, SqlitePromotions>;

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => StoreError::NotFound { entity, id },
            DbError::StockExhausted { product_id } => StoreError::StockExhausted { product_id },
            other => StoreError::Backend(other.to_string()),
        }
    }
}

impl CheckoutService<SqliteOrders, SqliteProducts, SqlitePromotions> {
    /// Builds a checkout service over `db`.
    pub fn sqlite(db: &Database) -> Self {
        CheckoutService::new(
            SqliteOrders(db.orders()),
            SqliteProducts(db.products()),
            SqlitePromotions(db.promotions()),
        )
    }
}

// =============================================================================
// Orders
// =============================================================================

#[derive(Debug, Clone)]
pub struct SqliteOrders(pub OrderRepository);

#[async_trait]
impl OrderStore for SqliteOrders {
    type Tx = DbTransaction;

    async fn begin(&self) -> StoreResult<DbTransaction> {
        Ok(self.0.begin().await?)
    }

    async fn create_order(&self, tx: &mut DbTransaction, order: &NewOrder) -> StoreResult<i64> {
        Ok(self.0.create_order(tx, order).await?)
    }

    async fn create_order_lines(
        &self,
        tx: &mut DbTransaction,
        lines: &[LineItemRecord],
    ) -> StoreResult<()> {
        let written = self.0.create_order_lines(tx, lines).await?;
        if written != lines.len() as u64 {
            return Err(StoreError::backend(format!(
                "wrote {} of {} order lines",
                written,
                lines.len()
            )));
        }
        Ok(())
    }

    async fn finalize_total(
        &self,
        tx: &mut DbTransaction,
        order_id: i64,
        total: Money,
    ) -> StoreResult<()> {
        Ok(self.0.finalize_total(tx, order_id, total.cents()).await?)
    }

    async fn commit(&self, tx: DbTransaction) -> StoreResult<()> {
        Ok(self.0.commit(tx).await?)
    }

    async fn rollback(&self, tx: DbTransaction) -> StoreResult<()> {
        Ok(self.0.rollback(tx).await?)
    }
}

// =============================================================================
// Products
// =============================================================================

#[derive(Debug, Clone)]
pub struct SqliteProducts(pub ProductRepository);

#[async_trait]
impl ProductStore<DbTransaction> for SqliteProducts {
    async fn get_by_id(
        &self,
        tx: &mut DbTransaction,
        product_id: i64,
    ) -> StoreResult<Option<Product>> {
        Ok(self.0.get_by_id_in(tx, product_id).await?)
    }

    async fn list_all(&self) -> StoreResult<Vec<Product>> {
        Ok(self.0.list_all().await?)
    }

    async fn decrement_qty(
        &self,
        tx: &mut DbTransaction,
        product_id: i64,
        qty: i64,
    ) -> StoreResult<()> {
        Ok(self.0.decrement_qty(tx, product_id, qty).await?)
    }
}

// =============================================================================
// Promotions
// =============================================================================

#[derive(Debug, Clone)]
pub struct SqlitePromotions(pub PromotionRepository);

#[async_trait]
impl PromotionStore<DbTransaction> for SqlitePromotions {
    async fn get_by_product_id(
        &self,
        tx: &mut DbTransaction,
        product_id: i64,
    ) -> StoreResult<Option<Promotion>> {
        Ok(self.0.get_by_product_id_in(tx, product_id).await?)
    }

    async fn list_all(&self) -> StoreResult<Vec<Promotion>> {
        Ok(self.0.list_all().await?)
    }
}
