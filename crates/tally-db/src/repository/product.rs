//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - Lookups, through the pool or inside an open checkout transaction
//! - Conditional stock decrement
//! - Catalog inserts (seeding, tests)
//!
//! ## Stock Decrement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  UPDATE products SET qty = qty - 3                                      │
//! │  WHERE product_id = 2 AND qty >= 3                                      │
//! │                                                                         │
//! │  1 row  → reserved                                                      │
//! │  0 rows → product missing (NotFound) or short (StockExhausted)         │
//! │                                                                         │
//! │  The check and the write are one statement, so a concurrent checkout   │
//! │  can never drive qty below zero.                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::pool::DbTransaction;
use tally_core::validation::validate_new_product;
use tally_core::{NewProduct, Product};

const SELECT_PRODUCT: &str = r#"
    SELECT product_id, sku, name, price_cents, qty
    FROM products
    WHERE product_id = ?1
"#;

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// // Catalog read
/// let product = repo.get_by_id(3).await?;
///
/// // Inside a checkout
/// let product = repo.get_by_id_in(&mut tx, 3).await?;
/// repo.decrement_qty(&mut tx, 3, 2).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, product_id: i64) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(SELECT_PRODUCT)
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Gets a product inside `tx`, seeing the transaction's own decrements.
    pub async fn get_by_id_in(
        &self,
        tx: &mut DbTransaction,
        product_id: i64,
    ) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(SELECT_PRODUCT)
            .bind(product_id)
            .fetch_optional(&mut **tx)
            .await?;

        Ok(product)
    }

    /// Lists the whole catalog ordered by id.
    pub async fn list_all(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT product_id, sku, name, price_cents, qty
            FROM products
            ORDER BY product_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Reserves `qty` units of a product inside `tx`.
    ///
    /// ## Returns
    /// * `Ok(())` - Units reserved
    /// * `Err(DbError::StockExhausted)` - Fewer than `qty` units left
    /// * `Err(DbError::NotFound)` - No such product
    pub async fn decrement_qty(
        &self,
        tx: &mut DbTransaction,
        product_id: i64,
        qty: i64,
    ) -> DbResult<()> {
        debug!(product_id, qty, "Decrementing stock");

        let result = sqlx::query(
            r#"
            UPDATE products
            SET qty = qty - ?1
            WHERE product_id = ?2 AND qty >= ?1
            "#,
        )
        .bind(qty)
        .bind(product_id)
        .execute(&mut **tx)
        .await?;

        if result.rows_affected() == 0 {
            let exists: Option<i64> =
                sqlx::query_scalar("SELECT product_id FROM products WHERE product_id = ?1")
                    .bind(product_id)
                    .fetch_optional(&mut **tx)
                    .await?;

            return Err(match exists {
                Some(_) => DbError::StockExhausted { product_id },
                None => DbError::not_found("Product", product_id),
            });
        }

        Ok(())
    }

    /// Inserts a new product and returns it with its assigned id.
    ///
    /// ## Returns
    /// * `Err(DbError::Invalid)` - Fails catalog validation
    /// * `Err(DbError::UniqueViolation)` - SKU already exists
    pub async fn insert(&self, product: &NewProduct) -> DbResult<Product> {
        validate_new_product(product)?;
        debug!(sku = %product.sku, "Inserting product");

        let inserted = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (sku, name, price_cents, qty)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING product_id, sku, name, price_cents, qty
            "#,
        )
        .bind(&product.sku)
        .bind(&product.name)
        .bind(product.price_cents)
        .bind(product.qty)
        .fetch_one(&self.pool)
        .await?;

        Ok(inserted)
    }

    /// Sets a product's stock level (restocking, tests).
    pub async fn set_qty(&self, product_id: i64, qty: i64) -> DbResult<()> {
        let result = sqlx::query("UPDATE products SET qty = ?1 WHERE product_id = ?2")
            .bind(qty)
            .bind(product_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", product_id));
        }

        Ok(())
    }

    /// Counts products in the catalog.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Sums the stock of every product.
    pub async fn total_stock(&self) -> DbResult<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COALESCE(SUM(qty), 0) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(total)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::Database;

    fn alexa() -> NewProduct {
        NewProduct {
            sku: "A304SD".to_string(),
            name: "Alexa Speaker".to_string(),
            price_cents: 10950,
            qty: 10,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.products();

        let inserted = repo.insert(&alexa()).await.unwrap();
        assert!(inserted.product_id > 0);

        let fetched = repo.get_by_id(inserted.product_id).await.unwrap().unwrap();
        assert_eq!(fetched, inserted);
        assert_eq!(fetched.price().cents(), 10950);

        assert!(repo.get_by_id(999).await.unwrap().is_none());
        assert_eq!(repo.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_repeated_reads_agree() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.products();
        let id = repo.insert(&alexa()).await.unwrap().product_id;

        let first = repo.get_by_id(id).await.unwrap();
        let second = repo.get_by_id(id).await.unwrap();
        assert_eq!(first, second);

        let mut tx = db.begin().await.unwrap();
        let in_tx = repo.get_by_id_in(&mut tx, id).await.unwrap();
        assert_eq!(in_tx, first);
        tx.rollback().await.unwrap();
    }

    #[tokio::test]
    async fn test_duplicate_sku_is_rejected() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.products();

        repo.insert(&alexa()).await.unwrap();
        let err = repo.insert(&alexa()).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_invalid_product_never_reaches_sqlite() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.products();

        let negative = NewProduct {
            qty: -3,
            ..alexa()
        };
        let err = repo.insert(&negative).await.unwrap_err();
        assert!(matches!(err, DbError::Invalid(_)));
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_decrement_is_conditional() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.products();
        let product = repo.insert(&alexa()).await.unwrap();
        let id = product.product_id;

        let mut tx = db.begin().await.unwrap();
        repo.decrement_qty(&mut tx, id, 4).await.unwrap();

        // the transaction sees its own reservation
        let seen = repo.get_by_id_in(&mut tx, id).await.unwrap().unwrap();
        assert_eq!(seen.qty, 6);

        let err = repo.decrement_qty(&mut tx, id, 7).await.unwrap_err();
        assert!(matches!(err, DbError::StockExhausted { product_id } if product_id == id));

        let err = repo.decrement_qty(&mut tx, 999, 1).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        tx.commit().await.unwrap();
        assert_eq!(repo.get_by_id(id).await.unwrap().unwrap().qty, 6);
    }

    #[tokio::test]
    async fn test_dropped_transaction_restores_stock() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.products();
        let id = repo.insert(&alexa()).await.unwrap().product_id;

        {
            let mut tx = db.begin().await.unwrap();
            repo.decrement_qty(&mut tx, id, 10).await.unwrap();
        }

        assert_eq!(repo.get_by_id(id).await.unwrap().unwrap().qty, 10);
        assert_eq!(repo.total_stock().await.unwrap(), 10);
    }

    #[tokio::test]
    async fn test_set_qty() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.products();
        let id = repo.insert(&alexa()).await.unwrap().product_id;

        repo.set_qty(id, 2).await.unwrap();
        assert_eq!(repo.get_by_id(id).await.unwrap().unwrap().qty, 2);
        assert!(repo.set_qty(999, 1).await.is_err());
    }
}
