//! # Order Repository
//!
//! Order headers and their priced lines.
//!
//! ## Checkout Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  begin()                       ── dedicated connection, BEGIN           │
//! │    create_order(tx, header)    ── INSERT orders (total 0) → order_id    │
//! │    ... per-line reads and stock decrements on the same tx ...          │
//! │    create_order_lines(tx, ..)  ── one multi-row INSERT                  │
//! │    finalize_total(tx, id, t)   ── UPDATE orders SET total_cents        │
//! │  commit(tx) | rollback(tx)                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The header INSERT is the first statement, so a checkout takes the SQLite
//! write lock before it reads any stock level.

use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::pool::DbTransaction;
use tally_core::{LineItemRecord, NewOrder, OrderHeader};

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    // =========================================================================
    // Transactional writes
    // =========================================================================

    /// Starts a checkout transaction.
    pub async fn begin(&self) -> DbResult<DbTransaction> {
        self.pool.begin().await.map_err(DbError::transaction)
    }

    /// Inserts an order header and returns its id.
    pub async fn create_order(&self, tx: &mut DbTransaction, order: &NewOrder) -> DbResult<i64> {
        let order_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO orders (reference, created_at, total_cents)
            VALUES (?1, ?2, ?3)
            RETURNING order_id
            "#,
        )
        .bind(&order.reference)
        .bind(order.created_at)
        .bind(order.total_cents)
        .fetch_one(&mut **tx)
        .await?;

        debug!(order_id, reference = %order.reference, "Created order header");
        Ok(order_id)
    }

    /// Inserts all lines of an order in a single statement.
    ///
    /// ## Returns
    /// Number of rows written (0 for an empty slice, without touching SQLite).
    pub async fn create_order_lines(
        &self,
        tx: &mut DbTransaction,
        lines: &[LineItemRecord],
    ) -> DbResult<u64> {
        if lines.is_empty() {
            return Ok(0);
        }

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "INSERT INTO order_lines (order_id, product_id, promotion_id, price_cents, qty) ",
        );
        builder.push_values(lines, |mut row, line| {
            row.push_bind(line.order_id)
                .push_bind(line.product_id)
                .push_bind(line.promotion_id)
                .push_bind(line.price_cents)
                .push_bind(line.qty);
        });

        let result = builder.build().execute(&mut **tx).await?;

        debug!(count = result.rows_affected(), "Inserted order lines");
        Ok(result.rows_affected())
    }

    /// Writes the final receipt total back to the header.
    pub async fn finalize_total(
        &self,
        tx: &mut DbTransaction,
        order_id: i64,
        total_cents: i64,
    ) -> DbResult<()> {
        let result = sqlx::query("UPDATE orders SET total_cents = ?1 WHERE order_id = ?2")
            .bind(total_cents)
            .bind(order_id)
            .execute(&mut **tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", order_id));
        }

        Ok(())
    }

    /// Makes every write of `tx` durable.
    pub async fn commit(&self, tx: DbTransaction) -> DbResult<()> {
        tx.commit().await.map_err(DbError::transaction)
    }

    /// Discards every write of `tx`.
    pub async fn rollback(&self, tx: DbTransaction) -> DbResult<()> {
        tx.rollback().await.map_err(DbError::transaction)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Gets an order header by id.
    pub async fn get_by_id(&self, order_id: i64) -> DbResult<Option<OrderHeader>> {
        let order = sqlx::query_as::<_, OrderHeader>(
            r#"
            SELECT order_id, reference, created_at, total_cents
            FROM orders
            WHERE order_id = ?1
            "#,
        )
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Gets the lines of an order in insertion order.
    pub async fn get_lines(&self, order_id: i64) -> DbResult<Vec<LineItemRecord>> {
        let lines = sqlx::query_as::<_, LineItemRecord>(
            r#"
            SELECT order_id, product_id, promotion_id, price_cents, qty
            FROM order_lines
            WHERE order_id = ?1
            ORDER BY line_id
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Lists the most recent orders, newest first.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<OrderHeader>> {
        let orders = sqlx::query_as::<_, OrderHeader>(
            r#"
            SELECT order_id, reference, created_at, total_cents
            FROM orders
            ORDER BY order_id DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Counts order headers.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
