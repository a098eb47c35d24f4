//! # Promotion Repository
//!
//! Promotions are keyed by the product they price. The schema allows at
//! most one per product, so a lookup yields zero or one row.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::pool::DbTransaction;
use tally_core::validation::validate_new_promotion;
use tally_core::{NewPromotion, Promotion};

const SELECT_BY_PRODUCT: &str = r#"
    SELECT promotion_id, product_id, promotion_type AS kind, reward, min_qty
    FROM promotions
    WHERE product_id = ?1
"#;

/// Repository for promotion database operations.
#[derive(Debug, Clone)]
pub struct PromotionRepository {
    pool: SqlitePool,
}

impl PromotionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PromotionRepository { pool }
    }

    /// Gets the promotion attached to a product, if any.
    pub async fn get_by_product_id(&self, product_id: i64) -> DbResult<Option<Promotion>> {
        let promotion = sqlx::query_as::<_, Promotion>(SELECT_BY_PRODUCT)
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(promotion)
    }

    /// Same lookup, run on the checkout's transaction.
    pub async fn get_by_product_id_in(
        &self,
        tx: &mut DbTransaction,
        product_id: i64,
    ) -> DbResult<Option<Promotion>> {
        let promotion = sqlx::query_as::<_, Promotion>(SELECT_BY_PRODUCT)
            .bind(product_id)
            .fetch_optional(&mut **tx)
            .await?;

        Ok(promotion)
    }

    pub async fn list_all(&self) -> DbResult<Vec<Promotion>> {
        let promotions = sqlx::query_as::<_, Promotion>(
            r#"
            SELECT promotion_id, product_id, promotion_type AS kind, reward, min_qty
            FROM promotions
            ORDER BY promotion_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(promotions)
    }

    /// Inserts a promotion and returns it with its assigned id.
    ///
    /// ## Returns
    /// * `Err(DbError::Invalid)` - Fails catalog validation
    /// * `Err(DbError::UniqueViolation)` - The product already has one
    /// * `Err(DbError::ForeignKeyViolation)` - Unknown product
    pub async fn insert(&self, promotion: &NewPromotion) -> DbResult<Promotion> {
        validate_new_promotion(promotion)?;
        debug!(
            product_id = promotion.product_id,
            kind = promotion.kind.as_str(),
            "Inserting promotion"
        );

        let inserted = sqlx::query_as::<_, Promotion>(
            r#"
            INSERT INTO promotions (product_id, promotion_type, reward, min_qty)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING promotion_id, product_id, promotion_type AS kind, reward, min_qty
            "#,
        )
        .bind(promotion.product_id)
        .bind(promotion.kind)
        .bind(promotion.reward)
        .bind(promotion.min_qty)
        .fetch_one(&self.pool)
        .await?;

        Ok(inserted)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::Database;
    use tally_core::{NewProduct, PromotionKind};

    async fn google_home(db: &Database) -> i64 {
        db.products()
            .insert(&NewProduct {
                sku: "120P90".to_string(),
                name: "Google Home".to_string(),
                price_cents: 4999,
                qty: 10,
            })
            .await
            .unwrap()
            .product_id
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let db = Database::in_memory().await.unwrap();
        let product_id = google_home(&db).await;
        let repo = db.promotions();

        let inserted = repo
            .insert(&NewPromotion {
                product_id,
                kind: PromotionKind::MultiBuySelfDiscount,
                reward: product_id,
                min_qty: 3,
            })
            .await
            .unwrap();
        assert_eq!(inserted.kind, PromotionKind::MultiBuySelfDiscount);

        let found = repo.get_by_product_id(product_id).await.unwrap().unwrap();
        assert_eq!(found, inserted);
        assert!(repo.get_by_product_id(999).await.unwrap().is_none());

        let mut tx = db.begin().await.unwrap();
        let in_tx = repo.get_by_product_id_in(&mut tx, product_id).await.unwrap();
        assert_eq!(in_tx, Some(inserted));
        tx.rollback().await.unwrap();

        assert_eq!(repo.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_one_promotion_per_product() {
        let db = Database::in_memory().await.unwrap();
        let product_id = google_home(&db).await;
        let repo = db.promotions();

        let promo = NewPromotion {
            product_id,
            kind: PromotionKind::PercentageDiscount,
            reward: 10,
            min_qty: 1,
        };
        repo.insert(&promo).await.unwrap();

        let err = repo.insert(&promo).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_promotion_needs_a_product() {
        let db = Database::in_memory().await.unwrap();

        let err = db
            .promotions()
            .insert(&NewPromotion {
                product_id: 42,
                kind: PromotionKind::FreeGift,
                reward: 1,
                min_qty: 1,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }
}
