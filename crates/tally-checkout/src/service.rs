//! # Checkout Service
//!
//! The orchestrator: one transaction per checkout, committed only when
//! every line has been priced and reserved.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  checkout(lines)                                                        │
//! │    validate ──✗──► InvalidRequest (no store touched)                    │
//! │    begin ─────✗──► TransactionStart                                     │
//! │    ┌──────────────── process (under the deadline) ─────────────────┐   │
//! │    │ create_order(total 0)                                          │   │
//! │    │ for each line, in request order:                               │   │
//! │    │   promotion? ─► product ─► stock check ─► gate ─► price_line   │   │
//! │    │   ─► free gift name? ─► decrement_qty ─► LineOutcome           │   │
//! │    │ create_order_lines(batch)                                      │   │
//! │    │ finalize_total(receipt total)                                  │   │
//! │    └────────────────────────────────────────────────────────────────┘   │
//! │    Ok  ─► commit ──✗──► Commit                                          │
//! │    Err ─► rollback (failure logged, original error returned)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A dropped or timed-out `process` future releases its borrow of the
//! transaction, so the rollback branch runs on every exit path.

use chrono::Utc;
use std::error::Error as _;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::{CheckoutError, CheckoutResult};
use crate::store::{OrderStore, ProductStore, PromotionStore, StoreError, StoreResult};
use tally_core::promotion::{price_line, PromotionRule};
use tally_core::validation::validate_checkout;
use tally_core::types::unit_entries;
use tally_core::{LineItemRecord, LineItemRequest, NewOrder, Product, Promotion, Receipt};

/// What one processed line contributes to the checkout.
#[derive(Debug)]
struct LineOutcome {
    record: LineItemRecord,
    /// Receipt entries: one per unit, then the bonus unit if any.
    entries: Vec<String>,
}

/// Runs checkouts against a set of stores.
///
/// ## Example
/// ```rust,ignore
/// let service = SqliteCheckout::sqlite(&db).with_timeout(Duration::from_secs(10));
/// let receipt = service.checkout(&[LineItemRequest::new(3, 3)]).await?;
/// assert_eq!(receipt.total.cents(), 29565);
/// ```
#[derive(Debug, Clone)]
pub struct CheckoutService<O, P, R> {
    orders: O,
    products: P,
    promotions: R,
    timeout: Option<Duration>,
}

impl<O, P, R> CheckoutService<O, P, R>
where
    O: OrderStore,
    P: ProductStore<O::Tx>,
    R: PromotionStore<O::Tx>,
{
    pub fn new(orders: O, products: P, promotions: R) -> Self {
        CheckoutService {
            orders,
            products,
            promotions,
            timeout: None,
        }
    }

    /// Bounds each checkout, from `begin` up to (not including) `commit`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Catalog listing, outside any checkout.
    pub async fn list_products(&self) -> StoreResult<Vec<Product>> {
        self.products.list_all().await
    }

    pub async fn list_promotions(&self) -> StoreResult<Vec<Promotion>> {
        self.promotions.list_all().await
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Checks out `lines` atomically.
    ///
    /// ## Returns
    /// * `Ok(Receipt)` - Order, lines, stock decrements and total committed
    /// * `Err(CheckoutError)` - Nothing committed
    pub async fn checkout(&self, lines: &[LineItemRequest]) -> CheckoutResult<Receipt> {
        if let Err(err) = validate_checkout(lines) {
            warn!(error = %err, "Rejected checkout request");
            return Err(err.into());
        }

        let reference = Uuid::new_v4().to_string();
        let deadline = self.timeout.map(|limit| (Instant::now() + limit, limit));

        info!(reference = %reference, lines = lines.len(), "Starting checkout");

        let mut tx = bounded(deadline, async {
            self.orders
                .begin()
                .await
                .map_err(CheckoutError::TransactionStart)
        })
        .await?;

        let outcome = bounded(deadline, self.process(&mut tx, &reference, lines)).await;

        match outcome {
            Ok(receipt) => {
                self.orders.commit(tx).await.map_err(|err| {
                    error!(reference = %reference, error = %err, "Checkout commit failed");
                    CheckoutError::Commit(err)
                })?;

                info!(
                    reference = %reference,
                    order_id = receipt.order_id,
                    items = receipt.items.len(),
                    total = %receipt.total,
                    "Checkout committed"
                );
                Ok(receipt)
            }
            Err(err) => {
                if let Err(rollback_err) = self.orders.rollback(tx).await {
                    warn!(
                        reference = %reference,
                        error = %rollback_err,
                        "Rollback failed after checkout error"
                    );
                }

                let cause = err.source().map(tracing::field::display);
                if err.is_client_error() {
                    warn!(reference = %reference, kind = err.kind(), error = %err, cause, "Checkout rejected");
                } else {
                    error!(reference = %reference, kind = err.kind(), error = %err, cause, "Checkout failed");
                }
                Err(err)
            }
        }
    }

    /// Everything that happens inside the transaction. Every failure exits
    /// through `?`; the caller decides commit or rollback.
    async fn process(
        &self,
        tx: &mut O::Tx,
        reference: &str,
        lines: &[LineItemRequest],
    ) -> CheckoutResult<Receipt> {
        let header = NewOrder {
            reference: reference.to_string(),
            created_at: Utc::now(),
            total_cents: 0,
        };
        let order_id = self
            .orders
            .create_order(tx, &header)
            .await
            .map_err(CheckoutError::OrderCreation)?;

        let mut receipt = Receipt::new(order_id);
        let mut records = Vec::with_capacity(lines.len());

        for line in lines {
            let outcome = self.process_line(tx, order_id, line).await?;
            receipt
                .record_line(outcome.record.price(), outcome.entries)
                .map_err(|source| CheckoutError::AmountOverflow {
                    product_id: line.product_id,
                    source,
                })?;
            records.push(outcome.record);
        }

        self.orders
            .create_order_lines(tx, &records)
            .await
            .map_err(CheckoutError::LineBatchPersist)?;

        self.orders
            .finalize_total(tx, order_id, receipt.total)
            .await
            .map_err(CheckoutError::OrderTotal)?;

        Ok(receipt)
    }

    async fn process_line(
        &self,
        tx: &mut O::Tx,
        order_id: i64,
        line: &LineItemRequest,
    ) -> CheckoutResult<LineOutcome> {
        let product_id = line.product_id;
        let qty = line.qty;

        let promotion = self
            .promotions
            .get_by_product_id(tx, product_id)
            .await
            .map_err(|source| CheckoutError::PromotionLookup { product_id, source })?;

        let product = self
            .products
            .get_by_id(tx, product_id)
            .await
            .map_err(|source| CheckoutError::ProductLookup { product_id, source })?
            .ok_or(CheckoutError::ProductNotFound { product_id })?;

        if !product.has_stock_for(qty) {
            return Err(CheckoutError::InsufficientStock {
                product_id,
                name: product.name,
                available: Some(product.qty),
                requested: qty,
            });
        }

        let rule = match &promotion {
            Some(promotion) if promotion.qualifies(qty) => promotion
                .rule_for(product_id)
                .map_err(CheckoutError::InvalidPromotion)?,
            _ => PromotionRule::None,
        };

        let priced = price_line(&rule, product.price(), qty)
            .map_err(|source| CheckoutError::AmountOverflow { product_id, source })?;

        let mut entries = unit_entries(&product.name, qty);

        if let Some(gift_id) = priced.bonus_product_id {
            let gift = self
                .products
                .get_by_id(tx, gift_id)
                .await
                .map_err(|source| CheckoutError::ProductLookup {
                    product_id: gift_id,
                    source,
                })?
                .ok_or_else(|| CheckoutError::ProductLookup {
                    product_id: gift_id,
                    source: StoreError::not_found("Product", gift_id),
                })?;
            entries.push(gift.name);
        }

        self.products
            .decrement_qty(tx, product_id, qty)
            .await
            .map_err(|source| match source {
                // The earlier read no longer holds, so there is no count to report
                StoreError::StockExhausted { .. } => CheckoutError::InsufficientStock {
                    product_id,
                    name: product.name.clone(),
                    available: None,
                    requested: qty,
                },
                source => CheckoutError::StockReservation { product_id, source },
            })?;

        let promotion_id = promotion
            .as_ref()
            .filter(|_| priced.promotion_applied)
            .map(|p| p.promotion_id);

        debug!(
            order_id,
            product_id,
            qty,
            ?rule,
            price = %priced.price,
            "Line priced and reserved"
        );

        Ok(LineOutcome {
            record: LineItemRecord {
                order_id,
                product_id,
                promotion_id,
                price_cents: priced.price.cents(),
                qty,
            },
            entries,
        })
    }
}

/// Runs `fut` under the checkout deadline, if there is one.
async fn bounded<T, F>(deadline: Option<(Instant, Duration)>, fut: F) -> CheckoutResult<T>
where
    F: Future<Output = CheckoutResult<T>>,
{
    match deadline {
        Some((at, limit)) => tokio::time::timeout_at(at, fut)
            .await
            .map_err(|_| CheckoutError::TimedOut { after: limit })?,
        None => fut.await,
    }
}
