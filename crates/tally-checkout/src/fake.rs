//! In-memory stores for orchestrator tests.
//!
//! A transaction is a private copy of the committed state; `commit`
//! publishes it, `rollback` (or drop) throws it away. Faults make any
//! single store call fail on demand.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::service::CheckoutService;
use crate::store::{OrderStore, ProductStore, PromotionStore, StoreError, StoreResult};
use tally_core::{
    LineItemRecord, Money, NewOrder, OrderHeader, Product, Promotion, PromotionKind,
};

#[derive(Debug, Clone, Default)]
struct Snapshot {
    products: BTreeMap<i64, Product>,
    /// Keyed by product id.
    promotions: BTreeMap<i64, Promotion>,
    orders: BTreeMap<i64, OrderHeader>,
    lines: Vec<LineItemRecord>,
    next_order_id: i64,
}

/// Store calls to break.
#[derive(Debug, Clone, Default)]
pub struct Faults {
    pub begin: bool,
    pub create_order: bool,
    /// Product id whose promotion lookup fails.
    pub promotion_lookup: Option<i64>,
    /// Product id whose product lookup fails.
    pub product_lookup: Option<i64>,
    /// Error every decrement returns.
    pub decrement: Option<StoreError>,
    pub line_batch: bool,
    pub finalize_total: bool,
    pub commit: bool,
    pub rollback: bool,
    /// Sleep before every product lookup.
    pub lookup_delay: Option<Duration>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Counters {
    pub begins: usize,
    pub commits: usize,
    pub rollbacks: usize,
}

#[derive(Debug)]
pub struct FakeTx {
    staged: Snapshot,
}

#[derive(Debug, Clone, Default)]
pub struct FakeStore {
    committed: Arc<Mutex<Snapshot>>,
    faults: Arc<Mutex<Faults>>,
    counters: Arc<Mutex<Counters>>,
}

pub type FakeCheckout = CheckoutService<FakeStore, FakeStore, FakeStore>;

pub const GOOGLE_HOME: i64 = 1;
pub const MACBOOK_PRO: i64 = 2;
pub const ALEXA_SPEAKER: i64 = 3;
pub const RASPBERRY_PI: i64 = 4;

impl FakeStore {
    /// The demo catalog: Google Home buy-3-pay-2, MacBook Pro with a free
    /// Raspberry Pi B, 10% off 3+ Alexa Speakers.
    pub fn demo() -> Self {
        let store = FakeStore::default();
        store.add_product(GOOGLE_HOME, "120P90", "Google Home", 4999, 10);
        store.add_product(MACBOOK_PRO, "43N23P", "MacBook Pro", 539999, 5);
        store.add_product(ALEXA_SPEAKER, "A304SD", "Alexa Speaker", 10950, 10);
        store.add_product(RASPBERRY_PI, "234234", "Raspberry Pi B", 3000, 2);

        store.add_promotion(1, GOOGLE_HOME, PromotionKind::MultiBuySelfDiscount, GOOGLE_HOME, 3);
        // multi-buy pointing at another product acts as a free gift
        store.add_promotion(2, MACBOOK_PRO, PromotionKind::MultiBuySelfDiscount, RASPBERRY_PI, 1);
        store.add_promotion(3, ALEXA_SPEAKER, PromotionKind::PercentageDiscount, 10, 3);
        store
    }

    pub fn service(&self) -> FakeCheckout {
        CheckoutService::new(self.clone(), self.clone(), self.clone())
    }

    pub fn add_product(&self, id: i64, sku: &str, name: &str, price_cents: i64, qty: i64) {
        self.committed.lock().unwrap().products.insert(
            id,
            Product {
                product_id: id,
                sku: sku.to_string(),
                name: name.to_string(),
                price_cents,
                qty,
            },
        );
    }

    pub fn add_promotion(
        &self,
        promotion_id: i64,
        product_id: i64,
        kind: PromotionKind,
        reward: i64,
        min_qty: i64,
    ) {
        self.committed.lock().unwrap().promotions.insert(
            product_id,
            Promotion {
                promotion_id,
                product_id,
                kind,
                reward,
                min_qty,
            },
        );
    }

    pub fn set_qty(&self, product_id: i64, qty: i64) {
        if let Some(product) = self.committed.lock().unwrap().products.get_mut(&product_id) {
            product.qty = qty;
        }
    }

    pub fn qty(&self, product_id: i64) -> i64 {
        self.committed.lock().unwrap().products[&product_id].qty
    }

    pub fn total_stock(&self) -> i64 {
        self.committed.lock().unwrap().products.values().map(|p| p.qty).sum()
    }

    pub fn orders(&self) -> Vec<OrderHeader> {
        self.committed.lock().unwrap().orders.values().cloned().collect()
    }

    pub fn lines(&self) -> Vec<LineItemRecord> {
        self.committed.lock().unwrap().lines.clone()
    }

    pub fn break_calls(&self, update: impl FnOnce(&mut Faults)) {
        update(&mut self.faults.lock().unwrap());
    }

    pub fn counters(&self) -> Counters {
        *self.counters.lock().unwrap()
    }

    fn faults(&self) -> Faults {
        self.faults.lock().unwrap().clone()
    }
}

#[async_trait]
impl OrderStore for FakeStore {
    type Tx = FakeTx;

    async fn begin(&self) -> StoreResult<FakeTx> {
        if self.faults().begin {
            return Err(StoreError::backend("begin refused"));
        }
        self.counters.lock().unwrap().begins += 1;
        Ok(FakeTx {
            staged: self.committed.lock().unwrap().clone(),
        })
    }

    async fn create_order(&self, tx: &mut FakeTx, order: &NewOrder) -> StoreResult<i64> {
        if self.faults().create_order {
            return Err(StoreError::backend("orders table locked"));
        }
        tx.staged.next_order_id += 1;
        let order_id = tx.staged.next_order_id;
        tx.staged.orders.insert(
            order_id,
            OrderHeader {
                order_id,
                reference: order.reference.clone(),
                created_at: order.created_at,
                total_cents: order.total_cents,
            },
        );
        Ok(order_id)
    }

    async fn create_order_lines(&self, tx: &mut FakeTx, lines: &[LineItemRecord]) -> StoreResult<()> {
        if self.faults().line_batch {
            return Err(StoreError::backend("batch insert failed"));
        }
        tx.staged.lines.extend_from_slice(lines);
        Ok(())
    }

    async fn finalize_total(&self, tx: &mut FakeTx, order_id: i64, total: Money) -> StoreResult<()> {
        if self.faults().finalize_total {
            return Err(StoreError::backend("header update failed"));
        }
        let header = tx
            .staged
            .orders
            .get_mut(&order_id)
            .ok_or_else(|| StoreError::not_found("Order", order_id))?;
        header.total_cents = total.cents();
        Ok(())
    }

    async fn commit(&self, tx: FakeTx) -> StoreResult<()> {
        if self.faults().commit {
            return Err(StoreError::backend("commit failed"));
        }
        *self.committed.lock().unwrap() = tx.staged;
        self.counters.lock().unwrap().commits += 1;
        Ok(())
    }

    async fn rollback(&self, _tx: FakeTx) -> StoreResult<()> {
        self.counters.lock().unwrap().rollbacks += 1;
        if self.faults().rollback {
            return Err(StoreError::backend("rollback failed"));
        }
        Ok(())
    }
}

#[async_trait]
impl ProductStore<FakeTx> for FakeStore {
    async fn get_by_id(&self, tx: &mut FakeTx, product_id: i64) -> StoreResult<Option<Product>> {
        let faults = self.faults();
        if let Some(delay) = faults.lookup_delay {
            tokio::time::sleep(delay).await;
        }
        if faults.product_lookup == Some(product_id) {
            return Err(StoreError::backend("product read failed"));
        }
        Ok(tx.staged.products.get(&product_id).cloned())
    }

    async fn list_all(&self) -> StoreResult<Vec<Product>> {
        Ok(self.committed.lock().unwrap().products.values().cloned().collect())
    }

    async fn decrement_qty(&self, tx: &mut FakeTx, product_id: i64, qty: i64) -> StoreResult<()> {
        if let Some(err) = self.faults().decrement {
            return Err(err);
        }
        let product = tx
            .staged
            .products
            .get_mut(&product_id)
            .ok_or_else(|| StoreError::not_found("Product", product_id))?;
        if product.qty < qty {
            return Err(StoreError::StockExhausted { product_id });
        }
        product.qty -= qty;
        Ok(())
    }
}

#[async_trait]
impl PromotionStore<FakeTx> for FakeStore {
    async fn get_by_product_id(
        &self,
        tx: &mut FakeTx,
        product_id: i64,
    ) -> StoreResult<Option<Promotion>> {
        if self.faults().promotion_lookup == Some(product_id) {
            return Err(StoreError::backend("promotion read failed"));
        }
        Ok(tx.staged.promotions.get(&product_id).cloned())
    }

    async fn list_all(&self) -> StoreResult<Vec<Promotion>> {
        Ok(self.committed.lock().unwrap().promotions.values().cloned().collect())
    }
}
