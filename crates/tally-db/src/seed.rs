//! # Demo Catalog
//!
//! The reference catalog used for demos and end-to-end tests.
//!
//! ```text
//! ┌────────┬────────────────┬─────────┬─────┬──────────────────────────────────┐
//! │ SKU    │ Name           │ Price   │ Qty │ Promotion                        │
//! ├────────┼────────────────┼─────────┼─────┼──────────────────────────────────┤
//! │ 120P90 │ Google Home    │   49.99 │  10 │ buy 3, pay for 2                 │
//! │ 43N23P │ MacBook Pro    │ 5399.99 │   5 │ free Raspberry Pi B with each    │
//! │ A304SD │ Alexa Speaker  │  109.50 │  10 │ 10% off when buying 3 or more    │
//! │ 234234 │ Raspberry Pi B │   30.00 │   2 │ -                                │
//! └────────┴────────────────┴─────────┴─────┴──────────────────────────────────┘
//! ```

use tracing::info;

use crate::error::DbResult;
use crate::pool::Database;
use tally_core::{NewProduct, NewPromotion, PromotionKind};

const DEMO_PRODUCTS: &[(&str, &str, i64, i64)] = &[
    ("120P90", "Google Home", 4999, 10),
    ("43N23P", "MacBook Pro", 539999, 5),
    ("A304SD", "Alexa Speaker", 10950, 10),
    ("234234", "Raspberry Pi B", 3000, 2),
];

/// What [`seed_demo_catalog`] inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub products: usize,
    pub promotions: usize,
}

impl SeedSummary {
    pub fn is_empty(&self) -> bool {
        self.products == 0 && self.promotions == 0
    }
}

/// Inserts the demo catalog and its promotions.
///
/// Skipped (empty summary) when the catalog already has products.
pub async fn seed_demo_catalog(db: &Database) -> DbResult<SeedSummary> {
    let existing = db.products().count().await?;
    if existing > 0 {
        info!(existing, "Catalog already populated, skipping seed");
        return Ok(SeedSummary::default());
    }

    let products = db.products();
    let mut ids = Vec::with_capacity(DEMO_PRODUCTS.len());
    for &(sku, name, price_cents, qty) in DEMO_PRODUCTS {
        let product = products
            .insert(&NewProduct {
                sku: sku.to_string(),
                name: name.to_string(),
                price_cents,
                qty,
            })
            .await?;
        ids.push(product.product_id);
    }

    let (google_home, macbook, alexa, raspberry_pi) = (ids[0], ids[1], ids[2], ids[3]);

    let promotions = [
        NewPromotion {
            product_id: google_home,
            kind: PromotionKind::MultiBuySelfDiscount,
            reward: google_home,
            min_qty: 3,
        },
        NewPromotion {
            product_id: macbook,
            kind: PromotionKind::FreeGift,
            reward: raspberry_pi,
            min_qty: 1,
        },
        NewPromotion {
            product_id: alexa,
            kind: PromotionKind::PercentageDiscount,
            reward: 10,
            min_qty: 3,
        },
    ];

    let repo = db.promotions();
    for promotion in &promotions {
        repo.insert(promotion).await?;
    }

    let summary = SeedSummary {
        products: ids.len(),
        promotions: promotions.len(),
    };
    info!(
        products = summary.products,
        promotions = summary.promotions,
        "Seeded demo catalog"
    );
    Ok(summary)
}
