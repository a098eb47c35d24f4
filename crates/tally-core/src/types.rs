//! # Domain Types
//!
//! Core domain types used throughout Tally.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │   Promotion     │   │  OrderHeader    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  product_id     │◄──│  product_id     │   │  order_id       │       │
//! │  │  sku            │   │  kind           │   │  reference      │       │
//! │  │  name           │   │  reward         │   │  created_at     │       │
//! │  │  price_cents    │   │  min_qty        │   │  total_cents    │       │
//! │  │  qty            │   └─────────────────┘   └────────▲────────┘       │
//! │  └─────────────────┘                                  │                │
//! │                                                       │                │
//! │  ┌─────────────────┐   priced   ┌─────────────────────┴──┐             │
//! │  │ LineItemRequest │ ─────────► │    LineItemRecord      │             │
//! │  │ product_id, qty │            │ + price, promotion_id  │             │
//! │  └─────────────────┘            └────────────────────────┘             │
//! │                                                                         │
//! │  Receipt: display names (one per unit + bonus units) and the total     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::{Money, BPS_PER_WHOLE};
use crate::promotion::PromotionRule;

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Identifier assigned by the store.
    pub product_id: i64,

    /// Stock Keeping Unit - business identifier.
    pub sku: String,

    /// Display name shown on the receipt.
    pub name: String,

    /// Unit price in cents.
    pub price_cents: i64,

    /// Units available for sale.
    pub qty: i64,
}

impl Product {
    /// Returns the unit price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks whether `quantity` units can be reserved.
    #[inline]
    pub fn has_stock_for(&self, quantity: i64) -> bool {
        self.qty >= quantity
    }
}

/// A product to be inserted (the store assigns the id).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub sku: String,
    pub name: String,
    pub price_cents: i64,
    pub qty: i64,
}

// =============================================================================
// Promotion
// =============================================================================

/// The declared type of a promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "kebab-case"))]
#[serde(rename_all = "kebab-case")]
pub enum PromotionKind {
    /// Percentage off the whole line; `reward` is the percent.
    PercentageDiscount,
    /// Buy N, one unit free; `reward` is the product's own id.
    /// A different product id in `reward` turns it into a free gift.
    MultiBuySelfDiscount,
    /// One unit of the `reward` product is added to the receipt.
    FreeGift,
}

impl PromotionKind {
    /// The stored text form.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PromotionKind::PercentageDiscount => "percentage-discount",
            PromotionKind::MultiBuySelfDiscount => "multi-buy-self-discount",
            PromotionKind::FreeGift => "free-gift",
        }
    }
}

/// A promotion attached to a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Promotion {
    pub promotion_id: i64,

    /// Product whose lines this promotion prices.
    pub product_id: i64,

    pub kind: PromotionKind,

    /// Percent for `PercentageDiscount`, a product id otherwise.
    pub reward: i64,

    /// Minimum line quantity for the promotion to apply.
    pub min_qty: i64,
}

impl Promotion {
    /// Minimum-quantity gate.
    #[inline]
    pub fn qualifies(&self, qty: i64) -> bool {
        qty >= self.min_qty
    }

    /// Resolves the pricing rule for a line of `product_id`.
    ///
    /// ## Dispatch
    /// ```text
    /// percentage-discount                        → PercentageDiscount
    /// multi-buy-self-discount, reward == product → MultiBuySelfDiscount
    /// multi-buy-self-discount, reward != product → FreeGift(reward)
    /// free-gift                                  → FreeGift(reward)
    /// ```
    pub fn rule_for(&self, product_id: i64) -> Result<PromotionRule, CoreError> {
        match self.kind {
            PromotionKind::PercentageDiscount => {
                let max = (BPS_PER_WHOLE / 100) as i64;
                if !(0..=max).contains(&self.reward) {
                    return Err(CoreError::InvalidPromotion {
                        promotion_id: self.promotion_id,
                        reason: format!("discount of {}% is outside 0..=100", self.reward),
                    });
                }
                Ok(PromotionRule::PercentageDiscount {
                    percent: self.reward as u32,
                })
            }
            PromotionKind::MultiBuySelfDiscount if self.reward == product_id => {
                Ok(PromotionRule::MultiBuySelfDiscount)
            }
            PromotionKind::MultiBuySelfDiscount | PromotionKind::FreeGift => {
                if self.reward <= 0 {
                    return Err(CoreError::InvalidPromotion {
                        promotion_id: self.promotion_id,
                        reason: format!("reward product id {} is not valid", self.reward),
                    });
                }
                Ok(PromotionRule::FreeGift {
                    gift_product_id: self.reward,
                })
            }
        }
    }
}

/// A promotion to be inserted (the store assigns the id).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPromotion {
    pub product_id: i64,
    pub kind: PromotionKind,
    pub reward: i64,
    pub min_qty: i64,
}

// =============================================================================
// Line Items
// =============================================================================

/// One requested (product, quantity) pair of a checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemRequest {
    pub product_id: i64,
    pub qty: i64,
}

impl LineItemRequest {
    pub const fn new(product_id: i64, qty: i64) -> Self {
        LineItemRequest { product_id, qty }
    }
}

/// A priced line, persisted once per requested line.
///
/// Bonus (free gift) units never get a record of their own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct LineItemRecord {
    pub order_id: i64,
    pub product_id: i64,

    /// Promotion applied to this line, `None` when none applied.
    pub promotion_id: Option<i64>,

    /// Charged price for the whole line, in cents.
    pub price_cents: i64,

    pub qty: i64,
}

impl LineItemRecord {
    /// Returns the charged price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Orders
// =============================================================================

/// Header values for a new order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    /// External reference (UUID v4), unique per checkout.
    pub reference: String,
    pub created_at: DateTime<Utc>,
    pub total_cents: i64,
}

/// A persisted order header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderHeader {
    pub order_id: i64,
    pub reference: String,
    pub created_at: DateTime<Utc>,
    pub total_cents: i64,
}

impl OrderHeader {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Receipt
// =============================================================================

/// The result of a successful checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Order the receipt belongs to.
    pub order_id: i64,

    /// One display name per unit sold, plus one per bonus unit.
    pub items: Vec<String>,

    pub total: Money,
}

impl Receipt {
    pub fn new(order_id: i64) -> Self {
        Receipt {
            order_id,
            items: Vec::new(),
            total: Money::zero(),
        }
    }

    /// Adds a priced line: its charged price and its receipt entries.
    /// Leaves the receipt untouched if the total would overflow.
    pub fn record_line<I>(&mut self, price: Money, entries: I) -> CoreResult<()>
    where
        I: IntoIterator<Item = String>,
    {
        self.total = self
            .total
            .checked_add(price)
            .ok_or(CoreError::AmountOverflow {
                what: "order total",
            })?;
        self.items.extend(entries);
        Ok(())
    }
}

/// Receipt entries for `qty` units of `name`.
pub fn unit_entries(name: &str, qty: i64) -> Vec<String> {
    let qty = usize::try_from(qty).unwrap_or(0);
    vec![name.to_string(); qty]
}

// =============================================================================
// Unit Tests
// =============================================================================
