//! # Promotion Engine
//!
//! Prices a single checkout line under its resolved promotion rule.
//!
//! ## Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Rule                    Charged price            Receipt change        │
//! │  ──────────────────────  ───────────────────────  ───────────────────   │
//! │  None                    qty × unit               -                     │
//! │  PercentageDiscount(p)   qty × unit − p%          -                     │
//! │  MultiBuySelfDiscount    (qty − 1) × unit         -                     │
//! │  FreeGift(id)            qty × unit               + 1 unit of `id`      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The minimum-quantity gate is NOT evaluated here. The orchestrator only
//! passes a rule other than [`PromotionRule::None`] once the line qualifies.
//!
//! Pricing is pure: a free gift is reported as `bonus_product_id` and the
//! caller resolves the product's display name. Line prices that leave the
//! `i64` cent range fail with [`CoreError::AmountOverflow`].

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;

/// A promotion resolved for one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "kebab-case")]
pub enum PromotionRule {
    /// No promotion, or the line is under the minimum quantity.
    None,
    /// `percent` off the line's base price.
    PercentageDiscount { percent: u32 },
    /// One unit of the line is free.
    MultiBuySelfDiscount,
    /// One unit of another product is given away.
    FreeGift { gift_product_id: i64 },
}

impl PromotionRule {
    #[inline]
    pub const fn is_none(&self) -> bool {
        matches!(self, PromotionRule::None)
    }
}

/// Outcome of pricing one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricedLine {
    /// Charged price for the whole line.
    pub price: Money,

    /// Whether a promotion applied (the line records its promotion id).
    pub promotion_applied: bool,

    /// Product to add one bonus receipt entry for.
    pub bonus_product_id: Option<i64>,
}

/// Prices `qty` units at `unit_price` under `rule`.
///
/// ```rust
/// use tally_core::money::Money;
/// use tally_core::promotion::{price_line, PromotionRule};
///
/// let priced = price_line(&PromotionRule::MultiBuySelfDiscount, Money::from_cents(4999), 3)?;
/// assert_eq!(priced.price.cents(), 9998);
/// assert!(priced.promotion_applied);
/// # Ok::<(), tally_core::CoreError>(())
/// ```
pub fn price_line(rule: &PromotionRule, unit_price: Money, qty: i64) -> CoreResult<PricedLine> {
    let units = |n: i64| {
        unit_price
            .checked_mul(n)
            .ok_or(CoreError::AmountOverflow { what: "line price" })
    };
    let base = units(qty)?;

    let priced = match *rule {
        PromotionRule::None => PricedLine {
            price: base,
            promotion_applied: false,
            bonus_product_id: None,
        },
        PromotionRule::PercentageDiscount { percent } => PricedLine {
            price: base.apply_percentage_discount(percent * 100),
            promotion_applied: true,
            bonus_product_id: None,
        },
        PromotionRule::MultiBuySelfDiscount => PricedLine {
            price: units((qty - 1).max(0))?,
            promotion_applied: true,
            bonus_product_id: None,
        },
        PromotionRule::FreeGift { gift_product_id } => PricedLine {
            price: base,
            promotion_applied: true,
            bonus_product_id: Some(gift_product_id),
        },
    };
    Ok(priced)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_promotion_keeps_base_price() {
        let priced = price_line(&PromotionRule::None, Money::from_cents(3000), 2).unwrap();
        assert_eq!(priced.price.cents(), 6000);
        assert!(!priced.promotion_applied);
        assert_eq!(priced.bonus_product_id, None);
    }

    #[test]
    fn test_alexa_speakers_ten_percent_off() {
        let priced = price_line(
            &PromotionRule::PercentageDiscount { percent: 10 },
            Money::from_cents(10950),
            3,
        )
        .unwrap();
        assert_eq!(priced.price.cents(), 29565);
        assert!(priced.promotion_applied);
    }

    #[test]
    fn test_google_home_three_for_two() {
        let priced = price_line(&PromotionRule::MultiBuySelfDiscount, Money::from_cents(4999), 3).unwrap();
        assert_eq!(priced.price.cents(), 9998);
        assert_eq!(priced.bonus_product_id, None);
    }

    #[test]
    fn test_self_discount_applies_once_per_line() {
        // 6 units still only get one free
        let priced = price_line(&PromotionRule::MultiBuySelfDiscount, Money::from_cents(4999), 6).unwrap();
        assert_eq!(priced.price.cents(), 5 * 4999);
    }

    #[test]
    fn test_macbook_comes_with_raspberry_pi() {
        let priced = price_line(
            &PromotionRule::FreeGift { gift_product_id: 4 },
            Money::from_cents(539999),
            1,
        )
        .unwrap();
        assert_eq!(priced.price.cents(), 539999);
        assert_eq!(priced.bonus_product_id, Some(4));
        assert!(priced.promotion_applied);
    }

    #[test]
    fn test_full_discount_is_free() {
        let priced = price_line(
            &PromotionRule::PercentageDiscount { percent: 100 },
            Money::from_cents(10950),
            2,
        )
        .unwrap();
        assert!(priced.price.is_zero());
    }

    #[test]
    fn test_line_price_overflow_is_an_error() {
        let unit = Money::from_cents(i64::MAX / 10);

        let err = price_line(&PromotionRule::None, unit, 999).unwrap_err();
        assert!(matches!(err, CoreError::AmountOverflow { what: "line price" }));

        // the self discount multiplies by qty - 1 and still overflows
        assert!(price_line(&PromotionRule::MultiBuySelfDiscount, unit, 999).is_err());

        // ten units is the exact edge: still representable
        let priced = price_line(&PromotionRule::None, unit, 10).unwrap();
        assert_eq!(priced.price.cents(), (i64::MAX / 10) * 10);
    }
}
