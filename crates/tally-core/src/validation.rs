//! # Validation
//!
//! Checks run before anything reaches a store.
//!
//! ```text
//! checkout request ──► validate_checkout ──► CheckoutService
//! catalog insert   ──► validate_new_product / validate_new_promotion ──► SQL
//! ```
//!
//! The schema repeats the stock and uniqueness rules as constraints; these
//! functions exist so callers get a field-level message instead of a
//! constraint name.

use crate::error::ValidationError;
use crate::money::BPS_PER_WHOLE;
use crate::types::{LineItemRequest, NewProduct, NewPromotion, PromotionKind};
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY, MAX_UNIT_PRICE_CENTS};

pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_SKU_LEN: usize = 32;
const MAX_NAME_LEN: usize = 120;

// =============================================================================
// Checkout
// =============================================================================

/// Validates a whole checkout request.
///
/// ## Rules
/// - Between 1 and [`MAX_CART_ITEMS`] lines
/// - Every product id is positive
/// - Every quantity is in `1..=MAX_ITEM_QUANTITY`
///
/// The same product may appear on several lines.
///
/// ```rust
/// use tally_core::types::LineItemRequest;
/// use tally_core::validation::validate_checkout;
///
/// assert!(validate_checkout(&[LineItemRequest::new(3, 3)]).is_ok());
/// assert!(validate_checkout(&[]).is_err());
/// assert!(validate_checkout(&[LineItemRequest::new(3, 0)]).is_err());
/// ```
pub fn validate_checkout(lines: &[LineItemRequest]) -> ValidationResult<()> {
    if lines.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }
    if lines.len() > MAX_CART_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_CART_ITEMS as i64,
        });
    }

    lines.iter().try_for_each(|line| {
        validate_id("product_id", line.product_id)?;
        validate_quantity(line.qty)
    })
}

/// A line quantity: positive and at most [`MAX_ITEM_QUANTITY`].
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    match qty {
        q if q <= 0 => Err(ValidationError::MustBePositive {
            field: "qty".to_string(),
        }),
        q if q > MAX_ITEM_QUANTITY => Err(ValidationError::OutOfRange {
            field: "qty".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        }),
        _ => Ok(()),
    }
}

/// Store-assigned ids start at 1.
pub fn validate_id(field: &str, id: i64) -> ValidationResult<()> {
    if id <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Catalog
// =============================================================================

/// A product about to be inserted.
pub fn validate_new_product(product: &NewProduct) -> ValidationResult<()> {
    validate_text("sku", &product.sku, MAX_SKU_LEN)?;
    if !product
        .sku
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "only ASCII letters, digits and '-' are allowed".to_string(),
        });
    }

    validate_text("name", &product.name, MAX_NAME_LEN)?;
    if !(0..=MAX_UNIT_PRICE_CENTS).contains(&product.price_cents) {
        return Err(ValidationError::OutOfRange {
            field: "price_cents".to_string(),
            min: 0,
            max: MAX_UNIT_PRICE_CENTS,
        });
    }
    validate_non_negative("qty", product.qty)
}

/// A promotion about to be inserted.
///
/// The reward is a percent for percentage discounts and a product id for
/// the other kinds.
pub fn validate_new_promotion(promotion: &NewPromotion) -> ValidationResult<()> {
    validate_id("product_id", promotion.product_id)?;
    validate_non_negative("min_qty", promotion.min_qty)?;

    match promotion.kind {
        PromotionKind::PercentageDiscount => {
            let max = (BPS_PER_WHOLE / 100) as i64;
            if !(0..=max).contains(&promotion.reward) {
                return Err(ValidationError::OutOfRange {
                    field: "reward".to_string(),
                    min: 0,
                    max,
                });
            }
            Ok(())
        }
        PromotionKind::MultiBuySelfDiscount | PromotionKind::FreeGift => {
            validate_id("reward", promotion.reward)
        }
    }
}

fn validate_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

fn validate_non_negative(field: &str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(sku: &str, name: &str, price_cents: i64, qty: i64) -> NewProduct {
        NewProduct {
            sku: sku.to_string(),
            name: name.to_string(),
            price_cents,
            qty,
        }
    }

    fn promotion(kind: PromotionKind, reward: i64) -> NewPromotion {
        NewPromotion {
            product_id: 1,
            kind,
            reward,
            min_qty: 3,
        }
    }

    #[test]
    fn test_checkout_bounds() {
        assert!(validate_checkout(&[LineItemRequest::new(1, 999)]).is_ok());

        let too_many: Vec<_> = (1..=101).map(|id| LineItemRequest::new(id, 1)).collect();
        assert!(matches!(
            validate_checkout(&too_many),
            Err(ValidationError::OutOfRange { .. })
        ));

        assert_eq!(
            validate_checkout(&[LineItemRequest::new(1, 1000)]),
            Err(ValidationError::OutOfRange {
                field: "qty".to_string(),
                min: 1,
                max: 999
            })
        );
    }

    #[test]
    fn test_checkout_reports_first_bad_line() {
        let lines = [
            LineItemRequest::new(1, 3),
            LineItemRequest::new(0, 1),
            LineItemRequest::new(2, -4),
        ];
        assert_eq!(
            validate_checkout(&lines),
            Err(ValidationError::MustBePositive {
                field: "product_id".to_string()
            })
        );
    }

    #[test]
    fn test_repeated_product_is_allowed() {
        let lines = [LineItemRequest::new(4, 2), LineItemRequest::new(4, 1)];
        assert!(validate_checkout(&lines).is_ok());
    }

    #[test]
    fn test_new_product() {
        assert!(validate_new_product(&product("A304SD", "Alexa Speaker", 10950, 10)).is_ok());
        assert!(validate_new_product(&product("234234", "Raspberry Pi B", 0, 0)).is_ok());

        assert!(matches!(
            validate_new_product(&product("", "Nameless", 100, 1)),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            validate_new_product(&product("A 304", "Alexa", 100, 1)),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(validate_new_product(&product("X1", &"n".repeat(121), 100, 1)).is_err());
        assert!(validate_new_product(&product("X1", "Gadget", -1, 1)).is_err());
        assert!(validate_new_product(&product("X1", "Gadget", 100, -1)).is_err());
    }

    #[test]
    fn test_price_cap_keeps_a_full_cart_in_range() {
        let at_cap = product("X1", "Gadget", MAX_UNIT_PRICE_CENTS, 1);
        assert!(validate_new_product(&at_cap).is_ok());

        let cart_max = (MAX_UNIT_PRICE_CENTS as i128)
            * MAX_ITEM_QUANTITY as i128
            * MAX_CART_ITEMS as i128;
        assert!(cart_max <= i64::MAX as i128);

        assert_eq!(
            validate_new_product(&product("X1", "Gadget", i64::MAX / 10, 1)),
            Err(ValidationError::OutOfRange {
                field: "price_cents".to_string(),
                min: 0,
                max: MAX_UNIT_PRICE_CENTS,
            })
        );
    }

    #[test]
    fn test_new_promotion() {
        assert!(validate_new_promotion(&promotion(PromotionKind::PercentageDiscount, 10)).is_ok());
        assert!(validate_new_promotion(&promotion(PromotionKind::PercentageDiscount, 100)).is_ok());
        assert!(validate_new_promotion(&promotion(PromotionKind::FreeGift, 4)).is_ok());

        assert!(validate_new_promotion(&promotion(PromotionKind::PercentageDiscount, 101)).is_err());
        assert!(validate_new_promotion(&promotion(PromotionKind::MultiBuySelfDiscount, 0)).is_err());

        let negative_min = NewPromotion {
            min_qty: -1,
            ..promotion(PromotionKind::FreeGift, 4)
        };
        assert!(validate_new_promotion(&negative_min).is_err());
    }
}
