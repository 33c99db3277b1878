//! Discounted price computation.
//!
//! Everything here is pure: callers pass the retail price, the discount they
//! consider authoritative (a live catalog lookup or a cart snapshot) and the
//! instant to evaluate at.
//!
//! Percent discounts truncate: `floor(value * retail / 100)`. Switching to
//! round-half-up would move checkout totals by up to one currency unit per
//! item, so the truncation is kept as the pricing policy.

use chrono::{DateTime, Utc};
use common::{DiscountId, Money, VariantId};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::discount::{DiscountInfo, DiscountKind};

const ONE_HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Errors raised when a price cannot be derived from the data at hand.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PricingError {
    /// The discount would push the price below zero.
    #[error("Discount {discount} exceeds retail price {retail_price}")]
    NegativePrice { retail_price: Money, discount: Money },

    /// A field of the discount definition is negative.
    #[error("Invalid {field} {value} for {kind} discount")]
    NegativeDiscount {
        kind: DiscountKind,
        field: &'static str,
        value: Decimal,
    },
}

/// Result of applying one discount to one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountedPrice {
    /// Price after the discount.
    pub discounted_price: Money,
    /// Amount taken off.
    pub applied_discount: Money,
}

/// Per-unit pricing of a variant, with or without a discount.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitPrice {
    pub retail_price: Money,
    pub applied_discount: Money,
    pub discounted_price: Money,
    /// The discount that was applied, if any.
    pub discount_id: Option<DiscountId>,
}

impl UnitPrice {
    /// Pricing for a unit with no discount.
    pub fn undiscounted(retail_price: &Money) -> Self {
        Self {
            retail_price: retail_price.clone(),
            applied_discount: retail_price.zeroed(),
            discounted_price: retail_price.clone(),
            discount_id: None,
        }
    }

    /// Returns true if a discount reduced the price.
    pub fn is_discounted(&self) -> bool {
        self.discount_id.is_some()
    }
}

/// Applies a discount to a retail price.
///
/// Flat discounts subtract `value` and ignore `max_value`. Percent discounts
/// take `floor(value * retail / 100)`, capped at `max_value` when the cap is
/// positive.
pub fn compute_discounted_price(
    retail_price: &Money,
    discount: &DiscountInfo,
) -> Result<DiscountedPrice, PricingError> {
    for (field, value) in [("value", discount.value), ("maxValue", discount.max_value)] {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(PricingError::NegativeDiscount {
                kind: discount.kind,
                field,
                value,
            });
        }
    }

    let applied = match discount.kind {
        DiscountKind::Flat => discount.value,
        DiscountKind::Percent => {
            let raw = (discount.value * retail_price.value() / ONE_HUNDRED).floor();
            if discount.max_value > Decimal::ZERO && raw > discount.max_value {
                discount.max_value
            } else {
                raw
            }
        }
    };

    let applied_discount = retail_price.with_value(applied);
    let discounted_price = retail_price.clone() - applied_discount.clone();
    if discounted_price.is_negative() {
        return Err(PricingError::NegativePrice {
            retail_price: retail_price.clone(),
            discount: applied_discount,
        });
    }

    Ok(DiscountedPrice {
        discounted_price,
        applied_discount,
    })
}

/// Prices one unit of a variant.
///
/// The discount only applies when it lists the variant and `at` falls inside
/// its window; otherwise the retail price is returned unchanged.
pub fn price_variant(
    retail_price: &Money,
    variant_id: &VariantId,
    discount: Option<&DiscountInfo>,
    at: DateTime<Utc>,
) -> Result<UnitPrice, PricingError> {
    match discount {
        Some(discount) if discount.applies_to(variant_id, at) => {
            let priced = compute_discounted_price(retail_price, discount)?;
            Ok(UnitPrice {
                retail_price: retail_price.clone(),
                applied_discount: priced.applied_discount,
                discounted_price: priced.discounted_price,
                discount_id: Some(discount.id.clone()),
            })
        }
        _ => Ok(UnitPrice::undiscounted(retail_price)),
    }
}
