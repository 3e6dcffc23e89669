//! Bundle pricing
//!
//! A bundle costs the sum of its members' effective prices minus a flat
//! 10% discount, rounded to cents (midpoint away from zero). The result is a
//! snapshot stored on the bundle; it is only recomputed on membership changes
//! or on an explicit recheck.

use std::collections::HashSet;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::domain::aggregates::Product;
use crate::{MarketError, Result};

/// 0.10
pub const BUNDLE_DISCOUNT_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

pub const MIN_BUNDLE_PRODUCTS: usize = 2;

pub const TOO_FEW_PRODUCTS: &str = "A bundle must contain at least 2 different products.";

/// 9999999999.99, the largest amount a `NUMERIC(12, 2)` column holds.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, 2);

pub const AMOUNT_OUT_OF_RANGE: &str = "Amount is out of range.";

pub fn out_of_range() -> MarketError { MarketError::validation(AMOUNT_OUT_OF_RANGE) }

pub fn round_price(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Discounted price of a set of resolved products.
///
/// Duplicate entries count once.
pub fn discounted_price(products: &[Product]) -> Result<Decimal> {
    let mut seen = HashSet::with_capacity(products.len());
    let mut total = Decimal::ZERO;
    for product in products.iter().filter(|p| seen.insert(p.id)) {
        total = total.checked_add(product.effective_price()).ok_or_else(out_of_range)?;
    }
    if seen.len() < MIN_BUNDLE_PRODUCTS {
        return Err(MarketError::validation(TOO_FEW_PRODUCTS));
    }
    let discount = total.checked_mul(BUNDLE_DISCOUNT_RATE).ok_or_else(out_of_range)?;
    Ok(round_price(total - discount))
}
