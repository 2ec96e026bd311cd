use rust_decimal::Decimal;

use crate::coerce::clamp_percent;
use crate::cpq::money::{percent_of, round_currency};

/// Discount on the module subtotal only. Surcharges and per-unit extras are never discounted.
pub fn discount_amount(module_subtotal: Decimal, discount_percent: Decimal) -> Decimal {
    round_currency(percent_of(module_subtotal, clamp_percent(discount_percent)))
}
