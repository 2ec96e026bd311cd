use rust_decimal::Decimal;

use crate::cpq::money::{round_currency, saturating_add, saturating_mul, saturating_sub};
use crate::cpq::rates::RateCard;
use crate::domain::quote::QuoteTotals;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TotalsInput {
    pub module_subtotal: Decimal,
    pub discount_amount: Decimal,
    pub price_per_employee: Decimal,
    pub stamp_count: u32,
    pub extra_user_count: u32,
    pub extra_surcharge_unit_count: u32,
    pub multiplier: u32,
}

/// Combines already-rounded components into subtotal, tax and total.
pub fn aggregate_totals(input: &TotalsInput, rates: &RateCard) -> QuoteTotals {
    let multiplier = Decimal::from(input.multiplier);

    let extra_user_amount = round_currency(saturating_mul(
        saturating_mul(Decimal::from(input.extra_user_count), rates.extra_user_rate),
        multiplier,
    ));
    let extra_surcharge_amount = round_currency(saturating_mul(
        saturating_mul(Decimal::from(input.extra_surcharge_unit_count), rates.extra_surcharge_rate),
        multiplier,
    ));
    let surcharge_amount = round_currency(saturating_mul(Decimal::from(input.stamp_count), multiplier));

    let subtotal = [surcharge_amount, extra_user_amount, extra_surcharge_amount]
        .into_iter()
        .fold(input.module_subtotal, saturating_add);
    let subtotal = saturating_sub(subtotal, input.discount_amount);
    let tax = round_currency(saturating_mul(subtotal, rates.tax_rate));
    let total = round_currency(saturating_add(subtotal, tax));

    QuoteTotals {
        multiplier: input.multiplier,
        price_per_employee: input.price_per_employee,
        module_subtotal: input.module_subtotal,
        discount_amount: input.discount_amount,
        surcharge_amount,
        extra_user_amount,
        extra_surcharge_amount,
        subtotal,
        tax,
        total,
    }
}
