use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds to cents, half away from zero. Applied at every accumulation step, never deferred.
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub fn percent_of(amount: Decimal, percent: Decimal) -> Decimal {
    match amount.checked_mul(percent) {
        Some(product) => product / Decimal::ONE_HUNDRED,
        None => saturating_mul(amount / Decimal::ONE_HUNDRED, percent),
    }
}

/// Multiplication clamped to `Decimal::MIN..=Decimal::MAX`. Catalog prices are external input,
/// so a product past the 96-bit mantissa must not abort a recalculation.
pub fn saturating_mul(lhs: Decimal, rhs: Decimal) -> Decimal {
    lhs.checked_mul(rhs)
        .unwrap_or_else(|| bound(lhs.is_sign_negative() != rhs.is_sign_negative()))
}

pub fn saturating_add(lhs: Decimal, rhs: Decimal) -> Decimal {
    lhs.checked_add(rhs).unwrap_or_else(|| bound(lhs.is_sign_negative()))
}

pub fn saturating_sub(lhs: Decimal, rhs: Decimal) -> Decimal {
    lhs.checked_sub(rhs).unwrap_or_else(|| bound(lhs.is_sign_negative()))
}

fn bound(negative: bool) -> Decimal {
    if negative {
        Decimal::MIN
    } else {
        Decimal::MAX
    }
}
