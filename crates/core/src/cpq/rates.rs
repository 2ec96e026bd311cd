use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fixed unit rates used by the surcharge, extras and tax steps.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateCard {
    /// Stamp units billed per payroll employee when stamping is required.
    pub stamp_units_per_employee: u32,
    pub extra_user_rate: Decimal,
    pub extra_surcharge_rate: Decimal,
    pub tax_rate: Decimal,
}

impl Default for RateCard {
    fn default() -> Self {
        Self {
            stamp_units_per_employee: 5,
            extra_user_rate: Decimal::new(55, 0),
            extra_surcharge_rate: Decimal::ONE,
            tax_rate: Decimal::new(16, 2),
        }
    }
}
