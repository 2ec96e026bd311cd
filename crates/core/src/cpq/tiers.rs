//! Module pricing: tier resolution against the price scheme and per-period module totals.

use rust_decimal::Decimal;
use tracing::warn;

use crate::cpq::money::{round_currency, saturating_mul};
use crate::domain::module::{ModuleConfig, ModuleId, TierResolution};
use crate::domain::price_tier::{PriceTierRow, PriceTierTable};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedTier<'a> {
    pub row: Option<&'a PriceTierRow>,
    pub resolution: TierResolution,
}

impl ResolvedTier<'_> {
    pub fn unit_price(&self) -> Decimal {
        self.row.map(|row| row.unit_price).unwrap_or(Decimal::ZERO)
    }
}

/// Picks the smallest tier whose threshold covers `employees`. Past the top tier the largest
/// threshold below the headcount is reused. No rows at all resolves to [`TierResolution::Unpriced`].
pub fn resolve_tier<'a>(
    table: &'a PriceTierTable,
    module_id: &ModuleId,
    tier_key: &ModuleId,
    employees: u32,
) -> ResolvedTier<'a> {
    let candidates = table.candidates(module_id, tier_key);

    if let Some(row) = candidates.iter().copied().find(|row| row.resource_number >= employees) {
        return ResolvedTier { row: Some(row), resolution: TierResolution::Ceiling };
    }

    match candidates.iter().copied().filter(|row| row.resource_number < employees).last() {
        Some(row) => ResolvedTier { row: Some(row), resolution: TierResolution::Overflow },
        None => ResolvedTier { row: None, resolution: TierResolution::Unpriced },
    }
}

/// Headcount bundled with the selected tier, read from the row linked to it.
pub fn included_free_users(table: &PriceTierTable, module_id: &ModuleId, tier: &ResolvedTier<'_>) -> u32 {
    tier.row
        .and_then(|row| table.linked_to(module_id, &row.id))
        .map(|linked| linked.resource_number)
        .unwrap_or(0)
}

/// Prices one module for the given periodicity multiplier, returning a new record.
pub fn price_module(
    module: &ModuleConfig,
    stamps: u32,
    table: &PriceTierTable,
    tier_key: &ModuleId,
    multiplier: u32,
) -> ModuleConfig {
    if !module.is_active {
        return module.without_pricing();
    }

    let tier = resolve_tier(table, &module.module_id, tier_key, module.employee_number);
    if tier.resolution == TierResolution::Unpriced {
        warn!(
            event_name = "pricing.module.unpriced",
            module_id = %module.module_id,
            employee_number = module.employee_number,
            "no price tier matched active module; pricing at zero"
        );
    }

    let unit_price = tier.unit_price();
    let base_amount = round_currency(saturating_mul(unit_price, Decimal::from(module.employee_number)));
    let period_total = round_currency(saturating_mul(base_amount, Decimal::from(multiplier)));

    ModuleConfig {
        resolved_unit_price: unit_price,
        included_free_users: included_free_users(table, &module.module_id, &tier),
        stamp_count: stamps,
        period_total,
        tier_resolution: tier.resolution,
        ..module.without_pricing()
    }
}
