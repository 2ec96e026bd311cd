use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cpq::discount::discount_amount;
use crate::cpq::money::saturating_add;
use crate::cpq::periodicity::Periodicity;
use crate::cpq::rates::RateCard;
use crate::cpq::stamps::{stamps_for, surcharge_stamps};
use crate::cpq::tiers::price_module;
use crate::cpq::totals::{aggregate_totals, TotalsInput};
use crate::domain::module::{ModuleConfig, ModuleId, ModuleRole, ModuleRoles, TierResolution};
use crate::domain::price_tier::PriceTierTable;
use crate::domain::quote::{QuoteConfig, QuoteTotals};
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTraceStep {
    pub stage: String,
    pub detail: String,
    pub amount: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTrace {
    pub periodicity: Periodicity,
    pub steps: Vec<PricingTraceStep>,
}

impl PricingTrace {
    fn push(&mut self, stage: impl Into<String>, detail: impl Into<String>, amount: Decimal) {
        self.steps.push(PricingTraceStep { stage: stage.into(), detail: detail.into(), amount });
    }
}

/// Configuration with module pricing recomputed and top-level totals attached.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricedQuote {
    pub config: QuoteConfig,
    pub totals: QuoteTotals,
    pub trace: PricingTrace,
}

impl PricedQuote {
    pub fn unpriced_modules(&self) -> Vec<&ModuleId> {
        self.config
            .modules
            .iter()
            .filter(|module| module.is_active && module.tier_resolution == TierResolution::Unpriced)
            .map(|module| &module.module_id)
            .collect()
    }
}

/// Strict check for callers that must not present a silently zero-priced module.
pub fn ensure_fully_priced(priced: &PricedQuote) -> Result<(), DomainError> {
    match priced.unpriced_modules().first() {
        Some(module_id) => Err(DomainError::UnpricedModule { module_id: (*module_id).clone() }),
        None => Ok(()),
    }
}

/// Full recomputation: stamps, module tiers, discount, then totals. Pure and idempotent; every
/// derived field of the input is ignored and rebuilt.
pub fn calculate_totals(
    config: &QuoteConfig,
    tiers: &PriceTierTable,
    roles: &ModuleRoles,
    rates: &RateCard,
) -> PricedQuote {
    let multiplier = config.periodicity.multiplier();
    let tier_key = roles.surcharge_driving();
    let total_stamps = surcharge_stamps(&config.modules, &config.extras, roles, rates);
    let mut trace = PricingTrace { periodicity: config.periodicity, steps: Vec::new() };

    let modules: Vec<ModuleConfig> = config
        .modules
        .iter()
        .map(|module| {
            let stamps = stamps_for(module, total_stamps, roles);
            price_module(module, stamps, tiers, tier_key, multiplier)
        })
        .collect();

    let mut module_subtotal = Decimal::ZERO;
    for module in modules.iter().filter(|module| module.is_active) {
        module_subtotal = saturating_add(module_subtotal, module.period_total);
        trace.push(
            format!("module:{}", module.module_id),
            format!(
                "round(round({} * {}) * {multiplier})",
                module.resolved_unit_price, module.employee_number
            ),
            module.period_total,
        );
    }
    trace.push("module_subtotal", "sum(active module period totals)", module_subtotal);

    let price_per_employee = modules
        .iter()
        .find(|module| module.is_active && &module.module_id == roles.id(ModuleRole::BASE))
        .map(|module| module.resolved_unit_price)
        .unwrap_or(Decimal::ZERO);

    let discount = discount_amount(module_subtotal, config.discount_percent);
    trace.push(
        "discount",
        format!("round(module_subtotal * {}%)", config.discount_percent),
        discount,
    );

    let totals = aggregate_totals(
        &TotalsInput {
            module_subtotal,
            discount_amount: discount,
            price_per_employee,
            stamp_count: total_stamps,
            extra_user_count: config.extras.extra_user_count,
            extra_surcharge_unit_count: config.extras.extra_surcharge_unit_count,
            multiplier,
        },
        rates,
    );
    trace.push("surcharge", format!("round({total_stamps} stamps * {multiplier})"), totals.surcharge_amount);
    trace.push(
        "extra_users",
        format!("round({} * {} * {multiplier})", config.extras.extra_user_count, rates.extra_user_rate),
        totals.extra_user_amount,
    );
    trace.push(
        "extra_surcharge",
        format!(
            "round({} * {} * {multiplier})",
            config.extras.extra_surcharge_unit_count, rates.extra_surcharge_rate
        ),
        totals.extra_surcharge_amount,
    );
    trace.push("subtotal", "modules + surcharge + extras - discount", totals.subtotal);
    trace.push("tax", format!("round(subtotal * {})", rates.tax_rate), totals.tax);
    trace.push("total", "round(subtotal + tax)", totals.total);

    debug!(
        event_name = "pricing.quote.recalculated",
        periodicity = config.periodicity.label(),
        module_count = modules.len(),
        tier_rows = tiers.len(),
        total = %totals.total,
        "quote totals recalculated"
    );

    PricedQuote { config: QuoteConfig { modules, ..config.clone() }, totals, trace }
}
