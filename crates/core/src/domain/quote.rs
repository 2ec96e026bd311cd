use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::coerce;
use crate::cpq::periodicity::Periodicity;
use crate::domain::module::{ModuleConfig, ModuleId, ModuleRole, ModuleRoles};
use crate::domain::product::{HardwareCatalog, ProductLine, ProductLineId};

const DRAFT_BASE_EMPLOYEES: u32 = 60;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtrasConfig {
    #[serde(default, alias = "requiresStamps", deserialize_with = "coerce::lenient_flag")]
    pub requires_surcharge: bool,
    #[serde(default, alias = "numberOfExtraUsers", deserialize_with = "coerce::lenient_count")]
    pub extra_user_count: u32,
    #[serde(default, alias = "numberOfExtraRings", deserialize_with = "coerce::lenient_count")]
    pub extra_surcharge_unit_count: u32,
}

/// Caller-owned quote configuration. The engine receives it by reference and returns new values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "QuoteRecord")]
pub struct QuoteConfig {
    #[serde(rename = "periodicitySelector")]
    pub periodicity: Periodicity,
    pub discount_percent: Decimal,
    pub modules: Vec<ModuleConfig>,
    pub extras: ExtrasConfig,
    pub product_lines: Vec<ProductLine>,
}

/// Accepted input shape. Besides the nested `extras` object, saved form records carry the
/// surcharge and extras as flat top-level fields.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteRecord {
    #[serde(default, rename = "periodicitySelector", alias = "periodicity")]
    periodicity: Periodicity,
    #[serde(default, alias = "discount", deserialize_with = "coerce::lenient_percent")]
    discount_percent: Decimal,
    #[serde(default, alias = "moduleDetails")]
    modules: Vec<ModuleConfig>,
    #[serde(default)]
    extras: Option<ExtrasConfig>,
    #[serde(default, alias = "productDetails")]
    product_lines: Vec<ProductLine>,
    #[serde(default)]
    requires_stamps: Option<Value>,
    #[serde(default)]
    number_of_extra_users: Option<Value>,
    #[serde(default)]
    number_of_extra_rings: Option<Value>,
}

impl From<QuoteRecord> for QuoteConfig {
    fn from(record: QuoteRecord) -> Self {
        let extras = record.extras.unwrap_or_else(|| ExtrasConfig {
            requires_surcharge: record
                .requires_stamps
                .as_ref()
                .map(coerce::flag_from_value)
                .unwrap_or(false),
            extra_user_count: record
                .number_of_extra_users
                .as_ref()
                .map(coerce::count_from_value)
                .unwrap_or(0),
            extra_surcharge_unit_count: record
                .number_of_extra_rings
                .as_ref()
                .map(coerce::count_from_value)
                .unwrap_or(0),
        });

        Self {
            periodicity: record.periodicity,
            discount_percent: record.discount_percent,
            modules: record.modules,
            extras,
            product_lines: record.product_lines,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteTotals {
    pub multiplier: u32,
    pub price_per_employee: Decimal,
    pub module_subtotal: Decimal,
    pub discount_amount: Decimal,
    pub surcharge_amount: Decimal,
    pub extra_user_amount: Decimal,
    pub extra_surcharge_amount: Decimal,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl QuoteConfig {
    /// New-quote defaults: first periodicity, no discount, only the base module active.
    pub fn draft(roles: &ModuleRoles) -> Self {
        let modules = ModuleRole::ALL
            .into_iter()
            .map(|role| {
                if role == ModuleRole::BASE {
                    ModuleConfig::for_role(roles, role, DRAFT_BASE_EMPLOYEES, true)
                } else {
                    ModuleConfig::for_role(roles, role, 0, false)
                }
            })
            .collect();

        Self {
            periodicity: Periodicity::default(),
            discount_percent: Decimal::ZERO,
            modules,
            extras: ExtrasConfig::default(),
            product_lines: HardwareCatalog::default_lines(),
        }
    }

    /// Overlays a persisted quote on `template`. Modules match on module id and product lines on
    /// their catalog key; display names always come from the template and unknown persisted
    /// entries are dropped.
    pub fn hydrate(template: &QuoteConfig, persisted: &QuoteConfig) -> Self {
        let modules = template
            .modules
            .iter()
            .map(|template_module| {
                persisted
                    .modules
                    .iter()
                    .find(|module| module.module_id == template_module.module_id)
                    .map(|module| ModuleConfig { name: template_module.name.clone(), ..module.clone() })
                    .unwrap_or_else(|| template_module.clone())
            })
            .collect();

        let product_lines = template
            .product_lines
            .iter()
            .map(|template_line| {
                persisted
                    .product_lines
                    .iter()
                    .find(|line| line.catalog_id() == &template_line.id)
                    .map(|line| ProductLine {
                        quantity: line.quantity,
                        line_total: line.line_total,
                        ..template_line.clone()
                    })
                    .unwrap_or_else(|| template_line.clone())
            })
            .collect();

        Self {
            periodicity: persisted.periodicity,
            discount_percent: coerce::clamp_percent(persisted.discount_percent),
            modules,
            extras: persisted.extras.clone(),
            product_lines,
        }
    }

    pub fn module(&self, module_id: &ModuleId) -> Option<&ModuleConfig> {
        self.modules.iter().find(|module| &module.module_id == module_id)
    }
}

/// Toggles one module. Turning the surcharge-driving module off also clears the surcharge
/// request and any extra surcharge units, since both only apply while it is active.
pub fn set_module_active(
    config: &QuoteConfig,
    module_id: &ModuleId,
    active: bool,
    roles: &ModuleRoles,
) -> QuoteConfig {
    let modules = config
        .modules
        .iter()
        .map(|module| {
            if &module.module_id == module_id {
                ModuleConfig { is_active: active, ..module.clone() }
            } else {
                module.clone()
            }
        })
        .collect();

    let extras = if !active && module_id == roles.surcharge_driving() {
        ExtrasConfig { requires_surcharge: false, extra_surcharge_unit_count: 0, ..config.extras.clone() }
    } else {
        config.extras.clone()
    };

    QuoteConfig { modules, extras, ..config.clone() }
}

pub fn set_module_employees(config: &QuoteConfig, module_id: &ModuleId, employees: u32) -> QuoteConfig {
    let modules = config
        .modules
        .iter()
        .map(|module| {
            if &module.module_id == module_id {
                ModuleConfig { employee_number: employees, ..module.clone() }
            } else {
                module.clone()
            }
        })
        .collect();

    QuoteConfig { modules, ..config.clone() }
}

pub fn set_product_quantity(
    lines: &[ProductLine],
    line_id: &ProductLineId,
    quantity: u32,
) -> Vec<ProductLine> {
    lines
        .iter()
        .map(|line| {
            if &line.id == line_id {
                ProductLine { quantity, ..line.clone() }
            } else {
                line.clone()
            }
        })
        .collect()
}
