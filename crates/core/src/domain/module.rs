use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::coerce;

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ModuleId(pub String);

impl From<String> for ModuleId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ModuleId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for ModuleId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        coerce::lenient_id(deserializer)
    }
}

impl std::fmt::Display for ModuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stable role of a sellable module, independent of its catalog identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleRole {
    HumanResources,
    Payroll,
    PrePayroll,
}

impl ModuleRole {
    pub const ALL: [ModuleRole; 3] =
        [ModuleRole::HumanResources, ModuleRole::Payroll, ModuleRole::PrePayroll];

    /// Module whose activation and headcount drive the stamp surcharge. Every price tier is
    /// also keyed against this module's identity.
    pub const SURCHARGE_DRIVING: ModuleRole = ModuleRole::Payroll;

    /// Module quoted by default and used for the per-employee reference price.
    pub const BASE: ModuleRole = ModuleRole::HumanResources;

    pub fn as_str(self) -> &'static str {
        match self {
            Self::HumanResources => "human_resources",
            Self::Payroll => "payroll",
            Self::PrePayroll => "pre_payroll",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::HumanResources => "Recursos Humanos",
            Self::Payroll => "Nómina",
            Self::PrePayroll => "Pre-Nómina",
        }
    }
}

/// Role to catalog identifier lookup, injected at startup from configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleRoles {
    human_resources: ModuleId,
    payroll: ModuleId,
    pre_payroll: ModuleId,
}

impl Default for ModuleRoles {
    fn default() -> Self {
        Self::new("lK20zbAk4JRDVEa1", "NZ9DezJWqMQOnRE3", "b93BVzJ3zAZelEd7")
    }
}

impl ModuleRoles {
    pub fn new(
        human_resources: impl Into<ModuleId>,
        payroll: impl Into<ModuleId>,
        pre_payroll: impl Into<ModuleId>,
    ) -> Self {
        Self {
            human_resources: human_resources.into(),
            payroll: payroll.into(),
            pre_payroll: pre_payroll.into(),
        }
    }

    pub fn id(&self, role: ModuleRole) -> &ModuleId {
        match role {
            ModuleRole::HumanResources => &self.human_resources,
            ModuleRole::Payroll => &self.payroll,
            ModuleRole::PrePayroll => &self.pre_payroll,
        }
    }

    pub fn surcharge_driving(&self) -> &ModuleId {
        self.id(ModuleRole::SURCHARGE_DRIVING)
    }

    pub fn role_of(&self, module_id: &ModuleId) -> Option<ModuleRole> {
        ModuleRole::ALL.into_iter().find(|role| self.id(*role) == module_id)
    }
}

/// How a module's unit price was obtained on the last recomputation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierResolution {
    #[default]
    Inactive,
    /// Smallest tier whose threshold covers the headcount.
    Ceiling,
    /// Headcount exceeds every tier; the top tier's unit price is reused.
    Overflow,
    /// Active module with no tier rows at all; priced at zero.
    Unpriced,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleConfig {
    pub module_id: ModuleId,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "coerce::lenient_count")]
    pub employee_number: u32,
    #[serde(default, deserialize_with = "coerce::lenient_flag")]
    pub is_active: bool,
    #[serde(default, alias = "price", deserialize_with = "coerce::lenient_decimal")]
    pub resolved_unit_price: Decimal,
    #[serde(default, alias = "userNumberFree", deserialize_with = "coerce::lenient_count")]
    pub included_free_users: u32,
    #[serde(default, alias = "stamp", deserialize_with = "coerce::lenient_count")]
    pub stamp_count: u32,
    #[serde(default, deserialize_with = "coerce::lenient_decimal")]
    pub period_total: Decimal,
    #[serde(default)]
    pub tier_resolution: TierResolution,
}

impl ModuleConfig {
    pub fn new(
        module_id: impl Into<ModuleId>,
        name: impl Into<String>,
        employee_number: u32,
        is_active: bool,
    ) -> Self {
        Self {
            module_id: module_id.into(),
            name: name.into(),
            employee_number,
            is_active,
            resolved_unit_price: Decimal::ZERO,
            included_free_users: 0,
            stamp_count: 0,
            period_total: Decimal::ZERO,
            tier_resolution: TierResolution::Inactive,
        }
    }

    pub fn for_role(roles: &ModuleRoles, role: ModuleRole, employee_number: u32, active: bool) -> Self {
        Self::new(roles.id(role).clone(), role.display_name(), employee_number, active)
    }

    /// Same module with every derived pricing field cleared.
    pub fn without_pricing(&self) -> Self {
        Self::new(self.module_id.clone(), self.name.clone(), self.employee_number, self.is_active)
    }
}
