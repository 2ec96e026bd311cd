use crate::cpq::rates::RateCard;
use crate::domain::module::{ModuleConfig, ModuleRoles};
use crate::domain::quote::ExtrasConfig;

/// Stamp units for the surcharge-driving module. Zero when the module is inactive, when no
/// surcharge was requested, or when the configuration does not carry the module at all.
pub fn surcharge_stamps(
    modules: &[ModuleConfig],
    extras: &ExtrasConfig,
    roles: &ModuleRoles,
    rates: &RateCard,
) -> u32 {
    let driving_id = roles.surcharge_driving();
    let Some(driving) = modules.iter().find(|module| &module.module_id == driving_id) else {
        return 0;
    };

    stamp_count(driving.is_active, driving.employee_number, extras.requires_surcharge, rates)
}

pub fn stamp_count(active: bool, employees: u32, requires_surcharge: bool, rates: &RateCard) -> u32 {
    if !active || !requires_surcharge {
        return 0;
    }
    employees.saturating_mul(rates.stamp_units_per_employee)
}

/// Stamps carried by a single module: only the surcharge-driving module ever holds any.
pub fn stamps_for(module: &ModuleConfig, total_stamps: u32, roles: &ModuleRoles) -> u32 {
    if module.is_active && &module.module_id == roles.surcharge_driving() {
        total_stamps
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::{stamp_count, stamps_for, surcharge_stamps};
    use crate::cpq::rates::RateCard;
    use crate::domain::module::{ModuleConfig, ModuleRole, ModuleRoles};
    use crate::domain::quote::ExtrasConfig;

    fn modules(roles: &ModuleRoles, payroll_active: bool, payroll_employees: u32) -> Vec<ModuleConfig> {
        vec![
            ModuleConfig::for_role(roles, ModuleRole::HumanResources, 60, true),
            ModuleConfig::for_role(roles, ModuleRole::Payroll, payroll_employees, payroll_active),
        ]
    }

    #[test]
    fn active_payroll_with_surcharge_bills_five_units_per_employee() {
        let roles = ModuleRoles::default();
        let extras = ExtrasConfig { requires_surcharge: true, ..ExtrasConfig::default() };

        let stamps = surcharge_stamps(&modules(&roles, true, 40), &extras, &roles, &RateCard::default());
        assert_eq!(stamps, 200);
    }

    #[test]
    fn inactive_payroll_or_no_request_yields_zero() {
        let roles = ModuleRoles::default();
        let rates = RateCard::default();
        let requested = ExtrasConfig { requires_surcharge: true, ..ExtrasConfig::default() };

        assert_eq!(surcharge_stamps(&modules(&roles, false, 40), &requested, &roles, &rates), 0);
        assert_eq!(
            surcharge_stamps(&modules(&roles, true, 40), &ExtrasConfig::default(), &roles, &rates),
            0
        );
        assert_eq!(stamp_count(true, 0, true, &rates), 0);
    }

    #[test]
    fn missing_payroll_module_yields_zero() {
        let roles = ModuleRoles::default();
        let extras = ExtrasConfig { requires_surcharge: true, ..ExtrasConfig::default() };
        let only_base = vec![ModuleConfig::for_role(&roles, ModuleRole::HumanResources, 60, true)];

        assert_eq!(surcharge_stamps(&only_base, &extras, &roles, &RateCard::default()), 0);
    }

    #[test]
    fn only_the_driving_module_carries_stamps() {
        let roles = ModuleRoles::default();
        let all = modules(&roles, true, 10);

        assert_eq!(stamps_for(&all[0], 50, &roles), 0);
        assert_eq!(stamps_for(&all[1], 50, &roles), 50);
    }
}
