use cotizador_core::config::{AppConfig, LoadOptions};
use cotizador_core::{ModuleRole, PriceTierTable};
use serde::Serialize;

use crate::catalog::select_source;
use crate::commands::{block_on, CommandResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { 1 };

    if json_output {
        let output = serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
        return CommandResult { exit_code, output };
    }

    CommandResult { exit_code, output: render_human(&report) }
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            match check_price_tiers(&config) {
                Ok((check, table)) => {
                    checks.push(check);
                    checks.push(check_role_coverage(&config, &table));
                }
                Err(check) => {
                    checks.push(check);
                    checks.push(skipped("role_coverage", "price tiers did not load"));
                }
            }
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(skipped("price_tier_catalog", "configuration did not load"));
            checks.push(skipped("role_coverage", "configuration did not load"));
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn skipped(name: &'static str, reason: &str) -> DoctorCheck {
    DoctorCheck {
        name,
        status: CheckStatus::Skipped,
        details: format!("skipped because {reason}"),
    }
}

fn check_price_tiers(config: &AppConfig) -> Result<(DoctorCheck, PriceTierTable), DoctorCheck> {
    let fail = |details: String| DoctorCheck {
        name: "price_tier_catalog",
        status: CheckStatus::Fail,
        details,
    };

    let Some(source) = select_source(&config.catalog, None) else {
        return Err(fail(
            "no price tier source configured (set catalog.base_url or catalog.tiers_path)"
                .to_string(),
        ));
    };

    let fetched = block_on(async move { source.fetch_price_tiers().await }).map_err(fail)?;
    match fetched {
        Ok(table) if table.is_empty() => Err(fail("price tier catalog returned no rows".to_string())),
        Ok(table) => Ok((
            DoctorCheck {
                name: "price_tier_catalog",
                status: CheckStatus::Pass,
                details: format!("loaded {} price tier rows", table.len()),
            },
            table,
        )),
        Err(error) => Err(fail(error.to_string())),
    }
}

fn check_role_coverage(config: &AppConfig, table: &PriceTierTable) -> DoctorCheck {
    let roles = config.pricing.roles();
    let missing: Vec<String> = ModuleRole::ALL
        .into_iter()
        .filter(|role| table.candidates(roles.id(*role), roles.surcharge_driving()).is_empty())
        .map(|role| format!("{} ({})", role.display_name(), roles.id(role)))
        .collect();

    if missing.is_empty() {
        DoctorCheck {
            name: "role_coverage",
            status: CheckStatus::Pass,
            details: "every module role has at least one price tier".to_string(),
        }
    } else {
        DoctorCheck {
            name: "role_coverage",
            status: CheckStatus::Fail,
            details: format!("no price tiers for: {}", missing.join(", ")),
        }
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
