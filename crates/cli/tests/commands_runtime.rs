use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use cotizador_cli::commands::quote::QuoteArgs;
use cotizador_cli::commands::{config, doctor, draft, periodicities, quote};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tempfile::TempDir;

const HR: &str = "lK20zbAk4JRDVEa1";
const PAYROLL: &str = "NZ9DezJWqMQOnRE3";
const PRE_PAYROLL: &str = "b93BVzJ3zAZelEd7";

#[test]
fn draft_returns_new_quote_defaults() {
    with_env(&[], || {
        let result = draft::run();
        assert_eq!(result.exit_code, 0, "expected draft to succeed with default config");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["periodicitySelector"], 1);
        assert_eq!(payload["modules"].as_array().map(Vec::len), Some(3));
        assert_eq!(payload["modules"][0]["moduleId"], HR);
        assert_eq!(payload["modules"][0]["isActive"], true);
        assert_eq!(payload["modules"][0]["employeeNumber"], 60);
        assert_eq!(payload["productLines"].as_array().map(Vec::len), Some(9));
    });
}

#[test]
fn draft_uses_configured_module_ids() {
    with_env(&[("COTIZADOR_PRICING_HUMAN_RESOURCES_MODULE_ID", "hr-custom")], || {
        let payload = parse_payload(&draft::run().output);
        assert_eq!(payload["modules"][0]["moduleId"], "hr-custom");
    });
}

#[test]
fn periodicities_lists_the_billing_table() {
    with_env(&[], || {
        let result = periodicities::run();
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        let options = payload.as_array().expect("periodicity list");
        assert_eq!(options.len(), 4);
        assert_eq!(options[3]["label"], "Annual");
        assert_eq!(options[3]["multiplier"], 12);
    });
}

#[test]
fn quote_prices_annual_scenario_with_hardware() {
    with_env(&[], || {
        let dir = TempDir::new().expect("tempdir");
        let tiers = write_tiers(dir.path());
        let input = write_json(
            dir.path(),
            "quote.json",
            json!({
                "periodicitySelector": "4",
                "discountPercent": "0",
                "moduleDetails": [
                    {"moduleId": HR, "employeeNumber": "50", "isActive": "true"}
                ],
                "productDetails": [{"id": 7, "quantity": "2"}]
            }),
        );

        let result = quote::run(&QuoteArgs { input, tiers: Some(tiers), ..QuoteArgs::default() });
        assert_eq!(result.exit_code, 0, "unexpected failure: {}", result.output);

        let payload = parse_payload(&result.output);
        let totals = &payload["quote"]["totals"];
        assert_eq!(decimal(&totals["moduleSubtotal"]), Decimal::from(6000));
        assert_eq!(decimal(&totals["tax"]), Decimal::from(960));
        assert_eq!(decimal(&totals["total"]), Decimal::from(6960));
        assert_eq!(decimal(&payload["products"]["totalProducts"]), Decimal::from(5800));
        assert_eq!(decimal(&payload["grandTotal"]), Decimal::from(12760));
        assert_eq!(payload["quote"]["config"]["modules"][0]["name"], "Recursos Humanos");
    });
}

#[test]
fn quote_prices_saved_record_with_flat_extras_and_product_ids() {
    with_env(&[], || {
        let dir = TempDir::new().expect("tempdir");
        let tiers = write_tiers(dir.path());
        let input = write_json(
            dir.path(),
            "quote.json",
            json!({
                "periodicity": 1,
                "moduleDetails": [
                    {"moduleId": PAYROLL, "employeeNumber": 10, "isActive": true}
                ],
                "requiresStamps": true,
                "numberOfExtraUsers": "1",
                "productDetails": [{"id": 812, "productId": 6, "price": 150, "quantity": 3}]
            }),
        );

        let result = quote::run(&QuoteArgs { input, tiers: Some(tiers), ..QuoteArgs::default() });
        assert_eq!(result.exit_code, 0, "unexpected failure: {}", result.output);

        let payload = parse_payload(&result.output);
        let totals = &payload["quote"]["totals"];
        assert_eq!(decimal(&totals["surchargeAmount"]), Decimal::from(50));
        assert_eq!(decimal(&totals["extraUserAmount"]), Decimal::from(55));
        assert_eq!(decimal(&payload["products"]["subtotalProducts"]), Decimal::from(450));
    });
}

#[test]
fn quote_periodicity_switch_applies_default_discount_unless_kept() {
    with_env(&[], || {
        let dir = TempDir::new().expect("tempdir");
        let tiers = write_tiers(dir.path());
        let input = write_json(
            dir.path(),
            "quote.json",
            json!({
                "discountPercent": 3,
                "moduleDetails": [{"moduleId": HR, "employeeNumber": 50, "isActive": true}]
            }),
        );

        let args = QuoteArgs {
            input,
            tiers: Some(tiers),
            periodicity: Some("annual".to_string()),
            ..QuoteArgs::default()
        };
        let reset = parse_payload(&quote::run(&args).output);
        assert_eq!(reset["quote"]["config"]["periodicitySelector"], 4);
        assert_eq!(decimal(&reset["quote"]["config"]["discountPercent"]), Decimal::from(15));
        assert_eq!(decimal(&reset["quote"]["totals"]["discountAmount"]), Decimal::from(900));

        let kept = parse_payload(&quote::run(&QuoteArgs { keep_discount: true, ..args }).output);
        assert_eq!(decimal(&kept["quote"]["config"]["discountPercent"]), Decimal::from(3));
    });
}

#[test]
fn quote_without_tier_source_prices_modules_at_zero() {
    with_env(&[], || {
        let dir = TempDir::new().expect("tempdir");
        let input = write_json(dir.path(), "quote.json", json!({}));

        let result = quote::run(&QuoteArgs { input, ..QuoteArgs::default() });
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(decimal(&payload["quote"]["totals"]["total"]), Decimal::ZERO);
        assert_eq!(payload["quote"]["config"]["modules"][0]["tierResolution"], "unpriced");
    });
}

#[test]
fn strict_quote_fails_on_unpriced_module() {
    with_env(&[], || {
        let dir = TempDir::new().expect("tempdir");
        let input = write_json(dir.path(), "quote.json", json!({}));

        let result = quote::run(&QuoteArgs { input, strict: true, ..QuoteArgs::default() });
        assert_eq!(result.exit_code, 4);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "quote");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "bad_request");
        assert!(payload["message"].as_str().unwrap_or_default().contains(HR));
    });
}

#[test]
fn quote_reports_unreadable_input() {
    with_env(&[], || {
        let result = quote::run(&QuoteArgs {
            input: PathBuf::from("/nonexistent/quote.json"),
            ..QuoteArgs::default()
        });
        assert_eq!(result.exit_code, 3);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "bad_request");
    });
}

#[test]
fn quote_returns_config_failure_for_invalid_tax_rate() {
    with_env(&[("COTIZADOR_PRICING_TAX_RATE", "1.5")], || {
        let result = quote::run(&QuoteArgs::default());
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "quote");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn doctor_passes_with_full_tier_coverage() {
    let dir = TempDir::new().expect("tempdir");
    let tiers = write_tiers(dir.path());
    let tiers = tiers.to_string_lossy().into_owned();

    with_env(&[("COTIZADOR_CATALOG_TIERS_PATH", tiers.as_str())], || {
        let result = doctor::run(true);
        assert_eq!(result.exit_code, 0, "unexpected doctor failure: {}", result.output);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["overall_status"], "pass");
        assert_eq!(payload["checks"][1]["name"], "price_tier_catalog");
        assert_eq!(payload["checks"][2]["name"], "role_coverage");
    });
}

#[test]
fn doctor_fails_without_tier_source() {
    with_env(&[], || {
        let result = doctor::run(true);
        assert_eq!(result.exit_code, 1);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["overall_status"], "fail");
        assert_eq!(payload["checks"][0]["status"], "pass");
        assert_eq!(payload["checks"][1]["status"], "fail");
        assert_eq!(payload["checks"][2]["status"], "skipped");
    });
}

#[test]
fn doctor_reports_missing_role_coverage() {
    let dir = TempDir::new().expect("tempdir");
    let tiers = write_json(
        dir.path(),
        "tiers.json",
        json!([{"id": 1, "productId": HR, "resourceId": PAYROLL, "resourceNumber": 50, "unitPrice": 10}]),
    );
    let tiers = tiers.to_string_lossy().into_owned();

    with_env(&[("COTIZADOR_CATALOG_TIERS_PATH", tiers.as_str())], || {
        let result = doctor::run(false);
        assert_eq!(result.exit_code, 1);
        assert!(result.output.contains("[fail] role_coverage"));
        assert!(result.output.contains(PRE_PAYROLL));
    });
}

#[test]
fn config_redacts_catalog_token_and_attributes_sources() {
    with_env(
        &[
            ("COTIZADOR_CATALOG_API_TOKEN", "eyJhbGciOiJIUzI1NiJ9.secret-part"),
            ("COTIZADOR_LOG_LEVEL", "debug"),
        ],
        || {
            let result = config::run();
            assert_eq!(result.exit_code, 0);
            assert!(!result.output.contains("secret-part"));
            assert!(result.output.contains("catalog.api_token = eyJh***"));
            assert!(result.output.contains("logging.level = debug (source: env (COTIZADOR_LOG_LEVEL))"));
            assert!(result.output.contains("pricing.tax_rate = 0.16 (source: default)"));
        },
    );
}

fn write_tiers(dir: &Path) -> PathBuf {
    write_json(
        dir,
        "tiers.json",
        json!([
            {"id": 1, "productId": HR, "resourceId": PAYROLL, "resourceNumber": 50, "unitPrice": "10.00"},
            {"id": 2, "productId": HR, "resourceId": PAYROLL, "resourceNumber": 100, "unitPrice": "8.00"},
            {"id": 3, "productId": PAYROLL, "resourceId": PAYROLL, "resourceNumber": 100, "unitPrice": "15.50"},
            {"id": 4, "productId": PRE_PAYROLL, "resourceId": PAYROLL, "resourceNumber": 100, "unitPrice": "4.75"}
        ]),
    )
}

fn write_json(dir: &Path, name: &str, value: Value) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, value.to_string()).expect("fixture should be writable");
    path
}

fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(text) => text.parse().expect("decimal string"),
        other => other.to_string().parse().expect("decimal number"),
    }
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).unwrap_or_else(|error| {
        panic!("command output should be valid JSON ({error}): {output}");
    })
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "COTIZADOR_CATALOG_BASE_URL",
        "COTIZADOR_CATALOG_API_TOKEN",
        "COTIZADOR_CATALOG_TIMEOUT_SECS",
        "COTIZADOR_CATALOG_TIERS_PATH",
        "COTIZADOR_PRICING_HUMAN_RESOURCES_MODULE_ID",
        "COTIZADOR_PRICING_PAYROLL_MODULE_ID",
        "COTIZADOR_PRICING_PRE_PAYROLL_MODULE_ID",
        "COTIZADOR_PRICING_STAMP_UNITS_PER_EMPLOYEE",
        "COTIZADOR_PRICING_EXTRA_USER_RATE",
        "COTIZADOR_PRICING_EXTRA_SURCHARGE_RATE",
        "COTIZADOR_PRICING_TAX_RATE",
        "COTIZADOR_LOGGING_LEVEL",
        "COTIZADOR_LOGGING_FORMAT",
        "COTIZADOR_LOG_LEVEL",
        "COTIZADOR_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
