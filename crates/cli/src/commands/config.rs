use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use cotizador_core::config::{AppConfig, LoadOptions};
use toml::Value;

use crate::commands::{CommandResult, EXIT_CONFIG};

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure("config", "config_validation", error.to_string(), EXIT_CONFIG)
        }
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let catalog = &config.catalog;
    let pricing = &config.pricing;
    let api_token = match config.catalog.api_token_value() {
        Some(token) => redact_token(token),
        None => "<unset>".to_string(),
    };
    let tiers_path = catalog
        .tiers_path
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "<unset>".to_string());

    let fields: Vec<(&str, String, Vec<&str>)> = vec![
        (
            "catalog.base_url",
            catalog.base_url.clone().unwrap_or_else(|| "<unset>".to_string()),
            vec!["COTIZADOR_CATALOG_BASE_URL"],
        ),
        ("catalog.api_token", api_token, vec!["COTIZADOR_CATALOG_API_TOKEN"]),
        (
            "catalog.timeout_secs",
            catalog.timeout_secs.to_string(),
            vec!["COTIZADOR_CATALOG_TIMEOUT_SECS"],
        ),
        ("catalog.tiers_path", tiers_path, vec!["COTIZADOR_CATALOG_TIERS_PATH"]),
        (
            "pricing.human_resources_module_id",
            pricing.human_resources_module_id.clone(),
            vec!["COTIZADOR_PRICING_HUMAN_RESOURCES_MODULE_ID"],
        ),
        (
            "pricing.payroll_module_id",
            pricing.payroll_module_id.clone(),
            vec!["COTIZADOR_PRICING_PAYROLL_MODULE_ID"],
        ),
        (
            "pricing.pre_payroll_module_id",
            pricing.pre_payroll_module_id.clone(),
            vec!["COTIZADOR_PRICING_PRE_PAYROLL_MODULE_ID"],
        ),
        (
            "pricing.stamp_units_per_employee",
            pricing.stamp_units_per_employee.to_string(),
            vec!["COTIZADOR_PRICING_STAMP_UNITS_PER_EMPLOYEE"],
        ),
        (
            "pricing.extra_user_rate",
            pricing.extra_user_rate.to_string(),
            vec!["COTIZADOR_PRICING_EXTRA_USER_RATE"],
        ),
        (
            "pricing.extra_surcharge_rate",
            pricing.extra_surcharge_rate.to_string(),
            vec!["COTIZADOR_PRICING_EXTRA_SURCHARGE_RATE"],
        ),
        ("pricing.tax_rate", pricing.tax_rate.to_string(), vec!["COTIZADOR_PRICING_TAX_RATE"]),
        (
            "logging.level",
            config.logging.level.clone(),
            vec!["COTIZADOR_LOGGING_LEVEL", "COTIZADOR_LOG_LEVEL"],
        ),
        (
            "logging.format",
            format!("{:?}", config.logging.format),
            vec!["COTIZADOR_LOGGING_FORMAT", "COTIZADOR_LOG_FORMAT"],
        ),
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for (key, value, env_keys) in &fields {
        let source =
            field_source(key, env_keys, config_file_doc.as_ref(), config_file_path.as_deref());
        lines.push(render_line(key, value, source));
    }

    CommandResult { exit_code: 0, output: lines.join("\n") }
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("cotizador.toml"), PathBuf::from("config/cotizador.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

fn redact_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    let visible: String = trimmed.chars().take(4).collect();
    if trimmed.chars().count() > 8 {
        return format!("{visible}***");
    }

    "<redacted>".to_string()
}
