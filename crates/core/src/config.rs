use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cpq::rates::RateCard;
use crate::domain::module::ModuleRoles;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub catalog: CatalogConfig,
    pub pricing: PricingConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct CatalogConfig {
    pub base_url: Option<String>,
    pub api_token: Option<SecretString>,
    pub timeout_secs: u64,
    pub tiers_path: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PricingConfig {
    pub human_resources_module_id: String,
    pub payroll_module_id: String,
    pub pre_payroll_module_id: String,
    pub stamp_units_per_employee: u32,
    pub extra_user_rate: Decimal,
    pub extra_surcharge_rate: Decimal,
    pub tax_rate: Decimal,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub catalog_base_url: Option<String>,
    pub catalog_tiers_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        let roles = ModuleRoles::default();
        let rates = RateCard::default();
        Self {
            catalog: CatalogConfig {
                base_url: None,
                api_token: None,
                timeout_secs: 30,
                tiers_path: None,
            },
            pricing: PricingConfig {
                human_resources_module_id: roles.id(crate::ModuleRole::HumanResources).0.clone(),
                payroll_module_id: roles.id(crate::ModuleRole::Payroll).0.clone(),
                pre_payroll_module_id: roles.id(crate::ModuleRole::PrePayroll).0.clone(),
                stamp_units_per_employee: rates.stamp_units_per_employee,
                extra_user_rate: rates.extra_user_rate,
                extra_surcharge_rate: rates.extra_surcharge_rate,
                tax_rate: rates.tax_rate,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl PricingConfig {
    pub fn roles(&self) -> ModuleRoles {
        ModuleRoles::new(
            self.human_resources_module_id.as_str(),
            self.payroll_module_id.as_str(),
            self.pre_payroll_module_id.as_str(),
        )
    }

    pub fn rate_card(&self) -> RateCard {
        RateCard {
            stamp_units_per_employee: self.stamp_units_per_employee,
            extra_user_rate: self.extra_user_rate,
            extra_surcharge_rate: self.extra_surcharge_rate,
            tax_rate: self.tax_rate,
        }
    }
}

impl CatalogConfig {
    pub fn api_token_value(&self) -> Option<&str> {
        self.api_token.as_ref().map(|token| token.expose_secret()) // ubs:ignore
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from("cotizador.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(catalog) = patch.catalog {
            if let Some(base_url) = catalog.base_url {
                self.catalog.base_url = Some(base_url);
            }
            if let Some(api_token_value) = catalog.api_token {
                self.catalog.api_token = Some(api_token_value.into()); // ubs:ignore
            }
            if let Some(timeout_secs) = catalog.timeout_secs {
                self.catalog.timeout_secs = timeout_secs;
            }
            if let Some(tiers_path) = catalog.tiers_path {
                self.catalog.tiers_path = Some(tiers_path);
            }
        }

        if let Some(pricing) = patch.pricing {
            if let Some(id) = pricing.human_resources_module_id {
                self.pricing.human_resources_module_id = id;
            }
            if let Some(id) = pricing.payroll_module_id {
                self.pricing.payroll_module_id = id;
            }
            if let Some(id) = pricing.pre_payroll_module_id {
                self.pricing.pre_payroll_module_id = id;
            }
            if let Some(units) = pricing.stamp_units_per_employee {
                self.pricing.stamp_units_per_employee = units;
            }
            if let Some(rate) = pricing.extra_user_rate {
                self.pricing.extra_user_rate = rate;
            }
            if let Some(rate) = pricing.extra_surcharge_rate {
                self.pricing.extra_surcharge_rate = rate;
            }
            if let Some(rate) = pricing.tax_rate {
                self.pricing.tax_rate = rate;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("COTIZADOR_CATALOG_BASE_URL") {
            self.catalog.base_url = Some(value);
        }
        if let Some(value) = read_env("COTIZADOR_CATALOG_API_TOKEN") {
            self.catalog.api_token = Some(value.into()); // ubs:ignore
        }
        if let Some(value) = read_env("COTIZADOR_CATALOG_TIMEOUT_SECS") {
            self.catalog.timeout_secs = parse_u64("COTIZADOR_CATALOG_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("COTIZADOR_CATALOG_TIERS_PATH") {
            self.catalog.tiers_path = Some(PathBuf::from(value));
        }

        if let Some(value) = read_env("COTIZADOR_PRICING_HUMAN_RESOURCES_MODULE_ID") {
            self.pricing.human_resources_module_id = value;
        }
        if let Some(value) = read_env("COTIZADOR_PRICING_PAYROLL_MODULE_ID") {
            self.pricing.payroll_module_id = value;
        }
        if let Some(value) = read_env("COTIZADOR_PRICING_PRE_PAYROLL_MODULE_ID") {
            self.pricing.pre_payroll_module_id = value;
        }
        if let Some(value) = read_env("COTIZADOR_PRICING_STAMP_UNITS_PER_EMPLOYEE") {
            self.pricing.stamp_units_per_employee =
                parse_u32("COTIZADOR_PRICING_STAMP_UNITS_PER_EMPLOYEE", &value)?;
        }
        if let Some(value) = read_env("COTIZADOR_PRICING_EXTRA_USER_RATE") {
            self.pricing.extra_user_rate =
                parse_decimal("COTIZADOR_PRICING_EXTRA_USER_RATE", &value)?;
        }
        if let Some(value) = read_env("COTIZADOR_PRICING_EXTRA_SURCHARGE_RATE") {
            self.pricing.extra_surcharge_rate =
                parse_decimal("COTIZADOR_PRICING_EXTRA_SURCHARGE_RATE", &value)?;
        }
        if let Some(value) = read_env("COTIZADOR_PRICING_TAX_RATE") {
            self.pricing.tax_rate = parse_decimal("COTIZADOR_PRICING_TAX_RATE", &value)?;
        }

        let log_level =
            read_env("COTIZADOR_LOGGING_LEVEL").or_else(|| read_env("COTIZADOR_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("COTIZADOR_LOGGING_FORMAT").or_else(|| read_env("COTIZADOR_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(base_url) = overrides.catalog_base_url {
            self.catalog.base_url = Some(base_url);
        }
        if let Some(tiers_path) = overrides.catalog_tiers_path {
            self.catalog.tiers_path = Some(tiers_path);
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_catalog(&self.catalog)?;
        validate_pricing(&self.pricing)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("cotizador.toml"), PathBuf::from("config/cotizador.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_catalog(catalog: &CatalogConfig) -> Result<(), ConfigError> {
    if catalog.timeout_secs == 0 || catalog.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "catalog.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    if let Some(base_url) = &catalog.base_url {
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::Validation(
                "catalog.base_url must start with http:// or https://".to_string(),
            ));
        }
    }

    let blank_token =
        catalog.api_token.as_ref().map(|token| token.expose_secret().trim().is_empty()); // ubs:ignore
    if blank_token == Some(true) {
        return Err(ConfigError::Validation(
            "catalog.api_token must not be blank when set".to_string(),
        ));
    }

    Ok(())
}

fn validate_pricing(pricing: &PricingConfig) -> Result<(), ConfigError> {
    let ids = [
        ("pricing.human_resources_module_id", &pricing.human_resources_module_id),
        ("pricing.payroll_module_id", &pricing.payroll_module_id),
        ("pricing.pre_payroll_module_id", &pricing.pre_payroll_module_id),
    ];
    for (key, id) in ids {
        if id.trim().is_empty() {
            return Err(ConfigError::Validation(format!("{key} must not be empty")));
        }
    }
    let distinct = pricing.human_resources_module_id != pricing.payroll_module_id
        && pricing.human_resources_module_id != pricing.pre_payroll_module_id
        && pricing.payroll_module_id != pricing.pre_payroll_module_id;
    if !distinct {
        return Err(ConfigError::Validation(
            "pricing module ids must be distinct for each module role".to_string(),
        ));
    }

    if pricing.extra_user_rate < Decimal::ZERO || pricing.extra_surcharge_rate < Decimal::ZERO {
        return Err(ConfigError::Validation(
            "pricing.extra_user_rate and pricing.extra_surcharge_rate must be >= 0".to_string(),
        ));
    }

    if pricing.tax_rate < Decimal::ZERO || pricing.tax_rate >= Decimal::ONE {
        return Err(ConfigError::Validation(
            "pricing.tax_rate must be a fraction in range 0..1 (e.g. 0.16)".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.trim().parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_decimal(key: &str, value: &str) -> Result<Decimal, ConfigError> {
    value.trim().parse::<Decimal>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    catalog: Option<CatalogPatch>,
    pricing: Option<PricingPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogPatch {
    base_url: Option<String>,
    api_token: Option<String>,
    timeout_secs: Option<u64>,
    tiers_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct PricingPatch {
    human_resources_module_id: Option<String>,
    payroll_module_id: Option<String>,
    pre_payroll_module_id: Option<String>,
    stamp_units_per_employee: Option<u32>,
    extra_user_rate: Option<Decimal>,
    extra_surcharge_rate: Option<Decimal>,
    tax_rate: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
