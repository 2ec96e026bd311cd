use cotizador_core::config::{AppConfig, LoadOptions};
use cotizador_core::QuoteConfig;

use crate::commands::{CommandResult, EXIT_CONFIG};

pub fn run() -> CommandResult {
    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => CommandResult::payload("draft", &QuoteConfig::draft(&config.pricing.roles())),
        Err(error) => {
            CommandResult::failure("draft", "config_validation", error.to_string(), EXIT_CONFIG)
        }
    }
}
