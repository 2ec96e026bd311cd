use std::fs;
use std::path::PathBuf;

use clap::Args;
use cotizador_core::config::{AppConfig, LoadOptions};
use cotizador_core::{
    apply_periodicity, ensure_fully_priced, load_or_empty, ApplicationError,
    DeterministicQuoteEngine, DiscountReset, Periodicity, PriceTierTable, QuoteConfig, QuoteEngine,
};
use tracing::{info, warn};

use crate::catalog::select_source;
use crate::commands::{block_on, CommandResult, EXIT_CONFIG, EXIT_REQUEST, EXIT_RUNTIME, EXIT_UNPRICED};

const COMMAND: &str = "quote";

#[derive(Clone, Debug, Default, Args)]
pub struct QuoteArgs {
    /// Quote configuration as JSON (a persisted quote or a `draft` output)
    #[arg(long)]
    pub input: PathBuf,
    /// Price tier list as JSON; overrides the configured catalog
    #[arg(long)]
    pub tiers: Option<PathBuf>,
    /// Switch billing frequency before pricing (id 1-4 or name)
    #[arg(long)]
    pub periodicity: Option<String>,
    /// Keep the input discount when --periodicity is given
    #[arg(long)]
    pub keep_discount: bool,
    /// Fail when an active module has no matching price tier
    #[arg(long)]
    pub strict: bool,
}

pub fn run(args: &QuoteArgs) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(COMMAND, "config_validation", error.to_string(), EXIT_CONFIG)
        }
    };
    let correlation_id = correlation_id(args);
    let roles = config.pricing.roles();

    let persisted = match read_quote(args) {
        Ok(persisted) => persisted,
        Err(error) => {
            let error = error.into_interface(correlation_id);
            return CommandResult::interface_failure(COMMAND, &error, EXIT_REQUEST);
        }
    };
    let mut quote = QuoteConfig::hydrate(&QuoteConfig::draft(&roles), &persisted);

    if let Some(selector) = args.periodicity.as_deref() {
        let reset =
            if args.keep_discount { DiscountReset::KeepManual } else { DiscountReset::ApplyDefault };
        quote = apply_periodicity(&quote, Periodicity::from_selector(selector), reset);
    }

    let tiers = match load_tiers(&config, args) {
        Ok(tiers) => tiers,
        Err(message) => return CommandResult::failure(COMMAND, "runtime", message, EXIT_RUNTIME),
    };

    let engine = DeterministicQuoteEngine::new(tiers, roles, config.pricing.rate_card());
    let summary = engine.recalculate_all(&quote);

    if args.strict {
        if let Err(error) = ensure_fully_priced(&summary.quote) {
            let error = ApplicationError::from(error).into_interface(correlation_id);
            return CommandResult::interface_failure(COMMAND, &error, EXIT_UNPRICED);
        }
    }

    info!(
        event_name = "cli.quote.priced",
        periodicity = summary.quote.config.periodicity.label(),
        total = %summary.quote.totals.total,
        grand_total = %summary.grand_total,
        unpriced = summary.quote.unpriced_modules().len(),
        "quote priced"
    );

    CommandResult::payload(COMMAND, &summary)
}

fn read_quote(args: &QuoteArgs) -> Result<QuoteConfig, ApplicationError> {
    let raw = fs::read_to_string(&args.input).map_err(|error| {
        ApplicationError::Input(format!("could not read `{}`: {error}", args.input.display()))
    })?;

    serde_json::from_str::<QuoteConfig>(&raw).map_err(|error| {
        ApplicationError::Input(format!("`{}` is not a quote: {error}", args.input.display()))
    })
}

fn load_tiers(config: &AppConfig, args: &QuoteArgs) -> Result<PriceTierTable, String> {
    match select_source(&config.catalog, args.tiers.clone()) {
        Some(source) => block_on(async move { load_or_empty(source.as_ref()).await }),
        None => {
            warn!(
                event_name = "cli.quote.no_tier_source",
                "no price tier source configured; modules are priced at zero"
            );
            Ok(PriceTierTable::empty())
        }
    }
}

fn correlation_id(args: &QuoteArgs) -> String {
    let name = args
        .input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "stdin".to_string());
    format!("{COMMAND}:{name}")
}
