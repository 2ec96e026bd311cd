pub mod catalog;
pub mod commands;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use cotizador_core::config::{AppConfig, LoadOptions, LogFormat, LoggingConfig};
use tracing_subscriber::EnvFilter;

use crate::commands::quote::QuoteArgs;

#[derive(Debug, Parser)]
#[command(
    name = "cotizador",
    about = "Cotizador subscription quote pricing CLI",
    long_about = "Price subscription quotes against the module price scheme, inspect configuration, and check catalog readiness.",
    after_help = "Examples:\n  cotizador draft > quote.json\n  cotizador quote --input quote.json --tiers tiers.json --periodicity annual\n  cotizador doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Price a quote configuration and print modules, hardware, and grand total")]
    Quote(QuoteArgs),
    #[command(about = "Print the default configuration for a new quote")]
    Draft,
    #[command(about = "List billing frequencies with multipliers and default discounts")]
    Periodicities,
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, price tier catalog availability, and module coverage")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

/// Directive filter for the configured level. The level is validated on load, so the fallback only
/// covers configurations built by hand.
fn log_filter(logging: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_new(logging.level.trim()).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the stderr subscriber. Falls back to defaults when the configuration is invalid;
/// the command itself reports the validation error.
fn init_logging() {
    let config = AppConfig::load(LoadOptions::default()).unwrap_or_default();
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(log_filter(&config.logging));

    match config.logging.format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Json => builder.json().init(),
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Command::Quote(args) => commands::quote::run(&args),
        Command::Draft => commands::draft::run(),
        Command::Periodicities => commands::periodicities::run(),
        Command::Config => commands::config::run(),
        Command::Doctor { json } => commands::doctor::run(json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
