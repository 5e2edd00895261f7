//! eventdesk CLI - price formatting and draft autosave

use anyhow::Result;
use clap::{Parser, Subcommand};
use pricing::CurrencyCode;
use rust_decimal::Decimal;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod cmd;
mod system_config;

/// eventdesk - Event pricing and draft tools
#[derive(Parser)]
#[command(name = "eventdesk")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (default: platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Format, parse and convert prices
    #[command(subcommand)]
    Price(PriceCommands),
    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Edit an event draft from stdin, autosaving to a JSON file
    Draft {
        /// Draft file to write
        #[arg(short, long)]
        output: PathBuf,
        /// Quiet period in milliseconds (default: autosave.interval_ms)
        #[arg(long)]
        interval_ms: Option<u64>,
    },
}

#[derive(Subcommand)]
enum PriceCommands {
    /// Format an amount as currency
    Format {
        #[arg(allow_negative_numbers = true)]
        amount: Decimal,
        #[command(flatten)]
        flags: cmd::price::FormatFlags,
    },
    /// Format a price for display ("Free" for zero)
    Display {
        #[arg(allow_negative_numbers = true)]
        amount: Decimal,
        #[command(flatten)]
        flags: cmd::price::FormatFlags,
        /// Show zero as a formatted amount
        #[arg(long)]
        no_free: bool,
    },
    /// Parse user-entered price text
    Parse {
        #[arg(allow_hyphen_values = true)]
        text: String,
        /// Strip this locale's group separator first
        #[arg(short, long)]
        locale: Option<String>,
    },
    /// Format a plain number with grouping
    Number {
        #[arg(allow_negative_numbers = true)]
        value: Decimal,
        /// Locale tag (default: pricing.locale)
        #[arg(short, long)]
        locale: Option<String>,
    },
    /// Convert an amount between currencies
    Convert {
        #[arg(allow_negative_numbers = true)]
        amount: Decimal,
        /// Source currency
        from: CurrencyCode,
        /// Target currency
        to: CurrencyCode,
        /// Print the result as formatted currency
        #[arg(short, long)]
        formatted: bool,
    },
    /// Show the rate table in use
    Rates,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// List all configuration values
    List,
    /// Get a configuration value
    Get {
        /// Config key (e.g., pricing.locale)
        key: String,
    },
    /// Set a configuration value
    Set {
        /// Config key (e.g., autosave.interval_ms)
        key: String,
        /// Value to set
        value: String,
    },
    /// Show config file path
    Path {
        /// Create the file with defaults if missing
        #[arg(long)]
        create: bool,
    },
    /// Show example configuration
    Example,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = system_config::resolve_path(cli.config.as_deref())?;

    match cli.command {
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::List => cmd::config::run_list(&config_path).await,
            ConfigCommands::Get { key } => cmd::config::run_get(&config_path, &key).await,
            ConfigCommands::Set { key, value } => {
                cmd::config::run_set(&config_path, &key, &value).await
            }
            ConfigCommands::Path { create } => cmd::config::run_path(&config_path, create).await,
            ConfigCommands::Example => cmd::config::run_example().await,
        },
        Commands::Price(price_cmd) => {
            let config = system_config::load(&config_path)?;
            match price_cmd {
                PriceCommands::Format { amount, flags } => {
                    cmd::price::run_format(&config, amount, &flags).await
                }
                PriceCommands::Display { amount, flags, no_free } => {
                    cmd::price::run_display(&config, amount, &flags, no_free).await
                }
                PriceCommands::Parse { text, locale } => {
                    cmd::price::run_parse(&text, locale.as_deref()).await
                }
                PriceCommands::Number { value, locale } => {
                    cmd::price::run_number(&config, value, locale.as_deref()).await
                }
                PriceCommands::Convert { amount, from, to, formatted } => {
                    cmd::price::run_convert(&config, amount, from, to, formatted).await
                }
                PriceCommands::Rates => cmd::price::run_rates(&config).await,
            }
        }
        Commands::Draft { output, interval_ms } => {
            let config = system_config::load(&config_path)?;
            cmd::draft::run(&config, &output, interval_ms).await
        }
    }
}
