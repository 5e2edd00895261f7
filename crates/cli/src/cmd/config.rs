//! Configuration management command
//!
//! Provides CLI interface to view and edit the eventdesk configuration.

use crate::system_config;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::path::Path;

/// List all configuration values
pub async fn run_list(config_path: &Path) -> Result<()> {
    let config = system_config::load(config_path)?;

    println!("{}", "System Configuration".bold());
    println!("{}: {}\n", "Location".dimmed(), config_path.display().dimmed());

    println!("{}", "[autosave]".yellow());
    println!(
        "  {} = {} {}",
        "interval_ms".cyan(),
        config.autosave.interval_ms,
        format!("({:?})", config.autosave_interval()).dimmed()
    );

    println!("\n{}", "[pricing]".yellow());
    println!("  {} = {}", "locale".cyan(), config.pricing.locale);
    println!("  {} = {}", "decimals".cyan(), config.pricing.decimals);
    println!("  {} = {}", "show_symbol".cyan(), config.pricing.show_symbol);
    println!("  {} = {}", "show_free".cyan(), config.pricing.show_free);
    println!("  {} = {}", "currency".cyan(), config.pricing.currency);
    println!("  {} = {}", "base_currency".cyan(), config.pricing.base_currency);

    println!(
        "\n{} {}",
        "[pricing.rates]".yellow(),
        if config.pricing.rates.is_empty() {
            "(built-in)".dimmed().to_string()
        } else {
            String::new()
        }
    );
    let rates = config.rate_table()?;
    for (code, rate) in rates.iter() {
        println!("  {} = {}", code.cyan(), rate);
    }

    println!("\n{}", "Valid Ranges:".bold());
    println!("  autosave.interval_ms: 100-3,600,000");
    println!("  pricing.decimals: 0-20");
    println!("  pricing.rates.<CODE>: > 0");

    Ok(())
}

/// Get a single configuration value
pub async fn run_get(config_path: &Path, key: &str) -> Result<()> {
    let config = system_config::load(config_path)?;
    println!("{}", config.get(key)?);
    Ok(())
}

/// Set a configuration value
pub async fn run_set(config_path: &Path, key: &str, value: &str) -> Result<()> {
    let mut config = system_config::load(config_path)?;
    config.set(key, value)?;

    // Validate before saving
    config.validate()
        .context("Invalid configuration value")?;

    system_config::save(config_path, &config)?;

    println!("{} {} = {}", "✓".green(), key.cyan(), value);
    Ok(())
}

/// Show the config file path and optionally create it
pub async fn run_path(config_path: &Path, create: bool) -> Result<()> {
    if create && system_config::init_if_missing(config_path)? {
        println!("{} Created config file at: {}", "✓".green(), config_path.display());
    } else if config_path.exists() {
        println!("{}", config_path.display());
    } else {
        println!("{}", config_path.display());
        println!("{}", "File does not exist. Use --create to create it.".yellow());
    }

    Ok(())
}

/// Show example configuration
pub async fn run_example() -> Result<()> {
    print!("{}", system_config::example_config());
    Ok(())
}

