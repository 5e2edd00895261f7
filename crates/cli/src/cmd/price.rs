//! Price formatting, parsing and conversion commands

use crate::system_config::SystemConfig;
use anyhow::{Context, Result};
use clap::Args;
use owo_colors::OwoColorize;
use pricing::{
    format_number, format_price, format_tagged, parse, parse_in, CurrencyCode, FormatOptions,
    Money,
};
use rust_decimal::Decimal;

/// Overrides for the configured formatting defaults
#[derive(Args, Debug, Clone, Default)]
pub struct FormatFlags {
    /// Currency code (default: pricing.currency)
    #[arg(short, long)]
    pub currency: Option<CurrencyCode>,
    /// Locale tag, e.g. en-EG or de-DE (default: pricing.locale)
    #[arg(short, long)]
    pub locale: Option<String>,
    /// Fractional digits (default: pricing.decimals)
    #[arg(short, long)]
    pub decimals: Option<u32>,
    /// Omit the currency symbol
    #[arg(long)]
    pub no_symbol: bool,
}

impl FormatFlags {
    fn options(&self, config: &SystemConfig) -> Result<FormatOptions> {
        let mut options = config.format_options()?;
        if let Some(currency) = self.currency {
            options.currency = currency;
        }
        if let Some(locale) = &self.locale {
            options.locale = locale.clone();
        }
        if let Some(decimals) = self.decimals {
            options.decimals = decimals;
        }
        if self.no_symbol {
            options.show_symbol = false;
        }
        Ok(options)
    }
}

/// Format an amount as currency text
pub async fn run_format(config: &SystemConfig, amount: Decimal, flags: &FormatFlags) -> Result<()> {
    let options = flags.options(config)?;
    let formatted = format_tagged(amount, &options);
    println!("{}", formatted);
    if formatted.is_fallback() {
        eprintln!(
            "{}",
            format!("Locale formatting unavailable for {:?}; used fallback", options.locale).yellow()
        );
    }
    Ok(())
}

/// Format a price, showing "Free" for zero unless disabled
pub async fn run_display(
    config: &SystemConfig,
    amount: Decimal,
    flags: &FormatFlags,
    no_free: bool,
) -> Result<()> {
    let options = flags.options(config)?;
    let show_free = config.pricing.show_free && !no_free;
    println!("{}", format_price(amount, show_free, &options));
    Ok(())
}

/// Parse user-entered text into an amount
pub async fn run_parse(text: &str, locale: Option<&str>) -> Result<()> {
    let amount = match locale {
        Some(locale) => parse_in(Some(text), locale),
        None => parse(Some(text)),
    };
    println!("{}", amount.normalize());
    Ok(())
}

/// Group a plain number for a locale
pub async fn run_number(config: &SystemConfig, value: Decimal, locale: Option<&str>) -> Result<()> {
    let locale = locale.unwrap_or(&config.pricing.locale);
    println!("{}", format_number(value, locale));
    Ok(())
}

/// Convert between currencies using the configured rate table
pub async fn run_convert(
    config: &SystemConfig,
    amount: Decimal,
    from: CurrencyCode,
    to: CurrencyCode,
    formatted: bool,
) -> Result<()> {
    let rates = config.rate_table()?;
    let converted = Money::new(amount, from)
        .convert_to(to, &rates)
        .with_context(|| format!("Failed to convert {} {} to {}", amount, from, to))?;

    if formatted {
        println!("{}", converted.format(&config.format_options()?));
    } else {
        println!("{}", converted.amount.normalize());
    }
    Ok(())
}

/// List the rate table in use
pub async fn run_rates(config: &SystemConfig) -> Result<()> {
    let rates = config.rate_table()?;
    println!("{} {}", "Base currency:".bold(), rates.base().cyan());
    for (code, rate) in rates.iter() {
        let marker = if code == rates.base() { " (base)".dimmed().to_string() } else { String::new() };
        println!("  {} {}{}", code.cyan(), rate, marker);
    }
    Ok(())
}
