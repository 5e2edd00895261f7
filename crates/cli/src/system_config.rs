//! System configuration stored as TOML
//!
//! Default location: `$XDG_CONFIG_HOME/eventdesk/config.toml` (or the
//! platform equivalent). A missing file means defaults.

use anyhow::{Context, Result};
use autosave::DEFAULT_INTERVAL;
use pricing::{CurrencyCode, FormatOptions, Locale, RateTable, DEFAULT_LOCALE, MAX_DECIMALS};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

const MIN_INTERVAL_MS: u64 = 100;
const MAX_INTERVAL_MS: u64 = 3_600_000;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    pub autosave: AutosaveSection,
    pub pricing: PricingSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutosaveSection {
    /// Quiet period before a draft is saved
    pub interval_ms: u64,
}

impl Default for AutosaveSection {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_INTERVAL.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingSection {
    pub locale: String,
    pub decimals: u32,
    pub show_symbol: bool,
    pub show_free: bool,
    /// Currency used when a command does not name one
    pub currency: String,
    /// Currency the rates are relative to
    pub base_currency: String,
    /// Empty means the built-in illustrative table
    pub rates: BTreeMap<String, Decimal>,
}

impl Default for PricingSection {
    fn default() -> Self {
        Self {
            locale: DEFAULT_LOCALE.to_string(),
            decimals: 2,
            show_symbol: true,
            show_free: true,
            currency: CurrencyCode::EGP.to_string(),
            base_currency: CurrencyCode::EGP.to_string(),
            rates: BTreeMap::new(),
        }
    }
}

impl SystemConfig {
    /// Check every value, reporting the first problem
    pub fn validate(&self) -> Result<()> {
        let interval = self.autosave.interval_ms;
        if !(MIN_INTERVAL_MS..=MAX_INTERVAL_MS).contains(&interval) {
            anyhow::bail!(
                "autosave.interval_ms must be between {} and {} (got {})",
                MIN_INTERVAL_MS,
                MAX_INTERVAL_MS,
                interval
            );
        }

        if self.pricing.decimals > MAX_DECIMALS {
            anyhow::bail!(
                "pricing.decimals must be at most {} (got {})",
                MAX_DECIMALS,
                self.pricing.decimals
            );
        }

        Locale::parse(&self.pricing.locale).context("pricing.locale")?;
        self.default_currency().context("pricing.currency")?;
        self.rate_table().context("pricing.rates")?;
        Ok(())
    }

    pub fn autosave_interval(&self) -> Duration {
        Duration::from_millis(self.autosave.interval_ms)
    }

    pub fn default_currency(&self) -> Result<CurrencyCode> {
        Ok(self.pricing.currency.parse()?)
    }

    pub fn format_options(&self) -> Result<FormatOptions> {
        let mut options = FormatOptions::default()
            .with_locale(self.pricing.locale.clone())
            .with_decimals(self.pricing.decimals)
            .with_currency(self.default_currency()?);
        options.show_symbol = self.pricing.show_symbol;
        Ok(options)
    }

    pub fn rate_table(&self) -> Result<RateTable> {
        if self.pricing.rates.is_empty() {
            return Ok(RateTable::default());
        }
        let base: CurrencyCode = self
            .pricing
            .base_currency
            .parse()
            .context("pricing.base_currency")?;
        Ok(RateTable::from_map(base, &self.pricing.rates)?)
    }

    /// Read a value by dotted key
    pub fn get(&self, key: &str) -> Result<String> {
        let value = match key {
            "autosave.interval_ms" => self.autosave.interval_ms.to_string(),
            "pricing.locale" => self.pricing.locale.clone(),
            "pricing.decimals" => self.pricing.decimals.to_string(),
            "pricing.show_symbol" => self.pricing.show_symbol.to_string(),
            "pricing.show_free" => self.pricing.show_free.to_string(),
            "pricing.currency" => self.pricing.currency.clone(),
            "pricing.base_currency" => self.pricing.base_currency.clone(),
            _ => match key.strip_prefix("pricing.rates.") {
                Some(code) => {
                    let code: CurrencyCode = code.parse()?;
                    self.rate_table()?.rate(code).to_string()
                }
                None => anyhow::bail!(
                    "Unknown config key: {}. Use 'eventdesk config list' to see available keys.",
                    key
                ),
            },
        };
        Ok(value)
    }

    /// Set a value by dotted key; call [`SystemConfig::validate`] afterwards
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "autosave.interval_ms" => {
                self.autosave.interval_ms = value
                    .parse()
                    .context("Invalid value: must be a positive integer")?;
            }
            "pricing.locale" => self.pricing.locale = value.to_string(),
            "pricing.decimals" => {
                self.pricing.decimals = value
                    .parse()
                    .context("Invalid value: must be a non-negative integer")?;
            }
            "pricing.show_symbol" => {
                self.pricing.show_symbol = value
                    .parse()
                    .context("Invalid value: must be 'true' or 'false'")?;
            }
            "pricing.show_free" => {
                self.pricing.show_free = value
                    .parse()
                    .context("Invalid value: must be 'true' or 'false'")?;
            }
            "pricing.currency" => self.pricing.currency = value.trim().to_ascii_uppercase(),
            "pricing.base_currency" => {
                self.pricing.base_currency = value.trim().to_ascii_uppercase()
            }
            _ => match key.strip_prefix("pricing.rates.") {
                Some(code) => {
                    let code: CurrencyCode = code.parse()?;
                    let rate: Decimal = value
                        .trim()
                        .parse()
                        .context("Invalid value: must be a decimal number")?;
                    if self.pricing.rates.is_empty() {
                        // Start from the built-in table so other rates survive
                        self.pricing.rates = RateTable::default()
                            .iter()
                            .map(|(code, rate)| (code.to_string(), rate))
                            .collect();
                    }
                    self.pricing.rates.insert(code.to_string(), rate);
                }
                None => anyhow::bail!(
                    "Unknown config key: {}. Use 'eventdesk config list' to see available keys.",
                    key
                ),
            },
        }
        Ok(())
    }
}

/// Default config file location
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("eventdesk").join("config.toml"))
}

/// Use `explicit` if given, else the default location
pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => config_file_path().context("Could not determine config file path"),
    }
}

/// Load and validate the config at `path`; a missing file yields defaults
pub fn load(path: &Path) -> Result<SystemConfig> {
    if !path.exists() {
        tracing::debug!("No config at {}, using defaults", path.display());
        return Ok(SystemConfig::default());
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    let config: SystemConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config: {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid config: {}", path.display()))?;
    Ok(config)
}

pub fn save(path: &Path, config: &SystemConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
    }
    let contents = toml::to_string_pretty(config).context("Failed to serialize config")?;
    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write config: {}", path.display()))?;
    Ok(())
}

/// Write the defaults to `path` unless a file is already there
pub fn init_if_missing(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    save(path, &SystemConfig::default())?;
    Ok(true)
}

pub fn example_config() -> &'static str {
    r#"# eventdesk configuration

[autosave]
# Quiet period after the last edit before a draft is saved (100 - 3600000)
interval_ms = 30000

[pricing]
locale = "en-EG"
decimals = 2
show_symbol = true
# Render a zero price as "Free"
show_free = true
currency = "EGP"
base_currency = "EGP"

# Rates relative to base_currency. Leave empty for the built-in table.
[pricing.rates]
EGP = "1"
USD = "0.032"
EUR = "0.029"
"#
}
