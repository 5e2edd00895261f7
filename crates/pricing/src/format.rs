//! Locale-aware rendering of amounts
//!
//! Formatting never fails from the caller's point of view. When the locale
//! tag or precision cannot be rendered, the formatter logs a warning and
//! produces a fixed `"<amount> <CODE>"` string instead. [`format_tagged`]
//! exposes which of the two paths was taken.
//!
//! Rounding is half away from zero at the requested number of fractional
//! digits (`0.125` -> `0.13`, `-0.125` -> `-0.13`, `0.145` -> `0.15`).

use crate::error::{PricingError, Result, MAX_DECIMALS};
use crate::locale::{Conventions, Locale, SymbolPosition, DEFAULT_LOCALE};
use crate::money::CurrencyCode;
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;
use tracing::warn;

/// Label `format_price` renders for a zero amount
pub const FREE_LABEL: &str = "Free";

/// Fractional digits `format_number` keeps at most
const NUMBER_MAX_DECIMALS: u32 = 3;

/// Largest scale a `Decimal` can carry; bounds the fallback rendering
const MAX_SCALE: u32 = 28;

const NBSP: char = '\u{a0}';

/// Options for currency formatting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
    /// Include the currency symbol or code (default: true)
    pub show_symbol: bool,
    /// Fractional digits (default: 2, max 20)
    pub decimals: u32,
    /// Locale tag (default: "en-EG")
    pub locale: String,
    /// Currency being rendered (default: EGP)
    pub currency: CurrencyCode,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            show_symbol: true,
            decimals: 2,
            locale: DEFAULT_LOCALE.to_string(),
            currency: CurrencyCode::EGP,
        }
    }
}

impl FormatOptions {
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    pub fn with_decimals(mut self, decimals: u32) -> Self {
        self.decimals = decimals;
        self
    }

    pub fn with_currency(mut self, currency: CurrencyCode) -> Self {
        self.currency = currency;
        self
    }

    pub fn without_symbol(mut self) -> Self {
        self.show_symbol = false;
        self
    }
}

/// Result of a formatting call, tagged with the path that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Formatted {
    /// Rendered with the locale's conventions
    Localized(String),
    /// Locale rendering failed; `text` is the fixed fallback
    Fallback { text: String, reason: PricingError },
}

impl Formatted {
    pub fn as_str(&self) -> &str {
        match self {
            Formatted::Localized(text) | Formatted::Fallback { text, .. } => text,
        }
    }

    pub fn into_string(self) -> String {
        match self {
            Formatted::Localized(text) | Formatted::Fallback { text, .. } => text,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Formatted::Fallback { .. })
    }
}

impl fmt::Display for Formatted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Format `amount` as currency text
pub fn format(amount: Decimal, options: &FormatOptions) -> String {
    format_tagged(amount, options).into_string()
}

/// Format `amount`, reporting whether the fallback was used
pub fn format_tagged(amount: Decimal, options: &FormatOptions) -> Formatted {
    match render_currency(amount, options) {
        Ok(text) => Formatted::Localized(text),
        Err(reason) => {
            warn!(
                locale = %options.locale,
                decimals = options.decimals,
                error = %reason,
                "Currency formatting failed, using fallback"
            );
            let decimals = options.decimals.min(MAX_SCALE);
            let rounded = fixed_point(round_to(amount, decimals), decimals);
            Formatted::Fallback {
                text: format!("{} {}", rounded, options.currency),
                reason,
            }
        }
    }
}

/// Format a price, rendering exactly zero as "Free" when `show_free` is set
pub fn format_price(amount: Decimal, show_free: bool, options: &FormatOptions) -> String {
    if show_free && amount.is_zero() {
        return FREE_LABEL.to_string();
    }
    format(amount, options)
}

/// Group a plain number for `locale`, without any currency symbol
pub fn format_number(value: Decimal, locale: &str) -> String {
    format_number_tagged(value, locale).into_string()
}

/// Like [`format_number`], reporting whether the fallback was used
pub fn format_number_tagged(value: Decimal, locale: &str) -> Formatted {
    match Locale::parse(locale) {
        Ok(locale) => {
            let rounded = value
                .round_dp_with_strategy(NUMBER_MAX_DECIMALS, RoundingStrategy::MidpointAwayFromZero)
                .normalize();
            Formatted::Localized(render_signed(rounded, locale.conventions()))
        }
        Err(reason) => {
            warn!(locale, error = %reason, "Number formatting failed, using fallback");
            Formatted::Fallback {
                text: value.to_string(),
                reason,
            }
        }
    }
}

fn render_currency(amount: Decimal, options: &FormatOptions) -> Result<String> {
    if options.decimals > MAX_DECIMALS {
        return Err(PricingError::UnsupportedPrecision(options.decimals));
    }
    let locale = Locale::parse(&options.locale)?;
    let conventions = locale.conventions();

    let rounded = round_to(amount, options.decimals);
    let sign = if is_negative(rounded) { "-" } else { "" };
    let number = render_unsigned(&fixed_point(rounded.abs(), options.decimals), conventions);

    if !options.show_symbol {
        return Ok(format!("{sign}{number}"));
    }

    let symbol = locale.symbol(&options.currency);
    let text = match conventions.symbol_position {
        SymbolPosition::Prefix if symbol.chars().all(char::is_alphabetic) => {
            format!("{sign}{symbol}{NBSP}{number}")
        }
        SymbolPosition::Prefix => format!("{sign}{symbol}{number}"),
        SymbolPosition::Suffix => format!("{sign}{number}{NBSP}{symbol}"),
    };
    Ok(text)
}

/// Round half away from zero, then pad to exactly `decimals` digits
fn round_to(amount: Decimal, decimals: u32) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(decimals);
    rounded
}

/// Plain text of `value` with exactly `decimals` fractional digits
///
/// `rescale` lowers the scale when the mantissa cannot hold every requested
/// digit; the digits it could not store are zeros.
fn fixed_point(value: Decimal, decimals: u32) -> String {
    let mut text = value.to_string();
    let missing = decimals.saturating_sub(value.scale());
    if missing > 0 {
        if value.scale() == 0 {
            text.push('.');
        }
        text.extend(std::iter::repeat('0').take(missing as usize));
    }
    text
}

/// Negative and not rounded away to zero
fn is_negative(value: Decimal) -> bool {
    value.is_sign_negative() && !value.is_zero()
}

fn render_signed(value: Decimal, conventions: Conventions) -> String {
    let number = render_unsigned(&value.abs().to_string(), conventions);
    if is_negative(value) {
        format!("-{number}")
    } else {
        number
    }
}

/// Render plain non-negative number text with grouping, decimal mark and digit shapes
fn render_unsigned(plain: &str, conventions: Conventions) -> String {
    let (integer, fraction) = match plain.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (plain, None),
    };

    let mut out = String::with_capacity(plain.len() + integer.len() / 3 + 1);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            out.push(conventions.group);
        }
        out.push(conventions.digits.shape(digit));
    }
    if let Some(fraction) = fraction {
        out.push(conventions.decimal);
        out.extend(fraction.chars().map(|d| conventions.digits.shape(d)));
    }
    out
}
