//! Money formatting, parsing and conversion for eventdesk
//!
//! This crate provides:
//! - `Money` / `CurrencyCode` value types over `rust_decimal::Decimal`
//! - Locale-aware currency and number formatting with a fixed fallback
//! - Lenient parsing of user-entered amounts (bad input is zero)
//! - Rate-table based conversion between currencies
//!
//! Everything here is stateless; the only shared data is the `RateTable`
//! value the caller passes in.

pub mod error;
pub mod format;
pub mod locale;
pub mod money;
pub mod parse;
pub mod rates;

// Re-exports
pub use error::{PricingError, Result, MAX_DECIMALS};
pub use format::{
    format, format_number, format_number_tagged, format_price, format_tagged, FormatOptions,
    Formatted, FREE_LABEL,
};
pub use locale::{Locale, DEFAULT_LOCALE};
pub use money::{CurrencyCode, Money};
pub use parse::{parse, parse_in};
pub use rates::{convert, RateTable};
