//! Error type for pricing operations

use crate::money::CurrencyCode;
use rust_decimal::Decimal;
use thiserror::Error;

/// Largest `decimals` value the locale formatter accepts
pub const MAX_DECIMALS: u32 = 20;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    #[error("invalid currency code: {0:?} (expected three ASCII letters)")]
    InvalidCurrencyCode(String),

    #[error("invalid locale tag: {0:?}")]
    InvalidLocale(String),

    #[error("unsupported precision: {0} fractional digits (max {MAX_DECIMALS})")]
    UnsupportedPrecision(u32),

    #[error("invalid rate for {currency}: {rate} (must be positive)")]
    InvalidRate { currency: String, rate: Decimal },

    #[error("arithmetic overflow converting {from} to {to}")]
    Overflow { from: CurrencyCode, to: CurrencyCode },
}

pub type Result<T> = std::result::Result<T, PricingError>;
