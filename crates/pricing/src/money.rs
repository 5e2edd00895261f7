//! Currency codes and the `Money` value type

use crate::error::{PricingError, Result};
use crate::format::{format, FormatOptions};
use crate::rates::RateTable;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An ISO-4217-style currency code (three uppercase ASCII letters)
#[derive(Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode([u8; 3]);

impl CurrencyCode {
    pub const EGP: Self = Self(*b"EGP");
    pub const USD: Self = Self(*b"USD");
    pub const EUR: Self = Self(*b"EUR");
    pub const GBP: Self = Self(*b"GBP");
    pub const SAR: Self = Self(*b"SAR");
    pub const AED: Self = Self(*b"AED");

    /// Get the code as a string slice
    pub fn as_str(&self) -> &str {
        // Construction only admits ASCII letters
        std::str::from_utf8(&self.0).unwrap_or("???")
    }
}

impl FromStr for CurrencyCode {
    type Err = PricingError;

    /// Parse a code, accepting lowercase input ("usd" -> "USD")
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let bytes = trimmed.as_bytes();
        if bytes.len() != 3 || !bytes.iter().all(u8::is_ascii_alphabetic) {
            return Err(PricingError::InvalidCurrencyCode(s.to_string()));
        }

        let mut code = [0u8; 3];
        for (slot, byte) in code.iter_mut().zip(bytes) {
            *slot = byte.to_ascii_uppercase();
        }
        Ok(Self(code))
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = PricingError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.as_str().to_string()
    }
}

impl fmt::Debug for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CurrencyCode({})", self.as_str())
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A monetary amount tagged with its currency
///
/// Pairing the two keeps conversions and formatting from mixing units:
/// [`Money::convert_to`] always carries the target code along with the
/// converted amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub amount: Decimal,
    pub currency: CurrencyCode,
}

impl Money {
    pub fn new(amount: Decimal, currency: CurrencyCode) -> Self {
        Self { amount, currency }
    }

    /// Format with `options`, always using this value's own currency
    pub fn format(&self, options: &FormatOptions) -> String {
        let options = options.clone().with_currency(self.currency);
        format(self.amount, &options)
    }

    /// Convert into `target` using `rates`
    pub fn convert_to(&self, target: CurrencyCode, rates: &RateTable) -> Result<Money> {
        let amount = rates.convert(self.amount, self.currency, target)?;
        Ok(Money::new(amount, target))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(&FormatOptions::default()))
    }
}
