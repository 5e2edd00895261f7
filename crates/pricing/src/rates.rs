//! Exchange-rate table and linear conversion

use crate::error::{PricingError, Result};
use crate::money::CurrencyCode;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Rates relative to a base currency (base rate = 1)
///
/// The table is a plain value: callers build one (or take the default) and
/// pass it to [`RateTable::convert`]. Nothing global is mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateTable {
    base: CurrencyCode,
    rates: BTreeMap<CurrencyCode, Decimal>,
}

impl RateTable {
    /// Create a table containing only `base` at rate 1
    pub fn new(base: CurrencyCode) -> Self {
        let mut rates = BTreeMap::new();
        rates.insert(base, Decimal::ONE);
        Self { base, rates }
    }

    /// Add or replace a rate; rates must be positive
    pub fn with_rate(mut self, currency: CurrencyCode, rate: Decimal) -> Result<Self> {
        self.insert(currency, rate)?;
        Ok(self)
    }

    pub fn insert(&mut self, currency: CurrencyCode, rate: Decimal) -> Result<()> {
        if rate <= Decimal::ZERO {
            return Err(PricingError::InvalidRate {
                currency: currency.to_string(),
                rate,
            });
        }
        self.rates.insert(currency, rate);
        Ok(())
    }

    /// Build a table from string-keyed rates, e.g. a config file section
    ///
    /// The base currency is always present at rate 1, even if `rates`
    /// names it with another value.
    pub fn from_map<'a, I>(base: CurrencyCode, rates: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a String, &'a Decimal)>,
    {
        let mut table = Self::new(base);
        for (code, &rate) in rates {
            let currency: CurrencyCode = code.parse()?;
            if currency == base {
                continue;
            }
            table.insert(currency, rate)?;
        }
        Ok(table)
    }

    pub fn base(&self) -> CurrencyCode {
        self.base
    }

    /// Rate for `currency`; unknown codes count as 1
    pub fn rate(&self, currency: CurrencyCode) -> Decimal {
        self.rates.get(&currency).copied().unwrap_or(Decimal::ONE)
    }

    pub fn contains(&self, currency: CurrencyCode) -> bool {
        self.rates.contains_key(&currency)
    }

    pub fn iter(&self) -> impl Iterator<Item = (CurrencyCode, Decimal)> + '_ {
        self.rates.iter().map(|(code, rate)| (*code, *rate))
    }

    /// Convert `amount` from one currency to another
    ///
    /// Identical codes return `amount` unchanged. Otherwise the result is
    /// `(amount / rate[from]) * rate[to]`.
    pub fn convert(&self, amount: Decimal, from: CurrencyCode, to: CurrencyCode) -> Result<Decimal> {
        if from == to {
            return Ok(amount);
        }
        amount
            .checked_div(self.rate(from))
            .and_then(|base_amount| base_amount.checked_mul(self.rate(to)))
            .ok_or(PricingError::Overflow { from, to })
    }
}

impl Default for RateTable {
    /// Illustrative EGP-based rates; real deployments load their own
    fn default() -> Self {
        let mut table = Self::new(CurrencyCode::EGP);
        for (currency, mantissa, scale) in [
            (CurrencyCode::USD, 32, 3),
            (CurrencyCode::EUR, 29, 3),
            (CurrencyCode::GBP, 25, 3),
            (CurrencyCode::SAR, 12, 2),
            (CurrencyCode::AED, 12, 2),
        ] {
            table.rates.insert(currency, Decimal::new(mantissa, scale));
        }
        table
    }
}

/// Convert with `rates`; see [`RateTable::convert`]
pub fn convert(
    amount: Decimal,
    from: CurrencyCode,
    to: CurrencyCode,
    rates: &RateTable,
) -> Result<Decimal> {
    rates.convert(amount, from, to)
}
