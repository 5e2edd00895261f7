//! Locale tags and the number conventions they resolve to
//!
//! Only the language subtag selects conventions. A well-formed tag whose
//! language has no table entry resolves to English conventions, the same way
//! locale negotiation falls back to a default. A malformed tag is an error,
//! which the formatters turn into their fallback rendering.

use crate::error::{PricingError, Result};
use crate::money::CurrencyCode;

/// Locale used when the caller does not pick one
pub const DEFAULT_LOCALE: &str = "en-EG";

/// Where the currency symbol sits relative to the number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolPosition {
    Prefix,
    Suffix,
}

/// Digit shapes used when rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Digits {
    Latin,
    ArabicIndic,
}

/// Separators and placement rules for one language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conventions {
    pub group: char,
    pub decimal: char,
    pub symbol_position: SymbolPosition,
    pub digits: Digits,
}

const ENGLISH: Conventions = Conventions {
    group: ',',
    decimal: '.',
    symbol_position: SymbolPosition::Prefix,
    digits: Digits::Latin,
};

const ARABIC: Conventions = Conventions {
    group: '\u{66c}',
    decimal: '\u{66b}',
    symbol_position: SymbolPosition::Suffix,
    digits: Digits::ArabicIndic,
};

const GERMAN: Conventions = Conventions {
    group: '.',
    decimal: ',',
    symbol_position: SymbolPosition::Suffix,
    digits: Digits::Latin,
};

const FRENCH: Conventions = Conventions {
    group: '\u{202f}',
    decimal: ',',
    symbol_position: SymbolPosition::Suffix,
    digits: Digits::Latin,
};

/// A parsed, well-formed locale tag such as `en-EG` or `de_DE`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale {
    language: String,
    region: Option<String>,
}

impl Locale {
    /// Parse a BCP-47-like tag
    ///
    /// Accepts `-` or `_` as separator. The language subtag must be 2-3
    /// letters; any further subtag must be 1-8 alphanumerics.
    pub fn parse(tag: &str) -> Result<Self> {
        let invalid = || PricingError::InvalidLocale(tag.to_string());

        let mut subtags = tag.trim().split(['-', '_']);
        let language = subtags.next().ok_or_else(invalid)?;
        if !(2..=3).contains(&language.len()) || !language.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(invalid());
        }

        let mut region = None;
        for subtag in subtags {
            if subtag.is_empty()
                || subtag.len() > 8
                || !subtag.chars().all(|c| c.is_ascii_alphanumeric())
            {
                return Err(invalid());
            }
            if region.is_none() && subtag.len() == 2 && subtag.chars().all(|c| c.is_ascii_alphabetic()) {
                region = Some(subtag.to_ascii_uppercase());
            }
        }

        Ok(Self {
            language: language.to_ascii_lowercase(),
            region,
        })
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn conventions(&self) -> Conventions {
        match self.language.as_str() {
            "ar" => ARABIC,
            "de" => GERMAN,
            "fr" => FRENCH,
            _ => ENGLISH,
        }
    }

    /// Display symbol for `currency` in this locale
    pub fn symbol<'a>(&'a self, currency: &'a CurrencyCode) -> &'a str {
        match (self.language.as_str(), *currency) {
            ("ar", CurrencyCode::EGP) => "\u{62c}.\u{645}.\u{200f}",
            (_, CurrencyCode::USD) => "$",
            (_, CurrencyCode::EUR) => "\u{20ac}",
            (_, CurrencyCode::GBP) => "\u{a3}",
            _ => currency.as_str(),
        }
    }
}

impl Digits {
    /// Map an ASCII digit to this digit shape
    pub fn shape(self, ascii: char) -> char {
        match self {
            Digits::Latin => ascii,
            Digits::ArabicIndic => ascii
                .to_digit(10)
                .and_then(|d| char::from_u32(0x660 + d))
                .unwrap_or(ascii),
        }
    }
}

/// Map any Arabic-Indic or Extended Arabic-Indic digit to ASCII
pub(crate) fn to_ascii_digit(c: char) -> Option<char> {
    let value = match c {
        '0'..='9' => return Some(c),
        '\u{660}'..='\u{669}' => c as u32 - 0x660,
        '\u{6f0}'..='\u{6f9}' => c as u32 - 0x6f0,
        _ => return None,
    };
    char::from_digit(value, 10)
}
