//! Lenient parsing of user-entered amounts
//!
//! Parsing never fails: empty, absent or unparseable text is zero. Nothing is
//! logged either, since these functions see free-form user input.

use crate::locale::{to_ascii_digit, Locale};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Arabic decimal separator, accepted by every parse path
const ARABIC_DECIMAL: char = '\u{66b}';

/// Parse an amount, stripping currency symbols, codes and grouping
///
/// Keeps only digits, `-` and decimal marks that precede a digit, treating
/// `.` as the decimal mark. Arabic-Indic digits and the Arabic decimal
/// separator are accepted.
/// Anything that does not then read as a single number is zero, so
/// `"1-2"` and `"1.2.3"` both parse to zero.
pub fn parse(text: Option<&str>) -> Decimal {
    let Some(text) = text else {
        return Decimal::ZERO;
    };

    let mut cleaned = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '-' => cleaned.push('-'),
            '.' | ARABIC_DECIMAL => {
                // A mark not followed by a digit belongs to a symbol such as "ج.م."
                if chars.peek().copied().and_then(to_ascii_digit).is_some() {
                    cleaned.push('.');
                }
            }
            _ => {
                if let Some(digit) = to_ascii_digit(c) {
                    cleaned.push(digit);
                }
            }
        }
    }

    if cleaned.is_empty() {
        return Decimal::ZERO;
    }
    Decimal::from_str(&cleaned).unwrap_or(Decimal::ZERO)
}

/// Parse an amount written with `locale`'s separators
///
/// Removes the locale's grouping separator and reads its decimal separator
/// as `.`, then applies [`parse`]. A malformed locale tag parses with
/// English conventions.
pub fn parse_in(text: Option<&str>, locale: &str) -> Decimal {
    let Some(text) = text else {
        return Decimal::ZERO;
    };
    let Ok(locale) = Locale::parse(locale) else {
        return parse(Some(text));
    };

    let conventions = locale.conventions();
    let normalized: String = text
        .chars()
        .filter(|&c| c != conventions.group)
        .map(|c| if c == conventions.decimal { '.' } else { c })
        .collect();
    parse(Some(&normalized))
}
