//! Formatting output fed back through parsing

use pricing::{format, format_price, parse, parse_in, CurrencyCode, FormatOptions, RateTable};
use rust_decimal::Decimal;
use std::str::FromStr;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

#[test]
fn test_round_trip_default_locale() {
    let text = format(dec("1234.5"), &FormatOptions::default());
    let parsed = parse(Some(&text));
    assert_eq!(parsed, dec("1234.50"));
    assert!((parsed - dec("1234.5")).abs() < dec("0.005"));
}

#[test]
fn test_round_trip_across_locales_and_currencies() {
    let amounts = ["0", "0.01", "-0.5", "7", "1234.5", "-98765.43", "1000000", "123456789.99"];
    let locales = ["en-EG", "en-US", "ar-EG", "de-DE", "fr-FR", "sw-KE"];
    let currencies = [
        CurrencyCode::EGP,
        CurrencyCode::USD,
        CurrencyCode::EUR,
        CurrencyCode::GBP,
        CurrencyCode::SAR,
    ];

    for locale in locales {
        for currency in currencies {
            for show_symbol in [true, false] {
                let mut options = FormatOptions::default()
                    .with_locale(locale)
                    .with_currency(currency);
                options.show_symbol = show_symbol;

                for amount in amounts {
                    let amount = dec(amount);
                    let text = format(amount, &options);
                    assert_eq!(
                        parse_in(Some(&text), locale),
                        amount,
                        "{text:?} ({locale}, {currency}) did not round-trip"
                    );
                }
            }
        }
    }
}

#[test]
fn test_round_trip_respects_precision() {
    for decimals in [0, 1, 2, 3, 6] {
        let options = FormatOptions::default().with_decimals(decimals);
        let amount = dec("1234.5678912");
        let text = format(amount, &options);
        let parsed = parse(Some(&text));
        assert_eq!(parsed, amount.round_dp_with_strategy(
            decimals,
            rust_decimal::RoundingStrategy::MidpointAwayFromZero,
        ));
    }
}

#[test]
fn test_fallback_output_still_parses() {
    let options = FormatOptions::default().with_locale("###");
    let text = format(dec("-1234.5"), &options);
    assert_eq!(text, "-1234.50 EGP");
    assert_eq!(parse(Some(&text)), dec("-1234.5"));
}

#[test]
fn test_price_display_after_conversion() {
    let rates = RateTable::default();
    let usd = rates
        .convert(dec("1500"), CurrencyCode::EGP, CurrencyCode::USD)
        .unwrap();
    let options = FormatOptions::default().with_currency(CurrencyCode::USD);
    assert_eq!(format_price(usd, true, &options), "$48.00");
    assert_eq!(format_price(Decimal::ZERO, true, &options), "Free");
}
