//! Locale-aware numeric parsing and display formatting
//!
//! Inputs come from free-text fields and may be in any intermediate state the
//! user left them in: `"1,5"`, `"1.234,56"`, `"R$ 20"`, `""`, `"abc"`.
//! Parsing returns a [`ParseError`] for the caller to log; the `*_or_zero`
//! variants absorb it and substitute zero.
//!
//! Every amount is a [`Decimal`]: typed text is parsed exactly, never through
//! a binary float, so `"1,005"` is 1.005 and rounds to 1.01.

use chrono::{DateTime, Utc};
use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

/// Numeric or date input that could not be interpreted
///
/// Never surfaced to the user. Callers coerce to a safe default and log.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("empty input")]
    Empty,
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    #[error("unrecognised date '{0}'")]
    InvalidDate(String),
}

fn noise_regex() -> &'static Regex {
    static NOISE: OnceLock<Regex> = OnceLock::new();
    // Currency symbols, spaces, NBSP and any other decoration
    NOISE.get_or_init(|| Regex::new(r"[^0-9,.\-]").expect("static regex"))
}

/// Parse a decimal typed with either comma or dot as decimal separator
///
/// When both separators appear, the last one is the decimal separator and the
/// other is treated as a thousands separator. A separator repeated more than
/// once is always a thousands separator.
pub fn parse_decimal(raw: &str) -> Result<Decimal, ParseError> {
    let cleaned = noise_regex().replace_all(raw.trim(), "");
    if cleaned.is_empty() {
        return Err(ParseError::Empty);
    }

    let commas = cleaned.matches(',').count();
    let dots = cleaned.matches('.').count();

    let normalized = match (commas, dots) {
        (0, 0) => cleaned.to_string(),
        (_, 0) if commas > 1 => cleaned.replace(',', ""),
        (_, 0) => cleaned.replace(',', "."),
        (0, _) if dots > 1 => cleaned.replace('.', ""),
        (0, _) => cleaned.to_string(),
        _ => {
            let last_comma = cleaned.rfind(',').unwrap_or(0);
            let last_dot = cleaned.rfind('.').unwrap_or(0);
            if last_comma > last_dot {
                cleaned.replace('.', "").replace(',', ".")
            } else {
                cleaned.replace(',', "")
            }
        }
    };

    Decimal::from_str(&normalized).map_err(|_| ParseError::InvalidNumber(raw.to_string()))
}

/// Parse a decimal, substituting zero for anything unparseable
///
/// Empty input is a normal intermediate state and is not logged.
pub fn parse_decimal_or_zero(raw: &str, field: &str) -> Decimal {
    match parse_decimal(raw) {
        Ok(value) => value,
        Err(ParseError::Empty) => Decimal::ZERO,
        Err(err) => {
            tracing::warn!(field = field, input = raw, error = %err, "coercing unparseable number to 0");
            Decimal::ZERO
        }
    }
}

/// Round to 2 decimal places, half away from zero
pub fn round2(value: Decimal) -> Decimal {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    // Avoid rendering "-0,00"
    if rounded.is_zero() {
        Decimal::ZERO
    } else {
        rounded
    }
}

fn fixed2(value: Decimal) -> Decimal {
    let mut fixed = round2(value);
    fixed.rescale(2);
    fixed
}

/// `1234.5` → `"1234,50"`
pub fn format_decimal(value: Decimal) -> String {
    fixed2(value).to_string().replace('.', ",")
}

/// Shortest form without trailing zeros: `2` → `"2"`, `1.50` → `"1,5"`
pub fn format_number(value: Decimal) -> String {
    value.normalize().to_string().replace('.', ",")
}

/// `1234.5` with `"R$"` → `"R$ 1.234,50"`
pub fn format_currency(value: Decimal, symbol: &str) -> String {
    let value = fixed2(value);
    let text = value.abs().to_string();
    let (integer, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, ch) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if value.is_sign_negative() && !value.is_zero() { "-" } else { "" };
    format!("{}{} {},{}", sign, symbol, grouped, fraction)
}

/// `dd/mm/yyyy`
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// `dd/mm/yyyy HH:MM`
pub fn format_date_time(date: &DateTime<Utc>) -> String {
    date.format("%d/%m/%Y %H:%M").to_string()
}
