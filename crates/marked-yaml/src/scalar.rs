//! Scalar constructors.
//!
//! Each constructor turns the raw text of a scalar into a [`BaseValue`], or
//! returns None when the text does not fit the grammar of its kind. The
//! driver turns None into a [`crate::ScalarParseError`]; there is never a
//! fallback to another kind.

use crate::error::ScalarKind;
use crate::schema::Schema;
use crate::timestamp::{parse_timestamp, ParsedTimestamp};
use crate::value::BaseValue;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use num_bigint::BigInt;
use num_traits::{Num, Zero};
use once_cell::sync::Lazy;
use regex::Regex;

static DECIMAL_FLOAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:e[-+]?[0-9]+)?$")
        .expect("float pattern is valid")
});

/// Run the constructor for `kind` on `raw`.
///
/// Custom kinds have no built-in grammar and always return None here.
pub fn parse(kind: ScalarKind, raw: &str, schema: Schema) -> Option<BaseValue> {
    match kind {
        ScalarKind::Null => parse_null(raw),
        ScalarKind::Bool => parse_bool(raw, schema),
        ScalarKind::Int => parse_int(raw, schema).map(BaseValue::Int),
        ScalarKind::Float => parse_float(raw).map(BaseValue::Float),
        ScalarKind::Binary => parse_binary(raw).map(BaseValue::Bytes),
        ScalarKind::Timestamp => parse_timestamp(raw).map(|parsed| match parsed {
            ParsedTimestamp::Date(date) => BaseValue::Date(date),
            ParsedTimestamp::DateTime(ts) => BaseValue::DateTime(ts),
        }),
        ScalarKind::Str => Some(BaseValue::String(raw.to_string())),
        ScalarKind::Custom => None,
    }
}

fn parse_null(raw: &str) -> Option<BaseValue> {
    (raw.is_empty() || raw == "~" || raw.eq_ignore_ascii_case("null")).then_some(BaseValue::Null)
}

fn parse_bool(raw: &str, schema: Schema) -> Option<BaseValue> {
    let lower = raw.to_ascii_lowercase();
    let value = match (lower.as_str(), schema) {
        ("true", _) => true,
        ("false", _) => false,
        ("yes" | "on", Schema::Yaml11) => true,
        ("no" | "off", Schema::Yaml11) => false,
        _ => return None,
    };
    Some(BaseValue::Bool(value))
}

fn split_sign(text: &str) -> (bool, &str) {
    if let Some(rest) = text.strip_prefix('-') {
        (true, rest)
    } else {
        (false, text.strip_prefix('+').unwrap_or(text))
    }
}

fn radix(digits: &str, radix: u32) -> Option<BigInt> {
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return None;
    }
    BigInt::from_str_radix(digits, radix).ok()
}

/// Integers in decimal, binary (`0b`), octal (`0o`, or a legacy leading `0`
/// under YAML 1.1), hex (`0x`) and base 60 (`1:30`). Underscores are
/// separators.
pub fn parse_int(raw: &str, schema: Schema) -> Option<BigInt> {
    let cleaned: String = raw.chars().filter(|c| *c != '_').collect();
    let (negative, body) = split_sign(&cleaned);
    if body.is_empty() || body.starts_with(['+', '-']) {
        return None;
    }

    let magnitude = if let Some(digits) = body.strip_prefix("0b") {
        radix(digits, 2)?
    } else if let Some(digits) = body.strip_prefix("0x") {
        radix(digits, 16)?
    } else if let Some(digits) = body.strip_prefix("0o") {
        radix(digits, 8)?
    } else if schema == Schema::Yaml11 && body.len() > 1 && body.starts_with('0') {
        // Legacy octal wins over base 60, so `0:30` is not a number
        radix(&body[1..], 8)?
    } else if body.contains(':') {
        let mut total = BigInt::zero();
        for part in body.split(':') {
            total = total * 60 + radix(part, 10)?;
        }
        total
    } else {
        radix(body, 10)?
    };

    Some(if negative { -magnitude } else { magnitude })
}

/// Decimal and exponent floats, `.inf`, `.nan` and base 60 (`20:30.15`).
pub fn parse_float(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| *c != '_')
        .collect::<String>()
        .to_ascii_lowercase();
    let (negative, body) = split_sign(&cleaned);
    let sign = if negative { -1.0 } else { 1.0 };

    if body == ".inf" {
        return Some(sign * f64::INFINITY);
    }
    if body == ".nan" {
        return (cleaned == ".nan").then_some(f64::NAN);
    }
    if body.contains(':') {
        let mut total = 0.0;
        for part in body.split(':') {
            if !DECIMAL_FLOAT.is_match(part) {
                return None;
            }
            total = total * 60.0 + part.parse::<f64>().ok()?;
        }
        return Some(sign * total);
    }
    if !DECIMAL_FLOAT.is_match(body) {
        return None;
    }
    body.parse::<f64>().ok().map(|value| sign * value)
}

/// Base64 body of a `!!binary` scalar; whitespace and line breaks are ignored.
pub fn parse_binary(raw: &str) -> Option<Vec<u8>> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD.decode(compact).ok()
}
