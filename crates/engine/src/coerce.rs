//! Loose coercion of JSON values coming from the API.
//!
//! The API is not consistent about types: ids may be numbers or numeric
//! strings, keys may be camelCase or snake_case. These helpers never fail;
//! they return `None` (or zero) and let the caller pick a default.

use serde_json::Value;

/// Returns the first present, non-null value among `keys`.
///
/// Used to read fields that exist under several spellings
/// (`categoryId` / `category_id`): the first key listed wins.
pub fn field<'a>(object: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find(|value| !value.is_null())
}

/// Reads the leading decimal number of `raw`, ignoring leading whitespace and
/// any trailing garbage (`"12.5kg"` is `12.5`).
pub fn parse_float_prefix(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > frac_start {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Reads the leading base-10 integer of `raw` (`"12 months"` is `12`).
pub fn parse_int_prefix(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_start {
        return None;
    }

    s[..end].parse::<i64>().ok()
}

/// Parses a whole string as a number. Blank input is zero, anything that is
/// not entirely numeric is `None`.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Strict numeric view of a JSON value: numbers as-is, strings only when the
/// whole string is numeric. Other types are `None`.
pub fn strict_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64().filter(|v| v.is_finite()),
        Value::String(raw) => parse_number(raw),
        _ => None,
    }
}

/// Lenient numeric view of a JSON value: numbers as-is, strings by their
/// leading number, everything else zero.
pub fn lenient_number(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(number)) => number.as_f64().filter(|v| v.is_finite()).unwrap_or(0.0),
        Some(Value::String(raw)) => parse_float_prefix(raw).unwrap_or(0.0),
        _ => 0.0,
    }
}

/// [`lenient_number`] truncated towards zero.
pub fn lenient_integer(value: Option<&Value>) -> i64 {
    lenient_number(value).trunc() as i64
}
