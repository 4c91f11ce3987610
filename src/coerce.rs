//! Permissive conversions from stored values to the getter types.
//!
//! Every function here is total: a value that cannot be converted yields the
//! target type's zero value.

use toml::Value;

/// Parse the canonical boolean spellings: `true`/`false`, `t`/`f`, `1`/`0`,
/// case-insensitively. Anything else is `None`.
pub fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" => Some(true),
        "0" => Some(false),
        s if s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("t") => Some(true),
        s if s.eq_ignore_ascii_case("false") || s.eq_ignore_ascii_case("f") => Some(false),
        _ => None,
    }
}

/// Parse an integer from a stored string.
///
/// Accepts an optional sign, `0x`/`0o`/`0b` radix prefixes, and a trailing
/// all-zero fraction (`"80.0"`).
pub fn parse_int(s: &str) -> Option<i64> {
    let s = trim_zero_decimal(s);
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };

    let lower = digits.to_ascii_lowercase();
    let (radix, body) = if let Some(hex) = lower.strip_prefix("0x") {
        (16, hex)
    } else if let Some(oct) = lower.strip_prefix("0o") {
        (8, oct)
    } else if let Some(bin) = lower.strip_prefix("0b") {
        (2, bin)
    } else {
        (10, lower.as_str())
    };
    if body.is_empty() || body.starts_with(['+', '-']) {
        return None;
    }

    let magnitude = i128::from_str_radix(body, radix).ok()?;
    let signed = if negative { -magnitude } else { magnitude };
    i64::try_from(signed).ok()
}

fn trim_zero_decimal(s: &str) -> &str {
    match s.split_once('.') {
        Some((whole, frac))
            if !whole.is_empty() && !frac.is_empty() && frac.bytes().all(|b| b == b'0') =>
        {
            whole
        }
        _ => s,
    }
}

pub fn to_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Datetime(d) => d.to_string(),
        Value::Array(_) | Value::Table(_) => String::new(),
    }
}

pub fn to_int(v: &Value) -> i64 {
    match v {
        Value::Integer(i) => *i,
        Value::Float(f) => *f as i64,
        Value::Boolean(b) => i64::from(*b),
        Value::String(s) => parse_int(s).unwrap_or_default(),
        _ => 0,
    }
}

pub fn to_bool(v: &Value) -> bool {
    match v {
        Value::Boolean(b) => *b,
        Value::Integer(i) => *i != 0,
        Value::Float(f) => *f != 0.0,
        Value::String(s) => parse_bool(s).unwrap_or_default(),
        _ => false,
    }
}

pub fn to_float(v: &Value) -> f64 {
    match v {
        Value::Float(f) => *f,
        Value::Integer(i) => *i as f64,
        Value::Boolean(b) => f64::from(u8::from(*b)),
        Value::String(s) => s.parse().unwrap_or_default(),
        _ => 0.0,
    }
}

/// Lists render each element; a plain string splits on whitespace.
pub fn to_string_slice(v: &Value) -> Vec<String> {
    match v {
        Value::Array(items) => items.iter().map(to_string).collect(),
        Value::String(s) => s.split_whitespace().map(str::to_string).collect(),
        _ => Vec::new(),
    }
}
