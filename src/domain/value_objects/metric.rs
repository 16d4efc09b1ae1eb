use serde::{Deserialize, Serialize};

/// A single decoded diagnostic value.
///
/// Size-with-unit readings are normalized to an integer byte count; raw
/// counters of the `A/B` form keep both halves. Anything that matches no
/// numeric shape survives verbatim as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Integer(i64),
    Pair(i64, i64),
    Text(String),
}

impl MetricValue {
    /// True for the numeric variants (`Integer`, `Pair`).
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        !matches!(self, Self::Text(_))
    }
}

type DecodeRule = fn(&str) -> Option<MetricValue>;

/// Decode rules in precedence order; the first match wins. Keeping them as
/// a flat list makes the precedence auditable and each rule testable alone.
const DECODE_RULES: &[DecodeRule] = &[
    plain_integer,
    counter_pair,
    percent_suffix,
    grouped_integer,
    bracketed_size,
    celsius_reading,
    hex_flag,
    annotation_suffix,
];

/// Decodes one trimmed, non-empty diagnostic token. Total: falls back to
/// `MetricValue::Text` when no rule matches.
#[must_use]
pub fn decode(token: &str) -> MetricValue {
    for rule in DECODE_RULES {
        if let Some(value) = rule(token) {
            return value;
        }
    }
    MetricValue::Text(token.to_owned())
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// `12345` — already a plain base-10 integer.
fn plain_integer(token: &str) -> Option<MetricValue> {
    token.parse::<i64>().ok().map(MetricValue::Integer)
}

/// `0/8` — two raw counters separated by a single slash.
fn counter_pair(token: &str) -> Option<MetricValue> {
    let (left, right) = token.split_once('/')?;
    if !all_digits(left) || !all_digits(right) {
        return None;
    }
    Some(MetricValue::Pair(
        left.parse().ok()?,
        right.parse().ok()?,
    ))
}

/// `10%` — decode the token without its percent suffix.
fn percent_suffix(token: &str) -> Option<MetricValue> {
    let stripped = token.strip_suffix('%')?;
    match decode(stripped) {
        MetricValue::Text(_) => None,
        numeric => Some(numeric),
    }
}

/// `61,020,911` — thousands separators only.
fn grouped_integer(token: &str) -> Option<MetricValue> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit() || b == b',') {
        return None;
    }
    token
        .replace(',', "")
        .parse::<i64>()
        .ok()
        .map(MetricValue::Integer)
}

/// `2,321,992 [1.18 TB]` — unit-suffixed size, normalized to bytes and
/// truncated toward zero.
fn bracketed_size(token: &str) -> Option<MetricValue> {
    let (count, rest) = token.split_once(" [")?;
    if count.is_empty() || !count.bytes().all(|b| b.is_ascii_digit() || b == b',') {
        return None;
    }
    let (size, unit) = rest.strip_suffix(']')?.split_once(' ')?;
    if size.is_empty() || !size.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
        return None;
    }
    let multiplier: f64 = match unit {
        "TB" => 1024f64.powi(4),
        "GB" => 1024f64.powi(3),
        "MB" => 1024f64.powi(2),
        _ => return None,
    };
    let size: f64 = size.parse().ok()?;
    Some(MetricValue::Integer((size * multiplier) as i64))
}

/// `55 Celsius` — temperature reading; the first field is the value.
fn celsius_reading(token: &str) -> Option<MetricValue> {
    if !token.contains(" Celsius") {
        return None;
    }
    token
        .split_whitespace()
        .next()?
        .parse::<i64>()
        .ok()
        .map(MetricValue::Integer)
}

/// `0x00` — hexadecimal flag word.
fn hex_flag(token: &str) -> Option<MetricValue> {
    let digits = token.strip_prefix("0x")?;
    i64::from_str_radix(digits, 16).ok().map(MetricValue::Integer)
}

/// `13 (Average 2)` / `38 (Min/Max 28/38)` — decode the token without its
/// parenthetical annotation.
fn annotation_suffix(token: &str) -> Option<MetricValue> {
    let cut = token
        .find(" (Average")
        .or_else(|| token.find(" (Min/Max"))?;
    match decode(&token[..cut]) {
        MetricValue::Text(_) => None,
        numeric => Some(numeric),
    }
}
