//! Comparison policies for change detection.
//!
//! An observable property only publishes when the written value differs from
//! the stored one. "Differs" is decided by an [`Equality`] policy chosen per
//! property:
//!
//! - [`Equality::Loose`] (default): coercive comparison. `1` and `"1"` are the
//!   same value, `true` and `1` are the same value, `null` and `undefined`
//!   are the same value.
//! - [`Equality::Strict`]: [`Value`]'s own `PartialEq`, no coercion.
//!
//! # Loose comparison rules
//!
//! | Left | Right | Rule |
//! |------|-------|------|
//! | same kind | same kind | strict comparison |
//! | undefined / null | undefined / null | equal |
//! | undefined / null | anything else | not equal |
//! | number | string | string parsed as number |
//! | boolean | anything | boolean becomes `1` / `0`, compare again |
//! | object | number / string | object becomes `"[object Object]"`, compare again |
//!
//! Blank strings do not parse as numbers, so `0` and `""` are never equal.

use crate::value::Value;

/// Comparison policy used by an observable property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Equality {
    /// Coercive comparison (see module docs).
    #[default]
    Loose,
    /// Kind-sensitive comparison; objects by identity.
    Strict,
}

impl Equality {
    /// Whether `a` and `b` are the same value under this policy.
    #[must_use]
    pub fn equals(self, a: &Value, b: &Value) -> bool {
        match self {
            Self::Loose => loose_eq(a, b),
            Self::Strict => a == b,
        }
    }
}

/// Coercive equality.
#[must_use]
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Undefined | Value::Null, Value::Undefined | Value::Null) => true,
        (Value::Undefined | Value::Null, _) | (_, Value::Undefined | Value::Null) => false,
        (Value::Number(x), Value::String(s)) | (Value::String(s), Value::Number(x)) => {
            to_number(s).is_some_and(|y| *x == y)
        }
        (Value::Bool(flag), other) | (other, Value::Bool(flag)) => {
            if let Value::Bool(o) = other {
                return flag == o;
            }
            loose_eq(&Value::Number(bool_to_number(*flag)), other)
        }
        (Value::Object(_), Value::Number(_) | Value::String(_)) => {
            loose_eq(&Value::String(OBJECT_PRIMITIVE.to_owned()), b)
        }
        (Value::Number(_) | Value::String(_), Value::Object(_)) => {
            loose_eq(a, &Value::String(OBJECT_PRIMITIVE.to_owned()))
        }
        _ => a == b,
    }
}

/// Primitive string form of any object.
const OBJECT_PRIMITIVE: &str = "[object Object]";

fn bool_to_number(flag: bool) -> f64 {
    if flag { 1.0 } else { 0.0 }
}

/// Parse a string as a number for loose comparison.
///
/// Returns `None` for blank strings and anything that is not a numeric
/// literal.
#[must_use]
pub fn to_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }

    let (sign, unsigned) = match trimmed.as_bytes()[0] {
        b'-' => (-1.0, &trimmed[1..]),
        b'+' => (1.0, &trimmed[1..]),
        _ => (1.0, trimmed),
    };
    if unsigned == "Infinity" {
        return Some(sign * f64::INFINITY);
    }

    // Radix literals take no sign.
    if unsigned.len() == trimmed.len() {
        let radix = match unsigned.get(..2) {
            Some("0x" | "0X") => Some(16),
            Some("0o" | "0O") => Some(8),
            Some("0b" | "0B") => Some(2),
            _ => None,
        };
        if let Some(radix) = radix {
            let digits = &unsigned[2..];
            if digits.starts_with('+') {
                return None;
            }
            return u64::from_str_radix(digits, radix)
                .ok()
                .map(|n| n as f64);
        }
    }

    // `f64::from_str` also accepts "inf", "NaN" and friends; only plain
    // decimal literals are numeric here.
    if unsigned.starts_with(['+', '-']) {
        return None;
    }
    let decimal = unsigned
        .bytes()
        .all(|c| c.is_ascii_digit() || matches!(c, b'.' | b'e' | b'E' | b'+' | b'-'));
    if !decimal || !unsigned.bytes().any(|c| c.is_ascii_digit()) {
        return None;
    }
    unsigned.parse::<f64>().ok().map(|n| sign * n)
}
