//! Sentinel codec for values that JSON cannot express.
//!
//! A handful of scalars have no JSON representation: `undefined`, `NaN`,
//! `Infinity`, `-Infinity`, and the holes of sparse arrays. oson maps each to
//! a small negative integer. Positions in the flat sequence are always
//! non-negative, so sentinels and references never collide.

use crate::value::{Number, Value};

/// Sentinel for the absent value (`undefined`).
pub const UNDEFINED_INDEX: i64 = -1;
/// Sentinel for a hole in a sparse array. Only valid inside array entries.
pub const ARRAY_HOLE_INDEX: i64 = -2;
/// Sentinel for `NaN`.
pub const NAN_INDEX: i64 = -3;
/// Sentinel for positive infinity.
pub const POS_INF_INDEX: i64 = -4;
/// Sentinel for negative infinity.
pub const NEG_INF_INDEX: i64 = -5;

/// Classifies a value as non-representable and returns its sentinel, or
/// `None` when the value can be stored as a regular entry.
///
/// # Examples
///
/// ```rust
/// use oson::magic::{to_magic_number, NAN_INDEX, UNDEFINED_INDEX};
/// use oson::{Number, Value};
///
/// assert_eq!(to_magic_number(&Value::Undefined), Some(UNDEFINED_INDEX));
/// assert_eq!(to_magic_number(&Value::Number(Number::NaN)), Some(NAN_INDEX));
/// assert_eq!(to_magic_number(&Value::Null), None);
/// ```
#[must_use]
pub fn to_magic_number(value: &Value) -> Option<i64> {
    match value {
        Value::Undefined => Some(UNDEFINED_INDEX),
        Value::Number(number) => match number {
            Number::NaN => Some(NAN_INDEX),
            Number::Infinity => Some(POS_INF_INDEX),
            Number::NegativeInfinity => Some(NEG_INF_INDEX),
            // a raw float payload may still carry a non-finite value
            Number::Float(f) if f.is_nan() => Some(NAN_INDEX),
            Number::Float(f) if f.is_infinite() => {
                Some(if *f < 0.0 { NEG_INF_INDEX } else { POS_INF_INDEX })
            }
            _ => None,
        },
        _ => None,
    }
}

/// Resolves a sentinel back to its scalar, or `None` for any other number.
///
/// The array-hole sentinel is deliberately not resolved here: holes are only
/// meaningful inside array entries and are handled by the array path.
///
/// # Examples
///
/// ```rust
/// use oson::magic::{from_magic_number, ARRAY_HOLE_INDEX};
/// use oson::{Number, Value};
///
/// assert_eq!(from_magic_number(-1), Some(Value::Undefined));
/// assert_eq!(from_magic_number(-4), Some(Value::Number(Number::Infinity)));
/// assert_eq!(from_magic_number(ARRAY_HOLE_INDEX), None);
/// assert_eq!(from_magic_number(0), None);
/// ```
#[must_use]
pub fn from_magic_number(number: i64) -> Option<Value> {
    match number {
        UNDEFINED_INDEX => Some(Value::Undefined),
        NAN_INDEX => Some(Value::Number(Number::NaN)),
        POS_INF_INDEX => Some(Value::Number(Number::Infinity)),
        NEG_INF_INDEX => Some(Value::Number(Number::NegativeInfinity)),
        _ => None,
    }
}
