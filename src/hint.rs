//! Scalar type hints.
//!
//! [`guess_type`] classifies plain scalar content into the type it would
//! resolve to under the core schema. Construction uses it for booleans, floats
//! and null detection; representation uses it to decide when a string must be
//! marked as non-specific (`!`) so it is not mistaken for something else.

/// What a plain scalar looks like.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScalarHint {
    Integer,
    Float,
    FloatInfinity,
    FloatNaN,
    BoolTrue,
    BoolFalse,
    Null,
    Unknown,
}

const TRUE_WORDS: &[&str] = &[
    "y", "Y", "yes", "Yes", "YES", "true", "True", "TRUE", "on", "On", "ON",
];
const FALSE_WORDS: &[&str] = &[
    "n", "N", "no", "No", "NO", "false", "False", "FALSE", "off", "Off", "OFF",
];
const NULL_WORDS: &[&str] = &["", "~", "null", "Null", "NULL"];

/// Classifies `content`.
///
/// # Examples
///
/// ```rust
/// use yaml_bind::hint::{guess_type, ScalarHint};
///
/// assert_eq!(guess_type("42"), ScalarHint::Integer);
/// assert_eq!(guess_type("-.inf"), ScalarHint::FloatInfinity);
/// assert_eq!(guess_type("On"), ScalarHint::BoolTrue);
/// assert_eq!(guess_type("~"), ScalarHint::Null);
/// assert_eq!(guess_type("hello"), ScalarHint::Unknown);
/// ```
#[must_use]
pub fn guess_type(content: &str) -> ScalarHint {
    if NULL_WORDS.contains(&content) {
        return ScalarHint::Null;
    }
    if TRUE_WORDS.contains(&content) {
        return ScalarHint::BoolTrue;
    }
    if FALSE_WORDS.contains(&content) {
        return ScalarHint::BoolFalse;
    }

    let unsigned = content
        .strip_prefix('-')
        .or_else(|| content.strip_prefix('+'))
        .unwrap_or(content);

    match unsigned {
        ".inf" | ".Inf" | ".INF" => return ScalarHint::FloatInfinity,
        ".nan" | ".NaN" | ".NAN" if unsigned.len() == content.len() => {
            return ScalarHint::FloatNaN
        }
        _ => {}
    }

    if is_integer(unsigned) {
        ScalarHint::Integer
    } else if is_float(unsigned) {
        ScalarHint::Float
    } else {
        ScalarHint::Unknown
    }
}

/// Digits with optional `_` separators; must start with a digit.
fn is_integer(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_digit())
        && chars.all(|c| c.is_ascii_digit() || c == '_')
}

/// `digits[.digits][e[+-]digits]` or `.digits[e[+-]digits]`.
fn is_float(s: &str) -> bool {
    let (mantissa, exponent) = match s.find(|c: char| c == 'e' || c == 'E') {
        Some(pos) => (&s[..pos], Some(&s[pos + 1..])),
        None => (s, None),
    };

    let mantissa_ok = match mantissa.split_once('.') {
        Some((int_part, frac_part)) => {
            let int_ok = int_part.is_empty() || is_integer(int_part);
            let frac_ok = frac_part.chars().all(|c| c.is_ascii_digit() || c == '_');
            int_ok && frac_ok && !(int_part.is_empty() && frac_part.is_empty())
        }
        None => is_integer(mantissa),
    };

    let exponent_ok = match exponent {
        Some(exp) => {
            let digits = exp
                .strip_prefix('-')
                .or_else(|| exp.strip_prefix('+'))
                .unwrap_or(exp);
            !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
        }
        None => true,
    };

    mantissa_ok && exponent_ok
}
