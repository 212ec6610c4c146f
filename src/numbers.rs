//! Lenient Numbers
//!
//! Configuration values and user input arrive as free text. Parsing never fails loudly:
//! every reader here falls back to a documented default instead.

use std::str::FromStr;

use rust_decimal::Decimal;

/// Largest exponent magnitude accepted in scientific notation.
const MAX_EXPONENT: u32 = 28;

/// Parse the longest numeric prefix of `text`, ignoring leading whitespace and any
/// trailing text (`"2.5 m2"` is `2.5`).
///
/// Returns `None` when the text does not start with a number.
pub fn parse_leading_decimal(text: &str) -> Option<Decimal> {
    NumericPrefix::scan(text.trim_start())?.to_decimal()
}

/// Parse a multiplier. Missing, unparseable and zero values all become `1`.
pub fn parse_multiplier(text: Option<&str>) -> Decimal {
    text.and_then(parse_leading_decimal)
        .filter(|value| !value.is_zero())
        .unwrap_or(Decimal::ONE)
}

/// Parse the lower bound of a range; unparseable bounds become `0`.
pub fn parse_range_min(text: Option<&str>) -> Decimal {
    text.and_then(parse_leading_decimal)
        .unwrap_or(Decimal::ZERO)
}

/// Parse the upper bound of a range. `None` means unbounded, which is also what
/// unparseable text and infinity literals produce.
pub fn parse_range_max(text: Option<&str>) -> Option<Decimal> {
    let text = text?;

    if is_infinity_literal(text) {
        return None;
    }

    parse_leading_decimal(text)
}

/// Parse a rounding step; anything below `1` becomes `1`.
pub fn parse_rounding_step(text: Option<&str>) -> Decimal {
    text.and_then(parse_leading_decimal)
        .filter(|step| *step >= Decimal::ONE)
        .unwrap_or(Decimal::ONE)
}

/// Why a value typed by the user cannot be calculated with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputError {
    /// The entry does not start with a number
    NotANumber,

    /// The entry is a number too large to represent
    OutOfRange,
}

/// Parse a value typed by the user.
///
/// # Errors
///
/// [`InputError::NotANumber`] is the "invalid value" state; [`InputError::OutOfRange`] is a
/// number beyond the supported magnitude.
pub fn parse_input(text: &str) -> Result<Decimal, InputError> {
    NumericPrefix::scan(text.trim_start())
        .ok_or(InputError::NotANumber)?
        .to_decimal()
        .ok_or(InputError::OutOfRange)
}

fn is_infinity_literal(text: &str) -> bool {
    let trimmed = text.trim().trim_start_matches('+');

    trimmed == "∞"
        || trimmed.eq_ignore_ascii_case("infinity")
        || trimmed.eq_ignore_ascii_case("inf")
}

/// Normalised numeric prefix: `[-]digits[.digits]` plus an optional exponent.
#[derive(Debug, PartialEq)]
struct NumericPrefix {
    mantissa: String,
    exponent: i64,
}

impl NumericPrefix {
    fn scan(text: &str) -> Option<Self> {
        let bytes = text.as_bytes();
        let mut pos = 0;
        let mut mantissa = String::new();

        match bytes.first() {
            Some(b'-') => {
                mantissa.push('-');
                pos += 1;
            }
            Some(b'+') => pos += 1,
            _ => {}
        }

        let int_digits = digits_from(bytes, pos);
        pos += int_digits.len();

        let frac_digits = if bytes.get(pos) == Some(&b'.') {
            digits_from(bytes, pos + 1)
        } else {
            ""
        };

        if int_digits.is_empty() && frac_digits.is_empty() {
            return None;
        }

        mantissa.push_str(if int_digits.is_empty() { "0" } else { int_digits });

        if !frac_digits.is_empty() {
            mantissa.push('.');
            mantissa.push_str(frac_digits);
            pos += 1 + frac_digits.len();
        }

        Some(Self {
            mantissa,
            exponent: exponent_from(bytes, pos),
        })
    }

    /// `None` when the number does not fit a [`Decimal`].
    fn to_decimal(&self) -> Option<Decimal> {
        let mantissa = Decimal::from_str(&self.mantissa).ok()?;

        apply_exponent(mantissa, self.exponent)
    }
}

/// The run of ASCII digits starting at `from` (empty when there is none).
fn digits_from(bytes: &[u8], from: usize) -> &str {
    let tail = bytes.get(from..).unwrap_or_default();
    let len = tail.iter().take_while(|b| b.is_ascii_digit()).count();

    tail.get(..len)
        .and_then(|digits| std::str::from_utf8(digits).ok())
        .unwrap_or_default()
}

/// Exponent suffix (`e3`, `E-2`) starting at `from`; `0` when absent or malformed.
fn exponent_from(bytes: &[u8], from: usize) -> i64 {
    if !matches!(bytes.get(from), Some(b'e' | b'E')) {
        return 0;
    }

    let (negative, digits_at) = match bytes.get(from + 1) {
        Some(b'-') => (true, from + 2),
        Some(b'+') => (false, from + 2),
        _ => (false, from + 1),
    };

    let digits = digits_from(bytes, digits_at);
    let Ok(magnitude) = digits.parse::<i64>() else {
        return 0;
    };

    if negative { -magnitude } else { magnitude }
}

fn apply_exponent(mantissa: Decimal, exponent: i64) -> Option<Decimal> {
    let steps = u32::try_from(exponent.unsigned_abs()).unwrap_or(u32::MAX);

    if exponent >= 0 {
        if steps > MAX_EXPONENT && !mantissa.is_zero() {
            return None;
        }

        (0..steps.min(MAX_EXPONENT)).try_fold(mantissa, |value, _| value.checked_mul(Decimal::TEN))
    } else {
        // Values below the smallest representable scale collapse to zero.
        Some(
            (0..steps.min(MAX_EXPONENT + 1))
                .try_fold(mantissa, |value, _| value.checked_div(Decimal::TEN))
                .unwrap_or(Decimal::ZERO),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_decimal_ignores_trailing_text() {
        assert_eq!(parse_leading_decimal("2.5 m2"), Some(Decimal::new(25, 1)));
        assert_eq!(parse_leading_decimal("  12ks"), Some(Decimal::from(12)));
        assert_eq!(parse_leading_decimal("1,5"), Some(Decimal::ONE));
    }

    #[test]
    fn leading_decimal_handles_signs_and_bare_fractions() {
        assert_eq!(parse_leading_decimal("-3.25"), Some(Decimal::new(-325, 2)));
        assert_eq!(parse_leading_decimal("+4"), Some(Decimal::from(4)));
        assert_eq!(parse_leading_decimal(".5"), Some(Decimal::new(5, 1)));
        assert_eq!(parse_leading_decimal("7."), Some(Decimal::from(7)));
    }

    #[test]
    fn leading_decimal_handles_exponents() {
        assert_eq!(parse_leading_decimal("1.5e3"), Some(Decimal::from(1500)));
        assert_eq!(parse_leading_decimal("25E-1"), Some(Decimal::new(25, 1)));
        assert_eq!(parse_leading_decimal("3e"), Some(Decimal::from(3)));
        assert_eq!(parse_leading_decimal("1e400"), None);
    }

    #[test]
    fn leading_decimal_rejects_non_numbers() {
        assert_eq!(parse_leading_decimal(""), None);
        assert_eq!(parse_leading_decimal("abc"), None);
        assert_eq!(parse_leading_decimal("-"), None);
        assert_eq!(parse_leading_decimal("."), None);
    }

    #[test]
    fn multiplier_defaults_to_one() {
        assert_eq!(parse_multiplier(None), Decimal::ONE);
        assert_eq!(parse_multiplier(Some("oops")), Decimal::ONE);
        assert_eq!(parse_multiplier(Some("0")), Decimal::ONE);
        assert_eq!(parse_multiplier(Some("0.4")), Decimal::new(4, 1));
    }

    #[test]
    fn range_bounds_default_to_zero_and_unbounded() {
        assert_eq!(parse_range_min(None), Decimal::ZERO);
        assert_eq!(parse_range_min(Some("x")), Decimal::ZERO);
        assert_eq!(parse_range_min(Some("10")), Decimal::TEN);

        assert_eq!(parse_range_max(None), None);
        assert_eq!(parse_range_max(Some("x")), None);
        assert_eq!(parse_range_max(Some("Infinity")), None);
        assert_eq!(parse_range_max(Some("∞")), None);
        assert_eq!(parse_range_max(Some("50")), Some(Decimal::from(50)));
    }

    #[test]
    fn rounding_step_is_at_least_one() {
        assert_eq!(parse_rounding_step(None), Decimal::ONE);
        assert_eq!(parse_rounding_step(Some("0.5")), Decimal::ONE);
        assert_eq!(parse_rounding_step(Some("5")), Decimal::from(5));
    }

    #[test]
    fn input_rejects_non_numeric_entry() {
        assert_eq!(parse_input("12.5"), Ok(Decimal::new(125, 1)));
        assert_eq!(parse_input("twelve"), Err(InputError::NotANumber));
    }

    #[test]
    fn oversized_input_is_out_of_range() {
        assert_eq!(
            parse_input("1234567890123456789012345678901234567890"),
            Err(InputError::OutOfRange)
        );
        assert_eq!(parse_input("2e40 m2"), Err(InputError::OutOfRange));
    }
}
