//! Exact decimal numbers
//!
//! Monetary-style fields declare [`FieldKind::Decimal`](strata_schema::FieldKind)
//! and decode into this type instead of f64, so no precision is lost between
//! the wire and the value graph. Values are kept in a normalized
//! sign/digits/exponent form; two decimals that denote the same number
//! compare equal regardless of how they were written.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Largest exponent magnitude accepted from input (keeps display bounded)
const MAX_EXPONENT: i64 = 100_000;

/// Error parsing a decimal literal
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseDecimalError {
    /// The literal is not `[-]digits[.digits][e[+-]digits]`
    #[error("invalid decimal literal")]
    Invalid,

    /// The exponent is outside the supported range
    #[error("decimal exponent out of range")]
    ExponentOutOfRange,
}

/// Arbitrary-precision decimal in normalized form
///
/// The value is `(-1)^neg * digits * 10^exp` where `digits` has no leading
/// or trailing zeros (`"0"` for zero, with `neg = false` and `exp = 0`).
///
/// # Example
///
/// ```
/// use strata_codec::Decimal;
///
/// let a: Decimal = "1.50".parse().unwrap();
/// let b: Decimal = "1.5".parse().unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.to_string(), "1.5");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Decimal {
    neg: bool,
    digits: String,
    exp: i32,
}

impl Decimal {
    /// Parse a decimal literal
    pub fn parse(literal: &str) -> Result<Self, ParseDecimalError> {
        let bytes = literal.as_bytes();
        let mut pos = 0;

        let neg = if bytes.first() == Some(&b'-') {
            pos += 1;
            true
        } else {
            false
        };

        let int_start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
        if pos == int_start {
            return Err(ParseDecimalError::Invalid);
        }

        let mut digits = literal[int_start..pos].to_string();
        let mut exp: i64 = 0;

        if pos < bytes.len() && bytes[pos] == b'.' {
            pos += 1;
            let frac_start = pos;
            while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                pos += 1;
            }
            if pos == frac_start {
                return Err(ParseDecimalError::Invalid);
            }
            digits.push_str(&literal[frac_start..pos]);
            exp -= (pos - frac_start) as i64;
        }

        if pos < bytes.len() && (bytes[pos] == b'e' || bytes[pos] == b'E') {
            pos += 1;
            let exp_neg = match bytes.get(pos) {
                Some(b'+') => {
                    pos += 1;
                    false
                }
                Some(b'-') => {
                    pos += 1;
                    true
                }
                _ => false,
            };
            let exp_start = pos;
            while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                pos += 1;
            }
            if pos == exp_start {
                return Err(ParseDecimalError::Invalid);
            }
            let explicit: i64 = literal[exp_start..pos]
                .parse()
                .map_err(|_| ParseDecimalError::ExponentOutOfRange)?;
            exp += if exp_neg { -explicit } else { explicit };
        }

        if pos != bytes.len() {
            return Err(ParseDecimalError::Invalid);
        }
        if exp.abs() > MAX_EXPONENT {
            return Err(ParseDecimalError::ExponentOutOfRange);
        }

        Ok(Self::normalized(neg, digits, exp as i32))
    }

    /// Normalize sign/digits/exponent into the canonical form
    fn normalized(neg: bool, digits: String, mut exp: i32) -> Self {
        let mut digits = digits.trim_start_matches('0').to_string();
        while digits.ends_with('0') {
            digits.pop();
            exp += 1;
        }
        if digits.is_empty() {
            return Self {
                neg: false,
                digits: "0".to_string(),
                exp: 0,
            };
        }
        Self { neg, digits, exp }
    }

    /// Whether the value is exactly zero
    pub fn is_zero(&self) -> bool {
        self.digits == "0"
    }

    /// Lossy conversion to f64, for callers that accept truncation
    pub fn to_f64(&self) -> f64 {
        let rendered = format!(
            "{}{}e{}",
            if self.neg { "-" } else { "" },
            self.digits,
            self.exp
        );
        rendered.parse().unwrap_or(f64::NAN)
    }
}

impl fmt::Display for Decimal {
    /// Canonical rendering without an exponent marker
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.neg {
            f.write_str("-")?;
        }
        if self.exp >= 0 {
            f.write_str(&self.digits)?;
            for _ in 0..self.exp {
                f.write_str("0")?;
            }
        } else {
            let point = self.digits.len() as i32 + self.exp;
            if point > 0 {
                f.write_str(&self.digits[..point as usize])?;
                f.write_str(".")?;
                f.write_str(&self.digits[point as usize..])?;
            } else {
                f.write_str("0.")?;
                for _ in 0..-point {
                    f.write_str("0")?;
                }
                f.write_str(&self.digits)?;
            }
        }
        Ok(())
    }
}

impl FromStr for Decimal {
    type Err = ParseDecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        assert_eq!(Decimal::parse("42").unwrap().to_string(), "42");
        assert_eq!(Decimal::parse("-17.5").unwrap().to_string(), "-17.5");
        assert_eq!(Decimal::parse("19.99").unwrap().to_string(), "19.99");
        assert_eq!(Decimal::parse("3.14e2").unwrap().to_string(), "314");
        assert_eq!(Decimal::parse("5e-3").unwrap().to_string(), "0.005");
    }

    #[test]
    fn test_normalization() {
        assert_eq!(
            Decimal::parse("1.50").unwrap(),
            Decimal::parse("1.5").unwrap()
        );
        assert_eq!(
            Decimal::parse("0.00").unwrap(),
            Decimal::parse("0").unwrap()
        );
        assert_eq!(
            Decimal::parse("-0").unwrap(),
            Decimal::parse("0").unwrap()
        );
        assert_eq!(
            Decimal::parse("100e-2").unwrap(),
            Decimal::parse("1").unwrap()
        );
    }

    #[test]
    fn test_precision_beyond_f64() {
        let literal = "0.10000000000000000001";
        let value = Decimal::parse(literal).unwrap();
        assert_eq!(value.to_string(), literal);
        // f64 cannot hold this distinction.
        assert_eq!(0.10000000000000000001f64, 0.1f64);
    }

    #[test]
    fn test_invalid_literals() {
        assert_eq!(Decimal::parse(""), Err(ParseDecimalError::Invalid));
        assert_eq!(Decimal::parse("-"), Err(ParseDecimalError::Invalid));
        assert_eq!(Decimal::parse("1."), Err(ParseDecimalError::Invalid));
        assert_eq!(Decimal::parse(".5"), Err(ParseDecimalError::Invalid));
        assert_eq!(Decimal::parse("1e"), Err(ParseDecimalError::Invalid));
        assert_eq!(Decimal::parse("1x"), Err(ParseDecimalError::Invalid));
    }

    #[test]
    fn test_exponent_bound() {
        assert_eq!(
            Decimal::parse("1e2000000000"),
            Err(ParseDecimalError::ExponentOutOfRange)
        );
    }

    #[test]
    fn test_to_f64() {
        assert_eq!(Decimal::parse("2.5").unwrap().to_f64(), 2.5);
        assert_eq!(Decimal::parse("-4e2").unwrap().to_f64(), -400.0);
    }
}
