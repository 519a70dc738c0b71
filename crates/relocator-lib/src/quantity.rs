//! Exact Kubernetes quantity parsing and comparison
//!
//! Quantities are stored on the wire as strings such as `"250m"`, `"0.5"`,
//! `"512Mi"` or `"1e3"`. Two quantities are equal when they denote the same
//! number, so `"500m"` equals `"0.5"` and `"1Gi"` equals `"1024Mi"`. The value
//! is held as an arbitrary-precision mantissa scaled by a power of ten and a
//! power of two, which keeps every comparison exact.

use crate::error::{RelocatorError, Result};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use num_bigint::BigInt;
use std::str::FromStr;

/// Largest decimal exponent accepted from a quantity string
const MAX_DECIMAL_EXPONENT: i64 = 1000;

/// Parsed quantity: `mantissa * 10^pow10 * 2^pow2`
#[derive(Debug, Clone)]
pub struct ParsedQuantity {
    mantissa: BigInt,
    pow10: i64,
    pow2: u32,
}

impl ParsedQuantity {
    /// Parse a quantity string in canonical Kubernetes notation
    pub fn parse(value: &str) -> Result<Self> {
        let invalid = |reason: &str| RelocatorError::InvalidQuantity {
            value: value.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(invalid("empty quantity"));
        }

        let (negative, unsigned) = match trimmed.as_bytes()[0] {
            b'-' => (true, &trimmed[1..]),
            b'+' => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };

        let number_len = unsigned
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(unsigned.len());
        let (number, suffix) = unsigned.split_at(number_len);

        let (integer, fraction) = match number.split_once('.') {
            Some((_, frac)) if frac.contains('.') => return Err(invalid("multiple decimal points")),
            Some((int, frac)) => (int, frac),
            None => (number, ""),
        };
        if integer.is_empty() && fraction.is_empty() {
            return Err(invalid("missing digits"));
        }

        let digits = format!("{}{}", integer, fraction);
        let mut mantissa =
            BigInt::parse_bytes(digits.as_bytes(), 10).ok_or_else(|| invalid("bad digits"))?;
        if negative {
            mantissa = -mantissa;
        }

        let (suffix_pow10, pow2) = parse_suffix(suffix).ok_or_else(|| invalid("unknown suffix"))?;
        let pow10 = i64::try_from(fraction.len())
            .ok()
            .and_then(|digits| suffix_pow10.checked_sub(digits))
            .filter(|pow10| pow10.unsigned_abs() <= MAX_DECIMAL_EXPONENT.unsigned_abs())
            .ok_or_else(|| invalid("exponent out of range"))?;

        Ok(Self {
            mantissa,
            pow10,
            pow2,
        })
    }

    /// Scale the mantissa up to the common exponents of two quantities
    fn scaled_to(&self, pow10: i64, pow2: u32) -> BigInt {
        let ten = BigInt::from(10u32);
        let mut value = &self.mantissa * ten.pow((self.pow10 - pow10) as u32);
        value <<= (self.pow2 - pow2) as usize;
        value
    }
}

impl FromStr for ParsedQuantity {
    type Err = RelocatorError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<&Quantity> for ParsedQuantity {
    type Error = RelocatorError;

    fn try_from(quantity: &Quantity) -> Result<Self> {
        Self::parse(&quantity.0)
    }
}

impl PartialEq for ParsedQuantity {
    fn eq(&self, other: &Self) -> bool {
        let pow10 = self.pow10.min(other.pow10);
        let pow2 = self.pow2.min(other.pow2);
        self.scaled_to(pow10, pow2) == other.scaled_to(pow10, pow2)
    }
}

impl Eq for ParsedQuantity {}

/// Returns (decimal exponent, binary exponent) for a suffix
fn parse_suffix(suffix: &str) -> Option<(i64, u32)> {
    let scale = match suffix {
        "" => (0, 0),
        "Ki" => (0, 10),
        "Mi" => (0, 20),
        "Gi" => (0, 30),
        "Ti" => (0, 40),
        "Pi" => (0, 50),
        "Ei" => (0, 60),
        "n" => (-9, 0),
        "u" => (-6, 0),
        "m" => (-3, 0),
        "k" => (3, 0),
        "M" => (6, 0),
        "G" => (9, 0),
        "T" => (12, 0),
        "P" => (15, 0),
        "E" => (18, 0),
        _ => {
            let exponent = suffix
                .strip_prefix('e')
                .or_else(|| suffix.strip_prefix('E'))?;
            (exponent.parse::<i64>().ok()?, 0)
        }
    };
    Some(scale)
}

/// Exact numeric equality of two quantities
///
/// Falls back to string equality when either side does not parse.
pub fn same_quantity(a: &Quantity, b: &Quantity) -> bool {
    match (ParsedQuantity::try_from(a), ParsedQuantity::try_from(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a.0 == b.0,
    }
}

/// CPU quantity in millicores, e.g. `"250m"`
pub fn cpu_millis(millicores: i64) -> Quantity {
    Quantity(format!("{}m", millicores))
}

/// Memory quantity in mebibytes, e.g. `"512Mi"`
pub fn memory_mebibytes(mebibytes: i64) -> Quantity {
    Quantity(format!("{}Mi", mebibytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(s: &str) -> ParsedQuantity {
        ParsedQuantity::parse(s).unwrap()
    }

    #[test]
    fn test_decimal_and_milli_forms_are_equal() {
        assert_eq!(q("500m"), q("0.5"));
        assert_eq!(q("1"), q("1000m"));
        assert_eq!(q("1k"), q("1000"));
        assert_eq!(q("1e3"), q("1k"));
        assert_eq!(q("1E3"), q("1000"));
        assert_ne!(q("500m"), q("501m"));
    }

    #[test]
    fn test_binary_suffixes() {
        assert_eq!(q("1Gi"), q("1024Mi"));
        assert_eq!(q("1Ki"), q("1024"));
        assert_eq!(q("512Mi"), q("536870912"));
        assert_ne!(q("1Gi"), q("1G"));
    }

    #[test]
    fn test_exa_suffix_is_not_an_exponent() {
        assert_eq!(q("1E"), q("1000000000000000000"));
        assert_eq!(q("2e-3"), q("2m"));
    }

    #[test]
    fn test_signs_and_zero() {
        assert_eq!(q("-1"), q("-1000m"));
        assert_eq!(q("+1"), q("1"));
        assert_eq!(q("0"), q("0Mi"));
        assert_ne!(q("-1"), q("1"));
    }

    #[test]
    fn test_invalid_quantities() {
        for bad in [
            "",
            "abc",
            "1.2.3",
            "1Xi",
            "m",
            "1e",
            "1e99999",
            "1e-9223372036854775808",
            "1.5e-9223372036854775808",
            "1e9223372036854775807",
        ] {
            assert!(ParsedQuantity::parse(bad).is_err(), "{:?} should not parse", bad);
        }
    }

    #[test]
    fn test_wire_encoding_round_trips() {
        assert_eq!(cpu_millis(250).0, "250m");
        assert_eq!(memory_mebibytes(512).0, "512Mi");
        assert_eq!(q(&cpu_millis(250).0), q("0.25"));
        assert_eq!(q(&memory_mebibytes(512).0), q("0.5Gi"));
    }

    #[test]
    fn test_same_quantity_falls_back_to_strings() {
        assert!(same_quantity(&Quantity("2".into()), &Quantity("2000m".into())));
        assert!(same_quantity(&Quantity("bogus".into()), &Quantity("bogus".into())));
        assert!(!same_quantity(&Quantity("bogus".into()), &Quantity("1".into())));
    }

    #[test]
    fn test_extreme_exponent_falls_back_to_strings() {
        let extreme = Quantity("1e-9223372036854775808".into());
        assert!(!same_quantity(&extreme, &Quantity("1".into())));
        assert!(same_quantity(&extreme, &extreme.clone()));
    }
}
