//! Arbitrary-precision-looking, fixed-point decimal used for the `DECIMAL` value
//! tag. Backed by an `i128` scaled by `SCALE`, matching the 128-bit little-endian
//! on-disk encoding required by the page codec.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Number of digits kept after the decimal point.
pub const SCALE: u32 = 9;
const SCALE_FACTOR: i128 = 1_000_000_000;

/// A fixed-point decimal: `units / 10^SCALE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Decimal {
    units: i128,
}

impl Decimal {
    pub const ZERO: Decimal = Decimal { units: 0 };

    pub fn from_raw_units(units: i128) -> Self {
        Decimal { units }
    }

    pub fn raw_units(&self) -> i128 {
        self.units
    }

    pub fn from_i64(value: i64) -> Self {
        Decimal {
            units: value as i128 * SCALE_FACTOR,
        }
    }

    pub fn from_f64(value: f64) -> Self {
        Decimal {
            units: (value * SCALE_FACTOR as f64).round() as i128,
        }
    }

    pub fn to_f64(&self) -> f64 {
        self.units as f64 / SCALE_FACTOR as f64
    }

    pub fn checked_add(&self, other: &Decimal) -> Option<Decimal> {
        self.units.checked_add(other.units).map(Decimal::from_raw_units)
    }

    pub fn checked_sub(&self, other: &Decimal) -> Option<Decimal> {
        self.units.checked_sub(other.units).map(Decimal::from_raw_units)
    }

    pub fn checked_mul(&self, other: &Decimal) -> Option<Decimal> {
        let product = self.units.checked_mul(other.units)?;
        Some(Decimal::from_raw_units(product / SCALE_FACTOR))
    }

    /// Division under the mathematical (not truncating) definition; `None` on
    /// division by zero, matching the engine's `DivisionByZero` error.
    pub fn checked_div(&self, other: &Decimal) -> Option<Decimal> {
        if other.units == 0 {
            return None;
        }
        let numerator = self.units.checked_mul(SCALE_FACTOR)?;
        Some(Decimal::from_raw_units(numerator / other.units))
    }

    /// Mathematical modulo: `a - floor(a/b)*b`, always non-negative when `b` is
    /// positive, matching §4.6's type-coercion rule rather than Rust's
    /// truncating `%`.
    pub fn checked_rem_euclid(&self, other: &Decimal) -> Option<Decimal> {
        if other.units == 0 {
            return None;
        }
        let quotient = self.checked_div(other)?;
        let floor_units = quotient.units.div_euclid(SCALE_FACTOR);
        let floor = Decimal::from_raw_units(floor_units * SCALE_FACTOR);
        let product = floor.checked_mul(other)?;
        self.checked_sub(&product)
    }
}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        self.units.cmp(&other.units)
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let negative = self.units < 0;
        let abs = self.units.unsigned_abs();
        let whole = abs / SCALE_FACTOR as u128;
        let frac = abs % SCALE_FACTOR as u128;
        if negative && (whole != 0 || frac != 0) {
            write!(f, "-")?;
        }
        if frac == 0 {
            write!(f, "{whole}")
        } else {
            let frac_str = format!("{frac:0width$}", width = SCALE as usize);
            let trimmed = frac_str.trim_end_matches('0');
            write!(f, "{whole}.{trimmed}")
        }
    }
}

impl FromStr for Decimal {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(());
        }
        let (sign, rest) = match s.strip_prefix('-') {
            Some(rest) => (-1i128, rest),
            None => (1i128, s.strip_prefix('+').unwrap_or(s)),
        };
        let mut parts = rest.splitn(2, '.');
        let whole_part = parts.next().unwrap_or("");
        let frac_part = parts.next().unwrap_or("");
        if whole_part.is_empty() && frac_part.is_empty() {
            return Err(());
        }
        if !whole_part.chars().all(|c| c.is_ascii_digit())
            || !frac_part.chars().all(|c| c.is_ascii_digit())
        {
            return Err(());
        }
        let whole: i128 = if whole_part.is_empty() {
            0
        } else {
            whole_part.parse().map_err(|_| ())?
        };
        let mut frac_digits = frac_part.to_string();
        frac_digits.truncate(SCALE as usize);
        while frac_digits.len() < SCALE as usize {
            frac_digits.push('0');
        }
        let frac: i128 = if frac_digits.is_empty() {
            0
        } else {
            frac_digits.parse().map_err(|_| ())?
        };
        Ok(Decimal {
            units: sign * (whole * SCALE_FACTOR + frac),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_displays_round_trip() {
        let d: Decimal = "12.5".parse().unwrap();
        assert_eq!(d.to_string(), "12.5");
        let d: Decimal = "-3".parse().unwrap();
        assert_eq!(d.to_string(), "-3");
    }

    #[test]
    fn arithmetic_matches_expectations() {
        let a: Decimal = "10".parse().unwrap();
        let b: Decimal = "3".parse().unwrap();
        assert_eq!(a.checked_add(&b).unwrap().to_string(), "13");
        let rem = a.checked_rem_euclid(&b).unwrap();
        assert_eq!(rem.to_string(), "1");
    }

    #[test]
    fn division_by_zero_is_none() {
        let a: Decimal = "10".parse().unwrap();
        assert!(a.checked_div(&Decimal::ZERO).is_none());
    }

    #[test]
    fn negative_modulo_uses_mathematical_definition() {
        let a: Decimal = "-1".parse().unwrap();
        let b: Decimal = "3".parse().unwrap();
        let rem = a.checked_rem_euclid(&b).unwrap();
        assert_eq!(rem.to_string(), "2");
    }
}
