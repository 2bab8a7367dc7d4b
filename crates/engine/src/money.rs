use std::{
    fmt,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
    str::FromStr,
};

use serde::{Serialize, Serializer};

use crate::PricingError;

/// Signed money amount represented as **integer cents**.
///
/// Use this type for **all** monetary values in the engine (bracket prices,
/// discount amounts, final prices) to avoid floating-point drift across
/// repeated discount computations.
///
/// # Examples
///
/// ```rust
/// use engine::MoneyCents;
///
/// let amount = MoneyCents::new(140_00);
/// assert_eq!(amount.cents(), 14000);
/// assert_eq!(amount.to_string(), "140.00€");
/// ```
///
/// Parsing from user input (accepts `.` or `,` as decimal separator; rejects
/// more than 2 decimals):
///
/// ```rust
/// use engine::MoneyCents;
///
/// assert_eq!("10".parse::<MoneyCents>().unwrap().cents(), 1000);
/// assert_eq!("10,5".parse::<MoneyCents>().unwrap().cents(), 1050);
/// assert!("12.345".parse::<MoneyCents>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    /// Creates a new amount from integer cents.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is 0.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Converts a major-unit value (e.g. a YAML `140.5`) into cents.
    ///
    /// Rejects non-finite values, values with more than two fraction digits
    /// and values that overflow the cent range.
    pub fn from_major_f64(value: f64) -> Result<Self, PricingError> {
        if !value.is_finite() {
            return Err(PricingError::InvalidAmount(format!(
                "amount must be finite, got {value}"
            )));
        }
        const MAX_MAJOR: f64 = (i64::MAX / 100) as f64;
        if value.abs() > MAX_MAJOR {
            return Err(PricingError::InvalidAmount("amount too large".to_string()));
        }
        let scaled = value * 100.0;
        let rounded = scaled.round();
        if (scaled - rounded).abs() > 1e-6 {
            return Err(PricingError::InvalidAmount(format!(
                "amount {value} has more than two decimals"
            )));
        }
        Ok(Self(rounded as i64))
    }

    /// Returns the amount as major units (for serialization toward
    /// YAML/JSON, never for arithmetic).
    #[must_use]
    pub fn to_major_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Applies a percentage, rounding half-up to the cent.
    ///
    /// The multiplication runs in `i128`, so any representable amount can
    /// take any valid percentage without overflow.
    #[must_use]
    pub fn apply_percent(self, percent: Percent) -> MoneyCents {
        let product = i128::from(self.0) * i128::from(percent.basis_points());
        let rounded = if product >= 0 {
            (product + 5_000) / 10_000
        } else {
            (product - 5_000) / 10_000
        };
        MoneyCents(rounded as i64)
    }
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}€", abs / 100, abs % 100)
    }
}

impl Add for MoneyCents {
    type Output = MoneyCents;

    fn add(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0 + rhs.0)
    }
}

impl AddAssign for MoneyCents {
    fn add_assign(&mut self, rhs: MoneyCents) {
        self.0 += rhs.0;
    }
}

impl Sub for MoneyCents {
    type Output = MoneyCents;

    fn sub(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0 - rhs.0)
    }
}

impl SubAssign for MoneyCents {
    fn sub_assign(&mut self, rhs: MoneyCents) {
        self.0 -= rhs.0;
    }
}

impl Neg for MoneyCents {
    type Output = MoneyCents;

    fn neg(self) -> Self::Output {
        MoneyCents(-self.0)
    }
}

impl Serialize for MoneyCents {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_major_f64())
    }
}

impl FromStr for MoneyCents {
    type Err = PricingError;

    /// Parses a decimal string into cents.
    ///
    /// Accepts `.` or `,` as decimal separator and an optional leading
    /// `+`/`-`; rejects empty strings and more than two fraction digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PricingError::InvalidAmount(format!("invalid amount: {s:?}"));
        let overflow = || PricingError::InvalidAmount("amount too large".to_string());

        let trimmed = s.trim();
        let (sign, digits) = if let Some(rest) = trimmed.strip_prefix('-') {
            (-1i64, rest)
        } else if let Some(rest) = trimmed.strip_prefix('+') {
            (1i64, rest)
        } else {
            (1i64, trimmed)
        };

        let digits = digits.replace(',', ".");
        let (euros_str, frac_str) = match digits.split_once('.') {
            Some((euros, frac)) => (euros, frac),
            None => (digits.as_str(), ""),
        };
        if euros_str.is_empty() || !euros_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if frac_str.contains('.') || !frac_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let euros: i64 = euros_str.parse().map_err(|_| invalid())?;
        let cents: i64 = match frac_str.len() {
            0 => 0,
            1 => frac_str.parse::<i64>().map_err(|_| invalid())? * 10,
            2 => frac_str.parse().map_err(|_| invalid())?,
            _ => {
                return Err(PricingError::InvalidAmount(format!(
                    "too many decimals: {s:?}"
                )));
            }
        };

        let total = euros
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .ok_or_else(overflow)?;
        Ok(MoneyCents(sign * total))
    }
}

/// Percentage in `[0, 100]` stored as **basis points** (hundredths of a
/// percent), so `12.5%` is exactly representable and discount arithmetic
/// stays in integers end to end.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Percent(i64);

impl Percent {
    pub const ZERO: Percent = Percent(0);
    pub const FULL: Percent = Percent(10_000);

    /// Creates a percentage from basis points. Fails outside `[0, 10000]`.
    pub fn from_basis_points(bp: i64) -> Result<Self, PricingError> {
        if !(0..=10_000).contains(&bp) {
            return Err(PricingError::InvalidAmount(format!(
                "percentage out of range [0, 100]: {bp} bp"
            )));
        }
        Ok(Self(bp))
    }

    /// Creates a percentage from a plain value (e.g. a YAML `12.5`).
    ///
    /// Rejects values outside `[0, 100]` and values with more than two
    /// fraction digits.
    pub fn from_value_f64(value: f64) -> Result<Self, PricingError> {
        if !value.is_finite() || !(0.0..=100.0).contains(&value) {
            return Err(PricingError::InvalidAmount(format!(
                "percentage out of range [0, 100]: {value}"
            )));
        }
        let scaled = value * 100.0;
        let rounded = scaled.round();
        if (scaled - rounded).abs() > 1e-6 {
            return Err(PricingError::InvalidAmount(format!(
                "percentage {value} has more than two decimals"
            )));
        }
        Ok(Self(rounded as i64))
    }

    /// Raw basis points (`50% == 5000`).
    #[must_use]
    pub const fn basis_points(self) -> i64 {
        self.0
    }

    /// Returns `true` if the percentage is 0.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 100 == 0 {
            write!(f, "{}%", self.0 / 100)
        } else {
            write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
        }
    }
}

impl Serialize for Percent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.0 as f64 / 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_eur() {
        assert_eq!(MoneyCents::new(0).to_string(), "0.00€");
        assert_eq!(MoneyCents::new(1).to_string(), "0.01€");
        assert_eq!(MoneyCents::new(14000).to_string(), "140.00€");
        assert_eq!(MoneyCents::new(-1050).to_string(), "-10.50€");
    }

    #[test]
    fn parse_accepts_dot_or_comma() {
        assert_eq!("10".parse::<MoneyCents>().unwrap().cents(), 1000);
        assert_eq!("10.5".parse::<MoneyCents>().unwrap().cents(), 1050);
        assert_eq!("140,00".parse::<MoneyCents>().unwrap().cents(), 14000);
        assert_eq!("-0.01".parse::<MoneyCents>().unwrap().cents(), -1);
        assert_eq!("  2.30 ".parse::<MoneyCents>().unwrap().cents(), 230);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("12.345".parse::<MoneyCents>().is_err());
        assert!("".parse::<MoneyCents>().is_err());
        assert!("1.2.3".parse::<MoneyCents>().is_err());
        assert!("abc".parse::<MoneyCents>().is_err());
    }

    #[test]
    fn from_major_rejects_sub_cent_values() {
        assert_eq!(MoneyCents::from_major_f64(140.0).unwrap().cents(), 14000);
        assert_eq!(MoneyCents::from_major_f64(0.01).unwrap().cents(), 1);
        assert!(MoneyCents::from_major_f64(140.005).is_err());
        assert!(MoneyCents::from_major_f64(f64::NAN).is_err());
    }

    #[test]
    fn percent_range_is_enforced() {
        assert!(Percent::from_value_f64(0.0).is_ok());
        assert!(Percent::from_value_f64(100.0).is_ok());
        assert!(Percent::from_value_f64(-1.0).is_err());
        assert!(Percent::from_value_f64(100.01).is_err());
        assert_eq!(Percent::from_value_f64(12.5).unwrap().basis_points(), 1250);
    }

    #[test]
    fn apply_percent_rounds_half_up() {
        let base = MoneyCents::new(14000);
        assert_eq!(
            base.apply_percent(Percent::from_value_f64(50.0).unwrap()),
            MoneyCents::new(7000)
        );
        // 0.05€ at 10% is 0.005€, which rounds up to a full cent.
        let tiny = MoneyCents::new(5);
        assert_eq!(
            tiny.apply_percent(Percent::from_value_f64(10.0).unwrap()),
            MoneyCents::new(1)
        );
        // 0.04€ at 10% is 0.004€, which rounds down.
        let smaller = MoneyCents::new(4);
        assert_eq!(
            smaller.apply_percent(Percent::from_value_f64(10.0).unwrap()),
            MoneyCents::ZERO
        );
    }

    #[test]
    fn percent_display() {
        assert_eq!(Percent::from_value_f64(50.0).unwrap().to_string(), "50%");
        assert_eq!(Percent::from_value_f64(12.5).unwrap().to_string(), "12.50%");
    }
}
