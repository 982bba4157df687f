use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Sub},
};

/// Largest magnitude (in cents) accepted from floating point input.
///
/// Beyond 2^53 an `f64` can no longer represent every integer, so converting
/// to cents would silently lose precision.
const MAX_EXACT_CENTS: f64 = 9_007_199_254_740_992.0;

/// Signed money amount represented as **integer cents**.
///
/// Every split computation goes through this type so that sums such as
/// `33.33 + 33.33 + 33.34` compare exactly against the expense total. The
/// server speaks `f64` major units; conversion happens at the boundary with
/// [`Money::from_major`] and [`Money::to_major`].
///
/// # Examples
///
/// ```rust
/// use divvy_engine::Money;
///
/// let amount = Money::new(1234);
/// assert_eq!(amount.cents(), 1234);
/// assert_eq!(amount.to_string(), "12.34");
/// ```
///
/// Parsing user input never falls back to zero:
///
/// ```rust
/// use divvy_engine::Money;
///
/// assert_eq!(Money::parse_input("10,5"), Some(Money::new(1050)));
/// assert_eq!(Money::parse_input("abc"), None);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

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

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Converts a major-unit float (e.g. `12.5`) into cents, rounding to the
    /// nearest cent.
    ///
    /// Returns `None` for NaN, infinities and values too large to be
    /// represented exactly.
    #[must_use]
    pub fn from_major(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let cents = (value * 100.0).round();
        if cents.abs() >= MAX_EXACT_CENTS {
            return None;
        }
        Some(Self(cents as i64))
    }

    /// Converts back to major units for the wire.
    #[must_use]
    pub fn to_major(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Parses a user-typed amount.
    ///
    /// Accepts `.` or `,` as decimal separator. Anything that is not a finite
    /// number yields `None` so that a half-typed value is treated as "no
    /// entry" rather than zero.
    #[must_use]
    pub fn parse_input(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return None;
        }
        let normalized = trimmed.replace(',', ".");
        let value = normalized.parse::<f64>().ok()?;
        Self::from_major(value)
    }

    /// Absolute difference between two amounts.
    #[must_use]
    pub fn abs_diff(self, other: Money) -> Money {
        Money(self.0.saturating_sub(other.0).saturating_abs())
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let units = abs / 100;
        let cents = abs % 100;
        write!(f, "{sign}{units}.{cents:02}")
    }
}

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Self::Output {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Self::Output {
        Money(self.0.saturating_sub(rhs.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_two_decimals() {
        assert_eq!(Money::new(0).to_string(), "0.00");
        assert_eq!(Money::new(1).to_string(), "0.01");
        assert_eq!(Money::new(10).to_string(), "0.10");
        assert_eq!(Money::new(9000).to_string(), "90.00");
        assert_eq!(Money::new(-1050).to_string(), "-10.50");
    }

    #[test]
    fn parse_accepts_dot_or_comma() {
        assert_eq!(Money::parse_input("10"), Some(Money::new(1000)));
        assert_eq!(Money::parse_input("10.5"), Some(Money::new(1050)));
        assert_eq!(Money::parse_input("10,50"), Some(Money::new(1050)));
        assert_eq!(Money::parse_input("  2.30 "), Some(Money::new(230)));
        assert_eq!(Money::parse_input("-0.01"), Some(Money::new(-1)));
        assert_eq!(Money::parse_input("12."), Some(Money::new(1200)));
    }

    #[test]
    fn parse_rounds_extra_decimals_to_the_cent() {
        assert_eq!(Money::parse_input("33.333"), Some(Money::new(3333)));
        assert_eq!(Money::parse_input("0.005"), Some(Money::new(1)));
    }

    #[test]
    fn parse_rejects_non_finite_input() {
        assert_eq!(Money::parse_input(""), None);
        assert_eq!(Money::parse_input("1e400"), None);
        assert_eq!(Money::parse_input("NaN"), None);
        assert_eq!(Money::parse_input("inf"), None);
        assert_eq!(Money::parse_input("4a"), None);
    }

    #[test]
    fn from_major_survives_float_drift() {
        let sum = 33.33_f64 + 33.33 + 33.34;
        assert_eq!(Money::from_major(sum), Some(Money::new(10_000)));
        assert_eq!(Money::new(1050).to_major(), 10.5);
    }

    #[test]
    fn sum_and_difference() {
        let total: Money = [Money::new(4000), Money::new(4000), Money::new(1000)]
            .iter()
            .sum();
        assert_eq!(total, Money::new(9000));
        assert_eq!(total.abs_diff(Money::new(10_000)), Money::new(1000));
        assert_eq!(Money::new(10_000).abs_diff(total), Money::new(1000));
    }
}
