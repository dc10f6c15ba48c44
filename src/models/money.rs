//! Fixed-point currency amounts.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A currency amount held as integer minor units (cents).
///
/// Upstream prices arrive as floats with excess precision. They are rounded
/// half-up to two fractional digits once, at ingestion, and never touched by
/// float arithmetic afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Build an amount from minor units.
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Round a float half-up to two fractional digits.
    ///
    /// Rounding works on the float's shortest decimal representation, so
    /// `1.005` becomes `1.01` even though its binary value sits just below.
    pub fn from_f64(value: f64) -> Self {
        if !value.is_finite() {
            return Self::ZERO;
        }

        let text = value.abs().to_string();
        let (whole, frac) = text.split_once('.').unwrap_or((text.as_str(), ""));
        let whole: i64 = whole.parse().unwrap_or(i64::MAX / 100);

        let mut digits = frac.bytes().map(|b| i64::from(b - b'0'));
        let tenths = digits.next().unwrap_or(0);
        let hundredths = digits.next().unwrap_or(0);
        let round_up = digits.next().is_some_and(|d| d >= 5);

        let cents = whole
            .saturating_mul(100)
            .saturating_add(tenths * 10 + hundredths + i64::from(round_up));

        if value < 0.0 {
            Self(-cents)
        } else {
            Self(cents)
        }
    }

    /// The nearest float to this amount, for JSON output.
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Format as US dollars with thousands separators, e.g. `$1,234.50`.
    pub fn to_usd(self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let whole = (abs / 100).to_string();

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, ch) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        format!("{sign}${grouped}.{:02}", abs % 100)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_f64())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        f64::deserialize(deserializer).map(Money::from_f64)
    }
}
