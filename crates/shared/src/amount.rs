//! Fixed-point ledger amounts.
//!
//! Amounts are carried as a signed 256-bit count of 10^-18 units, which
//! covers the full range and precision of the ledger's `Decimal`. Parsing
//! and rendering go through decimal strings only, so a value typed by a user
//! reaches the manifest without any floating-point round trip.

use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub},
    str::FromStr,
};

use ethnum::{I256, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DECIMAL_PLACES: usize = 18;
const SCALE: I256 = I256::new(1_000_000_000_000_000_000);
const UNSIGNED_SCALE: U256 = U256::new(1_000_000_000_000_000_000);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,
    #[error("amount '{0}' is not a decimal number")]
    Malformed(String),
    #[error("amount '{0}' has more than {DECIMAL_PLACES} fractional digits")]
    TooPrecise(String),
    #[error("amount '{0}' is out of range")]
    Overflow(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Amount(I256);

impl Amount {
    pub const ZERO: Amount = Amount(I256::ZERO);
    pub const MAX: Amount = Amount(I256::MAX);
    pub const MIN: Amount = Amount(I256::MIN);

    pub fn from_whole(units: i64) -> Self {
        Amount(I256::from(units) * SCALE)
    }

    pub fn is_zero(self) -> bool {
        self.0 == I256::ZERO
    }

    pub fn is_positive(self) -> bool {
        self.0 > I256::ZERO
    }

    pub fn is_negative(self) -> bool {
        self.0 < I256::ZERO
    }

    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    /// Adds, clamping to [`Amount::MIN`]/[`Amount::MAX`] instead of wrapping.
    pub fn saturating_add(self, rhs: Amount) -> Amount {
        self.checked_add(rhs).unwrap_or(if rhs.is_negative() {
            Amount::MIN
        } else {
            Amount::MAX
        })
    }

    pub fn parse(raw: &str) -> Result<Self, AmountError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AmountError::Empty);
        }

        let (negative, unsigned) = match trimmed.as_bytes()[0] {
            b'-' => (true, &trimmed[1..]),
            b'+' => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };

        let (whole, fraction) = match unsigned.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (unsigned, ""),
        };

        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if whole.is_empty()
            || !all_digits(whole)
            || !all_digits(fraction)
            || (unsigned.contains('.') && fraction.is_empty())
        {
            return Err(AmountError::Malformed(trimmed.to_string()));
        }
        if fraction.len() > DECIMAL_PLACES {
            return Err(AmountError::TooPrecise(trimmed.to_string()));
        }

        let overflow = || AmountError::Overflow(trimmed.to_string());
        let whole_units = I256::from_str_radix(whole, 10).map_err(|_| overflow())?;
        let fraction_units = if fraction.is_empty() {
            I256::ZERO
        } else {
            let padded = format!("{fraction:0<width$}", width = DECIMAL_PLACES);
            I256::from_str_radix(&padded, 10).map_err(|_| overflow())?
        };

        let magnitude = whole_units
            .checked_mul(SCALE)
            .and_then(|value| value.checked_add(fraction_units))
            .ok_or_else(overflow)?;
        let value = if negative {
            magnitude.checked_neg().ok_or_else(overflow)?
        } else {
            magnitude
        };

        Ok(Amount(value))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let magnitude = self.0.unsigned_abs();
        let whole = magnitude / UNSIGNED_SCALE;
        let fraction = magnitude % UNSIGNED_SCALE;

        if self.is_negative() {
            f.write_str("-")?;
        }
        write!(f, "{whole}")?;
        if fraction != U256::ZERO {
            let digits = format!("{:0>width$}", fraction.to_string(), width = DECIMAL_PLACES);
            write!(f, ".{}", digits.trim_end_matches('0'))?;
        }
        Ok(())
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Amount::parse(s)
    }
}

impl TryFrom<String> for Amount {
    type Error = AmountError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Amount::parse(&value)
    }
}

impl From<Amount> for String {
    fn from(value: Amount) -> Self {
        value.to_string()
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        self.saturating_add(rhs)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Amount) {
        *self = self.saturating_add(rhs);
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Amount) -> Amount {
        match self.0.checked_sub(rhs.0) {
            Some(value) => Amount(value),
            None if rhs.is_negative() => Amount::MAX,
            None => Amount::MIN,
        }
    }
}

impl Neg for Amount {
    type Output = Amount;

    fn neg(self) -> Amount {
        Amount(self.0.checked_neg().unwrap_or(I256::MAX))
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, Amount::saturating_add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[cfg(test)]
#[path = "tests/amount_tests.rs"]
mod tests;
