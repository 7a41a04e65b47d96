//! Exact decimal multipliers for vote weighting.
//!
//! A multiplier is `units / 10^scale`. Configuration files may write it as a string
//! (`"0.1"`), an integer (`2`) or a float literal (`1.5`); floats are converted through
//! their shortest decimal representation, never through binary arithmetic.

use crate::amount::Amount;
use crate::error::TypesError;
use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A non-negative exact decimal factor.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Multiplier {
    units: BigInt,
    scale: u32,
}

impl Multiplier {
    pub fn one() -> Self {
        Self {
            units: BigInt::one(),
            scale: 0,
        }
    }

    pub fn zero() -> Self {
        Self {
            units: BigInt::zero(),
            scale: 0,
        }
    }

    /// Whole-number multiplier.
    pub fn integer(value: u64) -> Self {
        Self {
            units: BigInt::from(value),
            scale: 0,
        }
    }

    /// `units / 10^scale`, e.g. `decimal(15, 1)` is 1.5.
    pub fn decimal(units: u64, scale: u32) -> Self {
        Self {
            units: BigInt::from(units),
            scale,
        }
    }

    /// `amount × self`, rounded toward zero.
    ///
    /// Both halves of an apply/revert pair call this with the same operand, so the
    /// rounding never creates or destroys value across the pair.
    pub fn apply(&self, amount: &Amount) -> Amount {
        let product = amount.raw() * &self.units;
        if self.scale == 0 {
            return Amount::new(product);
        }
        // BigInt division truncates toward zero.
        Amount::new(product / BigInt::from(10u8).pow(self.scale))
    }

    pub fn is_zero(&self) -> bool {
        self.units.is_zero()
    }
}

impl FromStr for Multiplier {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || TypesError::InvalidMultiplier(s.to_string());

        let (whole, fraction) = match trimmed.split_once('.') {
            Some((w, f)) => (w, f),
            None => (trimmed, ""),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if !whole.chars().all(|c| c.is_ascii_digit())
            || !fraction.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }

        let fraction = fraction.trim_end_matches('0');
        let digits = format!("{}{}", if whole.is_empty() { "0" } else { whole }, fraction);
        let units = BigInt::from_str(&digits).map_err(|_| invalid())?;
        if units.is_negative() {
            return Err(invalid());
        }
        Ok(Self {
            units,
            scale: fraction.len() as u32,
        })
    }
}

impl fmt::Display for Multiplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale == 0 {
            return write!(f, "{}", self.units);
        }
        let mut digits = self.units.to_string();
        let min_len = self.scale as usize + 1;
        if digits.len() < min_len {
            digits.insert_str(0, &"0".repeat(min_len - digits.len()));
        }
        let (whole, fraction) = digits.split_at(digits.len() - self.scale as usize);
        write!(f, "{whole}.{fraction}")
    }
}

impl Serialize for Multiplier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Multiplier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MultiplierVisitor;

        impl serde::de::Visitor<'_> for MultiplierVisitor {
            type Value = Multiplier;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "a non-negative decimal number or decimal string")
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Multiplier::from_str(v).map_err(E::custom)
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(Multiplier::integer(v))
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Self::Value, E> {
                u64::try_from(v)
                    .map(Multiplier::integer)
                    .map_err(|_| E::custom(TypesError::InvalidMultiplier(v.to_string())))
            }

            fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<Self::Value, E> {
                Multiplier::from_str(&v.to_string()).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(MultiplierVisitor)
    }
}
