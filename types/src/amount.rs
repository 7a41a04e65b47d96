//! Exact token amounts.
//!
//! Amounts are arbitrary-precision signed integers in base units. Balances of a valid
//! chain state are never negative, but intermediate vote-balance deltas are, so the
//! type itself is signed. There is no floating point anywhere in the arithmetic.

use crate::error::TypesError;
use crate::multiplier::Multiplier;
use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

/// A base-unit token amount.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(BigInt);

impl Amount {
    pub fn zero() -> Self {
        Self(BigInt::zero())
    }

    pub fn new(raw: BigInt) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> &BigInt {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    /// Multiply by an exact decimal multiplier, rounding toward zero.
    pub fn times(&self, multiplier: &Multiplier) -> Self {
        multiplier.apply(self)
    }

    /// Half of this amount, rounded toward zero.
    pub fn halved(&self) -> Self {
        Self(&self.0 / 2)
    }
}

impl From<i64> for Amount {
    fn from(raw: i64) -> Self {
        Self(BigInt::from(raw))
    }
}

impl From<BigInt> for Amount {
    fn from(raw: BigInt) -> Self {
        Self(raw)
    }
}

impl FromStr for Amount {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BigInt::from_str(s.trim())
            .map(Self)
            .map_err(|_| TypesError::InvalidAmount(s.to_string()))
    }
}

impl Add for Amount {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl<'a> Add<&'a Amount> for &'a Amount {
    type Output = Amount;
    fn add(self, rhs: &'a Amount) -> Amount {
        Amount(&self.0 + &rhs.0)
    }
}

impl Sub for Amount {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl<'a> Sub<&'a Amount> for &'a Amount {
    type Output = Amount;
    fn sub(self, rhs: &'a Amount) -> Amount {
        Amount(&self.0 - &rhs.0)
    }
}

impl AddAssign<&Amount> for Amount {
    fn add_assign(&mut self, rhs: &Amount) {
        self.0 += &rhs.0;
    }
}

impl SubAssign<&Amount> for Amount {
    fn sub_assign(&mut self, rhs: &Amount) {
        self.0 -= &rhs.0;
    }
}

impl Neg for Amount {
    type Output = Self;
    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Amounts travel as decimal strings so JSON consumers never lose precision.
impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AmountVisitor;

        impl serde::de::Visitor<'_> for AmountVisitor {
            type Value = Amount;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "an integer or a decimal integer string")
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Amount::from_str(v).map_err(E::custom)
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(Amount::from(v))
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(Amount(BigInt::from(v)))
            }
        }

        deserializer.deserialize_any(AmountVisitor)
    }
}
