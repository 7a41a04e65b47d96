//! Per-sender transaction counter.

use crate::error::TypesError;
use num_bigint::BigUint;
use num_traits::{One, Zero};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Monotonically increasing, arbitrary-precision sender nonce.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Nonce(BigUint);

impl Nonce {
    pub fn zero() -> Self {
        Self(BigUint::zero())
    }

    /// The nonce a sender's next transaction must carry.
    pub fn next(&self) -> Self {
        Self(&self.0 + BigUint::one())
    }

    pub fn increment(&mut self) {
        self.0 += BigUint::one();
    }

    pub fn decrement(&mut self) -> Result<(), TypesError> {
        if self.0.is_zero() {
            return Err(TypesError::NonceUnderflow);
        }
        self.0 -= BigUint::one();
        Ok(())
    }
}

impl From<u64> for Nonce {
    fn from(raw: u64) -> Self {
        Self(BigUint::from(raw))
    }
}

impl FromStr for Nonce {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BigUint::from_str(s.trim())
            .map(Self)
            .map_err(|_| TypesError::InvalidNonce(s.to_string()))
    }
}

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Nonce {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Nonce {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct NonceVisitor;

        impl serde::de::Visitor<'_> for NonceVisitor {
            type Value = Nonce;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "a non-negative integer or decimal integer string")
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Nonce::from_str(v).map_err(E::custom)
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(Nonce::from(v))
            }
        }

        deserializer.deserialize_any(NonceVisitor)
    }
}
