//! Monetary amounts.

use crate::format::format_amount;
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;

/// A monetary amount.
///
/// The backend stores amounts as decimals, which arrive either as JSON
/// numbers or as numeric strings. Both are accepted; amounts are always
/// sent as numbers.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize)]
#[serde(transparent)]
pub struct Amount(pub f64);

impl Amount {
    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<f64> for Amount {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&format_amount(self.0))
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(value) => Ok(Amount(value)),
            Raw::Text(text) => text
                .trim()
                .parse::<f64>()
                .map(Amount)
                .map_err(|_| de::Error::custom(format!("invalid amount: {text:?}"))),
        }
    }
}
