//! Dictionary-coded probabilities.
//!
//! Cumulative tables are compared by exact key equality and `>=` tests,
//! never by raw `f64` comparison. A key is the probability in fixed point
//! with nine decimal places, so summation drift below 1e-9 disappears when
//! a running total is encoded.

use crate::types::Probability;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of key units in a probability of 1.0.
pub const DICTIONARY_SCALE: u64 = 1_000_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DictionaryKey(u64);

impl DictionaryKey {
    pub const ZERO: DictionaryKey = DictionaryKey(0);
    pub const ONE: DictionaryKey = DictionaryKey(DICTIONARY_SCALE);

    /// Encode a probability. Negative inputs (and NaN) map to zero;
    /// inputs above 1.0 stay above `ONE` so range checks still see them.
    pub fn encode(probability: Probability) -> Self {
        if probability.is_nan() || probability <= 0.0 {
            return Self::ZERO;
        }
        DictionaryKey((probability * DICTIONARY_SCALE as f64).round() as u64)
    }

    pub fn decode(self) -> Probability {
        self.0 as f64 / DICTIONARY_SCALE as f64
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl From<Probability> for DictionaryKey {
    fn from(probability: Probability) -> Self {
        Self::encode(probability)
    }
}

impl fmt::Display for DictionaryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.decode())
    }
}
