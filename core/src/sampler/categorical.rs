use super::{fmt_table, MASS_SUM_TOLERANCE};
use crate::{
    dictionary::DictionaryKey,
    error::{DemandError, DemandResult},
    types::Probability,
};
use std::fmt;

/// Discrete attribute drawn through a step-function inverse CDF.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoricalSampler<T> {
    cumulative: Vec<DictionaryKey>,
    values: Vec<T>,
}

impl<T: Clone + PartialEq + fmt::Display> CategoricalSampler<T> {
    /// Build from `value -> probability mass` pairs, accumulated in the
    /// order given (callers pass maps iterated in ascending key order).
    /// Zero-mass entries are dropped. When the masses add up to 1.0 within
    /// `MASS_SUM_TOLERANCE` the last threshold is closed at exactly 1.0.
    pub fn new<I>(what: &str, masses: I) -> DemandResult<Self>
    where
        I: IntoIterator<Item = (T, Probability)>,
    {
        let mut cumulative = Vec::new();
        let mut values = Vec::new();
        let mut running = 0.0;

        for (value, mass) in masses {
            if mass.is_nan() || mass < 0.0 {
                return Err(DemandError::InvalidDistribution {
                    what: what.to_string(),
                    reason: format!("negative or undefined mass {mass} for '{value}'"),
                });
            }
            if mass == 0.0 {
                continue;
            }
            running += mass;
            cumulative.push(DictionaryKey::encode(running));
            values.push(value);
        }

        if values.is_empty() {
            return Err(DemandError::EmptyDistribution { what: what.to_string() });
        }

        if (running - 1.0).abs() <= MASS_SUM_TOLERANCE {
            if let Some(last) = cumulative.last_mut() {
                *last = DictionaryKey::ONE;
            }
        } else {
            log::warn!("distribution '{what}' masses sum to {running}, not 1");
        }

        Ok(Self { cumulative, values })
    }

    /// Value of the first bucket whose cumulative threshold is at or
    /// above `probability`.
    pub fn get_value(&self, probability: Probability) -> DemandResult<&T> {
        let key = DictionaryKey::encode(probability);
        self.cumulative
            .iter()
            .position(|threshold| *threshold >= key)
            .map(|idx| &self.values[idx])
            .ok_or_else(|| DemandError::OutOfRange {
                probability,
                distribution: self.to_string(),
            })
    }

    /// True iff `value` is one of the stored outcomes.
    pub fn check_value(&self, value: &T) -> bool {
        self.values.contains(value)
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn thresholds(&self) -> Vec<Probability> {
        self.cumulative.iter().map(|key| key.decode()).collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<T: fmt::Display> fmt::Display for CategoricalSampler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_table(f, &self.cumulative, &self.values)
    }
}
