use super::fmt_table;
use crate::{
    dictionary::DictionaryKey,
    error::{DemandError, DemandResult},
    types::Probability,
};
use std::fmt;

/// Domain values a piecewise-linear inverse CDF can interpolate between.
pub trait Interpolate: Copy {
    /// Point at `weight` in [0, 1] on the segment from `lower` to `upper`.
    fn interpolate(lower: Self, upper: Self, weight: f64) -> Self;
}

impl Interpolate for f64 {
    fn interpolate(lower: Self, upper: Self, weight: f64) -> Self {
        lower + (upper - lower) * weight
    }
}

impl Interpolate for i64 {
    fn interpolate(lower: Self, upper: Self, weight: f64) -> Self {
        lower + ((upper - lower) as f64 * weight).round() as i64
    }
}

/// Continuous attribute drawn through a piecewise-linear inverse CDF.
#[derive(Debug, Clone, PartialEq)]
pub struct ContinuousSampler<T> {
    cumulative: Vec<DictionaryKey>,
    values: Vec<T>,
}

impl<T: Interpolate + fmt::Display> ContinuousSampler<T> {
    /// Build from `(value, cumulative probability)` breakpoints. The table
    /// is already cumulative; it is stored ordered by ascending cumulative
    /// probability (ties keep their input order).
    pub fn new<I>(what: &str, breakpoints: I) -> DemandResult<Self>
    where
        I: IntoIterator<Item = (T, Probability)>,
    {
        let mut points: Vec<(DictionaryKey, T)> = Vec::new();
        for (value, probability) in breakpoints {
            if probability.is_nan() || !(0.0..=1.0).contains(&probability) {
                return Err(DemandError::InvalidDistribution {
                    what: what.to_string(),
                    reason: format!("cumulative probability {probability} at '{value}' outside [0, 1]"),
                });
            }
            points.push((DictionaryKey::encode(probability), value));
        }
        if points.is_empty() {
            return Err(DemandError::EmptyDistribution { what: what.to_string() });
        }
        points.sort_by_key(|(key, _)| *key);

        let (cumulative, values) = points.into_iter().unzip();
        Ok(Self { cumulative, values })
    }

    /// Inverse CDF lookup. Below the first breakpoint the first value is
    /// returned, above the last one the last value; in between the value
    /// is linearly interpolated on the enclosing segment.
    pub fn get_value(&self, probability: Probability) -> T {
        let key = DictionaryKey::encode(probability);
        let Some(idx) = self.cumulative.iter().position(|point| *point >= key) else {
            return self.values[self.values.len() - 1];
        };
        if idx == 0 || self.cumulative[idx] == key {
            return self.values[idx];
        }

        let previous = self.cumulative[idx - 1];
        let next = self.cumulative[idx];
        if previous == next {
            return self.values[idx - 1];
        }

        let weight = (key.decode() - previous.decode()) / (next.decode() - previous.decode());
        T::interpolate(self.values[idx - 1], self.values[idx], weight)
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn breakpoints(&self) -> Vec<Probability> {
        self.cumulative.iter().map(|key| key.decode()).collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<T: fmt::Display> fmt::Display for ContinuousSampler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_table(f, &self.cumulative, &self.values)
    }
}
