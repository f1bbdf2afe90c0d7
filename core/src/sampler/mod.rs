//! Inverse-CDF attribute samplers.
//!
//! Both samplers are built once from a configuration map and queried with
//! a uniform draw. Storage is two parallel arrays (dictionary-coded
//! cumulative probabilities and values), owned and immutable after
//! construction.

pub mod categorical;
pub mod continuous;

pub use categorical::CategoricalSampler;
pub use continuous::{ContinuousSampler, Interpolate};

use crate::dictionary::DictionaryKey;
use std::fmt;

/// Sum of masses accepted as 1.0 when closing a categorical table.
pub const MASS_SUM_TOLERANCE: f64 = 1e-6;

/// Writes `value:cumulative, value:cumulative, ...`.
fn fmt_table<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    cumulative: &[DictionaryKey],
    values: &[T],
) -> fmt::Result {
    for (idx, (key, value)) in cumulative.iter().zip(values).enumerate() {
        if idx != 0 {
            write!(f, ", ")?;
        }
        write!(f, "{value}:{key}")?;
    }
    Ok(())
}
