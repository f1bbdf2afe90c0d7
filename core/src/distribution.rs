use crate::{
    error::{DemandError, DemandResult},
    types::Count,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Normal distribution of the total number of requests of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DemandDistribution {
    pub mean_count: f64,
    pub std_dev_count: f64,
}

impl DemandDistribution {
    pub fn new(mean_count: f64, std_dev_count: f64) -> DemandResult<Self> {
        if !mean_count.is_finite() || !std_dev_count.is_finite() || std_dev_count < 0.0 {
            return Err(DemandError::InvalidDistribution {
                what: "number of requests".into(),
                reason: format!("mean {mean_count}, std dev {std_dev_count}"),
            });
        }
        Ok(Self { mean_count, std_dev_count })
    }
}

/// Round a drawn count: below 0.5 is zero, otherwise round half up.
pub fn round_count(draw: f64) -> Count {
    if draw.is_nan() || draw < 0.5 {
        0
    } else {
        (draw + 0.5).floor() as Count
    }
}

impl fmt::Display for DemandDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N({}, {})", self.mean_count, self.std_dev_count)
    }
}
