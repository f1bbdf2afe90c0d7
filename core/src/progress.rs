use crate::types::Count;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Generated-so-far against the expected (mean) and actual (drawn) totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressStatus {
    pub current: Count,
    pub expected: f64,
    pub actual: Count,
}

impl ProgressStatus {
    pub fn new(current: Count, expected: f64, actual: Count) -> Self {
        Self { current, expected, actual }
    }

    /// Completion against the actual total, in percent.
    pub fn actual_progress(&self) -> f64 {
        if self.actual == 0 {
            return 100.0;
        }
        self.current as f64 / self.actual as f64 * 100.0
    }

    /// Completion against the expected total, in percent.
    pub fn expected_progress(&self) -> f64 {
        if self.expected <= 0.0 {
            return 100.0;
        }
        self.current as f64 / self.expected * 100.0
    }

    pub fn merge(&mut self, other: &ProgressStatus) {
        self.current += other.current;
        self.expected += other.expected;
        self.actual += other.actual;
    }
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {:.1} expected / {} actual",
            self.current, self.expected, self.actual
        )
    }
}
