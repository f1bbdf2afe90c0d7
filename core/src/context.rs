use crate::types::{Count, DateTime, Probability};
use serde::{Deserialize, Serialize};

/// Per-stream state of the sequential arrival-time generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RandomGenerationContext {
    pub cumulative_probability_so_far: Probability,
    pub number_of_requests_generated_so_far: Count,
    /// Timestamp of the last request handed out, if any.
    pub last_request_datetime: Option<DateTime>,
}

impl RandomGenerationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one generated request at cumulative probability `probability`.
    pub fn record(&mut self, probability: Probability, datetime: DateTime) {
        self.cumulative_probability_so_far = probability;
        self.number_of_requests_generated_so_far += 1;
        self.last_request_datetime = Some(datetime);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn record_then_reset() {
        let at = NaiveDate::from_ymd_opt(2011, 1, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let mut ctx = RandomGenerationContext::new();
        ctx.record(0.25, at);
        ctx.record(0.5, at);
        assert_eq!(ctx.number_of_requests_generated_so_far, 2);
        assert_eq!(ctx.cumulative_probability_so_far, 0.5);
        assert_eq!(ctx.last_request_datetime, Some(at));

        ctx.reset();
        assert_eq!(ctx, RandomGenerationContext::default());
    }
}
