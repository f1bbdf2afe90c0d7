//! A demand stream: sequential generation of the booking requests of one
//! (origin, destination, departure date, cabin) combination.
//!
//! Arrival times come from the order-statistics method. With R requests
//! still to draw and cumulative probability p already consumed, the next
//! request sits at
//!
//!   p' = 1 - (1 - p) * (1 - u)^(1/R)
//!
//! which is the smallest of R i.i.d. uniforms on [p, 1]. p' never goes
//! below p, so timestamps come out in order without drawing and sorting
//! all R values up front.

use crate::{
    characteristics::DemandCharacteristics,
    config::{REFERENCE_DEPARTURE_HOUR, REST_OF_WORLD_POS},
    context::RandomGenerationContext,
    distribution::{round_count, DemandDistribution},
    error::{DemandError, DemandResult},
    key::DemandStreamKey,
    progress::ProgressStatus,
    request::{BookingRequest, DEFAULT_PARTY_SIZE},
    rng::{RngPurpose, StreamRng, StreamSeeds},
    types::{Count, DateTime, DemandStreamKeyStr, Probability},
};
use chrono::{Duration, NaiveTime};
use std::sync::Arc;

pub const MILLISECONDS_IN_ONE_DAY: f64 = 86_400_000.0;

/// Next cumulative probability of the order-statistics recurrence.
pub fn next_cumulative_probability(
    probability_so_far: Probability,
    variate: Probability,
    remaining: Count,
) -> Probability {
    debug_assert!(remaining > 0, "no request left to place");
    1.0 - (1.0 - probability_so_far) * (1.0 - variate).powf(1.0 / remaining as f64)
}

pub struct DemandStream {
    key: DemandStreamKey,
    key_str: DemandStreamKeyStr,
    characteristics: Arc<DemandCharacteristics>,
    distribution: DemandDistribution,
    seeds: StreamSeeds,
    total_to_generate: Count,
    context: RandomGenerationContext,
    number_of_requests_rng: StreamRng,
    request_datetime_rng: StreamRng,
    characteristics_rng: StreamRng,
}

impl DemandStream {
    /// Build a stream and draw its total number of requests.
    pub fn new(
        key: DemandStreamKey,
        characteristics: Arc<DemandCharacteristics>,
        distribution: DemandDistribution,
        seeds: StreamSeeds,
    ) -> DemandResult<Self> {
        let mut stream = Self {
            key_str: key.to_key_str(),
            key,
            characteristics,
            distribution,
            seeds,
            total_to_generate: 0,
            context: RandomGenerationContext::new(),
            number_of_requests_rng: seeds.rng(RngPurpose::NumberOfRequests),
            request_datetime_rng: seeds.rng(RngPurpose::RequestDateTime),
            characteristics_rng: seeds.rng(RngPurpose::DemandCharacteristics),
        };
        stream.total_to_generate = stream.draw_total_to_generate()?;
        log::debug!(
            "[{}] created, {} request(s) to generate, distribution {}",
            stream.key_str,
            stream.total_to_generate,
            stream.distribution
        );
        Ok(stream)
    }

    pub fn key(&self) -> &DemandStreamKey {
        &self.key
    }

    pub fn key_str(&self) -> &str {
        &self.key_str
    }

    pub fn characteristics(&self) -> &DemandCharacteristics {
        &self.characteristics
    }

    pub fn distribution(&self) -> &DemandDistribution {
        &self.distribution
    }

    pub fn seeds(&self) -> &StreamSeeds {
        &self.seeds
    }

    pub fn context(&self) -> &RandomGenerationContext {
        &self.context
    }

    pub fn mean_number_of_requests(&self) -> f64 {
        self.distribution.mean_count
    }

    pub fn total_number_of_requests_to_be_generated(&self) -> Count {
        self.total_to_generate
    }

    pub fn number_of_requests_generated_so_far(&self) -> Count {
        self.context.number_of_requests_generated_so_far
    }

    pub fn progress_status(&self) -> ProgressStatus {
        ProgressStatus::new(
            self.context.number_of_requests_generated_so_far,
            self.distribution.mean_count,
            self.total_to_generate,
        )
    }

    fn remaining(&self) -> Count {
        self.total_to_generate
            .saturating_sub(self.context.number_of_requests_generated_so_far)
    }

    /// Active while fewer than the drawn total have been generated.
    pub fn still_having_requests_to_be_generated(&self) -> bool {
        self.remaining() > 0
    }

    /// Reference departure date-time (08:00 on the preferred date).
    pub fn departure_datetime(&self) -> DateTime {
        let reference = NaiveTime::from_hms_opt(REFERENCE_DEPARTURE_HOUR, 0, 0).unwrap_or_default();
        self.key.preferred_departure_date.and_time(reference)
    }

    /// Generate the next request. Must only be called while the stream
    /// is active; an exhausted stream answers `StreamExhausted`.
    ///
    /// The context only moves once every attribute has been drawn: a
    /// failing sampler leaves the stream's count and arrival position
    /// where they were.
    pub fn generate_next_request(&mut self) -> DemandResult<BookingRequest> {
        let (probability, request_datetime) = self.draw_time_of_request()?;

        let chars = Arc::clone(&self.characteristics);
        let rng = &mut self.characteristics_rng;

        let mut point_of_sale = chars.pos.get_value(rng.uniform01())?.clone();
        if point_of_sale == REST_OF_WORLD_POS {
            point_of_sale = chars.default_pos.get_value(rng.uniform01())?.clone();
        }
        let channel = chars.channel.get_value(rng.uniform01())?.clone();
        let trip_type = chars.trip_type.get_value(rng.uniform01())?.clone();
        let stay_duration = *chars.stay_duration.get_value(rng.uniform01())?;
        let frequent_flyer_tier = chars.frequent_flyer.get_value(rng.uniform01())?.clone();
        let departure_seconds = chars.preferred_departure_time.get_value(rng.uniform01());
        let willingness_to_pay = chars.min_wtp * chars.wtp_ratio.get_value(rng.uniform01());
        let value_of_time = chars.value_of_time.get_value(rng.uniform01());
        let change_fees = rng.uniform01() < chars.change_fee_probability;
        let non_refundable = rng.uniform01() < chars.non_refundable_probability;

        let request = BookingRequest {
            demand_stream_key: self.key_str.clone(),
            request_datetime,
            origin: self.key.origin.clone(),
            destination: self.key.destination.clone(),
            point_of_sale,
            preferred_departure_date: self.key.preferred_departure_date,
            preferred_cabin: self.key.preferred_cabin.clone(),
            party_size: DEFAULT_PARTY_SIZE,
            channel,
            trip_type,
            stay_duration,
            frequent_flyer_tier,
            preferred_departure_time: time_of_day(departure_seconds),
            willingness_to_pay,
            value_of_time,
            change_fees,
            change_fee_disutility: chars.change_fee_disutility,
            non_refundable,
            non_refundable_disutility: chars.non_refundable_disutility,
        };
        self.context.record(probability, request_datetime);
        log::debug!("[BKG] {request}");
        Ok(request)
    }

    /// Draw the next arrival time and advance the generation context.
    pub fn generate_time_of_request(&mut self) -> DemandResult<DateTime> {
        let (probability, datetime) = self.draw_time_of_request()?;
        self.context.record(probability, datetime);
        Ok(datetime)
    }

    /// Next cumulative probability and arrival time, context untouched.
    fn draw_time_of_request(&mut self) -> DemandResult<(Probability, DateTime)> {
        let remaining = self.remaining();
        if remaining == 0 {
            return Err(DemandError::StreamExhausted { key: self.key_str.clone() });
        }

        let probability_so_far = self.context.cumulative_probability_so_far;
        let variate = self.request_datetime_rng.uniform01();
        let probability = next_cumulative_probability(probability_so_far, variate, remaining);

        let days = self.characteristics.arrival_pattern.get_value(probability);
        // Floor to the millisecond, then one more: successive requests of
        // a stream never share a timestamp.
        let offset_ms = (days * MILLISECONDS_IN_ONE_DAY).floor() as i64 + 1;
        let mut datetime = self.departure_datetime() + Duration::milliseconds(offset_ms);
        if let Some(last) = self.context.last_request_datetime {
            if datetime <= last {
                datetime = last + Duration::milliseconds(1);
            }
        }
        Ok((probability, datetime))
    }

    /// Redraw the total and clear the context. Generators keep their
    /// current state; rebuild the stream to replay a run bit for bit.
    pub fn reset(&mut self) -> DemandResult<()> {
        self.total_to_generate = self.draw_total_to_generate()?;
        self.context.reset();
        log::debug!(
            "[{}] reset, {} request(s) to generate",
            self.key_str,
            self.total_to_generate
        );
        Ok(())
    }

    fn draw_total_to_generate(&mut self) -> DemandResult<Count> {
        let draw = self
            .number_of_requests_rng
            .normal(self.distribution.mean_count, self.distribution.std_dev_count)?;
        Ok(round_count(draw))
    }
}

fn time_of_day(seconds: i64) -> NaiveTime {
    let seconds = seconds.clamp(0, 86_399) as u32;
    NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0).unwrap_or_default()
}
