//! Orchestration of all demand streams of a run.
//!
//! The manager owns the streams (keyed by their canonical string form,
//! iterated in creation order) and feeds their requests into an event
//! queue it does not own.
//!
//! Two totals are tracked:
//!   - `expected`: sum of the stream means, decremented when a generated
//!     request lands at or after its preferred departure and is dropped.
//!   - `actual`:   sum of the drawn totals, never adjusted.
//! They are not expected to reconcile exactly.

use crate::{
    characteristics::DemandCharacteristics,
    config::DemandConfig,
    demand_stream::DemandStream,
    distribution::DemandDistribution,
    error::{DemandError, DemandResult},
    event::DemandEvent,
    event_queue::EventQueue,
    key::DemandStreamKey,
    progress::ProgressStatus,
    request::BookingRequest,
    rng::SeedGenerator,
    types::{Count, DemandStreamKeyStr},
};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default)]
pub struct DemandManager {
    streams: Vec<DemandStream>,
    index: HashMap<DemandStreamKeyStr, usize>,
    status: ProgressStatus,
}

impl DemandManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expand every demand definition into one stream per active
    /// departure date. Stream seeds come from the configuration's master
    /// seed, drawn in creation order.
    pub fn from_config(config: &DemandConfig) -> DemandResult<Self> {
        config.validate()?;
        let mut manager = Self::new();
        let mut seed_generator = SeedGenerator::new(config.seed);

        for demand in &config.demands {
            let characteristics =
                Arc::new(DemandCharacteristics::from_config(&demand.characteristics, &config.default_pos)?);
            let distribution = DemandDistribution::new(demand.demand_mean, demand.demand_std_dev)?;

            for date in demand.active_dates()? {
                let key = DemandStreamKey::new(
                    demand.origin.clone(),
                    demand.destination.clone(),
                    date,
                    demand.cabin.clone(),
                );
                let seeds = seed_generator.next_stream_seeds();
                let stream =
                    DemandStream::new(key, Arc::clone(&characteristics), distribution, seeds)?;
                manager.add_stream(stream)?;
            }
        }

        log::info!(
            "created {} demand stream(s) from seed {}: {:.1} request(s) expected, {} drawn",
            manager.streams.len(),
            config.seed,
            manager.expected_total_number_of_requests(),
            manager.actual_total_number_of_requests()
        );
        Ok(manager)
    }

    pub fn add_stream(&mut self, stream: DemandStream) -> DemandResult<()> {
        let key = stream.key_str().to_string();
        if self.index.contains_key(&key) {
            return Err(DemandError::DuplicateStream { key });
        }
        self.index.insert(key, self.streams.len());
        self.streams.push(stream);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    pub fn stream_keys(&self) -> Vec<DemandStreamKeyStr> {
        self.streams.iter().map(|s| s.key_str().to_string()).collect()
    }

    pub fn streams(&self) -> impl Iterator<Item = &DemandStream> {
        self.streams.iter()
    }

    pub fn stream(&self, key: &str) -> DemandResult<&DemandStream> {
        let idx = self.position(key)?;
        Ok(&self.streams[idx])
    }

    pub fn stream_mut(&mut self, key: &str) -> DemandResult<&mut DemandStream> {
        let idx = self.position(key)?;
        Ok(&mut self.streams[idx])
    }

    fn position(&self, key: &str) -> DemandResult<usize> {
        self.index
            .get(key)
            .copied()
            .ok_or_else(|| DemandError::StreamNotFound { key: key.to_string() })
    }

    pub fn still_having_requests_to_be_generated(&self, key: &str) -> DemandResult<bool> {
        Ok(self.stream(key)?.still_having_requests_to_be_generated())
    }

    pub fn total_number_of_requests_to_be_generated(&self, key: &str) -> DemandResult<Count> {
        Ok(self.stream(key)?.total_number_of_requests_to_be_generated())
    }

    /// Sum of the stream means.
    pub fn expected_total_number_of_requests(&self) -> f64 {
        self.streams.iter().map(|s| s.mean_number_of_requests()).sum()
    }

    /// Sum of the drawn stream totals.
    pub fn actual_total_number_of_requests(&self) -> Count {
        self.streams
            .iter()
            .map(|s| s.total_number_of_requests_to_be_generated())
            .sum()
    }

    /// Aggregate booking-request progress of the current run.
    pub fn status(&self) -> &ProgressStatus {
        &self.status
    }

    /// Per-stream progress, in creation order.
    pub fn stream_statuses(&self) -> Vec<(DemandStreamKeyStr, ProgressStatus)> {
        self.streams
            .iter()
            .map(|s| (s.key_str().to_string(), s.progress_status()))
            .collect()
    }

    /// Queue the first request of every active stream. Returns the
    /// expected total number of requests (sum of the means), for
    /// progress reporting.
    pub fn generate_first_requests<Q: EventQueue>(&mut self, queue: &mut Q) -> DemandResult<f64> {
        let expected = self.expected_total_number_of_requests();
        self.status = ProgressStatus::new(0, expected, self.actual_total_number_of_requests());

        for idx in 0..self.streams.len() {
            if self.streams[idx].still_having_requests_to_be_generated() {
                self.generate_and_queue(idx, queue)?;
            }
        }
        Ok(expected)
    }

    /// Generate the next request of stream `key`. The request is queued
    /// when it is issued before its preferred departure; otherwise it is
    /// dropped and the expected count decremented, which leaves the
    /// stream with nothing on the queue.
    pub fn generate_next_request<Q: EventQueue>(
        &mut self,
        queue: &mut Q,
        key: &str,
    ) -> DemandResult<BookingRequest> {
        let idx = self.position(key)?;
        self.generate_and_queue(idx, queue)
    }

    fn generate_and_queue<Q: EventQueue>(
        &mut self,
        idx: usize,
        queue: &mut Q,
    ) -> DemandResult<BookingRequest> {
        let request = self.streams[idx].generate_next_request()?;

        if request.is_before_preferred_departure() {
            queue.insert(request.request_datetime, DemandEvent::booking_request(request.clone()));
            self.status.current += 1;
        } else {
            log::warn!(
                "[{}] request at {} is beyond departure, dropped",
                request.demand_stream_key,
                request.request_datetime
            );
            self.status.expected -= 1.0;
        }
        Ok(request)
    }

    /// Replay a whole run: queue first requests, then pop events in
    /// chronological order, handing each to `on_event` and refilling from
    /// its stream. Returns the number of events delivered.
    pub fn play_all<Q, F>(&mut self, queue: &mut Q, mut on_event: F) -> DemandResult<Count>
    where
        Q: EventQueue,
        F: FnMut(&DemandEvent),
    {
        self.generate_first_requests(queue)?;
        let mut delivered = 0;
        while let Some(event) = queue.pop_earliest() {
            on_event(&event);
            delivered += 1;
            if self.still_having_requests_to_be_generated(&event.demand_stream_key)? {
                self.generate_next_request(queue, &event.demand_stream_key)?;
            }
        }
        log::info!("run complete: {delivered} event(s), status {}", self.status);
        Ok(delivered)
    }

    /// Reset every stream for another run, then clear the queue.
    pub fn reset_all<Q: EventQueue>(&mut self, queue: &mut Q) -> DemandResult<()> {
        for stream in &mut self.streams {
            stream.reset()?;
        }
        queue.reset();
        self.status = ProgressStatus::default();
        log::info!(
            "reset {} stream(s), {} request(s) drawn",
            self.streams.len(),
            self.actual_total_number_of_requests()
        );
        Ok(())
    }
}
