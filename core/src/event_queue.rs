//! The merge point of all demand streams.
//!
//! The generator only needs to insert, pop the earliest event and check
//! for emptiness. `TimelineQueue` is the in-memory implementation used by
//! the runner and the tests.

use crate::{event::DemandEvent, types::DateTime};
use chrono::Duration;
use std::collections::BTreeMap;

pub trait EventQueue {
    /// Insert `event` at `timestamp`. Returns the timestamp it was
    /// actually stored under, which differs when another event already
    /// holds that instant.
    fn insert(&mut self, timestamp: DateTime, event: DemandEvent) -> DateTime;

    fn pop_earliest(&mut self) -> Option<DemandEvent>;

    fn is_empty(&self) -> bool;

    /// Drop every pending event.
    fn reset(&mut self);
}

/// Time-ordered queue keyed by unique timestamps.
///
/// An insert is stored at the first free millisecond that is at or after
/// its requested timestamp and strictly after the last popped event, so
/// popped events come out strictly increasing even when streams collide.
#[derive(Debug, Default)]
pub struct TimelineQueue {
    events: BTreeMap<DateTime, DemandEvent>,
    last_popped: Option<DateTime>,
    inserted: u64,
    popped: u64,
    nudged: u64,
}

impl TimelineQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn peek_earliest(&self) -> Option<&DemandEvent> {
        self.events.values().next()
    }

    pub fn inserted(&self) -> u64 {
        self.inserted
    }

    pub fn popped(&self) -> u64 {
        self.popped
    }

    /// Number of inserts moved off their requested timestamp.
    pub fn nudged(&self) -> u64 {
        self.nudged
    }
}

impl EventQueue for TimelineQueue {
    fn insert(&mut self, timestamp: DateTime, mut event: DemandEvent) -> DateTime {
        let mut slot = match self.last_popped {
            Some(last) if timestamp <= last => last + Duration::milliseconds(1),
            _ => timestamp,
        };
        while self.events.contains_key(&slot) {
            slot += Duration::milliseconds(1);
        }
        if slot != timestamp {
            self.nudged += 1;
            log::debug!(
                "[{}] timestamp {timestamp} unavailable, event moved to {slot}",
                event.demand_stream_key
            );
        }
        event.timestamp = slot;
        self.events.insert(slot, event);
        self.inserted += 1;
        slot
    }

    fn pop_earliest(&mut self) -> Option<DemandEvent> {
        let (slot, event) = self.events.pop_first()?;
        self.last_popped = Some(slot);
        self.popped += 1;
        Some(event)
    }

    fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    fn reset(&mut self) {
        self.events.clear();
        self.last_popped = None;
        self.inserted = 0;
        self.popped = 0;
        self.nudged = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::DemandConfig, demand_manager::DemandManager};

    fn some_event() -> DemandEvent {
        let mut manager = DemandManager::from_config(&DemandConfig::sample()).unwrap();
        let key = manager.stream_keys()[0].clone();
        let request = manager.stream_mut(&key).unwrap().generate_next_request().unwrap();
        DemandEvent::booking_request(request)
    }

    #[test]
    fn pops_in_timestamp_order() {
        let template = some_event();
        let base = template.timestamp;
        let mut queue = TimelineQueue::new();
        for offset in [5i64, 1, 3] {
            let at = base + Duration::seconds(offset);
            queue.insert(at, template.clone());
        }
        let order: Vec<DateTime> =
            std::iter::from_fn(|| queue.pop_earliest().map(|e| e.timestamp)).collect();
        assert_eq!(
            order,
            vec![
                base + Duration::seconds(1),
                base + Duration::seconds(3),
                base + Duration::seconds(5)
            ]
        );
        assert!(queue.is_empty());
        assert_eq!(queue.popped(), 3);
    }

    #[test]
    fn collisions_are_nudged_forward() {
        let event = some_event();
        let at = event.timestamp;
        let mut queue = TimelineQueue::new();
        assert_eq!(queue.insert(at, event.clone()), at);
        assert_eq!(queue.insert(at, event.clone()), at + Duration::milliseconds(1));
        assert_eq!(queue.insert(at, event.clone()), at + Duration::milliseconds(2));
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.nudged(), 2);

        let first = queue.pop_earliest().unwrap();
        assert_eq!(first.timestamp, at);
        assert_eq!(first.request.request_datetime, at);
    }

    #[test]
    fn late_insert_lands_after_last_popped_event() {
        let event = some_event();
        let at = event.timestamp;
        let mut queue = TimelineQueue::new();
        queue.insert(at, event.clone());
        queue.insert(at, event.clone());
        assert_eq!(queue.pop_earliest().unwrap().timestamp, at);
        assert_eq!(queue.pop_earliest().unwrap().timestamp, at + Duration::milliseconds(1));

        // Requested before the last delivery: moved just past it.
        let stored = queue.insert(at, event.clone());
        assert_eq!(stored, at + Duration::milliseconds(2));
        let later = at + Duration::seconds(10);
        assert_eq!(queue.insert(later, event), later);
        assert_eq!(queue.nudged(), 2);
    }

    #[test]
    fn reset_empties_queue() {
        let event = some_event();
        let mut queue = TimelineQueue::new();
        queue.insert(event.timestamp, event);
        queue.reset();
        assert!(queue.is_empty());
        assert_eq!(queue.inserted(), 0);
        assert!(queue.pop_earliest().is_none());
    }
}
