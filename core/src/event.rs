//! Events handed to the downstream simulator.
//!
//! Variants are added as new event kinds appear, never removed or reordered.

use crate::{
    request::BookingRequest,
    types::{DateTime, DemandStreamKeyStr},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    BookingRequest,
}

impl EventType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::BookingRequest => "booking_request",
        }
    }
}

/// A request placed on the timeline. `timestamp` is the queue position,
/// which may have been nudged past a colliding event; the request keeps
/// its own generated date-time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandEvent {
    pub event_type: EventType,
    pub timestamp: DateTime,
    pub demand_stream_key: DemandStreamKeyStr,
    pub request: BookingRequest,
}

impl DemandEvent {
    pub fn booking_request(request: BookingRequest) -> Self {
        Self {
            event_type: EventType::BookingRequest,
            timestamp: request.request_datetime,
            demand_stream_key: request.demand_stream_key.clone(),
            request,
        }
    }
}
