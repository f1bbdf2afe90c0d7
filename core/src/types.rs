//! Shared primitive types used across the demand generator.

use chrono::{NaiveDate, NaiveDateTime};

/// IATA airport code, e.g. "SIN".
pub type AirportCode = String;

/// Cabin code, e.g. "Y".
pub type CabinCode = String;

/// Booking channel label, e.g. "DN" (direct, online).
pub type ChannelLabel = String;

/// Trip type label: "RO" (round trip outbound), "RI" (inbound), "OW" (one way).
pub type TripType = String;

/// Frequent-flyer tier code, e.g. "G".
pub type FrequentFlyerTier = String;

/// Length of stay at destination, in days.
pub type DayDuration = i32;

/// A probability in [0, 1].
pub type Probability = f64;

/// Count of requests.
pub type Count = u64;

/// Seed of a random generator.
pub type RandomSeed = u64;

/// Calendar date of a flight departure.
pub type Date = NaiveDate;

/// Point in time of a booking request, millisecond resolution.
pub type DateTime = NaiveDateTime;

/// Canonical string form of a demand stream key.
pub type DemandStreamKeyStr = String;
