use crate::types::{
    AirportCode, CabinCode, ChannelLabel, Date, DateTime, DayDuration, DemandStreamKeyStr,
    FrequentFlyerTier, TripType,
};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Party size of every generated request.
pub const DEFAULT_PARTY_SIZE: u32 = 1;

/// One synthetic booking request, as handed to the booking simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub demand_stream_key: DemandStreamKeyStr,
    pub request_datetime: DateTime,
    pub origin: AirportCode,
    pub destination: AirportCode,
    pub point_of_sale: AirportCode,
    pub preferred_departure_date: Date,
    pub preferred_cabin: CabinCode,
    pub party_size: u32,
    pub channel: ChannelLabel,
    pub trip_type: TripType,
    pub stay_duration: DayDuration,
    pub frequent_flyer_tier: FrequentFlyerTier,
    pub preferred_departure_time: NaiveTime,
    pub willingness_to_pay: f64,
    pub value_of_time: f64,
    /// Accepts fares carrying change fees.
    pub change_fees: bool,
    pub change_fee_disutility: f64,
    /// Accepts non-refundable fares.
    pub non_refundable: bool,
    pub non_refundable_disutility: f64,
}

impl BookingRequest {
    /// True when the request is issued strictly before the preferred
    /// departure date and time it asks for.
    pub fn is_before_preferred_departure(&self) -> bool {
        self.request_datetime
            < self.preferred_departure_date.and_time(self.preferred_departure_time)
    }
}

impl fmt::Display for BookingRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at {} from {}, {}-{} {} {} cabin {}, {}, {}, stay {}d, ff {}, wtp {:.2}, vot {:.2}, \
             change fees {} ({:.0}), non-refundable {} ({:.0})",
            self.demand_stream_key,
            self.request_datetime.format("%Y-%m-%d %H:%M:%S%.3f"),
            self.point_of_sale,
            self.origin,
            self.destination,
            self.preferred_departure_date,
            self.preferred_departure_time,
            self.preferred_cabin,
            self.channel,
            self.trip_type,
            self.stay_duration,
            self.frequent_flyer_tier,
            self.willingness_to_pay,
            self.value_of_time,
            self.change_fees,
            self.change_fee_disutility,
            self.non_refundable,
            self.non_refundable_disutility
        )
    }
}
