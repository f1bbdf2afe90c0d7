use crate::{
    config::CharacteristicsConfig,
    error::DemandResult,
    sampler::{CategoricalSampler, ContinuousSampler},
    types::{AirportCode, ChannelLabel, DayDuration, FrequentFlyerTier, TripType},
};
use std::collections::BTreeMap;
use std::fmt;

/// Immutable bundle of the samplers needed to synthesize one request.
/// Built once per demand definition and shared by all its streams.
#[derive(Debug, Clone, PartialEq)]
pub struct DemandCharacteristics {
    /// Days relative to departure.
    pub arrival_pattern: ContinuousSampler<f64>,
    pub pos: CategoricalSampler<AirportCode>,
    pub channel: CategoricalSampler<ChannelLabel>,
    pub trip_type: CategoricalSampler<TripType>,
    pub stay_duration: CategoricalSampler<DayDuration>,
    pub frequent_flyer: CategoricalSampler<FrequentFlyerTier>,
    /// Seconds after midnight.
    pub preferred_departure_time: ContinuousSampler<i64>,
    pub min_wtp: f64,
    pub wtp_ratio: ContinuousSampler<f64>,
    pub value_of_time: ContinuousSampler<f64>,
    pub change_fee_probability: f64,
    pub change_fee_disutility: f64,
    pub non_refundable_probability: f64,
    pub non_refundable_disutility: f64,
    /// Resolves rest-of-world point-of-sale draws.
    pub default_pos: CategoricalSampler<AirportCode>,
}

impl DemandCharacteristics {
    pub fn from_config(
        config: &CharacteristicsConfig,
        default_pos: &BTreeMap<AirportCode, f64>,
    ) -> DemandResult<Self> {
        Ok(Self {
            arrival_pattern: ContinuousSampler::new(
                "arrival_pattern",
                config.arrival_pattern.iter().copied(),
            )?,
            pos: CategoricalSampler::new("pos", config.pos.clone())?,
            channel: CategoricalSampler::new("channel", config.channel.clone())?,
            trip_type: CategoricalSampler::new("trip_type", config.trip_type.clone())?,
            stay_duration: CategoricalSampler::new("stay_duration", config.stay_duration.clone())?,
            frequent_flyer: CategoricalSampler::new("frequent_flyer", config.frequent_flyer.clone())?,
            preferred_departure_time: ContinuousSampler::new(
                "preferred_departure_time",
                config.preferred_departure_time_seconds()?,
            )?,
            min_wtp: config.min_wtp,
            wtp_ratio: ContinuousSampler::new("wtp_ratio", config.wtp_ratio.iter().copied())?,
            value_of_time: ContinuousSampler::new(
                "value_of_time",
                config.value_of_time.iter().copied(),
            )?,
            change_fee_probability: config.change_fee_probability,
            change_fee_disutility: config.change_fee_disutility,
            non_refundable_probability: config.non_refundable_probability,
            non_refundable_disutility: config.non_refundable_disutility,
            default_pos: CategoricalSampler::new("default_pos", default_pos.clone())?,
        })
    }
}

impl fmt::Display for DemandCharacteristics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Arrival pattern (days, cumulative): {}", self.arrival_pattern)?;
        writeln!(f, "PoS (value, cumulative): {}", self.pos)?;
        writeln!(f, "Channel (value, cumulative): {}", self.channel)?;
        writeln!(f, "Trip type (value, cumulative): {}", self.trip_type)?;
        writeln!(f, "Stay duration (days, cumulative): {}", self.stay_duration)?;
        writeln!(f, "Frequent flyer (tier, cumulative): {}", self.frequent_flyer)?;
        writeln!(
            f,
            "Preferred departure time (seconds, cumulative): {}",
            self.preferred_departure_time
        )?;
        writeln!(f, "Min WTP: {}", self.min_wtp)?;
        writeln!(f, "WTP ratio (ratio, cumulative): {}", self.wtp_ratio)?;
        writeln!(f, "Value of time (value, cumulative): {}", self.value_of_time)?;
        writeln!(
            f,
            "Change fees: {} (disutility {})",
            self.change_fee_probability, self.change_fee_disutility
        )?;
        write!(
            f,
            "Non-refundable: {} (disutility {})",
            self.non_refundable_probability, self.non_refundable_disutility
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DemandConfig;

    #[test]
    fn builds_from_sample_config() {
        let config = DemandConfig::sample();
        let characteristics =
            DemandCharacteristics::from_config(&config.demands[0].characteristics, &config.default_pos)
                .unwrap();
        assert_eq!(characteristics.pos.values(), &["BKK".to_string(), "SIN".to_string()]);
        assert_eq!(characteristics.stay_duration.len(), 6);
        assert_eq!(characteristics.preferred_departure_time.get_value(0.0), 6 * 3600);
        assert_eq!(characteristics.preferred_departure_time.get_value(1.0), 22 * 3600);
        assert_eq!(characteristics.wtp_ratio.get_value(0.0), 1.10);
        assert!(characteristics.to_string().contains("PoS (value, cumulative): BKK:0.3, SIN:1"));
        assert_eq!(characteristics.default_pos.len(), 24);
        assert!(characteristics.to_string().contains("Change fees: 0.5 (disutility 50)"));
    }
}
