//! Demand configuration: one entry per demand definition, expanded into
//! one demand stream per active departure date.
//!
//! Loaded from JSON. In tests, use `DemandConfig::sample()`.

use crate::{
    error::{DemandError, DemandResult},
    sampler::MASS_SUM_TOLERANCE,
    types::{AirportCode, CabinCode, Date, DayDuration, RandomSeed},
};
use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Master seed used when a configuration does not carry one.
pub const DEFAULT_RANDOM_SEED: RandomSeed = 120_765_987;

/// Departure time of day assumed when placing requests before departure.
pub const REFERENCE_DEPARTURE_HOUR: u32 = 8;

/// Largest WTP / min WTP ratio a ratio table may reach.
pub const DEFAULT_MAX_MIN_WTP_RATIO: f64 = 3.5;

/// Earliest request, in days before departure, an arrival pattern may start.
pub const DEFAULT_MAX_ADVANCE_PURCHASE: f64 = 330.0;

/// Point of sale standing for every market not listed explicitly.
pub const REST_OF_WORLD_POS: &str = "row";

pub const DEFAULT_CHANGE_FEE_PROBABILITY: f64 = 0.5;
pub const DEFAULT_CHANGE_FEE_DISUTILITY: f64 = 50.0;
pub const DEFAULT_NON_REFUNDABLE_PROBABILITY: f64 = 0.5;
pub const DEFAULT_NON_REFUNDABLE_DISUTILITY: f64 = 50.0;

/// Network-wide point-of-sale masses. A demand whose own table draws
/// `REST_OF_WORLD_POS` gets its concrete point of sale from here.
pub fn default_pos_mass() -> BTreeMap<AirportCode, f64> {
    [
        ("SIN", 0.44), ("HKG", 0.04), ("CGK", 0.04), ("SYD", 0.04),
        ("BKK", 0.04), ("LHR", 0.03), ("MEL", 0.03), ("KUL", 0.03),
        ("MNL", 0.03), ("PVG", 0.03), ("PER", 0.02), ("BNE", 0.02),
        ("NRT", 0.02), ("DPS", 0.02), ("SGN", 0.02), ("PEN", 0.02),
        ("FRA", 0.02), ("PEK", 0.02), ("HKT", 0.02), ("AKT", 0.02),
        ("SFO", 0.01), ("ICN", 0.01), ("TPE", 0.01), (REST_OF_WORLD_POS, 0.02),
    ]
    .into_iter()
    .map(|(pos, mass)| (pos.to_string(), mass))
    .collect()
}

/// WTP = min WTP x ratio; default ratio table (ratio -> cumulative probability).
pub fn default_wtp_ratio() -> Vec<(f64, f64)> {
    vec![
        (1.10, 0.0),   (1.40, 0.812), (1.45, 0.833), (1.50, 0.854),
        (1.55, 0.876), (1.60, 0.897), (1.70, 0.909), (1.80, 0.918),
        (2.00, 0.930), (2.30, 0.939), (2.60, 0.952), (3.00, 0.961),
        (3.30, 0.973), (3.40, 0.982), (3.44, 0.988), (3.47, 0.994),
        (3.50, 1.0),
    ]
}

fn default_seed() -> RandomSeed {
    DEFAULT_RANDOM_SEED
}

fn default_dow() -> String {
    "1111111".into()
}

fn default_change_fee_probability() -> f64 {
    DEFAULT_CHANGE_FEE_PROBABILITY
}

fn default_change_fee_disutility() -> f64 {
    DEFAULT_CHANGE_FEE_DISUTILITY
}

fn default_non_refundable_probability() -> f64 {
    DEFAULT_NON_REFUNDABLE_PROBABILITY
}

fn default_non_refundable_disutility() -> f64 {
    DEFAULT_NON_REFUNDABLE_DISUTILITY
}

/// Every distribution needed to synthesize a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacteristicsConfig {
    /// Point of sale -> probability mass.
    pub pos: BTreeMap<AirportCode, f64>,
    pub channel: BTreeMap<String, f64>,
    pub trip_type: BTreeMap<String, f64>,
    /// Stay duration in days -> probability mass.
    pub stay_duration: BTreeMap<DayDuration, f64>,
    pub frequent_flyer: BTreeMap<String, f64>,
    /// "HH:MM" -> cumulative probability.
    pub preferred_departure_time: BTreeMap<String, f64>,
    pub min_wtp: f64,
    /// WTP / min WTP ratio -> cumulative probability.
    #[serde(default = "default_wtp_ratio")]
    pub wtp_ratio: Vec<(f64, f64)>,
    /// Value of time -> cumulative probability.
    pub value_of_time: Vec<(f64, f64)>,
    /// Days relative to departure (<= 0) -> cumulative probability.
    pub arrival_pattern: Vec<(f64, f64)>,
    /// Share of requests accepting fares with change fees.
    #[serde(default = "default_change_fee_probability")]
    pub change_fee_probability: f64,
    #[serde(default = "default_change_fee_disutility")]
    pub change_fee_disutility: f64,
    /// Share of requests accepting non-refundable fares.
    #[serde(default = "default_non_refundable_probability")]
    pub non_refundable_probability: f64,
    #[serde(default = "default_non_refundable_disutility")]
    pub non_refundable_disutility: f64,
}

impl CharacteristicsConfig {
    pub fn validate(&self) -> DemandResult<()> {
        check_masses("pos", self.pos.values())?;
        check_masses("channel", self.channel.values())?;
        check_masses("trip_type", self.trip_type.values())?;
        check_masses("stay_duration", self.stay_duration.values())?;
        check_masses("frequent_flyer", self.frequent_flyer.values())?;

        let mut departure_times = Vec::with_capacity(self.preferred_departure_time.len());
        for (time, probability) in &self.preferred_departure_time {
            departure_times.push((parse_time_of_day(time)? as f64, *probability));
        }
        check_cumulative("preferred_departure_time", &departure_times)?;
        check_cumulative("wtp_ratio", &self.wtp_ratio)?;
        check_cumulative("value_of_time", &self.value_of_time)?;
        check_cumulative("arrival_pattern", &self.arrival_pattern)?;

        if !(self.min_wtp.is_finite() && self.min_wtp >= 0.0) {
            return invalid(format!("min_wtp must be a non-negative amount, got {}", self.min_wtp));
        }
        if self
            .arrival_pattern
            .iter()
            .any(|(days, _)| *days > 0.0 || *days < -DEFAULT_MAX_ADVANCE_PURCHASE)
        {
            return invalid(format!(
                "arrival_pattern days must lie in [-{DEFAULT_MAX_ADVANCE_PURCHASE}, 0]"
            ));
        }
        if self
            .wtp_ratio
            .iter()
            .any(|(ratio, _)| *ratio < 1.0 || *ratio > DEFAULT_MAX_MIN_WTP_RATIO)
        {
            return invalid(format!(
                "wtp_ratio values must lie in [1, {DEFAULT_MAX_MIN_WTP_RATIO}]"
            ));
        }
        for (what, probability) in [
            ("change_fee_probability", self.change_fee_probability),
            ("non_refundable_probability", self.non_refundable_probability),
        ] {
            if !(0.0..=1.0).contains(&probability) {
                return invalid(format!("{what} {probability} outside [0, 1]"));
            }
        }
        for (what, disutility) in [
            ("change_fee_disutility", self.change_fee_disutility),
            ("non_refundable_disutility", self.non_refundable_disutility),
        ] {
            if !(disutility.is_finite() && disutility >= 0.0) {
                return invalid(format!("{what} must be a non-negative amount, got {disutility}"));
            }
        }
        Ok(())
    }

    /// Preferred departure times as seconds after midnight.
    pub fn preferred_departure_time_seconds(&self) -> DemandResult<Vec<(i64, f64)>> {
        self.preferred_departure_time
            .iter()
            .map(|(time, probability)| Ok((parse_time_of_day(time)?, *probability)))
            .collect()
    }
}

/// One demand definition: a route, cabin and date range sharing the
/// same distributions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemandSpec {
    pub origin: AirportCode,
    pub destination: AirportCode,
    pub cabin: CabinCode,
    pub date_from: Date,
    pub date_to: Date,
    /// Active days of week, Monday first, e.g. "1111100".
    #[serde(default = "default_dow")]
    pub dow: String,
    pub demand_mean: f64,
    pub demand_std_dev: f64,
    pub characteristics: CharacteristicsConfig,
}

impl DemandSpec {
    /// Departure dates of the range whose day of week is active.
    pub fn active_dates(&self) -> DemandResult<Vec<Date>> {
        let mask = parse_dow(&self.dow)?;
        Ok(self
            .date_from
            .iter_days()
            .take_while(|date| *date <= self.date_to)
            .filter(|date| mask[date.weekday().num_days_from_monday() as usize])
            .collect())
    }

    pub fn validate(&self) -> DemandResult<()> {
        let route = format!("{}-{} {}", self.origin, self.destination, self.cabin);
        if self.origin.is_empty() || self.destination.is_empty() || self.cabin.is_empty() {
            return invalid(format!("demand '{route}' needs origin, destination and cabin"));
        }
        if self.date_from > self.date_to {
            return invalid(format!(
                "demand '{route}' date range {} .. {} is reversed",
                self.date_from, self.date_to
            ));
        }
        parse_dow(&self.dow)?;
        if !(self.demand_mean.is_finite() && self.demand_std_dev.is_finite())
            || self.demand_std_dev < 0.0
        {
            return invalid(format!(
                "demand '{route}' has invalid mean {} / std dev {}",
                self.demand_mean, self.demand_std_dev
            ));
        }
        self.characteristics.validate()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemandConfig {
    #[serde(default = "default_seed")]
    pub seed: RandomSeed,
    /// Point-of-sale masses resolving `REST_OF_WORLD_POS` draws.
    #[serde(default = "default_pos_mass")]
    pub default_pos: BTreeMap<AirportCode, f64>,
    pub demands: Vec<DemandSpec>,
}

impl DemandConfig {
    /// Load and validate a JSON demand file.
    pub fn load(path: impl AsRef<Path>) -> DemandResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| DemandError::InvalidConfig {
            reason: format!("cannot read {}: {e}", path.display()),
        })?;
        let config = Self::from_json(&content)?;
        log::info!(
            "loaded {} demand definition(s) from {}",
            config.demands.len(),
            path.display()
        );
        Ok(config)
    }

    pub fn from_json(content: &str) -> DemandResult<Self> {
        let config: DemandConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> DemandResult<()> {
        check_masses("default_pos", self.default_pos.values())?;
        for demand in &self.demands {
            demand.validate()?;
        }
        Ok(())
    }

    /// Built-in single-stream demand: SIN-BKK, Y cabin, 2011-02-14.
    pub fn sample() -> Self {
        let departure = NaiveDate::from_ymd_opt(2011, 2, 14).unwrap_or_default();
        let characteristics = CharacteristicsConfig {
            pos: masses(&[("BKK", 0.3), ("SIN", 0.7)]),
            channel: masses(&[("DF", 0.1), ("DN", 0.3), ("IF", 0.4), ("IN", 0.2)]),
            trip_type: masses(&[("RO", 0.6), ("RI", 0.2), ("OW", 0.2)]),
            stay_duration: sample_stay_duration(),
            frequent_flyer: masses(&[("P", 0.01), ("G", 0.05), ("S", 0.15), ("M", 0.3), ("N", 0.49)]),
            preferred_departure_time: masses(&[
                ("06:00", 0.0),
                ("07:00", 0.1),
                ("09:00", 0.3),
                ("17:00", 0.4),
                ("19:00", 0.8),
                ("20:00", 0.95),
                ("22:00", 1.0),
            ]),
            min_wtp: 1000.0,
            wtp_ratio: default_wtp_ratio(),
            value_of_time: vec![(15.0, 0.0), (60.0, 1.0)],
            arrival_pattern: vec![(-330.0, 0.0), (-40.0, 0.2), (-20.0, 0.6), (-1.0, 1.0)],
            change_fee_probability: DEFAULT_CHANGE_FEE_PROBABILITY,
            change_fee_disutility: DEFAULT_CHANGE_FEE_DISUTILITY,
            non_refundable_probability: DEFAULT_NON_REFUNDABLE_PROBABILITY,
            non_refundable_disutility: DEFAULT_NON_REFUNDABLE_DISUTILITY,
        };

        DemandConfig {
            seed: DEFAULT_RANDOM_SEED,
            default_pos: default_pos_mass(),
            demands: vec![single_day("SIN", "BKK", departure, 10.0, 1.0, characteristics)],
        }
    }

    /// Built-in three-market demand around a SIN hub on 2010-02-08:
    /// SIN-BKK, BKK-HKG and SIN-HKG, Y cabin, mean 60 each. The arrival
    /// pattern runs up to departure day, so some requests fall beyond
    /// departure and are dropped.
    pub fn sample_crs() -> Self {
        let departure = NaiveDate::from_ymd_opt(2010, 2, 8).unwrap_or_default();
        let sin_departure_times = masses(&[
            ("06:00", 0.0),
            ("08:00", 0.7),
            ("10:00", 0.8),
            ("12:00", 0.9),
            ("14:00", 1.0),
        ]);
        let bkk_departure_times = masses(&[
            ("08:00", 0.0),
            ("10:00", 0.2),
            ("12:00", 0.6),
            ("14:00", 0.8),
            ("16:00", 1.0),
        ]);
        let market = |pos: &str, other: &str, departure_times: &BTreeMap<String, f64>, min_wtp: f64| {
            CharacteristicsConfig {
                pos: masses(&[(pos, 1.0), (other, 0.0)]),
                channel: masses(&[("DF", 0.0), ("DN", 0.0), ("IF", 0.0), ("IN", 1.0)]),
                trip_type: masses(&[("RO", 0.0), ("RI", 0.0), ("OW", 1.0)]),
                stay_duration: sample_stay_duration(),
                frequent_flyer: masses(&[("P", 0.1), ("G", 0.01), ("S", 0.09), ("M", 0.4), ("N", 0.4)]),
                preferred_departure_time: departure_times.clone(),
                min_wtp,
                wtp_ratio: default_wtp_ratio(),
                value_of_time: vec![(15.0, 0.0), (60.0, 1.0)],
                arrival_pattern: vec![
                    (-330.0, 0.0),
                    (-150.0, 0.1),
                    (-92.0, 0.2),
                    (-55.0, 0.3),
                    (-34.0, 0.4),
                    (-21.0, 0.5),
                    (-12.0, 0.6),
                    (-6.0, 0.7),
                    (-3.0, 0.8),
                    (-1.0, 0.9),
                    (0.0, 1.0),
                ],
                change_fee_probability: DEFAULT_CHANGE_FEE_PROBABILITY,
                change_fee_disutility: DEFAULT_CHANGE_FEE_DISUTILITY,
                non_refundable_probability: DEFAULT_NON_REFUNDABLE_PROBABILITY,
                non_refundable_disutility: DEFAULT_NON_REFUNDABLE_DISUTILITY,
            }
        };

        DemandConfig {
            seed: DEFAULT_RANDOM_SEED,
            default_pos: default_pos_mass(),
            demands: vec![
                single_day("SIN", "BKK", departure, 60.0, 4.0, market("SIN", "BKK", &sin_departure_times, 400.0)),
                single_day("BKK", "HKG", departure, 60.0, 4.0, market("BKK", "HKG", &bkk_departure_times, 400.0)),
                single_day("SIN", "HKG", departure, 60.0, 4.0, market("SIN", "HKG", &sin_departure_times, 750.0)),
            ],
        }
    }
}

fn masses(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

fn sample_stay_duration() -> BTreeMap<DayDuration, f64> {
    [(0, 0.1), (1, 0.1), (2, 0.15), (3, 0.15), (4, 0.15), (5, 0.35)]
        .into_iter()
        .collect()
}

fn single_day(
    origin: &str,
    destination: &str,
    departure: Date,
    demand_mean: f64,
    demand_std_dev: f64,
    characteristics: CharacteristicsConfig,
) -> DemandSpec {
    DemandSpec {
        origin: origin.into(),
        destination: destination.into(),
        cabin: "Y".into(),
        date_from: departure,
        date_to: departure,
        dow: default_dow(),
        demand_mean,
        demand_std_dev,
        characteristics,
    }
}

fn invalid<T>(reason: String) -> DemandResult<T> {
    Err(DemandError::InvalidConfig { reason })
}

fn check_masses<'a>(what: &str, masses: impl Iterator<Item = &'a f64>) -> DemandResult<()> {
    let mut sum = 0.0;
    for mass in masses {
        if mass.is_nan() || *mass < 0.0 {
            return invalid(format!("{what}: negative probability mass {mass}"));
        }
        sum += mass;
    }
    if (sum - 1.0).abs() > MASS_SUM_TOLERANCE {
        return invalid(format!("{what}: probability masses sum to {sum}, expected 1"));
    }
    Ok(())
}

fn check_cumulative(what: &str, points: &[(f64, f64)]) -> DemandResult<()> {
    if points.is_empty() {
        return invalid(format!("{what}: empty cumulative distribution"));
    }
    let mut sorted: Vec<&(f64, f64)> = points.iter().collect();
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0));
    let mut previous = 0.0;
    for (value, probability) in sorted {
        if !value.is_finite() || !(0.0..=1.0).contains(probability) {
            return invalid(format!("{what}: bad point {value}:{probability}"));
        }
        if *probability < previous {
            return invalid(format!("{what}: cumulative probability decreases at {value}"));
        }
        previous = *probability;
    }
    if (previous - 1.0).abs() > MASS_SUM_TOLERANCE {
        return invalid(format!("{what}: cumulative distribution ends at {previous}, expected 1"));
    }
    Ok(())
}

/// "HH:MM" or "HH:MM:SS" to seconds after midnight.
pub fn parse_time_of_day(text: &str) -> DemandResult<i64> {
    let time = NaiveTime::parse_from_str(text, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M"))
        .map_err(|e| DemandError::InvalidConfig {
            reason: format!("bad time of day '{text}': {e}"),
        })?;
    Ok(time.num_seconds_from_midnight() as i64)
}

/// Seven-character day-of-week mask, Monday first.
pub fn parse_dow(mask: &str) -> DemandResult<[bool; 7]> {
    let chars: Vec<char> = mask.chars().collect();
    if chars.len() != 7 || chars.iter().any(|c| *c != '0' && *c != '1') {
        return invalid(format!("day-of-week mask '{mask}' must be 7 characters of 0/1"));
    }
    let mut days = [false; 7];
    for (day, c) in days.iter_mut().zip(chars) {
        *day = c == '1';
    }
    Ok(days)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_config_is_valid() {
        let config = DemandConfig::sample();
        config.validate().expect("sample config validates");
        assert_eq!(config.demands[0].active_dates().unwrap().len(), 1);
    }

    #[test]
    fn json_round_trip_keeps_defaults() {
        let mut json = serde_json::to_value(DemandConfig::sample()).unwrap();
        json.as_object_mut().unwrap().remove("seed");
        json["demands"][0]["characteristics"]
            .as_object_mut()
            .unwrap()
            .remove("wtp_ratio");
        json["demands"][0].as_object_mut().unwrap().remove("dow");
        json.as_object_mut().unwrap().remove("default_pos");
        for field in ["change_fee_probability", "non_refundable_disutility"] {
            json["demands"][0]["characteristics"].as_object_mut().unwrap().remove(field);
        }

        let config = DemandConfig::from_json(&json.to_string()).expect("parses");
        assert_eq!(config.seed, DEFAULT_RANDOM_SEED);
        assert_eq!(config.demands[0].dow, "1111111");
        assert_eq!(config.demands[0].characteristics.wtp_ratio, default_wtp_ratio());
        assert_eq!(config.demands[0].characteristics.stay_duration.len(), 6);
        assert_eq!(config.default_pos, default_pos_mass());
        assert_eq!(config.demands[0].characteristics.change_fee_probability, 0.5);
        assert_eq!(config.demands[0].characteristics.non_refundable_disutility, 50.0);
    }

    #[test]
    fn three_market_sample_is_valid() {
        let config = DemandConfig::sample_crs();
        config.validate().expect("three-market sample validates");
        let routes: Vec<String> = config
            .demands
            .iter()
            .map(|d| format!("{}-{}", d.origin, d.destination))
            .collect();
        assert_eq!(routes, vec!["SIN-BKK", "BKK-HKG", "SIN-HKG"]);
        assert_eq!(config.demands[2].characteristics.min_wtp, 750.0);
    }

    #[test]
    fn default_pos_table_sums_to_one_and_has_rest_of_world() {
        let table = default_pos_mass();
        assert_eq!(table.len(), 24);
        assert_eq!(table.get(REST_OF_WORLD_POS), Some(&0.02));
        let sum: f64 = table.values().sum();
        assert!((sum - 1.0).abs() < 1e-9, "sum {sum}");
    }

    #[test]
    fn rejects_out_of_bound_ratios_and_fees() {
        let mut demand = DemandConfig::sample().demands.remove(0);
        demand.characteristics.wtp_ratio = vec![(1.0, 0.0), (DEFAULT_MAX_MIN_WTP_RATIO + 0.5, 1.0)];
        assert!(demand.validate().unwrap_err().to_string().contains("wtp_ratio"));

        let mut demand = DemandConfig::sample().demands.remove(0);
        demand.characteristics.arrival_pattern = vec![(-400.0, 0.0), (-1.0, 1.0)];
        assert!(demand.validate().unwrap_err().to_string().contains("arrival_pattern"));

        let mut demand = DemandConfig::sample().demands.remove(0);
        demand.characteristics.non_refundable_probability = 1.5;
        assert!(demand.validate().unwrap_err().to_string().contains("non_refundable_probability"));
    }

    #[test]
    fn dow_mask_filters_dates() {
        let mut demand = DemandConfig::sample().demands.remove(0);
        // 2011-02-14 is a Monday; two weeks, weekdays only.
        demand.date_to = NaiveDate::from_ymd_opt(2011, 2, 27).unwrap();
        demand.dow = "1111100".into();
        let dates = demand.active_dates().unwrap();
        assert_eq!(dates.len(), 10);
        assert!(dates.iter().all(|d| d.weekday().num_days_from_monday() < 5));
    }

    #[test]
    fn rejects_bad_masks_and_ranges() {
        assert!(parse_dow("11111").is_err());
        assert!(parse_dow("11111x1").is_err());

        let mut demand = DemandConfig::sample().demands.remove(0);
        demand.date_to = NaiveDate::from_ymd_opt(2011, 2, 1).unwrap();
        assert!(matches!(demand.validate(), Err(DemandError::InvalidConfig { .. })));
    }

    #[test]
    fn rejects_masses_not_summing_to_one() {
        let mut demand = DemandConfig::sample().demands.remove(0);
        demand.characteristics.channel.insert("DF".into(), 0.5);
        let err = demand.validate().unwrap_err();
        assert!(err.to_string().contains("channel"), "got {err}");
    }

    #[test]
    fn rejects_decreasing_cumulative_table() {
        let mut demand = DemandConfig::sample().demands.remove(0);
        demand.characteristics.arrival_pattern = vec![(-30.0, 0.0), (-20.0, 0.7), (-10.0, 0.5), (0.0, 1.0)];
        let err = demand.validate().unwrap_err();
        assert!(err.to_string().contains("arrival_pattern"), "got {err}");
    }

    #[test]
    fn parses_times_of_day() {
        assert_eq!(parse_time_of_day("06:00").unwrap(), 6 * 3600);
        assert_eq!(parse_time_of_day("19:30:15").unwrap(), 19 * 3600 + 30 * 60 + 15);
        assert!(parse_time_of_day("25:00").is_err());
    }
}
