use crate::types::{AirportCode, CabinCode, Date, DemandStreamKeyStr};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a demand stream. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DemandStreamKey {
    pub origin: AirportCode,
    pub destination: AirportCode,
    pub preferred_departure_date: Date,
    pub preferred_cabin: CabinCode,
}

impl DemandStreamKey {
    pub fn new(
        origin: impl Into<AirportCode>,
        destination: impl Into<AirportCode>,
        preferred_departure_date: Date,
        preferred_cabin: impl Into<CabinCode>,
    ) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            preferred_departure_date,
            preferred_cabin: preferred_cabin.into(),
        }
    }

    /// Canonical lookup form, e.g. `SIN-BKK 2010-Feb-08 Y`.
    pub fn to_key_str(&self) -> DemandStreamKeyStr {
        self.to_string()
    }
}

impl fmt::Display for DemandStreamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{} {} {}",
            self.origin,
            self.destination,
            self.preferred_departure_date.format("%Y-%b-%d"),
            self.preferred_cabin
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn canonical_string_form() {
        let date = NaiveDate::from_ymd_opt(2010, 2, 8).unwrap();
        let key = DemandStreamKey::new("SIN", "BKK", date, "Y");
        assert_eq!(key.to_key_str(), "SIN-BKK 2010-Feb-08 Y");
    }

    #[test]
    fn keys_differ_by_any_component() {
        let date = NaiveDate::from_ymd_opt(2010, 2, 8).unwrap();
        let base = DemandStreamKey::new("SIN", "BKK", date, "Y");
        let other_cabin = DemandStreamKey::new("SIN", "BKK", date, "C");
        let other_date = DemandStreamKey::new("SIN", "BKK", date.succ_opt().unwrap(), "Y");
        assert_ne!(base.to_key_str(), other_cabin.to_key_str());
        assert_ne!(base.to_key_str(), other_date.to_key_str());
    }
}
