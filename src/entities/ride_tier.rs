use std::fmt;

use serde::{Deserialize, Serialize};

pub const METERS_PER_MILE: f64 = 1609.34;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RideTier {
    Economy,
    Premium,
    ExtraLarge,
}

impl RideTier {
    pub const ALL: [RideTier; 3] = [RideTier::Economy, RideTier::Premium, RideTier::ExtraLarge];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Economy => "Economy",
            Self::Premium => "Premium",
            Self::ExtraLarge => "XL",
        }
    }

    pub fn image_name(&self) -> &'static str {
        match self {
            Self::Economy | Self::ExtraLarge => "ride-economy",
            Self::Premium => "ride-premium",
        }
    }

    pub fn base_fare(&self) -> f64 {
        match self {
            Self::Economy => 5.0,
            Self::Premium => 20.0,
            Self::ExtraLarge => 10.0,
        }
    }

    pub fn per_mile_rate(&self) -> f64 {
        match self {
            Self::Economy => 1.5,
            Self::Premium => 2.0,
            Self::ExtraLarge => 1.75,
        }
    }

    /// Price for a trip of `distance` meters. A missing, negative or
    /// non-finite distance prices at zero.
    pub fn fare(&self, distance: Option<f64>) -> Fare {
        match distance {
            Some(meters) if meters.is_finite() && meters >= 0.0 => {
                Fare(self.base_fare() + self.per_mile_rate() * (meters / METERS_PER_MILE))
            }
            _ => Fare(0.0),
        }
    }
}

impl Default for RideTier {
    fn default() -> Self {
        Self::Economy
    }
}

/// A price in dollars. Rounded to cents only when displayed.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Fare(pub f64);

impl Fare {
    pub fn amount(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for Fare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fare_follows_base_plus_rate() {
        for tier in RideTier::ALL {
            for meters in [0.0, 1.0, 804.67, 1609.34, 2414.0, 25_000.0] {
                let expected = tier.base_fare() + tier.per_mile_rate() * meters / 1609.34;
                let fare = tier.fare(Some(meters)).amount();
                assert!((fare - expected).abs() < 1e-9, "{:?} at {}", tier, meters);
            }
        }
    }

    #[test]
    fn zero_distance_is_base_fare() {
        assert_eq!(RideTier::Economy.fare(Some(0.0)), Fare(5.0));
        assert_eq!(RideTier::Premium.fare(Some(0.0)), Fare(20.0));
        assert_eq!(RideTier::ExtraLarge.fare(Some(0.0)), Fare(10.0));
    }

    #[test]
    fn undefined_distance_is_free() {
        for tier in RideTier::ALL {
            assert_eq!(tier.fare(None), Fare(0.0));
            assert_eq!(tier.fare(Some(-1.0)), Fare(0.0));
            assert_eq!(tier.fare(Some(f64::NAN)), Fare(0.0));
        }
    }

    #[test]
    fn ferry_building_economy() {
        let fare = RideTier::Economy.fare(Some(2414.0));
        assert_eq!(fare.to_string(), "$7.25");
    }

    #[test]
    fn tiers_are_ordered_by_price() {
        let economy = RideTier::Economy.fare(Some(5000.0));
        let xl = RideTier::ExtraLarge.fare(Some(5000.0));
        let premium = RideTier::Premium.fare(Some(5000.0));
        assert!(economy < xl && xl < premium);
    }
}
