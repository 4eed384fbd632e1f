//! Fixtures for tests

use crate::model::RoomParameters;
use crate::price::PriceSeries;
use crate::simulation::{DoorSampler, TICKS_PER_MONTH};
use crate::thermostat::{PriceCeiling, SafetyBounds, ThermostatSections};
use indexmap::indexmap;
use rstest::fixture;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

/// A door which is never opened
pub struct ClosedDoor;

impl DoorSampler for ClosedDoor {
    fn is_door_open(&mut self) -> bool {
        false
    }
}

/// A month of prices which are all the same
pub fn constant_prices(price: f64) -> PriceSeries {
    PriceSeries::new(vec![price; TICKS_PER_MONTH]).unwrap()
}

/// A month of prices at `base`, except for the given ticks
pub fn prices_with(base: f64, overrides: &[(usize, f64)]) -> PriceSeries {
    let mut prices = vec![base; TICKS_PER_MONTH];
    for &(tick, price) in overrides {
        prices[tick] = price;
    }

    PriceSeries::new(prices).unwrap()
}

#[fixture]
pub fn room_parameters() -> RoomParameters {
    RoomParameters::default()
}

#[fixture]
pub fn price_ceiling() -> PriceCeiling {
    PriceCeiling {
        bounds: SafetyBounds {
            low: 2.0,
            high: 6.0,
        },
        low_price: 0.2,
        high_price: 1.0,
    }
}

#[fixture]
pub fn thermostat_sections() -> ThermostatSections {
    let ceiling = [
        ("LOW_TEMP", 3.5),
        ("HIGH_TEMP", 6.0),
        ("LOW_PRICE", 0.2),
        ("HIGH_PRICE", 1.0),
    ];

    indexmap! {
        "SIMPLE".to_string() => [("TEMP", 5.0)].into_iter().collect(),
        "BARGAIN".to_string() => [("PRICE_THRESHOLD", 0.3)].into_iter().collect(),
        "OPPORTUNIST".to_string() => [
            ("LOW_TEMP", 3.5),
            ("HIGH_TEMP", 6.0),
            ("PRICE_OPPORTUNITY_THRESHOLD", 0.25),
        ]
        .into_iter()
        .collect(),
        "DESPERATION".to_string() => ceiling.into_iter().collect(),
        "DESPERATION_OPPORTUNIST".to_string() => ceiling
            .into_iter()
            .chain([("PRICE_CUTOFF", 0.25)])
            .collect(),
        "DESPERATION_EXPONENTIAL".to_string() => ceiling
            .into_iter()
            .chain([("STEEPNESS", 2.0)])
            .collect(),
        "WATCHER".to_string() => ceiling.into_iter().chain([("WINDOW", 12.0)]).collect(),
        "PEER_REVIEW".to_string() => ceiling.into_iter().chain([("WINDOW", 12.0)]).collect(),
        "PARTITION".to_string() => [
            ("LOW_TEMP", 3.5),
            ("HIGH_TEMP", 6.0),
            ("PARTITION_SIZE", 288.0),
            ("PURCHASES_PER_PARTITION", 96.0),
        ]
        .into_iter()
        .collect(),
    }
}
