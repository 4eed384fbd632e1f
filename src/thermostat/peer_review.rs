//! A thermostat which compares the current price with nearby prices.
use super::{ConfigError, FromParameters, ParameterReader, PriceCeiling, Thermostat};
use crate::price::mean_price;
use crate::simulation::RoomState;

/// Runs the compressor when the current price is below the average price of the ticks within
/// `WINDOW` ticks either side of it. Otherwise behaves like
/// [`DesperationThermostat`](super::DesperationThermostat).
#[derive(Debug, Clone, PartialEq)]
pub struct PeerReviewThermostat {
    /// The fallback price ceiling
    pub ceiling: PriceCeiling,
    /// How many ticks either side to include in the average
    pub window: usize,
}

impl FromParameters for PeerReviewThermostat {
    fn from_parameters(parameters: &ParameterReader) -> Result<Self, ConfigError> {
        Ok(Self {
            ceiling: PriceCeiling::from_parameters(parameters)?,
            window: parameters.get_count("WINDOW")?,
        })
    }
}

impl Thermostat for PeerReviewThermostat {
    fn evaluate_cooler_state(&self, room: &RoomState) -> bool {
        self.ceiling.decide(room, |price| {
            // The window always contains the current tick, so is never empty
            mean_price(room.prices.surrounding(room.tick, self.window))
                .is_some_and(|average| price < average)
        })
    }
}
