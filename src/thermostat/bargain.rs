//! A thermostat which only looks at the price of power.
use super::{ConfigError, FromParameters, ParameterReader, Thermostat};
use crate::simulation::RoomState;

/// Runs the compressor whenever power is cheaper than a threshold.
///
/// The temperature is ignored completely, so the room can freeze or overheat if prices stay on one
/// side of the threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct BargainThermostat {
    /// Power is bought when it is strictly cheaper than this
    pub price_threshold: f64,
}

impl FromParameters for BargainThermostat {
    fn from_parameters(parameters: &ParameterReader) -> Result<Self, ConfigError> {
        Ok(Self {
            price_threshold: parameters.get("PRICE_THRESHOLD")?,
        })
    }
}

impl Thermostat for BargainThermostat {
    fn evaluate_cooler_state(&self, room: &RoomState) -> bool {
        room.current_price() < self.price_threshold
    }
}
