//! A thermostat which takes advantage of cheap power.
use super::{ConfigError, FromParameters, ParameterReader, SafetyBounds, Thermostat};
use crate::simulation::RoomState;

/// Runs the compressor when power is cheap, as long as the room isn't already cold.
///
/// Regardless of price, the compressor runs when the room is above `HIGH_TEMP`.
#[derive(Debug, Clone, PartialEq)]
pub struct OpportunistThermostat {
    /// Power below this price counts as a bargain
    pub price_threshold: f64,
    /// Temperature limits
    pub bounds: SafetyBounds,
}

impl FromParameters for OpportunistThermostat {
    fn from_parameters(parameters: &ParameterReader) -> Result<Self, ConfigError> {
        Ok(Self {
            price_threshold: parameters.get("PRICE_OPPORTUNITY_THRESHOLD")?,
            bounds: SafetyBounds::from_parameters(parameters)?,
        })
    }
}

impl Thermostat for OpportunistThermostat {
    fn evaluate_cooler_state(&self, room: &RoomState) -> bool {
        self.bounds
            .forced_decision(room.temperature)
            .unwrap_or_else(|| room.current_price() < self.price_threshold)
    }
}
