//! A thermostat which only looks at the temperature.
use super::{ConfigError, FromParameters, ParameterReader, Thermostat};
use crate::simulation::RoomState;

/// Runs the compressor whenever the room is warmer than a set temperature
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleThermostat {
    /// The room is cooled when it is strictly above this temperature
    pub temperature: f64,
}

impl FromParameters for SimpleThermostat {
    fn from_parameters(parameters: &ParameterReader) -> Result<Self, ConfigError> {
        Ok(Self {
            temperature: parameters.get("TEMP")?,
        })
    }
}

impl Thermostat for SimpleThermostat {
    fn evaluate_cooler_state(&self, room: &RoomState) -> bool {
        room.temperature > self.temperature
    }
}
