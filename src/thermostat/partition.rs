//! A thermostat which buys power on the cheapest ticks of each block of time.
use super::{ConfigError, FromParameters, ParameterReader, SafetyBounds, Thermostat};
use crate::simulation::RoomState;

/// Divides the month into contiguous partitions of `PARTITION_SIZE` ticks and runs the
/// compressor on the `PURCHASES_PER_PARTITION` cheapest ticks of each one.
///
/// Ties between equal prices go to the earlier tick, so exactly that many ticks of each partition
/// are chosen (or all of them, for a partition cut short by the end of the month). The
/// temperature bounds take precedence.
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionThermostat {
    /// Temperature limits
    pub bounds: SafetyBounds,
    /// Number of ticks in each partition
    pub partition_size: usize,
    /// Number of ticks per partition on which to buy power
    pub purchases_per_partition: usize,
}

impl FromParameters for PartitionThermostat {
    fn from_parameters(parameters: &ParameterReader) -> Result<Self, ConfigError> {
        Ok(Self {
            bounds: SafetyBounds::from_parameters(parameters)?,
            partition_size: parameters.get_count("PARTITION_SIZE")?,
            purchases_per_partition: parameters.get_count("PURCHASES_PER_PARTITION")?,
        })
    }
}

impl Thermostat for PartitionThermostat {
    fn evaluate_cooler_state(&self, room: &RoomState) -> bool {
        self.bounds
            .forced_decision(room.temperature)
            .unwrap_or_else(|| {
                room.prices.is_among_cheapest(
                    room.tick,
                    self.partition_size,
                    self.purchases_per_partition,
                )
            })
    }
}
