//! A thermostat which watches for dips in the price.
use super::{ConfigError, FromParameters, ParameterReader, PriceCeiling, Thermostat};
use crate::price::{PriceSeries, mean_price};
use crate::simulation::RoomState;

/// Runs the compressor in price valleys, i.e. when the current price is below the average price of
/// both the preceding and following `WINDOW` ticks. Otherwise behaves like
/// [`DesperationThermostat`](super::DesperationThermostat).
#[derive(Debug, Clone, PartialEq)]
pub struct WatcherThermostat {
    /// The fallback price ceiling
    pub ceiling: PriceCeiling,
    /// How many ticks to look back and ahead
    pub window: usize,
}

impl FromParameters for WatcherThermostat {
    fn from_parameters(parameters: &ParameterReader) -> Result<Self, ConfigError> {
        Ok(Self {
            ceiling: PriceCeiling::from_parameters(parameters)?,
            window: parameters.get_count("WINDOW")?,
        })
    }
}

impl WatcherThermostat {
    /// Whether the price at `tick` is lower than the average on either side of it.
    ///
    /// Near either end of the series the windows are truncated. If there are no prices at all on
    /// one side, the tick is not considered a valley.
    fn is_price_valley(&self, prices: &PriceSeries, tick: usize) -> bool {
        let price = prices.price(tick);
        let before = mean_price(prices.trailing(tick, self.window));
        let after = mean_price(prices.leading(tick, self.window));
        match (before, after) {
            (Some(before), Some(after)) => price < before && price < after,
            _ => false,
        }
    }
}

impl Thermostat for WatcherThermostat {
    fn evaluate_cooler_state(&self, room: &RoomState) -> bool {
        self.ceiling
            .decide(room, |_| self.is_price_valley(room.prices, room.tick))
    }
}
