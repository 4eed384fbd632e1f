//! Thermostats which are willing to pay more for power as the room warms up.
use super::{ConfigError, FromParameters, ParameterReader, SafetyBounds, Thermostat};
use crate::simulation::RoomState;

/// The most a thermostat is willing to pay for power, rising linearly with temperature.
///
/// At `LOW_TEMP` the ceiling is `LOW_PRICE` and at `HIGH_TEMP` it is `HIGH_PRICE`.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceCeiling {
    /// Temperature limits, which also define the interpolation range
    pub bounds: SafetyBounds,
    /// The price ceiling at the lower temperature bound
    pub low_price: f64,
    /// The price ceiling at the upper temperature bound
    pub high_price: f64,
}

impl FromParameters for PriceCeiling {
    fn from_parameters(parameters: &ParameterReader) -> Result<Self, ConfigError> {
        Ok(Self {
            bounds: SafetyBounds::from_parameters(parameters)?,
            low_price: parameters.get("LOW_PRICE")?,
            high_price: parameters.get("HIGH_PRICE")?,
        })
    }
}

impl PriceCeiling {
    /// The price ceiling at the given temperature
    pub fn at(&self, temperature: f64) -> f64 {
        self.low_price + self.bounds.position(temperature) * (self.high_price - self.low_price)
    }

    /// Decide whether to cool, given the extra reasons a thermostat may have to buy power.
    ///
    /// Outside the safety bounds the temperature decides. Otherwise the compressor runs if
    /// `accept` returns true or the current price is below the ceiling.
    pub fn decide<F>(&self, room: &RoomState, accept: F) -> bool
    where
        F: FnOnce(f64) -> bool,
    {
        self.bounds
            .forced_decision(room.temperature)
            .unwrap_or_else(|| {
                let price = room.current_price();
                accept(price) || price < self.at(room.temperature)
            })
    }
}

/// Runs the compressor when the price is below a temperature-dependent ceiling
#[derive(Debug, Clone, PartialEq)]
pub struct DesperationThermostat {
    /// The price ceiling
    pub ceiling: PriceCeiling,
}

impl FromParameters for DesperationThermostat {
    fn from_parameters(parameters: &ParameterReader) -> Result<Self, ConfigError> {
        Ok(Self {
            ceiling: PriceCeiling::from_parameters(parameters)?,
        })
    }
}

impl Thermostat for DesperationThermostat {
    fn evaluate_cooler_state(&self, room: &RoomState) -> bool {
        self.ceiling.decide(room, |_| false)
    }
}

/// As [`DesperationThermostat`], but also buys any power cheaper than `PRICE_CUTOFF`
#[derive(Debug, Clone, PartialEq)]
pub struct DesperationOpportunistThermostat {
    /// The price ceiling
    pub ceiling: PriceCeiling,
    /// Power below this price is always bought, unless the room is already cold
    pub price_cutoff: f64,
}

impl FromParameters for DesperationOpportunistThermostat {
    fn from_parameters(parameters: &ParameterReader) -> Result<Self, ConfigError> {
        Ok(Self {
            ceiling: PriceCeiling::from_parameters(parameters)?,
            price_cutoff: parameters.get("PRICE_CUTOFF")?,
        })
    }
}

impl Thermostat for DesperationOpportunistThermostat {
    fn evaluate_cooler_state(&self, room: &RoomState) -> bool {
        self.ceiling.decide(room, |price| price < self.price_cutoff)
    }
}

/// As [`DesperationThermostat`], but the price ceiling grows exponentially with temperature.
///
/// The ceiling is `LOW_PRICE * exp(b * STEEPNESS * x)`, where `b = ln(HIGH_PRICE / LOW_PRICE)` and
/// `x` is the position of the temperature between the bounds (0 at `LOW_TEMP`, 1 at `HIGH_TEMP`).
/// With a steepness of 1 the ceiling reaches `HIGH_PRICE` at `HIGH_TEMP`.
#[derive(Debug, Clone, PartialEq)]
pub struct DesperationExponentialThermostat {
    /// Temperature limits
    pub bounds: SafetyBounds,
    /// The price ceiling at the lower temperature bound
    pub low_price: f64,
    /// Scales the growth rate of the ceiling
    pub steepness: f64,
    /// `ln(HIGH_PRICE / LOW_PRICE)`
    growth: f64,
}

impl FromParameters for DesperationExponentialThermostat {
    fn from_parameters(parameters: &ParameterReader) -> Result<Self, ConfigError> {
        let bounds = SafetyBounds::from_parameters(parameters)?;
        let low_price = parameters.get("LOW_PRICE")?;
        let high_price = parameters.get("HIGH_PRICE")?;
        let steepness = parameters.get("STEEPNESS")?;
        for (key, price) in [("LOW_PRICE", low_price), ("HIGH_PRICE", high_price)] {
            if price <= 0.0 {
                return Err(parameters.invalid(key, "must be greater than zero"));
            }
        }

        Ok(Self {
            bounds,
            low_price,
            steepness,
            growth: (high_price / low_price).ln(),
        })
    }
}

impl DesperationExponentialThermostat {
    /// The price ceiling at the given temperature
    pub fn price_ceiling(&self, temperature: f64) -> f64 {
        let exponent = self.growth * self.steepness * self.bounds.position(temperature);
        self.low_price * exponent.exp()
    }
}

impl Thermostat for DesperationExponentialThermostat {
    fn evaluate_cooler_state(&self, room: &RoomState) -> bool {
        self.bounds
            .forced_decision(room.temperature)
            .unwrap_or_else(|| room.current_price() < self.price_ceiling(room.temperature))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::constant_prices;
    use crate::thermostat::ThermostatType;
    use float_cmp::assert_approx_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn ceiling() -> PriceCeiling {
        PriceCeiling {
            bounds: SafetyBounds {
                low: 2.0,
                high: 6.0,
            },
            low_price: 0.2,
            high_price: 1.0,
        }
    }

    fn exponential(steepness: f64) -> DesperationExponentialThermostat {
        let parameters = [
            ("LOW_TEMP", 2.0),
            ("HIGH_TEMP", 6.0),
            ("LOW_PRICE", 0.25),
            ("HIGH_PRICE", 4.0),
            ("STEEPNESS", steepness),
        ]
        .into_iter()
        .collect();
        let reader = ParameterReader::new(ThermostatType::DesperationExponential, Some(&parameters));
        DesperationExponentialThermostat::from_parameters(&reader).unwrap()
    }

    #[rstest]
    fn test_price_ceiling_at(ceiling: PriceCeiling) {
        assert_approx_eq!(f64, ceiling.at(2.0), 0.2);
        assert_approx_eq!(f64, ceiling.at(4.0), 0.6);
        assert_approx_eq!(f64, ceiling.at(6.0), 1.0);
    }

    #[rstest]
    #[case(0.5, 5.0, true)] // ceiling at 5 degrees is 0.8
    #[case(0.7, 3.0, false)] // ceiling at 3 degrees is 0.4
    #[case(0.3, 3.0, true)]
    #[case(0.0, 2.0, false)] // too cold, however cheap
    #[case(50.0, 6.5, true)] // too warm, however expensive
    fn test_desperation_thermostat(
        ceiling: PriceCeiling,
        #[case] price: f64,
        #[case] temperature: f64,
        #[case] expected: bool,
    ) {
        let prices = constant_prices(price);
        let thermostat = DesperationThermostat { ceiling };
        let room = RoomState::new(&prices, temperature);
        assert_eq!(thermostat.evaluate_cooler_state(&room), expected);
    }

    #[rstest]
    #[case(0.05, 2.5, true)] // below cutoff
    #[case(0.35, 2.5, false)] // above cutoff and ceiling at 2.5 degrees (0.3)
    #[case(0.05, 1.0, false)] // below cutoff, but too cold
    #[case(0.5, 5.0, true)] // below ceiling
    fn test_desperation_opportunist_thermostat(
        ceiling: PriceCeiling,
        #[case] price: f64,
        #[case] temperature: f64,
        #[case] expected: bool,
    ) {
        let prices = constant_prices(price);
        let thermostat = DesperationOpportunistThermostat {
            ceiling,
            price_cutoff: 0.1,
        };
        let room = RoomState::new(&prices, temperature);
        assert_eq!(thermostat.evaluate_cooler_state(&room), expected);
    }

    #[test]
    fn test_exponential_price_ceiling() {
        let thermostat = exponential(1.0);
        assert_approx_eq!(f64, thermostat.price_ceiling(2.0), 0.25);
        assert_approx_eq!(f64, thermostat.price_ceiling(4.0), 1.0, epsilon = 1e-12);
        assert_approx_eq!(f64, thermostat.price_ceiling(6.0), 4.0, epsilon = 1e-12);

        // Doubling the steepness squares the growth factor
        let thermostat = exponential(2.0);
        assert_approx_eq!(f64, thermostat.price_ceiling(4.0), 4.0, epsilon = 1e-12);
    }

    #[rstest]
    #[case(0.9, 4.0, true)]
    #[case(1.1, 4.0, false)]
    #[case(0.01, 2.0, false)]
    #[case(100.0, 6.01, true)]
    fn test_exponential_thermostat(
        #[case] price: f64,
        #[case] temperature: f64,
        #[case] expected: bool,
    ) {
        let prices = constant_prices(price);
        let room = RoomState::new(&prices, temperature);
        assert_eq!(exponential(1.0).evaluate_cooler_state(&room), expected);
    }

    #[test]
    fn test_exponential_non_positive_price() {
        let parameters = [
            ("LOW_TEMP", 2.0),
            ("HIGH_TEMP", 6.0),
            ("LOW_PRICE", 0.0),
            ("HIGH_PRICE", 4.0),
            ("STEEPNESS", 1.0),
        ]
        .into_iter()
        .collect();
        let reader = ParameterReader::new(ThermostatType::DesperationExponential, Some(&parameters));
        assert!(matches!(
            DesperationExponentialThermostat::from_parameters(&reader),
            Err(ConfigError::InvalidParameter {
                key: "LOW_PRICE",
                ..
            })
        ));
    }

    #[test]
    fn test_degenerate_temperature_range() {
        let parameters = [
            ("LOW_TEMP", 4.0),
            ("HIGH_TEMP", 4.0),
            ("LOW_PRICE", 0.2),
            ("HIGH_PRICE", 1.0),
        ]
        .into_iter()
        .collect();
        let reader = ParameterReader::new(ThermostatType::Desperation, Some(&parameters));
        assert!(matches!(
            DesperationThermostat::from_parameters(&reader),
            Err(ConfigError::DegenerateBounds { .. })
        ));
    }
}
