//! Thermostat policies, which decide whether the compressor runs on a given tick.
//!
//! Every policy is a pure function of the room's current temperature and the price series. Policies
//! are selected by name (e.g. `OPPORTUNIST`) and their thresholds are read from the matching
//! `[thermostats.<NAME>]` table of the model file.
use crate::simulation::RoomState;
use indexmap::IndexMap;
use serde::Deserialize;
use std::str::FromStr;
use strum::{EnumIter, EnumString, IntoStaticStr};

mod bargain;
pub use bargain::BargainThermostat;
mod desperation;
pub use desperation::{
    DesperationExponentialThermostat, DesperationOpportunistThermostat, DesperationThermostat,
    PriceCeiling,
};
mod opportunist;
pub use opportunist::OpportunistThermostat;
mod partition;
pub use partition::PartitionThermostat;
mod peer_review;
pub use peer_review::PeerReviewThermostat;
mod simple;
pub use simple::SimpleThermostat;
mod watcher;
pub use watcher::WatcherThermostat;

/// Decides whether the compressor should be running
pub trait Thermostat {
    /// Whether the compressor should run for the room's current tick.
    ///
    /// `room.temperature` is the temperature at the end of the previous tick.
    fn evaluate_cooler_state(&self, room: &RoomState) -> bool;
}

/// A thermostat which can be constructed from its section of the model file
pub trait FromParameters: Sized {
    /// Read and validate the thermostat's thresholds
    fn from_parameters(parameters: &ParameterReader) -> Result<Self, ConfigError>;
}

/// The available thermostat policies
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, EnumString, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ThermostatType {
    /// Cool whenever the room is above a set temperature
    Simple,
    /// Cool when power is cheap, unless the room is already cold
    Opportunist,
    /// Cool whenever power is cheap, regardless of temperature
    Bargain,
    /// Pay more for power the warmer the room gets
    Desperation,
    /// [`ThermostatType::Desperation`] which also takes very cheap power
    DesperationOpportunist,
    /// [`ThermostatType::Desperation`] with an exponential price ceiling
    DesperationExponential,
    /// Cool in local price valleys
    Watcher,
    /// Cool when the price is below its local average
    PeerReview,
    /// Cool on the cheapest ticks of each fixed-size block of ticks
    Partition,
}

/// Builds a boxed thermostat from its parameters
type ThermostatConstructor = fn(&ParameterReader) -> Result<Box<dyn Thermostat>, ConfigError>;

fn construct<T>(parameters: &ParameterReader) -> Result<Box<dyn Thermostat>, ConfigError>
where
    T: Thermostat + FromParameters + 'static,
{
    Ok(Box::new(T::from_parameters(parameters)?))
}

impl ThermostatType {
    /// The section name used for this thermostat's thresholds
    pub fn name(self) -> &'static str {
        self.into()
    }

    fn constructor(self) -> ThermostatConstructor {
        match self {
            Self::Simple => construct::<SimpleThermostat>,
            Self::Opportunist => construct::<OpportunistThermostat>,
            Self::Bargain => construct::<BargainThermostat>,
            Self::Desperation => construct::<DesperationThermostat>,
            Self::DesperationOpportunist => construct::<DesperationOpportunistThermostat>,
            Self::DesperationExponential => construct::<DesperationExponentialThermostat>,
            Self::Watcher => construct::<WatcherThermostat>,
            Self::PeerReview => construct::<PeerReviewThermostat>,
            Self::Partition => construct::<PartitionThermostat>,
        }
    }
}

/// Problems with the thermostat configuration, detected before simulation starts
#[derive(Debug, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    /// The requested thermostat doesn't exist
    #[display("Invalid thermostat type: {name}")]
    UnknownThermostat {
        /// The name which was requested
        name: String,
    },
    /// A threshold needed by the thermostat wasn't provided
    #[display("Missing parameter {key} for {thermostat} thermostat")]
    MissingParameter {
        /// The thermostat being built
        thermostat: ThermostatType,
        /// The missing key
        key: &'static str,
    },
    /// A threshold has an unusable value
    #[display("Invalid value for parameter {key} of {thermostat} thermostat: {reason}")]
    InvalidParameter {
        /// The thermostat being built
        thermostat: ThermostatType,
        /// The offending key
        key: &'static str,
        /// What is wrong with the value
        reason: String,
    },
    /// The upper bound of an interpolated range is not above the lower bound
    #[display("{high_key} must be greater than {low_key} for {thermostat} thermostat")]
    DegenerateBounds {
        /// The thermostat being built
        thermostat: ThermostatType,
        /// Key for the lower bound
        low_key: &'static str,
        /// Key for the upper bound
        high_key: &'static str,
    },
}

/// Thresholds for one thermostat, as read from the model file
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct ThermostatParameters(IndexMap<String, f64>);

impl<K: Into<String>> FromIterator<(K, f64)> for ThermostatParameters {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Thresholds for all thermostats, keyed by thermostat name
pub type ThermostatSections = IndexMap<String, ThermostatParameters>;

/// Reads thresholds for a particular thermostat, reporting missing or bad values
pub struct ParameterReader<'a> {
    thermostat: ThermostatType,
    parameters: Option<&'a ThermostatParameters>,
}

impl<'a> ParameterReader<'a> {
    /// Create a reader for the given thermostat's parameters (which may be absent)
    pub fn new(thermostat: ThermostatType, parameters: Option<&'a ThermostatParameters>) -> Self {
        Self {
            thermostat,
            parameters,
        }
    }

    /// The thermostat whose parameters are being read
    pub fn thermostat(&self) -> ThermostatType {
        self.thermostat
    }

    /// Get a required finite value
    pub fn get(&self, key: &'static str) -> Result<f64, ConfigError> {
        let value = self
            .parameters
            .and_then(|parameters| parameters.0.get(key))
            .copied()
            .ok_or(ConfigError::MissingParameter {
                thermostat: self.thermostat,
                key,
            })?;

        if !value.is_finite() {
            return Err(self.invalid(key, "must be a finite number"));
        }

        Ok(value)
    }

    /// Get a required value which must be a whole number greater than zero
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn get_count(&self, key: &'static str) -> Result<usize, ConfigError> {
        let value = self.get(key)?;
        if value < 1.0 || value.fract() != 0.0 {
            return Err(self.invalid(key, "must be a whole number greater than zero"));
        }

        Ok(value as usize)
    }

    /// Create an [`ConfigError::InvalidParameter`] for this thermostat
    pub fn invalid(&self, key: &'static str, reason: &str) -> ConfigError {
        ConfigError::InvalidParameter {
            thermostat: self.thermostat,
            key,
            reason: reason.to_string(),
        }
    }
}

/// Temperatures outside of which the thermostat ignores prices.
///
/// Above `high` the compressor always runs; at or below `low` it never does.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SafetyBounds {
    /// The lowest temperature at which the compressor may run
    pub low: f64,
    /// The temperature above which the compressor must run
    pub high: f64,
}

impl FromParameters for SafetyBounds {
    fn from_parameters(parameters: &ParameterReader) -> Result<Self, ConfigError> {
        let low = parameters.get("LOW_TEMP")?;
        let high = parameters.get("HIGH_TEMP")?;
        if high <= low {
            return Err(ConfigError::DegenerateBounds {
                thermostat: parameters.thermostat(),
                low_key: "LOW_TEMP",
                high_key: "HIGH_TEMP",
            });
        }

        Ok(Self { low, high })
    }
}

impl SafetyBounds {
    /// The decision forced by the temperature, if it is outside the bounds
    pub fn forced_decision(&self, temperature: f64) -> Option<bool> {
        if temperature > self.high {
            Some(true)
        } else if temperature <= self.low {
            Some(false)
        } else {
            None
        }
    }

    /// Where the temperature lies between the bounds: 0 at `low`, 1 at `high`
    pub fn position(&self, temperature: f64) -> f64 {
        (temperature - self.low) / (self.high - self.low)
    }
}

/// A thermostat along with the name it was selected by
pub struct NamedThermostat {
    kind: ThermostatType,
    policy: Box<dyn Thermostat>,
}

impl NamedThermostat {
    /// Which thermostat this is
    pub fn kind(&self) -> ThermostatType {
        self.kind
    }

    /// The thermostat's name
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }
}

impl Thermostat for NamedThermostat {
    fn evaluate_cooler_state(&self, room: &RoomState) -> bool {
        self.policy.evaluate_cooler_state(room)
    }
}

/// Look up a thermostat by name and construct it with its parameters from `sections`.
///
/// # Arguments
///
/// * `name` - The thermostat's name, e.g. `SIMPLE`
/// * `sections` - Thresholds for all thermostats, keyed by name
pub fn build_thermostat(
    name: &str,
    sections: &ThermostatSections,
) -> Result<NamedThermostat, ConfigError> {
    let kind = ThermostatType::from_str(name).map_err(|_| ConfigError::UnknownThermostat {
        name: name.to_string(),
    })?;
    let reader = ParameterReader::new(kind, sections.get(kind.name()));
    let policy = (kind.constructor())(&reader)?;

    Ok(NamedThermostat { kind, policy })
}
