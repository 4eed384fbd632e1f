//! Defines the `ModelParameters` struct, which represents the contents of `model.toml`.
use crate::input::{input_err_msg, read_toml};
use crate::thermostat::ThermostatSections;
use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const MODEL_PARAMETERS_FILE_NAME: &str = "model.toml";

macro_rules! define_param_default {
    ($name:ident, $type: ty, $value: expr) => {
        fn $name() -> $type {
            $value
        }
    };
}

define_param_default!(default_simulation_steps, u32, 1);
define_param_default!(default_price_file, PathBuf, PathBuf::from("prices.csv"));
define_param_default!(default_time_step, f64, 300.0);
define_param_default!(default_ambient_temperature, f64, 20.0);
define_param_default!(default_setpoint_temperature, f64, -5.0);
define_param_default!(default_leak_rate_door_closed, f64, 0.000_000_5);
define_param_default!(default_leak_rate_door_open, f64, 0.000_03);
define_param_default!(default_cooling_rate, f64, 0.000_008);
define_param_default!(default_safe_band_lower, f64, 3.5);
define_param_default!(default_safe_band_upper, f64, 6.5);
define_param_default!(default_cold_loss_coefficient, f64, 4.39);
define_param_default!(default_cold_loss_exponent, f64, 0.49);
define_param_default!(default_warm_loss_coefficient, f64, 0.11);
define_param_default!(default_warm_loss_exponent, f64, 0.31);

/// Represents the contents of the entire model file.
#[derive(Debug, Deserialize, PartialEq)]
pub struct ModelParameters {
    /// The name of the thermostat to simulate
    pub thermostat_type: String,
    /// How many months to simulate (only used if `simulate_multiple_months` is set)
    #[serde(default = "default_simulation_steps")]
    pub simulation_steps: u32,
    /// Whether to simulate many months and report costs per month, rather than a single month
    /// with tick-by-tick histories
    #[serde(default)]
    pub simulate_multiple_months: bool,
    /// Whether to also simulate `second_thermostat_type` for comparison
    #[serde(default)]
    pub comparison_simulation: bool,
    /// The thermostat to compare against
    #[serde(default)]
    pub second_thermostat_type: Option<String>,
    /// Seed for the random number generator. If absent, a random seed is chosen.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Path to the price CSV file, relative to the model directory
    #[serde(default = "default_price_file")]
    pub price_file: PathBuf,
    /// Physical and economic properties of the cold room
    #[serde(default)]
    pub room: RoomParameters,
    /// Thresholds for each thermostat, keyed by thermostat name
    #[serde(default)]
    pub thermostats: ThermostatSections,
}

/// Physical and economic constants of the cold room.
///
/// Rates are per second; the temperature change over a tick is the rate multiplied by
/// `time_step`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RoomParameters {
    /// Length of a tick in seconds
    #[serde(default = "default_time_step")]
    pub time_step: f64,
    /// Temperature outside the room
    #[serde(default = "default_ambient_temperature")]
    pub ambient_temperature: f64,
    /// Temperature the compressor cools towards
    #[serde(default = "default_setpoint_temperature")]
    pub setpoint_temperature: f64,
    /// Rate of heat exchange with the outside while the door is closed
    #[serde(default = "default_leak_rate_door_closed")]
    pub leak_rate_door_closed: f64,
    /// Rate of heat exchange with the outside while the door is open
    #[serde(default = "default_leak_rate_door_open")]
    pub leak_rate_door_open: f64,
    /// Rate of cooling while the compressor is running
    #[serde(default = "default_cooling_rate")]
    pub cooling_rate: f64,
    /// Below this temperature, food is lost to overcooling
    #[serde(default = "default_safe_band_lower")]
    pub safe_band_lower: f64,
    /// At or above this temperature, food is lost to spoilage
    #[serde(default = "default_safe_band_upper")]
    pub safe_band_upper: f64,
    /// Scale of the food loss cost below the safe band
    #[serde(default = "default_cold_loss_coefficient")]
    pub cold_loss_coefficient: f64,
    /// How quickly the food loss cost grows as the temperature falls below the safe band
    #[serde(default = "default_cold_loss_exponent")]
    pub cold_loss_exponent: f64,
    /// Scale of the food loss cost above the safe band
    #[serde(default = "default_warm_loss_coefficient")]
    pub warm_loss_coefficient: f64,
    /// How quickly the food loss cost grows as the temperature rises above the safe band
    #[serde(default = "default_warm_loss_exponent")]
    pub warm_loss_exponent: f64,
}

impl Default for RoomParameters {
    fn default() -> Self {
        Self {
            time_step: default_time_step(),
            ambient_temperature: default_ambient_temperature(),
            setpoint_temperature: default_setpoint_temperature(),
            leak_rate_door_closed: default_leak_rate_door_closed(),
            leak_rate_door_open: default_leak_rate_door_open(),
            cooling_rate: default_cooling_rate(),
            safe_band_lower: default_safe_band_lower(),
            safe_band_upper: default_safe_band_upper(),
            cold_loss_coefficient: default_cold_loss_coefficient(),
            cold_loss_exponent: default_cold_loss_exponent(),
            warm_loss_coefficient: default_warm_loss_coefficient(),
            warm_loss_exponent: default_warm_loss_exponent(),
        }
    }
}

impl RoomParameters {
    /// Check that the room's properties are physically sensible
    fn validate(&self) -> Result<()> {
        let values = [
            ("time_step", self.time_step),
            ("ambient_temperature", self.ambient_temperature),
            ("setpoint_temperature", self.setpoint_temperature),
            ("leak_rate_door_closed", self.leak_rate_door_closed),
            ("leak_rate_door_open", self.leak_rate_door_open),
            ("cooling_rate", self.cooling_rate),
            ("safe_band_lower", self.safe_band_lower),
            ("safe_band_upper", self.safe_band_upper),
            ("cold_loss_coefficient", self.cold_loss_coefficient),
            ("cold_loss_exponent", self.cold_loss_exponent),
            ("warm_loss_coefficient", self.warm_loss_coefficient),
            ("warm_loss_exponent", self.warm_loss_exponent),
        ];
        for (name, value) in values {
            ensure!(value.is_finite(), "room.{name} must be a finite number");
        }

        ensure!(self.time_step > 0.0, "room.time_step must be greater than zero");
        for (name, value) in [
            ("leak_rate_door_closed", self.leak_rate_door_closed),
            ("leak_rate_door_open", self.leak_rate_door_open),
            ("cooling_rate", self.cooling_rate),
        ] {
            ensure!(value >= 0.0, "room.{name} cannot be negative");
        }

        ensure!(
            self.safe_band_upper > self.safe_band_lower,
            "room.safe_band_upper must be greater than room.safe_band_lower"
        );
        for (name, value) in [
            ("cold_loss_coefficient", self.cold_loss_coefficient),
            ("cold_loss_exponent", self.cold_loss_exponent),
            ("warm_loss_coefficient", self.warm_loss_coefficient),
            ("warm_loss_exponent", self.warm_loss_exponent),
        ] {
            ensure!(value > 0.0, "room.{name} must be greater than zero");
        }

        Ok(())
    }
}

/// Check that the comparison settings are consistent
fn check_comparison(comparison_simulation: bool, second: Option<&str>) -> Result<()> {
    if comparison_simulation {
        ensure!(
            second.is_some(),
            "second_thermostat_type must be provided when comparison_simulation is enabled"
        );
    }

    Ok(())
}

impl ModelParameters {
    /// Read a model file from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `model_dir` - Folder containing model configuration files
    ///
    /// # Returns
    ///
    /// The model file contents as a [`ModelParameters`] struct or an error if the file is invalid
    pub fn from_path<P: AsRef<Path>>(model_dir: P) -> Result<ModelParameters> {
        let file_path = model_dir.as_ref().join(MODEL_PARAMETERS_FILE_NAME);
        let model_params: ModelParameters = read_toml(&file_path)?;

        model_params
            .validate()
            .with_context(|| input_err_msg(file_path))?;

        Ok(model_params)
    }

    /// Validate parameters after reading in file
    fn validate(&self) -> Result<()> {
        ensure!(
            self.simulation_steps > 0,
            "simulation_steps must be greater than zero"
        );

        check_comparison(
            self.comparison_simulation,
            self.second_thermostat_type.as_deref(),
        )?;

        self.room.validate()
    }

    /// The thermostat to compare against, if a comparison was requested
    pub fn comparison_thermostat_type(&self) -> Option<&str> {
        self.second_thermostat_type
            .as_deref()
            .filter(|_| self.comparison_simulation)
    }
}
