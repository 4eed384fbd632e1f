//! Code for simulation models.
use crate::price::PriceSeries;
use crate::thermostat::{NamedThermostat, build_thermostat};
use anyhow::{Context, Result};
use log::info;
use std::path::{Path, PathBuf};

pub mod parameters;
pub use parameters::{ModelParameters, RoomParameters};

/// A fully loaded and validated model, ready to simulate
pub struct Model {
    /// Path to the model folder
    pub model_path: PathBuf,
    /// Parameters from the model file
    pub parameters: ModelParameters,
    /// Electricity prices
    pub prices: PriceSeries,
    /// The thermostat to simulate
    pub thermostat: NamedThermostat,
    /// A second thermostat to compare against, if requested
    pub comparison_thermostat: Option<NamedThermostat>,
}

impl Model {
    /// Read a model from the specified directory.
    ///
    /// All thermostats are built here, so that configuration errors are reported before any
    /// simulation starts.
    ///
    /// # Arguments
    ///
    /// * `model_dir` - Folder containing model configuration files
    pub fn from_path<P: AsRef<Path>>(model_dir: P) -> Result<Model> {
        let model_dir = model_dir.as_ref();
        let parameters = ModelParameters::from_path(model_dir)?;

        let thermostat = build_thermostat(&parameters.thermostat_type, &parameters.thermostats)
            .context("Invalid value for thermostat_type")?;
        let comparison_thermostat = parameters
            .comparison_thermostat_type()
            .map(|name| build_thermostat(name, &parameters.thermostats))
            .transpose()
            .context("Invalid value for second_thermostat_type")?;

        let price_path = model_dir.join(&parameters.price_file);
        let prices = PriceSeries::from_csv(&price_path)?;
        info!(
            "Read {} prices from {}",
            prices.len(),
            price_path.display()
        );

        Ok(Model {
            model_path: model_dir.to_path_buf(),
            parameters,
            prices,
            thermostat,
            comparison_thermostat,
        })
    }

    /// Iterate over the thermostats to simulate, starting with the main one
    pub fn iter_thermostats(&self) -> impl Iterator<Item = &NamedThermostat> {
        std::iter::once(&self.thermostat).chain(&self.comparison_thermostat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::TICKS_PER_MONTH;
    use crate::thermostat::{ConfigError, ThermostatType};
    use std::fs::File;
    use std::io::Write;
    use tempfile::{TempDir, tempdir};

    fn create_model_dir(model_toml: &str, num_prices: usize) -> TempDir {
        let dir = tempdir().unwrap();
        {
            let mut file = File::create(dir.path().join("model.toml")).unwrap();
            writeln!(file, "{model_toml}").unwrap();

            let mut file = File::create(dir.path().join("prices.csv")).unwrap();
            writeln!(file, "Time,Price").unwrap();
            for tick in 0..num_prices {
                writeln!(file, "{tick},0.5").unwrap();
            }
        }

        dir
    }

    #[test]
    fn test_model_from_path() {
        let dir = create_model_dir(
            "thermostat_type = \"SIMPLE\"
comparison_simulation = true
second_thermostat_type = \"BARGAIN\"
[thermostats.SIMPLE]
TEMP = 5.0
[thermostats.BARGAIN]
PRICE_THRESHOLD = 0.3",
            TICKS_PER_MONTH,
        );

        let model = Model::from_path(dir.path()).unwrap();
        assert_eq!(model.prices.len(), TICKS_PER_MONTH);
        assert_eq!(
            model.iter_thermostats().map(NamedThermostat::kind).collect::<Vec<_>>(),
            [ThermostatType::Simple, ThermostatType::Bargain]
        );
    }

    #[test]
    fn test_model_from_path_unknown_thermostat() {
        let dir = create_model_dir("thermostat_type = \"MAGIC\"", TICKS_PER_MONTH);
        let err = Model::from_path(dir.path()).err().unwrap();
        assert_eq!(err.to_string(), "Invalid value for thermostat_type");
        assert_eq!(
            err.downcast_ref::<ConfigError>(),
            Some(&ConfigError::UnknownThermostat {
                name: "MAGIC".to_string()
            })
        );
    }

    #[test]
    fn test_model_from_path_missing_parameter() {
        let dir = create_model_dir(
            "thermostat_type = \"SIMPLE\"
comparison_simulation = true
second_thermostat_type = \"BARGAIN\"
[thermostats.SIMPLE]
TEMP = 5.0",
            TICKS_PER_MONTH,
        );
        let err = Model::from_path(dir.path()).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::MissingParameter {
                key: "PRICE_THRESHOLD",
                ..
            })
        ));
    }

    #[test]
    fn test_model_from_path_too_few_prices() {
        let dir = create_model_dir(
            "thermostat_type = \"SIMPLE\"\n[thermostats.SIMPLE]\nTEMP = 5.0",
            TICKS_PER_MONTH - 1,
        );
        assert!(Model::from_path(dir.path()).is_err());
    }
}
