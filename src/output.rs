//! The module responsible for writing output data to disk.
use crate::simulation::{MonthHistory, MonthlyResults};
use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};

pub mod metadata;
pub use metadata::write_metadata;

/// The root folder in which model-specific output folders will be created
const OUTPUT_DIRECTORY_ROOT: &str = "coolroom_results";

/// The output file name for costs per simulated month
const MONTHLY_COSTS_FILE_NAME: &str = "monthly_costs.csv";

/// The output file name for tick-by-tick histories
const TICK_HISTORY_FILE_NAME: &str = "tick_history.csv";

/// Get the model name from the specified directory path
pub fn get_output_dir(model_dir: &Path) -> Result<PathBuf> {
    // Get the model name from the dir path, checking for all the ways this can go wrong
    let model_dir = model_dir
        .canonicalize() // canonicalise in case the user has specified "."
        .context("Could not resolve path to model")?;

    let model_name = model_dir
        .file_name()
        .context("Model cannot be in root folder")?
        .to_str()
        .context("Invalid chars in model dir name")?;

    // Construct path
    Ok([OUTPUT_DIRECTORY_ROOT, model_name].iter().collect())
}

/// Create a new output directory for the model.
///
/// If the directory already exists and is not empty, it is only replaced if `allow_overwrite` is
/// set.
///
/// # Returns
///
/// True if an existing folder was overwritten, otherwise false
pub fn create_output_directory(output_dir: &Path, allow_overwrite: bool) -> Result<bool> {
    let is_populated = output_dir.is_dir() && output_dir.read_dir()?.next().is_some();
    if is_populated {
        ensure!(
            allow_overwrite,
            "Output folder already exists and is not empty. Use --overwrite to replace it."
        );
        fs::remove_dir_all(output_dir)?;
    }

    // Try to create the directory, with parents
    fs::create_dir_all(output_dir)?;

    Ok(is_populated)
}

/// Represents a row in the monthly costs CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct MonthlyCostRow {
    thermostat: String,
    month: u32,
    food_loss_cost: f64,
    power_cost: f64,
    total_cost: f64,
}

/// Represents a row in the tick history CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct TickRow {
    thermostat: String,
    tick: usize,
    door_open: bool,
    compressor_on: bool,
    temperature: f64,
    food_loss_cost: f64,
    power_cost: f64,
}

/// Open a CSV file for writing, unless it is open already
fn open_writer<'a>(
    writer: &'a mut Option<csv::Writer<File>>,
    file_path: PathBuf,
) -> Result<&'a mut csv::Writer<File>> {
    if writer.is_none() {
        *writer = Some(csv::Writer::from_path(file_path)?);
    }

    Ok(writer.as_mut().expect("Writer was just opened"))
}

/// An object for writing simulation results to file.
///
/// Each CSV file is only created once something is written to it.
pub struct DataWriter {
    output_path: PathBuf,
    monthly_costs_writer: Option<csv::Writer<File>>,
    tick_history_writer: Option<csv::Writer<File>>,
}

impl DataWriter {
    /// Create a writer for output data
    ///
    /// # Arguments
    ///
    /// * `output_path` - Folder where files will be saved
    pub fn create(output_path: &Path) -> Result<Self> {
        ensure!(
            output_path.is_dir(),
            "Output folder does not exist: {}",
            output_path.display()
        );

        Ok(Self {
            output_path: output_path.to_path_buf(),
            monthly_costs_writer: None,
            tick_history_writer: None,
        })
    }

    /// Write the costs for each simulated month to a CSV file
    pub fn write_monthly_costs(&mut self, thermostat: &str, results: &MonthlyResults) -> Result<()> {
        let writer = open_writer(
            &mut self.monthly_costs_writer,
            self.output_path.join(MONTHLY_COSTS_FILE_NAME),
        )?;
        for (month, result) in (1..).zip(results.iter()) {
            let row = MonthlyCostRow {
                thermostat: thermostat.to_string(),
                month,
                food_loss_cost: result.food_loss_cost,
                power_cost: result.power_cost,
                total_cost: result.total_cost(),
            };
            writer.serialize(row)?;
        }

        Ok(())
    }

    /// Write the full history of a single month to a CSV file
    pub fn write_tick_history(&mut self, thermostat: &str, history: &MonthHistory) -> Result<()> {
        let writer = open_writer(
            &mut self.tick_history_writer,
            self.output_path.join(TICK_HISTORY_FILE_NAME),
        )?;
        for (tick, temperature) in history.temperature.iter().enumerate() {
            let row = TickRow {
                thermostat: thermostat.to_string(),
                tick,
                door_open: history.door_open[tick],
                compressor_on: history.compressor_on[tick],
                temperature: *temperature,
                food_loss_cost: history.food_loss_cost[tick],
                power_cost: history.power_cost[tick],
            };
            writer.serialize(row)?;
        }

        Ok(())
    }

    /// Flush the underlying streams
    pub fn flush(&mut self) -> Result<()> {
        for writer in [&mut self.monthly_costs_writer, &mut self.tick_history_writer]
            .into_iter()
            .flatten()
        {
            writer.flush()?;
        }

        Ok(())
    }
}
