//! Common functionality for coolroom, a cold-room thermostat cost simulator.
#![warn(missing_docs)]
use std::path::PathBuf;

pub mod cli;
pub mod input;
pub mod log;
pub mod model;
pub mod output;
pub mod price;
pub mod settings;
pub mod simulation;
pub mod thermostat;

#[cfg(test)]
mod fixture;

/// Get the path to the folder where coolroom's user-wide configuration lives.
///
/// # Panics
///
/// If the user's config directory cannot be determined.
pub fn get_coolroom_config_dir() -> PathBuf {
    let Some(mut dir) = dirs::config_dir() else {
        panic!("Could not get path to user's config directory");
    };

    dir.push("coolroom");
    dir
}
