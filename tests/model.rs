use coolroom::model::Model;
use coolroom::simulation;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

/// Get the path to an example model.
fn get_model_dir(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("demos").join(name)
}

/// An integration test which attempts to load the example models
#[test]
fn test_model_from_path() {
    let model = Model::from_path(get_model_dir("simple")).unwrap();
    assert_eq!(model.iter_thermostats().count(), 1);

    let model = Model::from_path(get_model_dir("comparison")).unwrap();
    let names: Vec<_> = model.iter_thermostats().map(|t| t.name()).collect();
    assert_eq!(names, ["PARTITION", "WATCHER"]);
}

/// Running the same seeded model twice gives identical results
#[test]
fn test_run_reproducible() {
    let model = Model::from_path(get_model_dir("comparison")).unwrap();
    let dir1 = tempdir().unwrap();
    let dir2 = tempdir().unwrap();
    simulation::run(&model, dir1.path()).unwrap();
    simulation::run(&model, dir2.path()).unwrap();

    assert_eq!(
        fs::read_to_string(dir1.path().join("monthly_costs.csv")).unwrap(),
        fs::read_to_string(dir2.path().join("monthly_costs.csv")).unwrap()
    );

    // Only the file for the simulation mode is written
    assert!(!dir1.path().join("tick_history.csv").exists());
}
