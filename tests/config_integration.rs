//! Integration tests for configuration loading
//!
//! Tests that verify config loading from files and environment variables.

use riftgate::config::AppConfig;
use serial_test::serial;

#[test]
#[serial]
fn test_env_override() {
    std::env::set_var("RIFT_SIMULATION__GRAVITY", "-9.81");
    let config = AppConfig::load().unwrap();
    assert_eq!(config.simulation.gravity, -9.81);
    std::env::remove_var("RIFT_SIMULATION__GRAVITY");
}

#[test]
#[serial]
fn test_default_file_loading() {
    // Remove env var to test file-based config
    std::env::remove_var("RIFT_SIMULATION__GRAVITY");

    let config = AppConfig::load().unwrap();
    assert_eq!(config.simulation.gravity, -20.0);
    assert_eq!(config.scene.path, "scenes/demo.ron");
}

#[test]
#[serial]
fn test_missing_config_dir_falls_back_to_defaults() {
    let config = AppConfig::load_from("does/not/exist").unwrap();
    assert_eq!(config.portals.compensation_margin, 3.0);
}
