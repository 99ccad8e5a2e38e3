//! Application configuration
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. `config/default.toml` (version controlled)
//! 2. `config/user.toml` (gitignored, user overrides)
//! 3. Environment variables (`RIFT_SECTION__KEY`)

use figment::{Figment, providers::{Format, Toml, Env}};
use serde::{Serialize, Deserialize};
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Simulation configuration
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Portal tracking and projection configuration
    #[serde(default)]
    pub portals: PortalConfig,
    /// Scene configuration
    #[serde(default)]
    pub scene: SceneConfig,
    /// Debug configuration
    #[serde(default)]
    pub debug: DebugConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            portals: PortalConfig::default(),
            scene: SceneConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. `config/default.toml`
    /// 2. `config/user.toml`
    /// 3. Environment variables (`RIFT_*`)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific config directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let default_path = config_dir.join("default.toml");
        let user_path = config_dir.join("user.toml");

        let mut figment = Figment::new();

        // Load default config (required)
        if default_path.exists() {
            figment = figment.merge(Toml::file(&default_path));
        }

        // Load user config (optional)
        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }

        // Environment variables override everything
        // RIFT_SIMULATION__GRAVITY=-10 -> simulation.gravity = -10
        figment = figment.merge(Env::prefixed("RIFT_").split("__"));

        figment.extract().map_err(ConfigError::from)
    }
}

/// Simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Gravity acceleration (negative = down)
    pub gravity: f32,
    /// Maximum ledge height bodies step onto without jumping
    pub step_height: f32,
    /// Fixed simulation ticks per second
    pub tick_rate: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            gravity: -20.0,
            step_height: 0.6,
            tick_rate: 20.0,
        }
    }
}

/// Portal tracking and projection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    /// Portal box growth during the proximity scan
    pub compensation_margin: f32,
    /// Nested-view depth above which particles stop rendering
    pub particle_depth_cap: usize,
    /// Draw the camera body's own projection when it straddles a portal
    pub render_own_projection: bool,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            compensation_margin: 3.0,
            particle_depth_cap: 4,
            render_own_projection: true,
        }
    }
}

/// Scene configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Path to the universe template to load
    pub path: String,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            path: "scenes/demo.ron".to_string(),
        }
    }
}

/// Debug configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebugConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
    /// Ticks to simulate in the headless demo
    pub demo_ticks: u32,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            demo_ticks: 100,
        }
    }
}

/// Configuration error
#[derive(Debug)]
pub struct ConfigError {
    message: String,
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError {
            message: e.to_string(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Configuration error: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}
