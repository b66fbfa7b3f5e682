use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::solver::SolverParams;
use crate::state::DEFAULT_GRID_SIZE;

pub const DEFAULT_PATH: &str = "smoke.yaml";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub grid_size: usize,
    pub physics: PhysicsConfig,
    pub run: RunConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub dt: f64,
    pub base_visc: f64,
    pub visc_scale_factor: f64,
    pub streamline_scale: f64,
    pub history_capacity: usize,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Total steps before the driver exits; 0 runs until interrupted.
    pub steps: u64,
    pub steps_per_frame: usize,
    /// Log statistics every this many steps; 0 disables.
    pub stats_interval: u64,
    /// Steps for one revolution of the scripted pointer.
    pub orbit_period: u64,
    /// Orbit radius as a fraction of the grid size.
    pub orbit_radius: f64,
    pub seeds: Vec<SeedConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SeedConfig {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub t0: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            physics: PhysicsConfig::default(),
            run: RunConfig::default(),
        }
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        let p = SolverParams::default();
        Self {
            dt: p.dt,
            base_visc: p.base_visc,
            visc_scale_factor: p.visc_scale_factor,
            streamline_scale: p.streamline_scale,
            history_capacity: p.history_capacity,
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            steps: 0,
            steps_per_frame: 1,
            stats_interval: 100,
            orbit_period: 200,
            orbit_radius: 0.25,
            seeds: Vec::new(),
        }
    }
}

impl PhysicsConfig {
    /// Solver parameters with the configured knobs and default constants.
    pub fn solver_params(&self) -> SolverParams {
        SolverParams {
            dt: self.dt,
            base_visc: self.base_visc,
            visc_scale_factor: self.visc_scale_factor,
            streamline_scale: self.streamline_scale,
            history_capacity: self.history_capacity,
            ..SolverParams::default()
        }
    }
}

/// Read and parse a configuration file.
pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load `path`, falling back to defaults when it is missing or broken.
pub fn load(path: &Path) -> Config {
    if !path.exists() {
        log::debug!("{} not found; using defaults", path.display());
        return Config::default();
    }
    match load_from(path) {
        Ok(cfg) => cfg,
        Err(e) => {
            let cause = std::error::Error::source(&e).map(|s| s.to_string()).unwrap_or_default();
            log::warn!("{e}: {cause}; using defaults");
            Config::default()
        }
    }
}
