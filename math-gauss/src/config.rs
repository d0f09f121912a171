//! Solver and harness configuration
//!
//! [`GaussConfig`] is everything the coordinator needs; [`HarnessConfig`]
//! wraps it with the input and trial settings used by the `run-gauss` binary
//! and can be loaded from JSON.

use crate::error::{GaussError, Result};
use crate::verify::DEFAULT_TOLERANCE;
use serde::{Deserialize, Serialize};
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

/// Configuration for one parallel elimination run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaussConfig {
    /// Number of workers per step (`None` = available parallelism)
    #[serde(default)]
    pub workers: Option<usize>,
    /// Hand the matrix to the reporter after every elimination step
    #[serde(default)]
    pub verbose: bool,
    /// Smallest number of rows given to a worker in one step
    #[serde(default = "default_min_rows")]
    pub min_rows_per_worker: usize,
}

fn default_min_rows() -> usize {
    1
}

impl Default for GaussConfig {
    fn default() -> Self {
        Self {
            workers: None,
            verbose: false,
            min_rows_per_worker: default_min_rows(),
        }
    }
}

impl GaussConfig {
    /// Set a fixed worker count
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Enable or disable per-step reporting
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Worker count after applying the default
    pub fn resolved_workers(&self) -> usize {
        self.workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1)
        })
    }

    /// Reject settings the coordinator cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.workers == Some(0) {
            return Err(GaussError::InvalidConfig(
                "worker count must be at least 1".to_string(),
            ));
        }
        if self.min_rows_per_worker == 0 {
            return Err(GaussError::InvalidConfig(
                "min_rows_per_worker must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Settings for the test harness: which matrices to solve and how often
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Matrix file in the legacy text format, solved once if present
    #[serde(default)]
    pub input: Option<PathBuf>,
    /// Sizes of the random matrices to generate
    #[serde(default = "default_sizes")]
    pub random_sizes: Vec<usize>,
    /// Number of random trials per size
    #[serde(default = "default_trials")]
    pub trials: usize,
    /// Random entries are drawn from `[0, value_range)`
    #[serde(default = "default_value_range")]
    pub value_range: u32,
    /// Seed for reproducible random matrices
    #[serde(default)]
    pub seed: Option<u64>,
    /// Absolute tolerance used when verifying solutions
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Solver settings
    #[serde(default)]
    pub solver: GaussConfig,
}

fn default_sizes() -> Vec<usize> {
    vec![64, 256, 512, 1024]
}

fn default_trials() -> usize {
    10
}

fn default_value_range() -> u32 {
    10
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            input: None,
            random_sizes: default_sizes(),
            trials: default_trials(),
            value_range: default_value_range(),
            seed: None,
            tolerance: default_tolerance(),
            solver: GaussConfig::default(),
        }
    }
}

impl HarnessConfig {
    /// Load from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| GaussError::Parse {
            line: e.line(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save to a JSON file
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| GaussError::InvalidConfig(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Check the harness and solver settings
    pub fn validate(&self) -> Result<()> {
        if self.value_range == 0 {
            return Err(GaussError::InvalidConfig(
                "value_range must be at least 1".to_string(),
            ));
        }
        if self.tolerance.is_nan() || self.tolerance <= 0.0 {
            return Err(GaussError::InvalidConfig(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        self.solver.validate()
    }
}
