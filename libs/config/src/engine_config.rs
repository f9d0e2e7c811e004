//! Engine Configuration Module
//!
//! Loads engine tuning from an optional TOML file with `SWAPVM_` environment
//! overrides. Every section falls back to the library defaults, so an empty
//! file (or no file at all) yields `EngineConfig::default()`.
//!
//! Environment keys use `__` between section and field, for example
//! `SWAPVM_CORRECTION__MAX_ITERATIONS=64`.

use anyhow::{ensure, Context, Result};
use config_crate::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;
use swapvm_amm::{
    CorrectionPolicy, DEFAULT_MAX_BISECTION_STEPS, MAX_CORRECTION_ITERATIONS, MIN_CORRECTION_STEP,
};
use tracing::{debug, info};

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "SWAPVM";

/// Complete engine configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub correction: CorrectionConfig,
    pub density: DensityConfig,
    pub validation: ValidationConfig,
    pub logging: LoggingConfig,
}

/// Power-curve ExactOut correction loop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrectionConfig {
    pub max_iterations: u32,
    pub min_step: u64,
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self {
            max_iterations: MAX_CORRECTION_ITERATIONS,
            min_step: MIN_CORRECTION_STEP as u64,
        }
    }
}

impl CorrectionConfig {
    pub fn policy(&self) -> CorrectionPolicy {
        CorrectionPolicy {
            max_iterations: self.max_iterations,
            min_step: self.min_step as u128,
        }
    }
}

/// Density curve ExactIn search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DensityConfig {
    pub max_bisection_steps: u32,
}

impl Default for DensityConfig {
    fn default() -> Self {
        Self {
            max_bisection_steps: DEFAULT_MAX_BISECTION_STEPS,
        }
    }
}

/// Program validation policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Run every handler's argument validation when an order is registered
    pub validate_on_register: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            validate_on_register: true,
        }
    }
}

/// Tracing output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl EngineConfig {
    /// Load from an optional TOML file, then apply `SWAPVM_` overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            info!("Loading engine config: {:?}", path);
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .context("Failed to build engine configuration")?;
        let engine: EngineConfig = config
            .try_deserialize()
            .context("Failed to deserialize engine configuration")?;

        engine.validate()?;
        debug!(?engine, "engine configuration loaded");
        Ok(engine)
    }

    /// Parse a TOML document without consulting the environment
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let engine: EngineConfig = Config::builder()
            .add_source(File::from_str(content, FileFormat::Toml))
            .build()
            .context("Failed to parse engine configuration")?
            .try_deserialize()
            .context("Failed to deserialize engine configuration")?;
        engine.validate()?;
        Ok(engine)
    }

    /// Render as TOML, e.g. to write out a starting configuration
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize engine configuration")
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.correction.min_step > 0,
            "correction.min_step must be at least 1"
        );
        ensure!(
            self.density.max_bisection_steps > 0,
            "density.max_bisection_steps must be at least 1"
        );
        ensure!(!self.logging.level.is_empty(), "logging.level must be set");
        Ok(())
    }
}
