//! # SwapVM Configuration
//!
//! Engine tuning and logging settings shared by every embedding of the
//! engine.
//!
//! ## Features
//!
//! - **Curve tuning**: ExactOut correction bounds and the density search cap
//! - **Validation policy**: whether programs are fully validated at registration
//! - **Logging**: filter directive and output format for `tracing`
//!
//! ## Usage
//!
//! ```no_run
//! use swapvm_config::{init_tracing, EngineConfig};
//! use std::path::Path;
//!
//! let config = EngineConfig::load(Some(Path::new("config/engine.toml"))).unwrap();
//! init_tracing(&config.logging).unwrap();
//! ```

pub mod engine_config;
pub mod logging;

pub use engine_config::{
    CorrectionConfig, DensityConfig, EngineConfig, LoggingConfig, ValidationConfig, ENV_PREFIX,
};
pub use logging::init_tracing;
