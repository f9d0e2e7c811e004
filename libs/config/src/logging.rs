//! Tracing subscriber setup

use crate::engine_config::LoggingConfig;
use anyhow::{anyhow, Context, Result};
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber
///
/// `RUST_LOG` takes precedence over `config.level`. Fails if a global
/// subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .with_context(|| format!("Invalid log filter {:?}", config.level))?,
    };

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = if config.json {
        subscriber.json().try_init()
    } else {
        subscriber.try_init()
    };
    installed.map_err(|err| anyhow!("Failed to install tracing subscriber: {err}"))
}
