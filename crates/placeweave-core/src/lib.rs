pub mod config;
pub mod error;

pub use config::{
    Config, EndpointsConfig, GeocodeConfig, KnownPostcodeArea, OverpassConfig, PostcodeConfig,
    ValidationResult,
};
pub use error::{AppError, ConfigError, GeocodeError};

use anyhow::Result;

/// Initialize logging for binaries embedding the geocoder
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))?;

    tracing::info!("Placeweave core initialized");
    Ok(())
}
