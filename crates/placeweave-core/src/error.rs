//! Centralized error types for Placeweave.
//!
//! Geocoding itself never surfaces provider failures to callers (an
//! unresolvable point is `None`, not an error). The types here cover
//! configuration, HTTP client setup and command-line input.

use thiserror::Error;

/// Top-level application error type.
///
/// Use `user_message()` to get a message suitable for end users.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Geocoding error: {0}")]
    Geocode(#[from] GeocodeError),
}

impl AppError {
    /// Returns a user-friendly message suitable for display.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Config(e) => e.user_message(),
            AppError::Geocode(e) => e.user_message(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
        }
    }
}

/// Geocoding errors visible to callers.
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("No place found for {0}")]
    NotFound(String),

    #[error("HTTP client setup failed: {0}")]
    ClientSetup(String),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),
}

impl GeocodeError {
    pub fn user_message(&self) -> &'static str {
        match self {
            GeocodeError::NotFound(_) => "No place information is available for this location.",
            GeocodeError::ClientSetup(_) => "Geocoding is unavailable. Check your network settings.",
            GeocodeError::InvalidCoordinates(_) => {
                "Coordinates must be latitude -90..90 and longitude -180..180."
            }
        }
    }
}
