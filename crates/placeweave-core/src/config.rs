use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Geocoding settings
    #[serde(default)]
    pub geocode: GeocodeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodeConfig {
    /// Sent as `User-Agent` on every request. Nominatim rejects anonymous clients.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Transport timeout for each outbound request
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub endpoints: EndpointsConfig,

    #[serde(default)]
    pub overpass: OverpassConfig,

    #[serde(default)]
    pub postcode: PostcodeConfig,

    /// Bounding boxes whose postcode overrides anything upstream reports
    #[serde(default = "default_known_areas")]
    pub known_areas: Vec<KnownPostcodeArea>,
}

fn default_user_agent() -> String {
    format!(
        "placeweave/{} (+https://github.com/placeweave/placeweave)",
        env!("CARGO_PKG_VERSION")
    )
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_known_areas() -> Vec<KnownPostcodeArea> {
    vec![KnownPostcodeArea {
        lat_min: 17.33,
        lat_max: 17.37,
        lon_min: 78.32,
        lon_max: 78.36,
        postcode: "500075".to_string(),
    }]
}

impl Default for GeocodeConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout_secs(),
            endpoints: EndpointsConfig::default(),
            overpass: OverpassConfig::default(),
            postcode: PostcodeConfig::default(),
            known_areas: default_known_areas(),
        }
    }
}

/// Upstream service URLs. Overridable for self-hosted mirrors and tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointsConfig {
    pub photon: String,
    pub nominatim: String,
    pub bigdatacloud: String,
    pub overpass: String,
    pub forward: String,
    pub ip_lookup: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            photon: "https://photon.komoot.io/reverse".to_string(),
            nominatim: "https://nominatim.openstreetmap.org/reverse".to_string(),
            bigdatacloud: "https://api.bigdatacloud.net/data/reverse-geocode-client".to_string(),
            overpass: "https://overpass-api.de/api/interpreter".to_string(),
            forward: "https://geocoding-api.open-meteo.com/v1/search".to_string(),
            ip_lookup: "https://ipapi.co/json/".to_string(),
        }
    }
}

impl EndpointsConfig {
    /// Point every endpoint at one host, keeping the upstream paths.
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            photon: format!("{}/reverse", base),
            nominatim: format!("{}/nominatim/reverse", base),
            bigdatacloud: format!("{}/data/reverse-geocode-client", base),
            overpass: format!("{}/api/interpreter", base),
            forward: format!("{}/v1/search", base),
            ip_lookup: format!("{}/json/", base),
        }
    }

    fn fields(&self) -> [(&'static str, &str); 6] {
        [
            ("geocode.endpoints.photon", self.photon.as_str()),
            ("geocode.endpoints.nominatim", self.nominatim.as_str()),
            ("geocode.endpoints.bigdatacloud", self.bigdatacloud.as_str()),
            ("geocode.endpoints.overpass", self.overpass.as_str()),
            ("geocode.endpoints.forward", self.forward.as_str()),
            ("geocode.endpoints.ip_lookup", self.ip_lookup.as_str()),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverpassConfig {
    /// Search radii in meters, tried in order until one yields a postcode
    pub radii_m: Vec<u32>,
    /// Server-side processing limit embedded in each query
    pub server_timeout_secs: u32,
}

impl Default for OverpassConfig {
    fn default() -> Self {
        Self {
            radii_m: vec![600, 1200, 2000, 3000, 5000],
            server_timeout_secs: 25,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PostcodeConfig {
    /// Width of the fixed-length numeric postal format of the target region
    pub digits: usize,
}

impl Default for PostcodeConfig {
    fn default() -> Self {
        Self { digits: 6 }
    }
}

/// Axis-aligned box asserting the true postcode for points inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnownPostcodeArea {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
    pub postcode: String,
}

impl KnownPostcodeArea {
    /// Inclusive on all edges
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.lat_min && lat <= self.lat_max && lon >= self.lon_min && lon <= self.lon_max
    }
}

impl Config {
    /// Load configuration from the default location, creating it if missing
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from `path`, writing defaults there if it doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let contents = std::fs::read_to_string(path).context("Failed to read config file")?;

        let config: Config =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Warnings are logged; errors fail the load.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()).into());
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();
        let geo = &self.geocode;

        if geo.user_agent.trim().is_empty() {
            result.add_error(
                "geocode.user_agent",
                "A descriptive User-Agent is required by the Nominatim usage policy",
            );
        }

        if geo.request_timeout_secs == 0 {
            result.add_error(
                "geocode.request_timeout_secs",
                "Request timeout must be greater than 0",
            );
        }

        for (field, value) in geo.endpoints.fields() {
            Self::validate_url(value, field, &mut result);
        }

        if geo.overpass.radii_m.is_empty() {
            result.add_error("geocode.overpass.radii_m", "At least one search radius is required");
        } else if geo.overpass.radii_m.windows(2).any(|w| w[0] >= w[1]) {
            result.add_warning(
                "geocode.overpass.radii_m",
                "Radii are not strictly increasing; larger radii may be queried first",
            );
        }

        if geo.postcode.digits == 0 {
            result.add_error("geocode.postcode.digits", "Postcode width must be greater than 0");
        }

        for (i, area) in geo.known_areas.iter().enumerate() {
            let field = format!("geocode.known_areas[{}]", i);
            if area.lat_min > area.lat_max || area.lon_min > area.lon_max {
                result.add_error(&field, "Bounding box minimum exceeds maximum");
            }
            if area.postcode.is_empty() || !area.postcode.chars().all(|c| c.is_ascii_digit()) {
                result.add_warning(&field, format!("Postcode is not numeric: {:?}", area.postcode));
            }
        }

        result
    }

    fn validate_url(url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("placeweave");

        Ok(config_dir.join("config.toml"))
    }
}
