use serde::{Deserialize, Serialize};

/// Coordinates to resolve. Range checking is left to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoQuery {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoQuery {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// True when both components fall in the WGS84 range
    pub fn is_in_range(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// One provider's partial view of a place. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceFragment {
    pub name: Option<String>,
    pub town: Option<String>,
    pub district: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    /// Raw, as reported upstream
    pub postcode: Option<String>,
}

impl PlaceFragment {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.town.is_none()
            && self.district.is_none()
            && self.state.is_none()
            && self.country.is_none()
            && self.postcode.is_none()
    }
}

/// Merged result of a reverse lookup. Never constructed with every field empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub town: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postcode: Option<String>,
}

impl PlaceRecord {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.town.is_none()
            && self.district.is_none()
            && self.state.is_none()
            && self.country.is_none()
            && self.postcode.is_none()
    }

    /// Human-readable label, e.g. "Narsingi, Telangana, India (500075)".
    ///
    /// Prefers `town` over `name` for the leading part.
    pub fn display_label(&self) -> Option<String> {
        let parts: Vec<&str> = [
            self.town.as_deref().or(self.name.as_deref()),
            self.state.as_deref(),
            self.country.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect();

        let head = parts.join(", ");
        match (&self.postcode, head.is_empty()) {
            (Some(pin), false) => Some(format!("{} ({})", head, pin)),
            (Some(pin), true) => Some(pin.clone()),
            (None, false) => Some(head),
            (None, true) => None,
        }
    }
}

/// Top match of a free-text place search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoResult {
    pub lat: f64,
    pub lon: f64,
    pub name: String,
    pub state: Option<String>,
    pub country: Option<String>,
}

/// Approximate location derived from the caller's public IP
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpLocation {
    pub lat: f64,
    pub lon: f64,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub postal: Option<String>,
}

/// Why a single upstream call produced nothing.
///
/// Never returned to callers: clients log it and yield `None`.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Upstream returned status {0}")]
    Status(u16),
    #[error("Parse error: {0}")]
    Parse(String),
}
