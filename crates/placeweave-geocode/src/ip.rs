//! Coarse location from the caller's public IP (ipapi.co), for when no
//! device position is available.

use std::sync::Arc;

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::types::{IpLocation, ProviderError};

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    latitude: Option<Value>,
    lat: Option<Value>,
    longitude: Option<Value>,
    lon: Option<Value>,
    city: Option<String>,
    region: Option<String>,
    region_code: Option<String>,
    country_name: Option<String>,
    country: Option<String>,
    postal: Option<String>,
}

/// Coordinates arrive as numbers or numeric strings depending on the plan.
fn coordinate(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

impl IpApiResponse {
    fn into_location(self) -> Option<IpLocation> {
        let lat = coordinate(self.latitude.as_ref()).or_else(|| coordinate(self.lat.as_ref()))?;
        let lon =
            coordinate(self.longitude.as_ref()).or_else(|| coordinate(self.lon.as_ref()))?;
        Some(IpLocation {
            lat,
            lon,
            city: self.city,
            region: self.region.or(self.region_code),
            country: self.country_name.or(self.country),
            postal: self.postal,
        })
    }
}

#[derive(Debug, Clone)]
pub struct IpLocator {
    client: Arc<Client>,
    url: String,
}

impl IpLocator {
    pub fn new(client: Arc<Client>, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Approximate location of this host, or `None` on any failure.
    #[tracing::instrument(skip(self), level = "info")]
    pub async fn locate_by_ip(&self) -> Option<IpLocation> {
        match self.fetch().await {
            Ok(Some(location)) => Some(location),
            Ok(None) => {
                tracing::debug!("IP lookup returned no coordinates");
                None
            }
            Err(e) => {
                tracing::debug!("IP lookup failed: {}", e);
                None
            }
        }
    }

    async fn fetch(&self) -> Result<Option<IpLocation>, ProviderError> {
        let response = self.client.get(&self.url).send().await?;

        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status().as_u16()));
        }

        let body: IpApiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        Ok(body.into_location())
    }
}
