//! Nominatim (OpenStreetMap) reverse geocoding.
//! Free, no API key, but requires a descriptive User-Agent.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::{fetch_json, FieldChains, ReverseProvider, Source};
use crate::types::{PlaceFragment, ProviderError};

/// Fallback orders over the `address` object. `name` runs most to least
/// granular across the OSM place taxonomy.
pub const NOMINATIM_CHAINS: FieldChains = FieldChains {
    name: &[
        Source::Key("neighbourhood"),
        Source::Key("suburb"),
        Source::Key("municipality"),
        Source::Key("town"),
        Source::Key("village"),
        Source::Key("city"),
        Source::Key("hamlet"),
        Source::Key("quarter"),
    ],
    town: &[
        Source::Key("town"),
        Source::Key("city"),
        Source::Key("village"),
        Source::Key("municipality"),
        Source::Key("hamlet"),
    ],
    district: &[
        Source::Key("state_district"),
        Source::Key("county"),
        Source::Key("city_district"),
    ],
    state: &[
        Source::Key("state"),
        Source::Key("county"),
        Source::Key("state_district"),
        Source::Key("region"),
    ],
    country: &[Source::Key("country"), Source::Upper("country_code")],
    postcode: &[Source::Key("postcode")],
};

pub fn fragment_from_nominatim(body: &Value) -> PlaceFragment {
    body.get("address")
        .map(|address| NOMINATIM_CHAINS.extract(address))
        .unwrap_or_default()
}

#[derive(Debug, Clone)]
pub struct NominatimClient {
    client: Arc<Client>,
    url: String,
    user_agent: String,
}

impl NominatimClient {
    pub fn new(client: Arc<Client>, url: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            user_agent: user_agent.into(),
        }
    }

    async fn fetch(&self, lat: f64, lon: f64) -> Result<PlaceFragment, ProviderError> {
        let request = self
            .client
            .get(&self.url)
            .query(&[
                ("format", "jsonv2".to_string()),
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("addressdetails", "1".to_string()),
                ("zoom", "18".to_string()),
            ])
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .header(reqwest::header::ACCEPT, "application/json");

        let body = fetch_json(request).await?;
        Ok(fragment_from_nominatim(&body))
    }
}

#[async_trait]
impl ReverseProvider for NominatimClient {
    fn name(&self) -> &'static str {
        "nominatim"
    }

    async fn reverse(&self, lat: f64, lon: f64) -> Option<PlaceFragment> {
        if self.user_agent.trim().is_empty() {
            tracing::warn!("Skipping Nominatim: usage policy requires a User-Agent");
            return None;
        }

        match self.fetch(lat, lon).await {
            Ok(fragment) => Some(fragment),
            Err(e) => {
                tracing::debug!("Nominatim reverse geocode failed: {}", e);
                None
            }
        }
    }
}
