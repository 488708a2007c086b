//! Photon (komoot) reverse geocoding. GeoJSON response, OSM-derived properties.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::{fetch_json, FieldChains, ReverseProvider, Source};
use crate::types::{PlaceFragment, ProviderError};

pub const PHOTON_CHAINS: FieldChains = FieldChains {
    name: &[
        Source::Key("locality"),
        Source::Key("district"),
        Source::Key("name"),
        Source::Key("city"),
    ],
    town: &[
        Source::Key("city"),
        Source::Key("locality"),
        Source::Key("district"),
    ],
    district: &[Source::Key("county")],
    state: &[Source::Key("state")],
    country: &[Source::Key("country"), Source::Upper("countrycode")],
    postcode: &[Source::Key("postcode")],
};

/// Read the properties of the first feature.
pub fn fragment_from_photon(body: &Value) -> PlaceFragment {
    body.pointer("/features/0/properties")
        .map(|props| PHOTON_CHAINS.extract(props))
        .unwrap_or_default()
}

#[derive(Debug, Clone)]
pub struct PhotonClient {
    client: Arc<Client>,
    url: String,
    user_agent: String,
}

impl PhotonClient {
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
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("lang", "en".to_string()),
            ])
            .header(reqwest::header::USER_AGENT, &self.user_agent);

        let body = fetch_json(request).await?;
        Ok(fragment_from_photon(&body))
    }
}

#[async_trait]
impl ReverseProvider for PhotonClient {
    fn name(&self) -> &'static str {
        "photon"
    }

    async fn reverse(&self, lat: f64, lon: f64) -> Option<PlaceFragment> {
        match self.fetch(lat, lon).await {
            Ok(fragment) => Some(fragment),
            Err(e) => {
                tracing::debug!("Photon reverse geocode failed: {}", e);
                None
            }
        }
    }
}
