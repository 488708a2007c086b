//! Forward geocoding: free-text place name to coordinates.
//! Uses the Open-Meteo geocoding API - free, no API key required.

use std::sync::Arc;

use reqwest::Client;
use serde::Deserialize;

use crate::types::{GeoResult, ProviderError};

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    latitude: f64,
    longitude: f64,
    name: String,
    admin1: Option<String>,
    admin2: Option<String>,
    country: Option<String>,
}

impl From<SearchHit> for GeoResult {
    fn from(hit: SearchHit) -> Self {
        let non_empty = |s: Option<String>| s.filter(|v| !v.trim().is_empty());
        Self {
            lat: hit.latitude,
            lon: hit.longitude,
            name: hit.name,
            state: non_empty(hit.admin1).or_else(|| non_empty(hit.admin2)),
            country: non_empty(hit.country),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ForwardGeocoder {
    client: Arc<Client>,
    url: String,
}

impl ForwardGeocoder {
    pub fn new(client: Arc<Client>, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Top-ranked match for `query`, or `None` on no results or failure.
    #[tracing::instrument(skip(self), level = "info")]
    pub async fn forward_geocode(&self, query: &str) -> Option<GeoResult> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }

        match self.search(query).await {
            Ok(Some(result)) => {
                tracing::info!(
                    "Forward geocoded to: {} ({}, {})",
                    result.name,
                    result.lat,
                    result.lon
                );
                Some(result)
            }
            Ok(None) => {
                tracing::debug!("Forward geocode found no match");
                None
            }
            Err(e) => {
                tracing::debug!("Forward geocode failed: {}", e);
                None
            }
        }
    }

    async fn search(&self, query: &str) -> Result<Option<GeoResult>, ProviderError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("name", query),
                ("count", "1"),
                ("language", "en"),
                ("format", "json"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status().as_u16()));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        Ok(body.results.into_iter().next().map(GeoResult::from))
    }
}
