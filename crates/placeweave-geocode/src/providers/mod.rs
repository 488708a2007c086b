//! Upstream geocoding backends.
//!
//! Each reverse provider turns one HTTP call into a [`PlaceFragment`]. The
//! field fallback orders are plain data ([`FieldChains`]) so they can be
//! checked without a network.

pub mod bigdatacloud;
pub mod nominatim;
pub mod overpass;
pub mod photon;

pub use bigdatacloud::BigDataCloudClient;
pub use nominatim::NominatimClient;
pub use overpass::OverpassClient;
pub use photon::PhotonClient;

use std::time::Duration;

use async_trait::async_trait;
use placeweave_core::{GeocodeConfig, GeocodeError};
use reqwest::Client;
use serde_json::Value;

use crate::types::{PlaceFragment, ProviderError};

/// A reverse-geocoding backend. Failures surface as `None`, never as errors.
#[async_trait]
pub trait ReverseProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn reverse(&self, lat: f64, lon: f64) -> Option<PlaceFragment>;
}

/// Spatial search for postcodes tagged on map features near a point.
#[async_trait]
pub trait PostcodeSearch: Send + Sync {
    async fn find_postcode(&self, lat: f64, lon: f64, preferred: Option<&str>) -> Option<String>;
}

/// Where to read one value from a provider's JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// String or number under this key
    Key(&'static str),
    /// Same as `Key`, upper-cased (ISO country codes)
    Upper(&'static str),
    /// JSON pointer from the root
    Pointer(&'static str),
    /// `name` of the first entry in the array at `list` with this `adminLevel`
    AdminLevel { list: &'static str, level: u64 },
}

impl Source {
    fn resolve(&self, root: &Value) -> Option<String> {
        match self {
            Source::Key(key) => text(root.get(*key)?),
            Source::Upper(key) => text(root.get(*key)?).map(|s| s.to_uppercase()),
            Source::Pointer(ptr) => text(root.pointer(ptr)?),
            Source::AdminLevel { list, level } => root
                .pointer(list)?
                .as_array()?
                .iter()
                .find(|entry| entry.get("adminLevel").and_then(Value::as_u64) == Some(*level))
                .and_then(|entry| text(entry.get("name")?)),
        }
    }
}

fn text(value: &Value) -> Option<String> {
    let s = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!s.is_empty()).then_some(s)
}

/// First source in the chain that yields a non-empty value.
pub fn first_present(chain: &[Source], root: &Value) -> Option<String> {
    chain.iter().find_map(|source| source.resolve(root))
}

/// Per-field fallback orders for one provider's response shape.
#[derive(Debug, Clone, Copy)]
pub struct FieldChains {
    pub name: &'static [Source],
    pub town: &'static [Source],
    pub district: &'static [Source],
    pub state: &'static [Source],
    pub country: &'static [Source],
    pub postcode: &'static [Source],
}

impl FieldChains {
    pub fn extract(&self, root: &Value) -> PlaceFragment {
        PlaceFragment {
            name: first_present(self.name, root),
            town: first_present(self.town, root),
            district: first_present(self.district, root),
            state: first_present(self.state, root),
            country: first_present(self.country, root),
            postcode: first_present(self.postcode, root),
        }
    }
}

/// Shared HTTP client for every upstream call.
pub fn build_client(config: &GeocodeConfig) -> Result<Client, GeocodeError> {
    Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(|e| GeocodeError::ClientSetup(e.to_string()))
}

/// Send a request and decode a JSON body, mapping every failure mode.
pub(crate) async fn fetch_json(request: reqwest::RequestBuilder) -> Result<Value, ProviderError> {
    let response = request.send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(ProviderError::Status(status.as_u16()));
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| ProviderError::Parse(e.to_string()))
}
