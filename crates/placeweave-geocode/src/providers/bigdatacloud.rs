//! BigDataCloud client-side reverse geocoding. Keyless, flat top-level fields
//! plus a `localityInfo` breakdown by admin level.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::{fetch_json, FieldChains, ReverseProvider, Source};
use crate::types::{PlaceFragment, ProviderError};

const ADMIN: &str = "/localityInfo/administrative";

pub const BIGDATACLOUD_CHAINS: FieldChains = FieldChains {
    name: &[
        Source::Key("locality"),
        Source::Key("city"),
        Source::Pointer("/localityInfo/informative/0/name"),
        Source::Key("principalSubdivisionLocality"),
        Source::Pointer("/localityInfo/administrative/0/name"),
    ],
    town: &[Source::Key("city"), Source::Key("locality")],
    district: &[
        Source::AdminLevel { list: ADMIN, level: 5 },
        Source::AdminLevel { list: ADMIN, level: 6 },
    ],
    state: &[
        Source::Key("principalSubdivision"),
        Source::AdminLevel { list: ADMIN, level: 4 },
        Source::AdminLevel { list: ADMIN, level: 5 },
    ],
    country: &[Source::Key("countryName"), Source::Upper("countryCode")],
    postcode: &[Source::Key("postcode"), Source::Key("postalCode")],
};

pub fn fragment_from_bigdatacloud(body: &Value) -> PlaceFragment {
    BIGDATACLOUD_CHAINS.extract(body)
}

#[derive(Debug, Clone)]
pub struct BigDataCloudClient {
    client: Arc<Client>,
    url: String,
}

impl BigDataCloudClient {
    pub fn new(client: Arc<Client>, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    async fn fetch(&self, lat: f64, lon: f64) -> Result<PlaceFragment, ProviderError> {
        let request = self
            .client
            .get(&self.url)
            .query(&[
                ("latitude", lat.to_string()),
                ("longitude", lon.to_string()),
                ("localityLanguage", "en".to_string()),
            ])
            .header(reqwest::header::ACCEPT, "application/json");

        let body = fetch_json(request).await?;
        Ok(fragment_from_bigdatacloud(&body))
    }
}

#[async_trait]
impl ReverseProvider for BigDataCloudClient {
    fn name(&self) -> &'static str {
        "bigdatacloud"
    }

    async fn reverse(&self, lat: f64, lon: f64) -> Option<PlaceFragment> {
        match self.fetch(lat, lon).await {
            Ok(fragment) => Some(fragment),
            Err(e) => {
                tracing::debug!("BigDataCloud reverse geocode failed: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample() -> Value {
        json!({
            "latitude": 17.35,
            "longitude": 78.34,
            "countryName": "India",
            "countryCode": "IN",
            "principalSubdivision": "Telangana",
            "city": "Hyderabad",
            "locality": "Gandipet",
            "postcode": "",
            "localityInfo": {
                "administrative": [
                    {"name": "India", "adminLevel": 2, "order": 1},
                    {"name": "Telangana", "adminLevel": 4, "order": 3},
                    {"name": "Ranga Reddy", "adminLevel": 5, "order": 5}
                ],
                "informative": [
                    {"name": "Asia", "order": 0}
                ]
            }
        })
    }

    #[test]
    fn test_fragment_from_bigdatacloud() {
        let fragment = fragment_from_bigdatacloud(&sample());
        assert_eq!(fragment.name.as_deref(), Some("Gandipet"));
        assert_eq!(fragment.town.as_deref(), Some("Hyderabad"));
        assert_eq!(fragment.district.as_deref(), Some("Ranga Reddy"));
        assert_eq!(fragment.state.as_deref(), Some("Telangana"));
        assert_eq!(fragment.country.as_deref(), Some("India"));
        assert_eq!(fragment.postcode, None);
    }

    #[test]
    fn test_sparse_response_uses_admin_levels() {
        let body = json!({
            "countryCode": "in",
            "postalCode": "500075",
            "localityInfo": {
                "administrative": [
                    {"name": "Telangana", "adminLevel": 4},
                    {"name": "Medchal", "adminLevel": 6}
                ],
                "informative": [{"name": "Deccan Plateau"}]
            }
        });
        let fragment = fragment_from_bigdatacloud(&body);
        assert_eq!(fragment.name.as_deref(), Some("Deccan Plateau"));
        assert_eq!(fragment.town, None);
        assert_eq!(fragment.district.as_deref(), Some("Medchal"));
        assert_eq!(fragment.state.as_deref(), Some("Telangana"));
        assert_eq!(fragment.country.as_deref(), Some("IN"));
        assert_eq!(fragment.postcode.as_deref(), Some("500075"));
    }

    #[test]
    fn test_name_chain_order() {
        assert_eq!(
            BIGDATACLOUD_CHAINS.name,
            &[
                Source::Key("locality"),
                Source::Key("city"),
                Source::Pointer("/localityInfo/informative/0/name"),
                Source::Key("principalSubdivisionLocality"),
                Source::Pointer("/localityInfo/administrative/0/name"),
            ]
        );
    }

    #[test]
    fn test_state_chain_order() {
        assert_eq!(
            BIGDATACLOUD_CHAINS.state,
            &[
                Source::Key("principalSubdivision"),
                Source::AdminLevel { list: ADMIN, level: 4 },
                Source::AdminLevel { list: ADMIN, level: 5 },
            ]
        );
    }

    #[test]
    fn test_name_falls_back_to_subdivision_locality() {
        let body = json!({
            "principalSubdivisionLocality": "Serilingampally",
            "localityInfo": {
                "administrative": [{"name": "Kokapet", "adminLevel": 8}]
            }
        });
        assert_eq!(
            fragment_from_bigdatacloud(&body).name.as_deref(),
            Some("Serilingampally")
        );

        let body = json!({
            "localityInfo": {
                "administrative": [{"name": "Kokapet", "adminLevel": 8}]
            }
        });
        assert_eq!(
            fragment_from_bigdatacloud(&body).name.as_deref(),
            Some("Kokapet")
        );
    }

    #[test]
    fn test_state_falls_back_to_level_five() {
        let body = json!({
            "localityInfo": {
                "administrative": [{"name": "Ranga Reddy", "adminLevel": 5}]
            }
        });
        let fragment = fragment_from_bigdatacloud(&body);
        assert_eq!(fragment.state.as_deref(), Some("Ranga Reddy"));
        assert_eq!(fragment.district.as_deref(), Some("Ranga Reddy"));
    }

    #[tokio::test]
    async fn test_reverse_request_shape() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/reverse-geocode-client"))
            .and(query_param("latitude", "17.35"))
            .and(query_param("longitude", "78.34"))
            .and(query_param("localityLanguage", "en"))
            .and(header("Accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = BigDataCloudClient::new(
            Arc::new(Client::new()),
            format!("{}/data/reverse-geocode-client", mock_server.uri()),
        );
        let fragment = client.reverse(17.35, 78.34).await.unwrap();
        assert_eq!(fragment.country.as_deref(), Some("India"));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_absent() {
        let client = BigDataCloudClient::new(
            Arc::new(Client::new()),
            "http://127.0.0.1:9/data/reverse-geocode-client",
        );
        assert!(client.reverse(17.35, 78.34).await.is_none());
    }
}
