//! Postcode search over OSM features via the Overpass API.
//!
//! One query per radius, widening until some feature carries `addr:postcode`.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::{fetch_json, PostcodeSearch};
use crate::postcode::PostcodeFormat;
use crate::types::ProviderError;

pub const DEFAULT_RADII_M: [u32; 5] = [600, 1200, 2000, 3000, 5000];

/// Overpass QL selecting every node/way/relation tagged with a postcode
/// within `radius_m` of the point. Only tags are returned.
pub fn postcode_query(lat: f64, lon: f64, radius_m: u32, server_timeout_secs: u32) -> String {
    let around = format!("around:{},{},{}", radius_m, lat, lon);
    format!(
        "[out:json][timeout:{t}];(node[\"addr:postcode\"]({a});way[\"addr:postcode\"]({a});relation[\"addr:postcode\"]({a}););out tags;",
        t = server_timeout_secs,
        a = around
    )
}

/// Postcode values of the response's elements, in response order.
pub fn postcodes_in(body: &Value) -> Vec<String> {
    body.get("elements")
        .and_then(Value::as_array)
        .map(|elements| {
            elements
                .iter()
                .filter_map(|el| el.pointer("/tags/addr:postcode")?.as_str())
                .map(str::trim)
                .filter(|code| !code.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// The candidate equal to `preferred` after normalization, else the first.
/// No distance ordering is applied.
pub fn choose_postcode(
    candidates: &[String],
    preferred: Option<&str>,
    format: PostcodeFormat,
) -> Option<String> {
    let wanted = preferred.and_then(|p| format.normalize(Some(p)));

    wanted
        .and_then(|wanted| {
            candidates.iter().find(|code| {
                format.normalize(Some(code.as_str())).as_deref() == Some(wanted.as_str())
            })
        })
        .or_else(|| candidates.first())
        .cloned()
}

#[derive(Debug, Clone)]
pub struct OverpassClient {
    client: Arc<Client>,
    url: String,
    radii_m: Vec<u32>,
    server_timeout_secs: u32,
    format: PostcodeFormat,
}

impl OverpassClient {
    pub fn new(client: Arc<Client>, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            radii_m: DEFAULT_RADII_M.to_vec(),
            server_timeout_secs: 25,
            format: PostcodeFormat::default(),
        }
    }

    pub fn with_radii(mut self, radii_m: Vec<u32>) -> Self {
        self.radii_m = radii_m;
        self
    }

    pub fn with_server_timeout(mut self, secs: u32) -> Self {
        self.server_timeout_secs = secs;
        self
    }

    pub fn with_format(mut self, format: PostcodeFormat) -> Self {
        self.format = format;
        self
    }

    async fn search_radius(
        &self,
        lat: f64,
        lon: f64,
        radius_m: u32,
    ) -> Result<Vec<String>, ProviderError> {
        let query = postcode_query(lat, lon, radius_m, self.server_timeout_secs);
        let request = self.client.post(&self.url).form(&[("data", query)]);

        let body = fetch_json(request).await?;
        Ok(postcodes_in(&body))
    }
}

#[async_trait]
impl PostcodeSearch for OverpassClient {
    #[tracing::instrument(skip(self), level = "debug")]
    async fn find_postcode(&self, lat: f64, lon: f64, preferred: Option<&str>) -> Option<String> {
        for &radius in &self.radii_m {
            match self.search_radius(lat, lon, radius).await {
                Ok(candidates) if !candidates.is_empty() => {
                    tracing::debug!(
                        "Overpass found {} postcode candidates at {} m",
                        candidates.len(),
                        radius
                    );
                    return choose_postcode(&candidates, preferred, self.format);
                }
                Ok(_) => {
                    tracing::debug!("Overpass: no postcodes within {} m", radius);
                }
                Err(e) => {
                    tracing::debug!("Overpass query at {} m failed: {}", radius, e);
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn elements(codes: &[&str]) -> Value {
        let elements: Vec<Value> = codes
            .iter()
            .map(|c| json!({"type": "node", "id": 1, "tags": {"addr:postcode": c}}))
            .collect();
        json!({"version": 0.6, "elements": elements})
    }

    #[test]
    fn test_query_shape() {
        let q = postcode_query(17.35, 78.34, 600, 25);
        assert_eq!(
            q,
            "[out:json][timeout:25];(node[\"addr:postcode\"](around:600,17.35,78.34);way[\"addr:postcode\"](around:600,17.35,78.34);relation[\"addr:postcode\"](around:600,17.35,78.34););out tags;"
        );
    }

    #[test]
    fn test_postcodes_in_skips_untagged() {
        let body = json!({"elements": [
            {"tags": {"name": "Shop"}},
            {"tags": {"addr:postcode": " 500075 "}},
            {"tags": {"addr:postcode": ""}},
            {"id": 5}
        ]});
        assert_eq!(postcodes_in(&body), vec!["500075".to_string()]);
        assert!(postcodes_in(&json!({})).is_empty());
    }

    #[test]
    fn test_choose_prefers_hint_then_first() {
        let candidates = vec!["500089".to_string(), "500 075".to_string()];
        let format = PostcodeFormat::default();
        assert_eq!(
            choose_postcode(&candidates, Some("500075"), format).as_deref(),
            Some("500 075")
        );
        assert_eq!(
            choose_postcode(&candidates, Some("500032"), format).as_deref(),
            Some("500089")
        );
        assert_eq!(choose_postcode(&candidates, None, format).as_deref(), Some("500089"));
        assert_eq!(choose_postcode(&[], Some("500075"), format), None);
    }

    #[tokio::test]
    async fn test_escalates_until_match() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/interpreter"))
            .and(body_string_contains("around%3A600%2C"))
            .respond_with(ResponseTemplate::new(200).set_body_json(elements(&[])))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/interpreter"))
            .and(body_string_contains("around%3A1200%2C"))
            .respond_with(ResponseTemplate::new(504))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/interpreter"))
            .and(header("Content-Type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("around%3A2000%2C"))
            .respond_with(ResponseTemplate::new(200).set_body_json(elements(&["500089", "500075"])))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(body_string_contains("around%3A3000%2C"))
            .respond_with(ResponseTemplate::new(200).set_body_json(elements(&["999999"])))
            .expect(0)
            .mount(&mock_server)
            .await;

        let client = OverpassClient::new(
            Arc::new(Client::new()),
            format!("{}/api/interpreter", mock_server.uri()),
        );
        let found = client.find_postcode(17.35, 78.34, Some("500075")).await;
        assert_eq!(found.as_deref(), Some("500075"));
    }

    #[tokio::test]
    async fn test_exhausted_radii_is_absent() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(elements(&[])))
            .expect(3)
            .mount(&mock_server)
            .await;

        let client = OverpassClient::new(
            Arc::new(Client::new()),
            format!("{}/api/interpreter", mock_server.uri()),
        )
        .with_radii(vec![100, 200, 300]);
        assert_eq!(client.find_postcode(0.0, 0.0, None).await, None);
    }
}
