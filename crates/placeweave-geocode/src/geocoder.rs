//! One handle over every lookup, sharing a single HTTP client.

use std::sync::Arc;

use placeweave_core::{GeocodeConfig, GeocodeError};

use crate::aggregator::ReverseGeocoder;
use crate::forward::ForwardGeocoder;
use crate::ip::IpLocator;
use crate::providers::build_client;
use crate::types::{GeoResult, IpLocation, PlaceRecord};

#[derive(Debug, Clone)]
pub struct Geocoder {
    reverse: ReverseGeocoder,
    forward: ForwardGeocoder,
    ip: IpLocator,
}

impl Geocoder {
    pub fn new(config: &GeocodeConfig) -> Result<Self, GeocodeError> {
        let client = Arc::new(build_client(config)?);

        Ok(Self {
            reverse: ReverseGeocoder::with_client(client.clone(), config),
            forward: ForwardGeocoder::new(client.clone(), &config.endpoints.forward),
            ip: IpLocator::new(client, &config.endpoints.ip_lookup),
        })
    }

    pub async fn reverse_geocode(&self, lat: f64, lon: f64) -> Option<PlaceRecord> {
        self.reverse.reverse_geocode(lat, lon).await
    }

    pub async fn forward_geocode(&self, query: &str) -> Option<GeoResult> {
        self.forward.forward_geocode(query).await
    }

    pub async fn locate_by_ip(&self) -> Option<IpLocation> {
        self.ip.locate_by_ip().await
    }
}
