//! Reverse geocoding across several free providers.
//!
//! Photon, Nominatim, BigDataCloud and the Overpass postcode search are
//! queried together. Every one of them is allowed to fail; whatever comes back
//! is merged field by field with fixed provider precedence.

use std::sync::Arc;

use placeweave_core::{GeocodeConfig, GeocodeError};
use reqwest::Client;

use crate::known_area::KnownAreas;
use crate::postcode::PostcodeFormat;
use crate::providers::{
    build_client, BigDataCloudClient, NominatimClient, OverpassClient, PhotonClient,
    PostcodeSearch, ReverseProvider,
};
use crate::types::{PlaceFragment, PlaceRecord};

/// Reverse providers taking part in the merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Photon,
    Nominatim,
    BigDataCloud,
}

/// Precedence for `name`, `town` and provider postcodes.
pub const LOCALITY_PRECEDENCE: [Provider; 3] =
    [Provider::Photon, Provider::Nominatim, Provider::BigDataCloud];

/// Precedence for `district`, `state` and `country`.
pub const ADMIN_PRECEDENCE: [Provider; 3] =
    [Provider::Nominatim, Provider::Photon, Provider::BigDataCloud];

/// What each reverse provider returned. A failed provider is an empty fragment.
#[derive(Debug, Clone, Default)]
pub struct Fragments {
    pub photon: PlaceFragment,
    pub nominatim: PlaceFragment,
    pub bigdatacloud: PlaceFragment,
}

impl Fragments {
    pub fn get(&self, provider: Provider) -> &PlaceFragment {
        match provider {
            Provider::Photon => &self.photon,
            Provider::Nominatim => &self.nominatim,
            Provider::BigDataCloud => &self.bigdatacloud,
        }
    }

    fn pick(
        &self,
        order: &[Provider],
        field: impl Fn(&PlaceFragment) -> &Option<String>,
    ) -> Option<String> {
        order
            .iter()
            .find_map(|p| field(self.get(*p)).as_ref().filter(|v| !v.is_empty()))
            .cloned()
    }
}

/// Pick the postcode, highest priority first:
/// the known-area override, a well-formed Overpass code, the first
/// well-formed provider code, any Overpass code, any provider code.
pub fn resolve_postcode(
    fragments: &Fragments,
    overpass: Option<&str>,
    known: Option<&str>,
    format: PostcodeFormat,
) -> Option<String> {
    if let Some(known) = known {
        return Some(known.to_string());
    }

    let provider_codes: Vec<Option<&str>> = LOCALITY_PRECEDENCE
        .iter()
        .map(|p| fragments.get(*p).postcode.as_deref())
        .collect();

    format
        .normalize_valid(overpass)
        .or_else(|| provider_codes.iter().find_map(|raw| format.normalize_valid(*raw)))
        .or_else(|| format.normalize(overpass))
        .or_else(|| provider_codes.iter().find_map(|raw| format.normalize(*raw)))
}

/// Merge provider fragments into one record, or `None` if nothing is known.
pub fn merge(
    fragments: &Fragments,
    overpass_postcode: Option<&str>,
    known_postcode: Option<&str>,
    format: PostcodeFormat,
) -> Option<PlaceRecord> {
    let name = fragments.pick(&LOCALITY_PRECEDENCE, |f| &f.name);
    let town = fragments
        .pick(&LOCALITY_PRECEDENCE, |f| &f.town)
        .or_else(|| name.clone());

    let record = PlaceRecord {
        name,
        town,
        district: fragments.pick(&ADMIN_PRECEDENCE, |f| &f.district),
        state: fragments.pick(&ADMIN_PRECEDENCE, |f| &f.state),
        country: fragments.pick(&ADMIN_PRECEDENCE, |f| &f.country),
        postcode: resolve_postcode(fragments, overpass_postcode, known_postcode, format),
    };

    (!record.is_empty()).then_some(record)
}

/// Fans a coordinate out to every provider and merges what comes back.
#[derive(Clone)]
pub struct ReverseGeocoder {
    photon: Arc<dyn ReverseProvider>,
    nominatim: Arc<dyn ReverseProvider>,
    bigdatacloud: Arc<dyn ReverseProvider>,
    overpass: Arc<dyn PostcodeSearch>,
    known_areas: KnownAreas,
    format: PostcodeFormat,
}

impl std::fmt::Debug for ReverseGeocoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReverseGeocoder")
            .field("photon", &self.photon.name())
            .field("nominatim", &self.nominatim.name())
            .field("bigdatacloud", &self.bigdatacloud.name())
            .field("known_areas", &self.known_areas.len())
            .field("format", &self.format)
            .finish()
    }
}

impl ReverseGeocoder {
    /// Assemble from explicit providers, with no overrides and 6-digit postcodes.
    pub fn new(
        photon: Arc<dyn ReverseProvider>,
        nominatim: Arc<dyn ReverseProvider>,
        bigdatacloud: Arc<dyn ReverseProvider>,
        overpass: Arc<dyn PostcodeSearch>,
    ) -> Self {
        Self {
            photon,
            nominatim,
            bigdatacloud,
            overpass,
            known_areas: KnownAreas::default(),
            format: PostcodeFormat::default(),
        }
    }

    pub fn from_config(config: &GeocodeConfig) -> Result<Self, GeocodeError> {
        let client = Arc::new(build_client(config)?);
        Ok(Self::with_client(client, config))
    }

    /// Build the stock providers on an existing HTTP client.
    pub fn with_client(client: Arc<Client>, config: &GeocodeConfig) -> Self {
        let endpoints = &config.endpoints;
        let format = PostcodeFormat::new(config.postcode.digits);

        let photon = PhotonClient::new(client.clone(), &endpoints.photon, &config.user_agent);
        let nominatim =
            NominatimClient::new(client.clone(), &endpoints.nominatim, &config.user_agent);
        let bigdatacloud = BigDataCloudClient::new(client.clone(), &endpoints.bigdatacloud);
        let overpass = OverpassClient::new(client, &endpoints.overpass)
            .with_radii(config.overpass.radii_m.clone())
            .with_server_timeout(config.overpass.server_timeout_secs)
            .with_format(format);

        Self::new(
            Arc::new(photon),
            Arc::new(nominatim),
            Arc::new(bigdatacloud),
            Arc::new(overpass),
        )
        .with_known_areas(KnownAreas::new(config.known_areas.clone()))
        .with_postcode_format(format)
    }

    pub fn with_known_areas(mut self, known_areas: KnownAreas) -> Self {
        self.known_areas = known_areas;
        self
    }

    pub fn with_postcode_format(mut self, format: PostcodeFormat) -> Self {
        self.format = format;
        self
    }

    /// Resolve a coordinate to a place.
    ///
    /// All four lookups run concurrently and are awaited to completion; a
    /// failure in one never cancels the others. Returns `None` when no
    /// provider knew anything about the point.
    #[tracing::instrument(skip(self), level = "info")]
    pub async fn reverse_geocode(&self, lat: f64, lon: f64) -> Option<PlaceRecord> {
        let known = self.known_areas.lookup(lat, lon);
        if let Some(code) = known {
            tracing::debug!("Known-area override applies: {}", code);
        }

        let (photon, nominatim, bigdatacloud, overpass) = tokio::join!(
            self.photon.reverse(lat, lon),
            self.nominatim.reverse(lat, lon),
            self.bigdatacloud.reverse(lat, lon),
            self.overpass.find_postcode(lat, lon, known),
        );

        let fragments = Fragments {
            photon: photon.unwrap_or_default(),
            nominatim: nominatim.unwrap_or_default(),
            bigdatacloud: bigdatacloud.unwrap_or_default(),
        };

        let record = merge(&fragments, overpass.as_deref(), known, self.format);
        match &record {
            Some(place) => tracing::info!(
                "Reverse geocoded to: {}",
                place.display_label().unwrap_or_default()
            ),
            None => tracing::info!("No provider returned data for {}, {}", lat, lon),
        }
        record
    }
}
