//! Reverse and forward geocoding over free, keyless public services.
//!
//! Reverse lookups merge Photon, Nominatim, BigDataCloud and an Overpass
//! postcode search into one best-effort [`PlaceRecord`].

pub mod aggregator;
pub mod forward;
pub mod geocoder;
pub mod ip;
pub mod known_area;
pub mod postcode;
pub mod providers;
pub mod types;

pub use aggregator::{merge, resolve_postcode, Fragments, Provider, ReverseGeocoder};
pub use forward::ForwardGeocoder;
pub use geocoder::Geocoder;
pub use ip::IpLocator;
pub use known_area::KnownAreas;
pub use postcode::{normalize_postcode, PostcodeFormat};
pub use providers::{PostcodeSearch, ReverseProvider};
pub use types::*;
