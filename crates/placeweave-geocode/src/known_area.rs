//! Geofenced postcode corrections for places public data gets wrong.

use placeweave_core::KnownPostcodeArea;

/// Ordered table of override boxes. First containing box wins.
#[derive(Debug, Clone, Default)]
pub struct KnownAreas {
    areas: Vec<KnownPostcodeArea>,
}

impl KnownAreas {
    pub fn new(areas: Vec<KnownPostcodeArea>) -> Self {
        Self { areas }
    }

    pub fn lookup(&self, lat: f64, lon: f64) -> Option<&str> {
        self.areas
            .iter()
            .find(|area| area.contains(lat, lon))
            .map(|area| area.postcode.as_str())
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }
}

impl From<Vec<KnownPostcodeArea>> for KnownAreas {
    fn from(areas: Vec<KnownPostcodeArea>) -> Self {
        Self::new(areas)
    }
}
