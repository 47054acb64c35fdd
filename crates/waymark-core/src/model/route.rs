use std::time::Duration;

use super::geo::LatLng;

/// A driving route as returned by the directions service.
///
/// Text fields are the provider's own wording and are displayed as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub origin: LatLng,
    pub destination: LatLng,
    /// Decoded overview geometry.
    pub path: Vec<LatLng>,
    /// Provider summary, usually the main road ("Ring Rd").
    pub summary: String,
    pub distance_text: String,
    pub duration_text: String,
    pub distance_m: u64,
    pub duration: Duration,
    pub warnings: Vec<String>,
    pub copyrights: String,
}

impl Route {
    /// Whether this route was computed for the given endpoints.
    pub fn connects(&self, origin: LatLng, destination: LatLng) -> bool {
        self.origin == origin && self.destination == destination
    }
}
