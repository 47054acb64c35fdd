// Directions endpoint
//
// Routes are requested from a coordinate origin to a coordinate
// destination; the overview polyline is decoded by the caller via
// `polyline::decode` (or `DirectionsRoute::path`).

use tracing::debug;

use crate::client::MapsClient;
use crate::error::Error;
use crate::models::{DirectionsResponse, DirectionsRoute, LatLng, TravelMode};
use crate::polyline;

impl MapsClient {
    /// Request routes between two coordinates.
    ///
    /// `GET /maps/api/directions/json?origin=lat,lng&destination=lat,lng&mode=...`
    pub async fn directions(
        &self,
        origin: LatLng,
        destination: LatLng,
        mode: TravelMode,
    ) -> Result<DirectionsResponse, Error> {
        let url = self.maps_url("directions/json")?;
        let origin = origin.to_query();
        let destination = destination.to_query();
        let mode = mode.to_string();
        debug!(%origin, %destination, %mode, "requesting directions");

        self.get(
            url,
            &[
                ("origin", origin.as_str()),
                ("destination", destination.as_str()),
                ("mode", mode.as_str()),
            ],
        )
        .await
    }
}

impl DirectionsRoute {
    /// Decoded overview geometry.
    pub fn path(&self) -> Result<Vec<LatLng>, Error> {
        polyline::decode(&self.overview_polyline.points)
    }

    /// Total distance over all legs, in meters.
    pub fn distance_meters(&self) -> u64 {
        self.legs.iter().map(|leg| leg.distance.value).sum()
    }

    /// Total duration over all legs, in seconds.
    pub fn duration_seconds(&self) -> u64 {
        self.legs.iter().map(|leg| leg.duration.value).sum()
    }
}
