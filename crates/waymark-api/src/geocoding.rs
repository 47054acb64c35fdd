// Geocoding endpoint

use tracing::debug;

use crate::client::MapsClient;
use crate::error::Error;
use crate::models::GeocodeResponse;

impl MapsClient {
    /// Resolve a free-form address to candidate coordinates.
    ///
    /// `GET /maps/api/geocode/json?address=...`
    ///
    /// `ZERO_RESULTS` is returned as an empty `results` list, not an error.
    pub async fn geocode(&self, address: &str) -> Result<GeocodeResponse, Error> {
        let url = self.maps_url("geocode/json")?;
        debug!(address, "geocoding");
        self.get(url, &[("address", address)]).await
    }
}
