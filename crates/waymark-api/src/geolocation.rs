// Geolocation endpoint
//
// Unlike the `/maps/api` services this one is a POST on a different host
// and reports failures as `{"error": {"code", "message", "errors": [..]}}`
// with a non-2xx status instead of a `status` field.

use tracing::{debug, warn};

use crate::client::{MapsClient, parse_json, preview};
use crate::error::Error;
use crate::models::{GeolocationErrorBody, GeolocationRequest, GeolocationResponse};

impl MapsClient {
    /// Estimate the caller's position from its IP address.
    ///
    /// `POST /geolocation/v1/geolocate` with `{"considerIp": true}`
    pub async fn geolocate(&self) -> Result<GeolocationResponse, Error> {
        let url = self.geolocation_url("geolocate")?;
        debug!("geolocating");

        let resp = self
            .post(url, &GeolocationRequest { consider_ip: true })
            .await?;
        let status = resp.status();
        let body = resp.text().await?;

        if status.is_success() {
            return parse_json(&body);
        }

        match serde_json::from_str::<GeolocationErrorBody>(&body) {
            Ok(GeolocationErrorBody { error }) => {
                let reason = error
                    .errors
                    .into_iter()
                    .next()
                    .map(|e| e.reason)
                    .unwrap_or_default();
                warn!(code = error.code, %reason, "geolocation rejected");
                Err(Error::Geolocation {
                    code: error.code,
                    reason,
                    message: error.message,
                })
            }
            Err(_) => Err(Error::Http {
                status: status.as_u16(),
                message: preview(&body).to_owned(),
            }),
        }
    }
}
