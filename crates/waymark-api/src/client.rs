// Maps web-service HTTP client
//
// Wraps `reqwest::Client` with key injection, host-aware URL construction,
// and `status` envelope checking. Endpoint modules (places, geocoding,
// directions, geolocation) are implemented as inherent methods in
// separate files to keep this module focused on transport mechanics.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::StatusEnvelope;
use crate::transport::TransportConfig;

/// Production host for the `/maps/api/*` web services.
pub const GOOGLE_MAPS_URL: &str = "https://maps.googleapis.com";
/// Production host for the Geolocation API.
pub const GOOGLE_GEOLOCATION_URL: &str = "https://www.googleapis.com";

/// Base URLs for the two hosts waymark talks to.
///
/// Overridable so tests (and proxies) can point both at another server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub maps: Url,
    pub geolocation: Url,
}

impl Endpoints {
    /// Google's production hosts.
    pub fn google() -> Result<Self, Error> {
        Ok(Self {
            maps: Url::parse(GOOGLE_MAPS_URL)?,
            geolocation: Url::parse(GOOGLE_GEOLOCATION_URL)?,
        })
    }

    /// Route both services through a single base URL.
    pub fn single(base: Url) -> Self {
        Self {
            maps: base.clone(),
            geolocation: base,
        }
    }
}

/// Raw HTTP client for the Google Maps Platform web services.
///
/// Every request carries the API key as the `key` query parameter. JSON
/// responses with a `status` other than `OK` / `ZERO_RESULTS` are turned
/// into [`Error::Api`] before the caller sees them.
pub struct MapsClient {
    http: reqwest::Client,
    endpoints: Endpoints,
    api_key: SecretString,
}

impl MapsClient {
    /// Create a client from a `TransportConfig`.
    pub fn new(
        api_key: SecretString,
        endpoints: Endpoints,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, api_key, endpoints))
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, api_key: SecretString, endpoints: Endpoints) -> Self {
        Self {
            http,
            endpoints,
            api_key,
        }
    }

    /// The configured base URLs.
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// `{maps}/maps/api/{path}`
    pub(crate) fn maps_url(&self, path: &str) -> Result<Url, Error> {
        join(&self.endpoints.maps, &format!("maps/api/{path}"))
    }

    /// `{geolocation}/geolocation/v1/{path}`
    pub(crate) fn geolocation_url(&self, path: &str) -> Result<Url, Error> {
        join(&self.endpoints.geolocation, &format!("geolocation/v1/{path}"))
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET to a Maps web service and check its `status` envelope.
    pub(crate) async fn get<T>(&self, url: Url, params: &[(&str, &str)]) -> Result<T, Error>
    where
        T: DeserializeOwned + StatusEnvelope,
    {
        // Never log the query string: it carries the key.
        debug!(path = url.path(), "GET");

        let resp = self
            .http
            .get(url)
            .query(params)
            .query(&[("key", self.api_key.expose_secret())])
            .send()
            .await?;

        let body = read_success_body(resp).await?;
        let envelope: T = parse_json(&body)?;
        check_status(envelope)
    }

    /// Send a JSON POST and return the raw response for endpoint-specific
    /// error handling.
    pub(crate) async fn post(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<reqwest::Response, Error> {
        debug!(path = url.path(), "POST");

        let resp = self
            .http
            .post(url)
            .query(&[("key", self.api_key.expose_secret())])
            .json(body)
            .send()
            .await?;
        Ok(resp)
    }
}

fn join(base: &Url, path: &str) -> Result<Url, Error> {
    let base = base.as_str().trim_end_matches('/');
    Ok(Url::parse(&format!("{base}/{path}"))?)
}

/// Read the body of a successful response, mapping non-2xx to [`Error::Http`].
async fn read_success_body(resp: reqwest::Response) -> Result<String, Error> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(Error::Http {
            status: status.as_u16(),
            message: preview(&body).to_owned(),
        });
    }
    Ok(resp.text().await?)
}

pub(crate) fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    serde_json::from_str(body).map_err(|e| Error::Deserialization {
        message: format!("{e} (body preview: {:?})", preview(body)),
        body: body.to_owned(),
    })
}

/// Pass `OK` / `ZERO_RESULTS` through, reject every other status.
pub(crate) fn check_status<T: StatusEnvelope>(envelope: T) -> Result<T, Error> {
    let status = envelope.status();
    trace!(%status, "maps status");
    if status.is_data() {
        return Ok(envelope);
    }
    Err(Error::Api {
        status,
        message: envelope
            .error_message()
            .map_or_else(|| status.to_string(), str::to_owned),
    })
}

pub(crate) fn preview(body: &str) -> &str {
    match body.char_indices().nth(200) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
