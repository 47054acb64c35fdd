// Wire models for the Maps web services.
//
// Field names follow Google's JSON exactly; only the fields waymark reads
// are modelled. Unknown fields are ignored by serde.

use serde::{Deserialize, Serialize};

// ── Shared ──────────────────────────────────────────────────────────

/// The `status` field carried by every Maps web-service response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiStatus {
    Ok,
    ZeroResults,
    NotFound,
    OverQueryLimit,
    OverDailyLimit,
    RequestDenied,
    InvalidRequest,
    MaxRouteLengthExceeded,
    MaxWaypointsExceeded,
    UnknownError,
    /// Any status string this client does not recognize.
    #[serde(other)]
    Unknown,
}

impl ApiStatus {
    /// `OK` and `ZERO_RESULTS` carry data; everything else is a failure.
    pub fn is_data(self) -> bool {
        matches!(self, Self::Ok | Self::ZeroResults)
    }
}

/// A WGS84 coordinate as the Maps services encode it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// `"lat,lng"` as accepted by the `origin` / `destination` parameters.
    pub fn to_query(self) -> String {
        format!("{},{}", self.lat, self.lng)
    }
}

/// Responses that carry a Maps `status` envelope.
pub trait StatusEnvelope {
    fn status(&self) -> ApiStatus;
    fn error_message(&self) -> Option<&str>;
}

macro_rules! status_envelope {
    ($ty:ty) => {
        impl StatusEnvelope for $ty {
            fn status(&self) -> ApiStatus {
                self.status
            }

            fn error_message(&self) -> Option<&str> {
                self.error_message.as_deref()
            }
        }
    };
}

// ── Place Autocomplete ──────────────────────────────────────────────

/// Parameters for a Place Autocomplete query.
#[derive(Debug, Clone, Default)]
pub struct AutocompleteRequest {
    /// The partial text typed by the user.
    pub input: String,
    /// Groups the keystrokes of one search for billing.
    pub session_token: Option<String>,
    /// Preferred result language (e.g. `"en"`).
    pub language: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AutocompleteResponse {
    pub status: ApiStatus,
    #[serde(default)]
    pub predictions: Vec<Prediction>,
    pub error_message: Option<String>,
}

status_envelope!(AutocompleteResponse);

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Prediction {
    pub place_id: String,
    pub description: String,
    #[serde(default)]
    pub structured_formatting: StructuredFormatting,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct StructuredFormatting {
    #[serde(default)]
    pub main_text: String,
    #[serde(default)]
    pub secondary_text: String,
}

// ── Geocoding ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeocodeResponse {
    pub status: ApiStatus,
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
    pub error_message: Option<String>,
}

status_envelope!(GeocodeResponse);

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeocodeResult {
    pub formatted_address: String,
    #[serde(default)]
    pub place_id: String,
    pub geometry: Geometry,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct Geometry {
    pub location: LatLng,
}

// ── Directions ──────────────────────────────────────────────────────

/// Travel modes accepted by the Directions API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TravelMode {
    #[default]
    Driving,
    Walking,
    Bicycling,
    Transit,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DirectionsResponse {
    pub status: ApiStatus,
    #[serde(default)]
    pub routes: Vec<DirectionsRoute>,
    pub error_message: Option<String>,
}

status_envelope!(DirectionsResponse);

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DirectionsRoute {
    #[serde(default)]
    pub summary: String,
    pub overview_polyline: EncodedPolyline,
    #[serde(default)]
    pub legs: Vec<RouteLeg>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub copyrights: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EncodedPolyline {
    pub points: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteLeg {
    pub distance: TextValue,
    pub duration: TextValue,
    #[serde(default)]
    pub start_address: String,
    #[serde(default)]
    pub end_address: String,
    pub start_location: LatLng,
    pub end_location: LatLng,
}

/// Human text plus machine value (meters or seconds).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TextValue {
    pub text: String,
    pub value: u64,
}

// ── Geolocation ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeolocationRequest {
    pub consider_ip: bool,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct GeolocationResponse {
    pub location: LatLng,
    /// Radius of uncertainty in meters.
    pub accuracy: f64,
}

/// `{"error": {...}}` body returned by the Geolocation API on failure.
#[derive(Debug, Deserialize)]
pub(crate) struct GeolocationErrorBody {
    pub error: GeolocationErrorInner,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeolocationErrorInner {
    pub code: u16,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub errors: Vec<GeolocationErrorReason>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeolocationErrorReason {
    #[serde(default)]
    pub reason: String,
}
