// ── Runtime map configuration ──
//
// These types describe how the map screen behaves and how to reach the
// Maps services. They never touch disk: the config crate resolves files,
// env vars and the keyring, then hands these values in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::model::{LatLng, ViewState};

/// View defaults and ring geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct MapConfig {
    /// Center shown until geolocation or a selection moves the view.
    pub default_center: LatLng,
    /// Zoom applied on startup and after every view change.
    pub default_zoom: u8,
    /// Ring radii in meters, drawn around the view center.
    pub ring_radii_m: Vec<f64>,
    /// Rings strictly larger than this radius use the `Large` tone.
    pub ring_threshold_m: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            default_center: LatLng::new(27.672_932_021_393_862, 85.311_840_126_897_32),
            default_zoom: 14,
            ring_radii_m: vec![1000.0, 2500.0],
            ring_threshold_m: 1000.0,
        }
    }
}

impl MapConfig {
    pub fn default_view(&self) -> ViewState {
        ViewState {
            center: self.default_center,
            zoom: self.default_zoom,
        }
    }
}

/// Search box timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Idle time after the last keystroke before a query is issued.
    pub debounce: Duration,
    /// Lifetime of cached suggestion lists.
    pub cache_ttl: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            cache_ttl: Duration::from_secs(86_400),
        }
    }
}

/// Where the user's position comes from.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum LocationSource {
    /// The Geolocation API (IP based).
    #[default]
    Google,
    /// A fixed coordinate from configuration.
    Fixed(LatLng),
}

/// Everything needed to build the Google-backed provider.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub api_key: SecretString,
    /// Base URL for `/maps/api/*`.
    pub maps_url: Url,
    /// Base URL for `/geolocation/v1/*`.
    pub geolocation_url: Url,
    pub timeout: Duration,
    /// Extra CA certificate to trust (TLS-intercepting proxies).
    pub ca_cert: Option<PathBuf>,
    /// Preferred result language for suggestions.
    pub language: Option<String>,
    pub location: LocationSource,
}
