//! Configuration for the waymark map viewer.
//!
//! TOML file + `WAYMARK_` environment overrides, API-key resolution
//! (flag, env, keyring, plaintext), and translation into the
//! `waymark_core` runtime config types.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use waymark_core::{LatLng, LocationSource, MapConfig, SearchConfig, ServiceConfig};

/// Environment variable checked right after the `--api-key` flag.
pub const API_KEY_ENV: &str = "GOOGLE_MAPS_API_KEY";

const KEYRING_SERVICE: &str = "waymark";
const KEYRING_ENTRY: &str = "api-key";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error(
        "no Google Maps API key configured (use --api-key, $GOOGLE_MAPS_API_KEY, the keyring, or api_key in the config file)"
    )]
    NoApiKey,

    #[error("keyring error: {0}")]
    Keyring(String),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// API key (plaintext; prefer the keyring or an env var).
    pub api_key: Option<String>,

    /// Name of an environment variable holding the API key.
    pub api_key_env: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Extra CA certificate to trust.
    pub ca_cert: Option<PathBuf>,

    /// Preferred language for suggestions (e.g. "en", "ne").
    pub language: Option<String>,

    #[serde(default)]
    pub map: MapSection,

    #[serde(default)]
    pub search: SearchSection,

    #[serde(default)]
    pub location: LocationSection,

    #[serde(default)]
    pub endpoints: EndpointsSection,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: None,
            timeout: default_timeout(),
            ca_cert: None,
            language: None,
            map: MapSection::default(),
            search: SearchSection::default(),
            location: LocationSection::default(),
            endpoints: EndpointsSection::default(),
        }
    }
}

fn default_timeout() -> u64 {
    10
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MapSection {
    /// Center shown before geolocation resolves.
    pub center: LatLng,
    pub zoom: u8,
    /// Ring radii in meters.
    pub ring_radii: Vec<f64>,
    /// Rings strictly larger than this are drawn in the "large" color.
    pub ring_threshold: f64,
}

impl Default for MapSection {
    fn default() -> Self {
        let map = MapConfig::default();
        Self {
            center: map.default_center,
            zoom: map.default_zoom,
            ring_radii: map.ring_radii_m,
            ring_threshold: map.ring_threshold_m,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SearchSection {
    pub debounce_ms: u64,
    pub cache_ttl_secs: u64,
}

impl Default for SearchSection {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            cache_ttl_secs: 86_400,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationMode {
    /// Google Geolocation API.
    #[default]
    Google,
    /// The `lat` / `lng` below.
    Fixed,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct LocationSection {
    #[serde(default)]
    pub source: LocationMode,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EndpointsSection {
    pub maps: String,
    pub geolocation: String,
}

impl Default for EndpointsSection {
    fn default() -> Self {
        Self {
            maps: "https://maps.googleapis.com".into(),
            geolocation: "https://www.googleapis.com".into(),
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("rs", "waymark", "waymark").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("waymark");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the default file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from a specific file + environment. A missing file yields defaults.
///
/// Nested keys use a double underscore: `WAYMARK_SEARCH__DEBOUNCE_MS=150`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("WAYMARK_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the API key. First match wins:
///
/// 1. `flag` (`--api-key`)
/// 2. `$GOOGLE_MAPS_API_KEY`
/// 3. the variable named by `api_key_env`
/// 4. system keyring (`waymark` / `api-key`)
/// 5. plaintext `api_key`
pub fn resolve_api_key(
    cfg: &Config,
    flag: Option<SecretString>,
) -> Result<SecretString, ConfigError> {
    resolve_api_key_with(
        cfg,
        flag,
        |name| std::env::var(name).ok(),
        || {
            keyring::Entry::new(KEYRING_SERVICE, KEYRING_ENTRY)
                .and_then(|entry| entry.get_password())
                .ok()
        },
    )
}

fn resolve_api_key_with(
    cfg: &Config,
    flag: Option<SecretString>,
    env: impl Fn(&str) -> Option<String>,
    keyring: impl FnOnce() -> Option<String>,
) -> Result<SecretString, ConfigError> {
    if let Some(key) = flag.filter(|k| !k.expose_secret().is_empty()) {
        return Ok(key);
    }

    let from_env = env(API_KEY_ENV).or_else(|| cfg.api_key_env.as_deref().and_then(&env));
    if let Some(key) = from_env.filter(|k| !k.is_empty()) {
        return Ok(SecretString::from(key));
    }

    if let Some(key) = keyring() {
        return Ok(SecretString::from(key));
    }

    cfg.api_key
        .clone()
        .filter(|k| !k.is_empty())
        .map(SecretString::from)
        .ok_or(ConfigError::NoApiKey)
}

/// Store the API key in the system keyring.
pub fn store_api_key(key: &SecretString) -> Result<(), ConfigError> {
    keyring::Entry::new(KEYRING_SERVICE, KEYRING_ENTRY)
        .and_then(|entry| entry.set_password(key.expose_secret()))
        .map_err(|e| ConfigError::Keyring(e.to_string()))
}

// ── Translation to core config ──────────────────────────────────────

pub fn to_map_config(cfg: &Config) -> Result<MapConfig, ConfigError> {
    let map = &cfg.map;
    validate_lat_lng("map.center", map.center.lat, map.center.lng)?;
    if map.ring_radii.iter().any(|r| !r.is_finite() || *r <= 0.0) {
        return Err(ConfigError::Validation {
            field: "map.ring_radii".into(),
            reason: "radii must be positive".into(),
        });
    }
    Ok(MapConfig {
        default_center: map.center,
        default_zoom: map.zoom,
        ring_radii_m: map.ring_radii.clone(),
        ring_threshold_m: map.ring_threshold,
    })
}

pub fn to_search_config(cfg: &Config) -> SearchConfig {
    SearchConfig {
        debounce: Duration::from_millis(cfg.search.debounce_ms),
        cache_ttl: Duration::from_secs(cfg.search.cache_ttl_secs),
    }
}

/// Build a `ServiceConfig` with an already-resolved key.
pub fn to_service_config(cfg: &Config, api_key: SecretString) -> Result<ServiceConfig, ConfigError> {
    let location = match cfg.location.source {
        LocationMode::Google => LocationSource::Google,
        LocationMode::Fixed => {
            let (Some(lat), Some(lng)) = (cfg.location.lat, cfg.location.lng) else {
                return Err(ConfigError::Validation {
                    field: "location".into(),
                    reason: "source = \"fixed\" requires lat and lng".into(),
                });
            };
            validate_lat_lng("location", lat, lng)?;
            LocationSource::Fixed(LatLng::new(lat, lng))
        }
    };

    Ok(ServiceConfig {
        api_key,
        maps_url: parse_url("endpoints.maps", &cfg.endpoints.maps)?,
        geolocation_url: parse_url("endpoints.geolocation", &cfg.endpoints.geolocation)?,
        timeout: Duration::from_secs(cfg.timeout),
        ca_cert: cfg.ca_cert.clone(),
        language: cfg.language.clone(),
        location,
    })
}

fn parse_url(field: &str, raw: &str) -> Result<Url, ConfigError> {
    raw.parse().map_err(|_| ConfigError::Validation {
        field: field.into(),
        reason: format!("invalid URL: {raw}"),
    })
}

fn validate_lat_lng(field: &str, lat: f64, lng: f64) -> Result<(), ConfigError> {
    if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng) {
        Ok(())
    } else {
        Err(ConfigError::Validation {
            field: field.into(),
            reason: format!("({lat}, {lng}) is not a valid coordinate"),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn secret(value: &str) -> SecretString {
        SecretString::from(value.to_owned())
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.timeout, 10);
        assert_eq!(cfg.map.zoom, 14);
        assert_eq!(cfg.search, SearchSection::default());
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
timeout = 4
language = "ne"

[map]
center = { lat = 28.2096, lng = 83.9856 }
zoom = 12
ring_radii = [500.0, 1500.0]
ring_threshold = 1000.0

[search]
debounce_ms = 150
cache_ttl_secs = 60

[location]
source = "fixed"
lat = 28.2
lng = 83.98
"#,
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.timeout, 4);
        assert_eq!(cfg.map.zoom, 12);
        assert_eq!(cfg.location.source, LocationMode::Fixed);

        let search = to_search_config(&cfg);
        assert_eq!(search.debounce, Duration::from_millis(150));
        assert_eq!(search.cache_ttl, Duration::from_secs(60));

        let service = to_service_config(&cfg, secret("k")).unwrap();
        assert_eq!(service.location, LocationSource::Fixed(LatLng::new(28.2, 83.98)));
        assert_eq!(service.language.as_deref(), Some("ne"));
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let cfg = Config {
            api_key_env: Some("MY_MAPS_KEY".into()),
            search: SearchSection {
                debounce_ms: 250,
                cache_ttl_secs: 3600,
            },
            ..Config::default()
        };

        save_config_to(&cfg, &path).unwrap();
        assert_eq!(load_config_from(&path).unwrap(), cfg);
    }

    #[test]
    fn fixed_location_requires_coordinates() {
        let cfg = Config {
            location: LocationSection {
                source: LocationMode::Fixed,
                lat: Some(27.7),
                lng: None,
            },
            ..Config::default()
        };
        let err = to_service_config(&cfg, secret("k")).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }), "got {err:?}");
    }

    #[test]
    fn bad_endpoint_is_rejected() {
        let cfg = Config {
            endpoints: EndpointsSection {
                maps: "not a url".into(),
                ..EndpointsSection::default()
            },
            ..Config::default()
        };
        let err = to_service_config(&cfg, secret("k")).unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation { ref field, .. } if field == "endpoints.maps"),
            "got {err:?}"
        );
    }

    #[test]
    fn out_of_range_center_is_rejected() {
        let mut cfg = Config::default();
        cfg.map.center = LatLng::new(95.0, 0.0);
        assert!(to_map_config(&cfg).is_err());
    }

    #[test]
    fn flag_beats_everything() {
        let cfg = Config {
            api_key: Some("plain".into()),
            ..Config::default()
        };
        let key = resolve_api_key_with(
            &cfg,
            Some(secret("flag")),
            |_| Some("env".into()),
            || Some("keyring".into()),
        )
        .unwrap();
        assert_eq!(key.expose_secret(), "flag");
    }

    #[test]
    fn standard_env_var_beats_custom_env_var() {
        let cfg = Config {
            api_key_env: Some("CUSTOM".into()),
            ..Config::default()
        };
        let env = |name: &str| match name {
            API_KEY_ENV => Some("standard".to_owned()),
            "CUSTOM" => Some("custom".to_owned()),
            _ => None,
        };
        let key = resolve_api_key_with(&cfg, None, env, || None).unwrap();
        assert_eq!(key.expose_secret(), "standard");
    }

    #[test]
    fn custom_env_var_then_keyring_then_plaintext() {
        let cfg = Config {
            api_key: Some("plain".into()),
            api_key_env: Some("CUSTOM".into()),
            ..Config::default()
        };
        let custom = |name: &str| (name == "CUSTOM").then(|| "custom".to_owned());
        let key = resolve_api_key_with(&cfg, None, custom, || Some("keyring".into())).unwrap();
        assert_eq!(key.expose_secret(), "custom");

        let key = resolve_api_key_with(&cfg, None, no_env, || Some("keyring".into())).unwrap();
        assert_eq!(key.expose_secret(), "keyring");

        let key = resolve_api_key_with(&cfg, None, no_env, || None).unwrap();
        assert_eq!(key.expose_secret(), "plain");
    }

    #[test]
    fn no_key_anywhere_is_an_error() {
        let err = resolve_api_key_with(&Config::default(), None, no_env, || None).unwrap_err();
        assert!(matches!(err, ConfigError::NoApiKey));
    }
}
