use thiserror::Error;

use crate::models::ApiStatus;

/// Top-level error type for the `waymark-api` crate.
///
/// Covers every failure mode across the four web services: transport,
/// HTTP-level rejections, the `status` field of the Maps JSON envelope,
/// the Geolocation API's error body, and payload decoding.
/// `waymark-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The HTTP client could not be constructed (bad CA file, TLS backend).
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    /// Non-success HTTP status without a recognizable error body.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    // ── Service envelopes ───────────────────────────────────────────
    /// The Maps web service answered with a non-data `status`
    /// (anything other than `OK` / `ZERO_RESULTS`).
    #[error("Maps API returned {status}: {message}")]
    Api { status: ApiStatus, message: String },

    /// Structured error from the Geolocation API.
    #[error("Geolocation failed (HTTP {code}, {reason}): {message}")]
    Geolocation {
        code: u16,
        reason: String,
        message: String,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// An encoded route polyline was truncated or malformed.
    #[error("Malformed encoded polyline at byte {index}")]
    Polyline { index: usize },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Http { status, .. } => *status >= 500,
            Self::Api { status, .. } => matches!(status, ApiStatus::UnknownError),
            _ => false,
        }
    }

    /// Returns `true` if the key has exhausted its quota or is rate limited.
    pub fn is_quota(&self) -> bool {
        match self {
            Self::Api { status, .. } => {
                matches!(status, ApiStatus::OverQueryLimit | ApiStatus::OverDailyLimit)
            }
            Self::Http { status: 429, .. } | Self::Geolocation { code: 429, .. } => true,
            Self::Geolocation { reason, .. } => {
                reason == "dailyLimitExceeded" || reason == "userRateLimitExceeded"
            }
            _ => false,
        }
    }

    /// Returns `true` if the request was refused (bad or restricted key).
    pub fn is_denied(&self) -> bool {
        match self {
            Self::Api { status, .. } => matches!(status, ApiStatus::RequestDenied),
            Self::Http { status, .. } => *status == 401 || *status == 403,
            Self::Geolocation { code, reason, .. } => {
                *code == 403 || reason == "keyInvalid" || reason == "accessNotConfigured"
            }
            _ => false,
        }
    }

    /// Returns `true` if the service had nothing to return for the query.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Api { status, .. } => matches!(status, ApiStatus::NotFound),
            Self::Http { status: 404, .. } | Self::Geolocation { code: 404, .. } => true,
            _ => false,
        }
    }
}
