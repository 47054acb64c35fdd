// ── Core error types ──
//
// User-facing errors from waymark-core. Consumers never see HTTP status
// codes, Maps `status` strings, or JSON parse failures directly; the
// `From<waymark_api::Error>` impl folds them into the variants below.

use thiserror::Error;
use waymark_api::ApiStatus;

/// Unified error type for the core crate.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach the maps service: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Maps request timed out")]
    Timeout,

    // ── Service rejections ───────────────────────────────────────────
    #[error("Request denied: {message}")]
    RequestDenied { message: String },

    #[error("Quota exceeded: {message}")]
    QuotaExceeded { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The operation needs state that is not there yet (provider not
    /// ready, user location unknown).
    #[error("Not ready: {reason}")]
    NotReady { reason: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn not_ready(reason: impl Into<String>) -> Self {
        Self::NotReady {
            reason: reason.into(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<waymark_api::Error> for CoreError {
    fn from(err: waymark_api::Error) -> Self {
        if err.is_denied() {
            return CoreError::RequestDenied {
                message: rejection_message(&err),
            };
        }
        if err.is_quota() {
            return CoreError::QuotaExceeded {
                message: rejection_message(&err),
            };
        }
        if err.is_not_found() {
            return CoreError::NotFound {
                message: rejection_message(&err),
            };
        }

        match err {
            waymark_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            waymark_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            waymark_api::Error::ClientBuild(message) => CoreError::Config { message },
            waymark_api::Error::Http { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            waymark_api::Error::Api {
                status:
                    ApiStatus::InvalidRequest
                    | ApiStatus::MaxRouteLengthExceeded
                    | ApiStatus::MaxWaypointsExceeded,
                message,
            } => CoreError::InvalidRequest { message },
            waymark_api::Error::Api { status, message } => CoreError::Api {
                message: format!("{status}: {message}"),
                status: None,
            },
            waymark_api::Error::Geolocation {
                code,
                reason,
                message,
            } => CoreError::Api {
                message: format!("{reason}: {message}"),
                status: Some(code),
            },
            waymark_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
            waymark_api::Error::Polyline { index } => {
                CoreError::Internal(format!("Malformed route geometry at byte {index}"))
            }
        }
    }
}

fn rejection_message(err: &waymark_api::Error) -> String {
    match err {
        waymark_api::Error::Api { message, .. }
        | waymark_api::Error::Http { message, .. }
        | waymark_api::Error::Geolocation { message, .. } => message.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: ApiStatus, message: &str) -> waymark_api::Error {
        waymark_api::Error::Api {
            status,
            message: message.into(),
        }
    }

    #[test]
    fn denied_key_maps_to_request_denied() {
        let err = CoreError::from(api(ApiStatus::RequestDenied, "key invalid"));
        assert_eq!(
            err,
            CoreError::RequestDenied {
                message: "key invalid".into()
            }
        );
    }

    #[test]
    fn over_query_limit_maps_to_quota() {
        let err = CoreError::from(api(ApiStatus::OverQueryLimit, "slow down"));
        assert!(matches!(err, CoreError::QuotaExceeded { .. }), "got {err:?}");
    }

    #[test]
    fn route_too_long_is_invalid_request() {
        let err = CoreError::from(api(ApiStatus::MaxRouteLengthExceeded, "too far"));
        assert_eq!(
            err,
            CoreError::InvalidRequest {
                message: "too far".into()
            }
        );
    }

    #[test]
    fn geolocation_not_found_maps_to_not_found() {
        let err = CoreError::from(waymark_api::Error::Geolocation {
            code: 404,
            reason: "notFound".into(),
            message: "Requested entity was not found.".into(),
        });
        assert!(matches!(err, CoreError::NotFound { .. }), "got {err:?}");
    }

    #[test]
    fn bad_payload_is_internal() {
        let err = CoreError::from(waymark_api::Error::Deserialization {
            message: "expected value".into(),
            body: "<html>".into(),
        });
        assert!(matches!(err, CoreError::Internal(_)), "got {err:?}");
    }
}
