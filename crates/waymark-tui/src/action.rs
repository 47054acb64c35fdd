//! UI actions. Every state change in the app flows through one of these,
//! including completions posted back by spawned lookup tasks.

use std::sync::Arc;

use waymark_core::{CoreError, LatLng, Place, Route, Suggestion, Ticket};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A transient toast shown in the bottom-right corner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Info,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Success,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Warning,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Error,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ──
    Quit,
    Tick,
    Render,

    // ── Overlays ──
    ToggleHelp,
    Notify(Notification),

    // ── Provider ──
    ProviderReady,
    ProviderUnavailable(String),

    // ── Search box ──
    /// The debounce timer armed for this input generation fired.
    DebounceElapsed(u64),
    SuggestionsLoaded(Ticket, Result<Arc<Vec<Suggestion>>, CoreError>),
    AddressSelected(String),

    // ── Map ──
    Geocoded(Ticket, Result<Option<Place>, CoreError>),
    Located(Ticket, Result<LatLng, CoreError>),
    RequestDirections,
    DirectionsLoaded(Ticket, Result<Option<Route>, CoreError>),
}
