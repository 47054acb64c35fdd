//! Service bridge: runs maps lookups off the UI task.
//!
//! Each call spawns one task that carries a `MapsService` clone and the
//! request ticket, and posts a completion [`Action`] back through the
//! app's action channel. Staleness is decided by the receiver, never here.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use waymark_core::{DirectionsRequest, GoogleMaps, MapsService, SuggestionQuery, Ticket};

use crate::action::Action;

pub struct ServiceBridge {
    service: Option<MapsService<GoogleMaps>>,
    action_tx: UnboundedSender<Action>,
    debounce: Duration,
}

impl ServiceBridge {
    pub fn new(
        service: Option<MapsService<GoogleMaps>>,
        action_tx: UnboundedSender<Action>,
        debounce: Duration,
    ) -> Self {
        Self {
            service,
            action_tx,
            debounce,
        }
    }

    /// Post `DebounceElapsed(generation)` after the debounce interval.
    pub fn arm_debounce(&self, generation: u64) {
        let tx = self.action_tx.clone();
        let delay = self.debounce;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(Action::DebounceElapsed(generation));
        });
    }

    pub fn suggestions(&self, query: SuggestionQuery) {
        let Some(service) = self.service.clone() else {
            debug!("no provider, suggestion query skipped");
            return;
        };
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let result = service
                .suggestions(&query.input, &query.session_token)
                .await;
            let _ = tx.send(Action::SuggestionsLoaded(query.ticket, result));
        });
    }

    pub fn geocode(&self, ticket: Ticket, address: String) {
        let Some(service) = self.service.clone() else {
            debug!("no provider, geocode skipped");
            return;
        };
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let result = service.geocode(&address).await;
            let _ = tx.send(Action::Geocoded(ticket, result));
        });
    }

    pub fn locate(&self, ticket: Ticket) {
        let Some(service) = self.service.clone() else {
            debug!("no provider, geolocation skipped");
            return;
        };
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let result = service.locate().await;
            let _ = tx.send(Action::Located(ticket, result));
        });
    }

    pub fn directions(&self, request: DirectionsRequest) {
        let Some(service) = self.service.clone() else {
            debug!("no provider, directions skipped");
            return;
        };
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let result = service
                .directions(request.origin, request.destination)
                .await;
            let _ = tx.send(Action::DirectionsLoaded(request.ticket, result));
        });
    }
}
