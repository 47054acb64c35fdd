// ── Map session ──
//
// State of one mounted map screen, driven by asynchronous completions:
//
//   Initializing ──ready──▶ MapReady ──▶ (one geolocation request)
//                              │
//                              ├── address selected ──▶ geocode ──▶ view moves
//                              └── directions ──▶ route overlay
//
// Every outgoing request carries a `Ticket`; completions that are no
// longer current are dropped. Nothing here performs I/O.

use tracing::{debug, info, warn};

use crate::config::MapConfig;
use crate::error::CoreError;
use crate::model::{LatLng, Place, Route, ViewState};
use crate::scene::{Marker, MarkerKind, Ring, RingTone, Scene};
use crate::sequence::{RequestKind, RequestSequencer, Ticket};

/// Progress of one kind of external request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestStatus {
    #[default]
    Idle,
    Pending,
    Ready,
    Failed(String),
}

impl RequestStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    fn failed(err: &CoreError) -> Self {
        Self::Failed(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    /// Provider not usable yet. `reason` explains why, once known.
    Initializing { reason: Option<String> },
    Ready,
}

/// The route currently drawn on the map.
#[derive(Debug, Default)]
pub struct RouteOverlay {
    route: Option<Route>,
}

impl RouteOverlay {
    pub fn route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    fn show(&mut self, route: Route) {
        self.route = Some(route);
    }
}

/// Resources bound to a mounted map. Acquired once on readiness and
/// released on teardown.
#[derive(Debug, Default)]
pub struct MapHandles {
    overlay: RouteOverlay,
    directions_issued: u64,
}

impl MapHandles {
    pub fn overlay(&self) -> &RouteOverlay {
        &self.overlay
    }

    /// Directions requests issued through this handle.
    pub fn directions_issued(&self) -> u64 {
        self.directions_issued
    }
}

/// A directions lookup the caller should run now.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionsRequest {
    pub ticket: Ticket,
    pub origin: LatLng,
    pub destination: LatLng,
}

#[derive(Debug)]
pub struct MapSession {
    config: MapConfig,
    readiness: Readiness,
    view: ViewState,
    /// Bumped whenever `view` is set by geolocation or geocoding.
    view_revision: u64,
    user_location: Option<LatLng>,
    selected_address: Option<String>,
    handles: Option<MapHandles>,
    location_requested: bool,
    location_status: RequestStatus,
    address_status: RequestStatus,
    directions_status: RequestStatus,
    sequencer: RequestSequencer,
}

impl MapSession {
    pub fn new(config: MapConfig) -> Self {
        let view = config.default_view();
        Self {
            config,
            readiness: Readiness::Initializing { reason: None },
            view,
            view_revision: 0,
            user_location: None,
            selected_address: None,
            handles: None,
            location_requested: false,
            location_status: RequestStatus::Idle,
            address_status: RequestStatus::Idle,
            directions_status: RequestStatus::Idle,
            sequencer: RequestSequencer::new(),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn readiness(&self) -> &Readiness {
        &self.readiness
    }

    pub fn is_ready(&self) -> bool {
        self.readiness == Readiness::Ready
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn view_revision(&self) -> u64 {
        self.view_revision
    }

    pub fn user_location(&self) -> Option<LatLng> {
        self.user_location
    }

    pub fn selected_address(&self) -> Option<&str> {
        self.selected_address.as_deref()
    }

    pub fn handles(&self) -> Option<&MapHandles> {
        self.handles.as_ref()
    }

    pub fn route(&self) -> Option<&Route> {
        self.handles.as_ref()?.overlay.route()
    }

    pub fn location_status(&self) -> &RequestStatus {
        &self.location_status
    }

    pub fn address_status(&self) -> &RequestStatus {
        &self.address_status
    }

    pub fn directions_status(&self) -> &RequestStatus {
        &self.directions_status
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    // ── Readiness ────────────────────────────────────────────────────

    /// The provider cannot be built; stay in Initializing with a reason.
    pub fn mark_unavailable(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        warn!(%reason, "maps provider unavailable");
        self.readiness = Readiness::Initializing {
            reason: Some(reason),
        };
    }

    /// The provider is ready. Acquires the map handles if not held and,
    /// the first time only, returns the geolocation ticket to run.
    pub fn on_ready(&mut self) -> Option<Ticket> {
        self.readiness = Readiness::Ready;

        if self.handles.is_none() {
            info!("map ready, acquiring handles");
            self.handles = Some(MapHandles::default());
        }

        if self.location_requested {
            return None;
        }
        self.location_requested = true;
        self.location_status = RequestStatus::Pending;
        Some(self.sequencer.issue(RequestKind::Location))
    }

    /// Release the map handles. Outstanding completions become stale.
    /// Returns whether anything was held.
    pub fn teardown(&mut self) -> bool {
        for kind in [
            RequestKind::Geocode,
            RequestKind::Location,
            RequestKind::Directions,
        ] {
            self.sequencer.invalidate(kind);
        }
        let released = self.handles.take().is_some();
        if released {
            info!("map handles released");
        }
        released
    }

    // ── Geolocation ──────────────────────────────────────────────────

    pub fn apply_location(&mut self, ticket: Ticket, result: Result<LatLng, CoreError>) -> bool {
        if !self.sequencer.is_current(ticket) {
            debug!(seq = ticket.seq(), "dropping stale location");
            return false;
        }
        match result {
            Ok(position) => {
                self.user_location = Some(position);
                self.location_status = RequestStatus::Ready;
                self.set_view(position);
            }
            Err(e) => {
                warn!(error = %e, "user location unavailable");
                self.location_status = RequestStatus::failed(&e);
            }
        }
        true
    }

    // ── Address selection ────────────────────────────────────────────

    /// A suggestion was chosen. Returns the geocode ticket to run.
    pub fn select_address(&mut self, description: &str) -> Ticket {
        self.selected_address = Some(description.to_owned());
        self.address_status = RequestStatus::Pending;
        self.sequencer.issue(RequestKind::Geocode)
    }

    /// Apply a geocoding result. The view moves only on a match; otherwise
    /// the previous center is kept.
    pub fn apply_geocode(
        &mut self,
        ticket: Ticket,
        result: Result<Option<Place>, CoreError>,
    ) -> bool {
        if !self.sequencer.is_current(ticket) {
            debug!(seq = ticket.seq(), "dropping stale geocode");
            return false;
        }
        match result {
            Ok(Some(place)) => {
                self.address_status = RequestStatus::Ready;
                self.set_view(place.location);
            }
            Ok(None) => {
                self.address_status = RequestStatus::Failed("not found".into());
            }
            Err(e) => {
                self.address_status = RequestStatus::failed(&e);
            }
        }
        true
    }

    // ── Directions ───────────────────────────────────────────────────

    /// Start a driving-directions lookup from the user's location to the
    /// view center. Fails without issuing anything when the map is not
    /// mounted or the user location is unknown.
    pub fn request_directions(&mut self) -> Result<DirectionsRequest, CoreError> {
        let Some(handles) = self.handles.as_mut() else {
            debug!("directions requested before map ready");
            return Err(CoreError::not_ready("map is still loading"));
        };
        let Some(origin) = self.user_location else {
            warn!("directions requested without a user location");
            return Err(CoreError::not_ready("your location is unknown"));
        };

        handles.directions_issued += 1;
        self.directions_status = RequestStatus::Pending;
        let ticket = self.sequencer.issue(RequestKind::Directions);
        Ok(DirectionsRequest {
            ticket,
            origin,
            destination: self.view.center,
        })
    }

    /// Apply a directions result. On any failure the displayed route is
    /// left as it was.
    pub fn apply_directions(
        &mut self,
        ticket: Ticket,
        result: Result<Option<Route>, CoreError>,
    ) -> bool {
        if !self.sequencer.is_current(ticket) {
            debug!(seq = ticket.seq(), "dropping stale directions");
            return false;
        }
        let Some(handles) = self.handles.as_mut() else {
            return false;
        };
        match result {
            Ok(Some(route)) => {
                handles.overlay.show(route);
                self.directions_status = RequestStatus::Ready;
            }
            Ok(None) => {
                self.directions_status = RequestStatus::Failed("no driving route found".into());
            }
            Err(e) => {
                self.directions_status = RequestStatus::failed(&e);
            }
        }
        true
    }

    // ── Rendering ────────────────────────────────────────────────────

    /// Markers, rings and route for the current state.
    pub fn scene(&self) -> Scene<'_> {
        let center = self.view.center;
        let mut markers = Vec::with_capacity(2);
        if let Some(position) = self.user_location {
            markers.push(Marker {
                kind: MarkerKind::Person,
                position,
            });
        }
        markers.push(Marker {
            kind: MarkerKind::Pin,
            position: center,
        });

        let rings = self
            .config
            .ring_radii_m
            .iter()
            .map(|&radius_m| Ring {
                center,
                radius_m,
                tone: RingTone::for_radius(radius_m, self.config.ring_threshold_m),
            })
            .collect();

        Scene {
            markers,
            rings,
            route: self.route(),
        }
    }

    fn set_view(&mut self, center: LatLng) {
        self.view = ViewState {
            center,
            zoom: self.config.default_zoom,
        };
        self.view_revision += 1;
    }
}
