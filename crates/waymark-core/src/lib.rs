// waymark-core: Map session state between waymark-api and the terminal UI.

pub mod cache;
pub mod camera;
pub mod config;
pub mod convert;
pub mod error;
pub mod model;
pub mod scene;
pub mod search;
pub mod sequence;
pub mod service;
pub mod session;

// ── Primary re-exports ──────────────────────────────────────────────
pub use camera::{Bounds, Camera};
pub use config::{LocationSource, MapConfig, SearchConfig, ServiceConfig};
pub use error::CoreError;
pub use model::{LatLng, Place, Route, Suggestion, ViewState};
pub use scene::{Marker, MarkerKind, Ring, RingTone, Scene};
pub use search::{AddressSearch, SuggestionQuery, SuggestionStatus};
pub use sequence::{RequestKind, RequestSequencer, Ticket};
pub use service::{GoogleMaps, MapsProvider, MapsService};
pub use session::{DirectionsRequest, MapHandles, MapSession, Readiness, RequestStatus, RouteOverlay};
