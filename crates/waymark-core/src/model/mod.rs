// ── Domain model ──
//
// Transient map state. Nothing here is persisted; every value is rebuilt
// from service responses for the lifetime of one screen.

pub mod geo;
pub mod place;
pub mod route;

pub use geo::{LatLng, ViewState};
pub use place::{Place, Suggestion};
pub use route::Route;
