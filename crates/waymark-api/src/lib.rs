// waymark-api: Async Rust client for the Google Maps Platform web services
// (Place Autocomplete, Geocoding, Directions, Geolocation)

pub mod client;
mod directions;
pub mod error;
mod geocoding;
mod geolocation;
pub mod models;
mod places;
pub mod polyline;
pub mod transport;

pub use client::{Endpoints, MapsClient};
pub use error::Error;
pub use models::{ApiStatus, LatLng, TravelMode};
pub use transport::{TlsMode, TransportConfig};
