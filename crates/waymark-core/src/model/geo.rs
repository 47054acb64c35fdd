use serde::{Deserialize, Serialize};

/// Mean Earth radius used for ring geometry, in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// A WGS84 coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// The point reached by travelling `distance_m` meters from `self`
    /// along the initial bearing `bearing_deg` (clockwise from north) on a
    /// spherical Earth.
    pub fn destination(self, distance_m: f64, bearing_deg: f64) -> Self {
        let angular = distance_m / EARTH_RADIUS_M;
        let bearing = bearing_deg.to_radians();
        let lat1 = self.lat.to_radians();
        let lng1 = self.lng.to_radians();

        let lat2 = (lat1.sin() * angular.cos() + lat1.cos() * angular.sin() * bearing.cos()).asin();
        let lng2 = lng1
            + (bearing.sin() * angular.sin() * lat1.cos())
                .atan2(angular.cos() - lat1.sin() * lat2.sin());

        Self::new(lat2.to_degrees(), normalize_lng(lng2.to_degrees()))
    }

    /// Great-circle distance to `other`, in meters (haversine).
    pub fn distance_to(self, other: Self) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lng = (other.lng - self.lng).to_radians();
        let a = (d_lat / 2.0).sin().powi(2)
            + self.lat.to_radians().cos() * other.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * a.sqrt().asin()
    }
}

impl std::fmt::Display for LatLng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.5}, {:.5}", self.lat, self.lng)
    }
}

fn normalize_lng(lng: f64) -> f64 {
    (lng + 540.0).rem_euclid(360.0) - 180.0
}

/// The map's logical center and zoom.
///
/// Only geolocation and address selection move it; panning the canvas
/// does not.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub center: LatLng,
    pub zoom: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destination_due_north_moves_latitude_only() {
        let origin = LatLng::new(27.0, 85.0);
        let moved = origin.destination(1000.0, 0.0);
        assert!((moved.lng - 85.0).abs() < 1e-9);
        // One kilometer is roughly 0.009 degrees of latitude.
        assert!((moved.lat - 27.008_993).abs() < 1e-5, "lat {}", moved.lat);
    }

    #[test]
    fn distance_round_trips_through_destination() {
        let origin = LatLng::new(27.672_932, 85.311_840);
        for bearing in [0.0, 45.0, 90.0, 200.0, 315.0] {
            let d = origin.distance_to(origin.destination(2500.0, bearing));
            assert!((d - 2500.0).abs() < 0.01, "bearing {bearing}: {d}");
        }
    }

    #[test]
    fn longitude_wraps_across_antimeridian() {
        let moved = LatLng::new(0.0, 179.99).destination(5000.0, 90.0);
        assert!(moved.lng < -179.0, "lng {}", moved.lng);
    }
}
