// ── Canvas camera ──
//
// Local pan/zoom on top of the session's ViewState. The camera snaps back
// to the view whenever the session reports a new view revision, so panning
// is a temporary look-around and never moves the directions destination.

use crate::model::{LatLng, ViewState};

pub const MIN_ZOOM: u8 = 2;
pub const MAX_ZOOM: u8 = 20;

/// Width of the visible area in 256px web-map tiles.
const VIEWPORT_TILES: f64 = 4.0;
/// Mercator latitude limit.
const MAX_LAT: f64 = 85.0;

/// Geographic rectangle visible on the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub west: f64,
    pub east: f64,
    pub south: f64,
    pub north: f64,
}

impl Bounds {
    pub fn contains(&self, p: LatLng) -> bool {
        (self.west..=self.east).contains(&p.lng) && (self.south..=self.north).contains(&p.lat)
    }

    /// Map a point to fractional grid coordinates, origin top-left.
    pub fn project(&self, p: LatLng, width: f64, height: f64) -> (f64, f64) {
        let x = (p.lng - self.west) / (self.east - self.west) * width;
        let y = (self.north - p.lat) / (self.north - self.south) * height;
        (x, y)
    }

    /// Inverse of [`project`](Self::project).
    pub fn unproject(&self, x: f64, y: f64, width: f64, height: f64) -> LatLng {
        LatLng::new(
            self.north - y / height * (self.north - self.south),
            self.west + x / width * (self.east - self.west),
        )
    }
}

#[derive(Debug, Clone)]
pub struct Camera {
    center: LatLng,
    zoom: u8,
    revision: Option<u64>,
}

impl Camera {
    pub fn new(view: ViewState) -> Self {
        Self {
            center: view.center,
            zoom: view.zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            revision: None,
        }
    }

    /// Snap to `view` if `revision` differs from the last one seen.
    /// Returns whether the camera moved.
    pub fn follow(&mut self, view: &ViewState, revision: u64) -> bool {
        if self.revision == Some(revision) {
            return false;
        }
        self.revision = Some(revision);
        self.center = view.center;
        self.zoom = view.zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        true
    }

    pub fn center(&self) -> LatLng {
        self.center
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn zoom_in(&mut self) {
        self.zoom = self.zoom.saturating_add(1).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = self.zoom.saturating_sub(1).max(MIN_ZOOM);
    }

    /// Shift by fractions of the visible width (`dx`, east positive) and
    /// of the equivalent ground distance north (`dy`).
    pub fn pan(&mut self, dx: f64, dy: f64) {
        let span = self.lng_span();
        let lat = self.center.lat + dy * span * self.center.lat.to_radians().cos();
        let lng = self.center.lng + dx * span;
        self.center = LatLng::new(
            lat.clamp(-MAX_LAT, MAX_LAT),
            (lng + 540.0).rem_euclid(360.0) - 180.0,
        );
    }

    /// Degrees of longitude across the canvas.
    pub fn lng_span(&self) -> f64 {
        360.0 * VIEWPORT_TILES / 2f64.powi(i32::from(self.zoom))
    }

    /// Visible area for a canvas whose physical height/width ratio is
    /// `aspect`. Latitude span is corrected so rings stay round.
    pub fn bounds(&self, aspect: f64) -> Bounds {
        let half_lng = self.lng_span() / 2.0;
        let half_lat = half_lng * aspect * self.center.lat.to_radians().cos().max(0.01);
        Bounds {
            west: self.center.lng - half_lng,
            east: self.center.lng + half_lng,
            south: self.center.lat - half_lat,
            north: self.center.lat + half_lat,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(lat: f64, lng: f64, zoom: u8) -> ViewState {
        ViewState {
            center: LatLng::new(lat, lng),
            zoom,
        }
    }

    #[test]
    fn follow_resets_only_on_new_revision() {
        let start = view(27.67, 85.31, 14);
        let mut camera = Camera::new(start);
        assert!(camera.follow(&start, 1));

        camera.pan(0.5, 0.0);
        camera.zoom_out();
        assert!(!camera.follow(&start, 1));
        assert_eq!(camera.zoom(), 13);

        assert!(camera.follow(&start, 2));
        assert_eq!(camera.center(), start.center);
        assert_eq!(camera.zoom(), 14);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut camera = Camera::new(view(0.0, 0.0, MAX_ZOOM));
        camera.zoom_in();
        assert_eq!(camera.zoom(), MAX_ZOOM);

        let mut camera = Camera::new(view(0.0, 0.0, MIN_ZOOM));
        camera.zoom_out();
        assert_eq!(camera.zoom(), MIN_ZOOM);
    }

    #[test]
    fn each_zoom_level_halves_the_span() {
        let mut camera = Camera::new(view(0.0, 0.0, 10));
        let wide = camera.lng_span();
        camera.zoom_in();
        assert!((wide / camera.lng_span() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn project_and_unproject_agree() {
        let camera = Camera::new(view(27.67, 85.31, 14));
        let bounds = camera.bounds(0.5);
        let p = LatLng::new(27.68, 85.30);
        assert!(bounds.contains(p));

        let (x, y) = bounds.project(p, 120.0, 40.0);
        let back = bounds.unproject(x, y, 120.0, 40.0);
        assert!((back.lat - p.lat).abs() < 1e-9);
        assert!((back.lng - p.lng).abs() < 1e-9);
    }

    #[test]
    fn center_projects_to_middle() {
        let camera = Camera::new(view(-33.86, 151.2, 12));
        let bounds = camera.bounds(0.6);
        let (x, y) = bounds.project(camera.center(), 100.0, 30.0);
        assert!((x - 50.0).abs() < 1e-9);
        assert!((y - 15.0).abs() < 1e-9);
    }
}
