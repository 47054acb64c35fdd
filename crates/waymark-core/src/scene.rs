// ── Scene ──
//
// What the canvas draws, derived from session state. Rendering code never
// reads session fields directly; it draws a `Scene`.

use crate::model::{LatLng, Route};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    /// The user's geolocated position.
    Person,
    /// The selected destination (the view center).
    Pin,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    pub kind: MarkerKind,
    pub position: LatLng,
}

/// Ring coloring class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingTone {
    Small,
    Large,
}

impl RingTone {
    /// `Large` only when `radius_m` is strictly greater than `threshold_m`.
    pub fn for_radius(radius_m: f64, threshold_m: f64) -> Self {
        if radius_m > threshold_m {
            Self::Large
        } else {
            Self::Small
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ring {
    pub center: LatLng,
    pub radius_m: f64,
    pub tone: RingTone,
}

impl Ring {
    /// `segments` points evenly spaced around the ring, closing back on
    /// the first.
    pub fn outline(&self, segments: usize) -> Vec<LatLng> {
        let segments = segments.max(3);
        #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
        let step = 360.0 / segments as f64;
        (0..=segments)
            .map(|i| {
                #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
                let bearing = step * i as f64;
                self.center.destination(self.radius_m, bearing)
            })
            .collect()
    }
}

/// Everything the map canvas draws for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene<'a> {
    pub markers: Vec<Marker>,
    pub rings: Vec<Ring>,
    pub route: Option<&'a Route>,
}

impl Scene<'_> {
    pub fn marker(&self, kind: MarkerKind) -> Option<&Marker> {
        self.markers.iter().find(|m| m.kind == kind)
    }
}
