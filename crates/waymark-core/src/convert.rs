// ── API-to-domain type conversions ──
//
// Bridges raw `waymark_api` response types into `waymark_core::model`
// domain types. Provider text (descriptions, summaries, leg distance and
// duration strings) is carried through untouched.

use std::time::Duration;

use waymark_api::models::{DirectionsRoute, GeocodeResult, Prediction};

use crate::error::CoreError;
use crate::model::{LatLng, Place, Route, Suggestion};

// ── Coordinates ────────────────────────────────────────────────────

impl From<waymark_api::LatLng> for LatLng {
    fn from(p: waymark_api::LatLng) -> Self {
        LatLng::new(p.lat, p.lng)
    }
}

impl From<LatLng> for waymark_api::LatLng {
    fn from(p: LatLng) -> Self {
        waymark_api::LatLng::new(p.lat, p.lng)
    }
}

// ── Places ─────────────────────────────────────────────────────────

impl From<Prediction> for Suggestion {
    fn from(p: Prediction) -> Self {
        let fmt = p.structured_formatting;
        // Some predictions arrive without structured text.
        let primary_text = if fmt.main_text.is_empty() {
            p.description.clone()
        } else {
            fmt.main_text
        };
        Suggestion {
            id: p.place_id,
            primary_text,
            secondary_text: fmt.secondary_text,
            description: p.description,
        }
    }
}

impl From<GeocodeResult> for Place {
    fn from(r: GeocodeResult) -> Self {
        Place {
            label: r.formatted_address,
            location: r.geometry.location.into(),
        }
    }
}

// ── Directions ─────────────────────────────────────────────────────

/// Build a domain [`Route`] for the requested endpoints, decoding the
/// overview polyline.
pub(crate) fn route_from_api(
    route: DirectionsRoute,
    origin: LatLng,
    destination: LatLng,
) -> Result<Route, CoreError> {
    let path = route
        .path()?
        .into_iter()
        .map(LatLng::from)
        .collect::<Vec<_>>();
    let distance_m = route.distance_meters();
    let duration = Duration::from_secs(route.duration_seconds());

    let (distance_text, duration_text) = match route.legs.as_slice() {
        [leg] => (leg.distance.text.clone(), leg.duration.text.clone()),
        legs => (
            join_texts(legs.iter().map(|l| l.distance.text.as_str())),
            join_texts(legs.iter().map(|l| l.duration.text.as_str())),
        ),
    };

    Ok(Route {
        origin,
        destination,
        path,
        summary: route.summary,
        distance_text,
        duration_text,
        distance_m,
        duration,
        warnings: route.warnings,
        copyrights: route.copyrights,
    })
}

fn join_texts<'a>(texts: impl Iterator<Item = &'a str>) -> String {
    texts.collect::<Vec<_>>().join(" + ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use waymark_api::models::StructuredFormatting;

    #[test]
    fn prediction_without_main_text_uses_description() {
        let suggestion = Suggestion::from(Prediction {
            place_id: "p1".into(),
            description: "Boudha, Kathmandu".into(),
            structured_formatting: StructuredFormatting::default(),
        });
        assert_eq!(suggestion.primary_text, "Boudha, Kathmandu");
        assert_eq!(suggestion.description, "Boudha, Kathmandu");
    }

    #[test]
    fn route_keeps_provider_text_and_endpoints() {
        let api_route: DirectionsRoute = serde_json::from_value(serde_json::json!({
            "summary": "Araniko Hwy",
            "overview_polyline": { "points": "_p~iF~ps|U_ulLnnqC" },
            "legs": [{
                "distance": { "text": "12.3 km", "value": 12300 },
                "duration": { "text": "31 mins", "value": 1860 },
                "start_location": { "lat": 1.0, "lng": 2.0 },
                "end_location": { "lat": 3.0, "lng": 4.0 }
            }]
        }))
        .unwrap();

        let origin = LatLng::new(1.0, 2.0);
        let destination = LatLng::new(3.0, 4.0);
        let route = route_from_api(api_route, origin, destination).unwrap();

        assert!(route.connects(origin, destination));
        assert_eq!(route.summary, "Araniko Hwy");
        assert_eq!(route.distance_text, "12.3 km");
        assert_eq!(route.duration_text, "31 mins");
        assert_eq!(route.duration, Duration::from_secs(1860));
        assert_eq!(route.path.len(), 2);
    }

    #[test]
    fn broken_polyline_is_internal_error() {
        let api_route: DirectionsRoute = serde_json::from_value(serde_json::json!({
            "overview_polyline": { "points": "_p~" }
        }))
        .unwrap();
        let err = route_from_api(api_route, LatLng::new(0.0, 0.0), LatLng::new(1.0, 1.0))
            .unwrap_err();
        assert!(matches!(err, CoreError::Internal(_)), "got {err:?}");
    }
}
