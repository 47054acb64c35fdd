#![allow(clippy::unwrap_used)]
// Integration tests for the Google-backed `MapsService` using wiremock.

use std::time::Duration;

use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use waymark_core::{
    CoreError, GoogleMaps, LatLng, LocationSource, MapsService, SearchConfig, ServiceConfig,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup(location: LocationSource) -> (MockServer, MapsService<GoogleMaps>) {
    let server = MockServer::start().await;
    let base = Url::parse(&server.uri()).unwrap();
    let config = ServiceConfig {
        api_key: "test-key".to_owned().into(),
        maps_url: base.clone(),
        geolocation_url: base,
        timeout: Duration::from_secs(5),
        ca_cert: None,
        language: None,
        location,
    };
    let provider = GoogleMaps::new(&config).unwrap();
    (server, MapsService::new(provider, &SearchConfig::default()))
}

// ── Suggestions ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_suggestions_are_cached_per_input() {
    let (server, service) = setup(LocationSource::Google).await;

    Mock::given(method("GET"))
        .and(path("/maps/api/place/autocomplete/json"))
        .and(query_param("input", "bhak"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "predictions": [{
                "place_id": "ChIJb",
                "description": "Bhaktapur, Nepal",
                "structured_formatting": {
                    "main_text": "Bhaktapur",
                    "secondary_text": "Nepal"
                }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let first = service.suggestions("bhak", "s1").await.unwrap();
    let second = service.suggestions("bhak", "s1").await.unwrap();

    assert_eq!(first[0].primary_text, "Bhaktapur");
    assert_eq!(first[0].secondary_text, "Nepal");
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_denied_key_surfaces_as_core_error() {
    let (server, service) = setup(LocationSource::Google).await;

    Mock::given(method("GET"))
        .and(path("/maps/api/place/autocomplete/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "REQUEST_DENIED",
            "error_message": "API keys with referer restrictions cannot be used with this API."
        })))
        .mount(&server)
        .await;

    let err = service.suggestions("x", "s1").await.unwrap_err();
    assert!(
        matches!(err, CoreError::RequestDenied { .. }),
        "expected RequestDenied, got: {err:?}"
    );
    assert!(service.cache().is_empty());
}

// ── Geocoding ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_geocode_takes_first_result() {
    let (server, service) = setup(LocationSource::Google).await;

    Mock::given(method("GET"))
        .and(path("/maps/api/geocode/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "results": [
                {
                    "formatted_address": "Durbar Marg, Kathmandu",
                    "geometry": { "location": { "lat": 27.712, "lng": 85.318 } }
                },
                {
                    "formatted_address": "Durbar Square, Bhaktapur",
                    "geometry": { "location": { "lat": 27.672, "lng": 85.428 } }
                }
            ]
        })))
        .mount(&server)
        .await;

    let place = service.geocode("Durbar").await.unwrap().unwrap();
    assert_eq!(place.label, "Durbar Marg, Kathmandu");
    assert_eq!(place.location, LatLng::new(27.712, 85.318));
}

#[tokio::test]
async fn test_geocode_zero_results_is_none() {
    let (server, service) = setup(LocationSource::Google).await;

    Mock::given(method("GET"))
        .and(path("/maps/api/geocode/json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "status": "ZERO_RESULTS", "results": [] })),
        )
        .mount(&server)
        .await;

    assert!(service.geocode("qwertyuiop").await.unwrap().is_none());
}

// ── Directions ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_directions_request_driving_between_endpoints() {
    let (server, service) = setup(LocationSource::Google).await;

    Mock::given(method("GET"))
        .and(path("/maps/api/directions/json"))
        .and(query_param("origin", "27.7172,85.324"))
        .and(query_param("destination", "27.6727,85.3253"))
        .and(query_param("mode", "driving"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "routes": [{
                "summary": "Kupondole Rd",
                "overview_polyline": { "points": "_p~iF~ps|U_ulLnnqC_mqNvxq`@" },
                "legs": [{
                    "distance": { "text": "5.4 km", "value": 5400 },
                    "duration": { "text": "18 mins", "value": 1080 },
                    "start_location": { "lat": 27.7172, "lng": 85.324 },
                    "end_location": { "lat": 27.6727, "lng": 85.3253 }
                }]
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let origin = LatLng::new(27.7172, 85.324);
    let destination = LatLng::new(27.6727, 85.3253);
    let route = service.directions(origin, destination).await.unwrap().unwrap();

    assert!(route.connects(origin, destination));
    assert_eq!(route.summary, "Kupondole Rd");
    assert_eq!(route.distance_text, "5.4 km");
    assert_eq!(route.duration, Duration::from_secs(1080));
    assert_eq!(route.path.len(), 3);
}

// ── Location ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_locate_via_geolocation_api() {
    let (server, service) = setup(LocationSource::Google).await;

    Mock::given(method("POST"))
        .and(path("/geolocation/v1/geolocate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "location": { "lat": 27.7, "lng": 85.33 },
            "accuracy": 2200.0
        })))
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(service.locate().await.unwrap(), LatLng::new(27.7, 85.33));
}

#[tokio::test]
async fn test_fixed_location_makes_no_request() {
    let fixed = LatLng::new(28.2096, 83.9856);
    let (server, service) = setup(LocationSource::Fixed(fixed)).await;

    Mock::given(method("POST"))
        .and(path("/geolocation/v1/geolocate"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    assert_eq!(service.locate().await.unwrap(), fixed);
}
