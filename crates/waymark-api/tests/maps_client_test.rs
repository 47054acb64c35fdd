#![allow(clippy::unwrap_used)]
// Integration tests for `MapsClient` using wiremock.

use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use waymark_api::models::AutocompleteRequest;
use waymark_api::{ApiStatus, Endpoints, Error, LatLng, MapsClient, TravelMode};

// ── Helpers ─────────────────────────────────────────────────────────

const KEY: &str = "test-key";

async fn setup() -> (MockServer, MapsClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = MapsClient::with_client(
        reqwest::Client::new(),
        SecretString::from(KEY.to_owned()),
        Endpoints::single(base_url),
    );
    (server, client)
}

// ── Autocomplete ────────────────────────────────────────────────────

#[tokio::test]
async fn test_autocomplete_sends_input_key_and_session() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/maps/api/place/autocomplete/json"))
        .and(query_param("input", "Thamel"))
        .and(query_param("sessiontoken", "sess-1"))
        .and(query_param("key", KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "predictions": [{
                "place_id": "ChIJ1",
                "description": "Thamel, Kathmandu, Nepal",
                "structured_formatting": {
                    "main_text": "Thamel",
                    "secondary_text": "Kathmandu, Nepal"
                }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client
        .autocomplete(&AutocompleteRequest {
            input: "Thamel".into(),
            session_token: Some("sess-1".into()),
            language: None,
        })
        .await
        .unwrap();

    assert_eq!(resp.status, ApiStatus::Ok);
    assert_eq!(resp.predictions.len(), 1);
    assert_eq!(resp.predictions[0].description, "Thamel, Kathmandu, Nepal");
    assert_eq!(resp.predictions[0].structured_formatting.main_text, "Thamel");
}

#[tokio::test]
async fn test_autocomplete_zero_results_is_empty() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/maps/api/place/autocomplete/json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "status": "ZERO_RESULTS" })),
        )
        .mount(&server)
        .await;

    let resp = client
        .autocomplete(&AutocompleteRequest {
            input: "zzzzqqq".into(),
            ..AutocompleteRequest::default()
        })
        .await
        .unwrap();

    assert_eq!(resp.status, ApiStatus::ZeroResults);
    assert!(resp.predictions.is_empty());
}

#[tokio::test]
async fn test_request_denied_becomes_api_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/maps/api/place/autocomplete/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "REQUEST_DENIED",
            "error_message": "The provided API key is invalid.",
            "predictions": []
        })))
        .mount(&server)
        .await;

    let result = client
        .autocomplete(&AutocompleteRequest {
            input: "x".into(),
            ..AutocompleteRequest::default()
        })
        .await;

    let err = result.unwrap_err();
    assert!(err.is_denied());
    match err {
        Error::Api { status, message } => {
            assert_eq!(status, ApiStatus::RequestDenied);
            assert_eq!(message, "The provided API key is invalid.");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

// ── Geocoding ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_geocode_returns_first_location() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/maps/api/geocode/json"))
        .and(query_param("address", "Patan Durbar Square, Lalitpur"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "results": [{
                "formatted_address": "Patan Durbar Square, Lalitpur 44600, Nepal",
                "place_id": "ChIJp",
                "geometry": { "location": { "lat": 27.6727, "lng": 85.3253 } }
            }]
        })))
        .mount(&server)
        .await;

    let resp = client
        .geocode("Patan Durbar Square, Lalitpur")
        .await
        .unwrap();

    assert_eq!(resp.results.len(), 1);
    assert_eq!(
        resp.results[0].geometry.location,
        LatLng::new(27.6727, 85.3253)
    );
}

#[tokio::test]
async fn test_geocode_http_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/maps/api/geocode/json"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&server)
        .await;

    let err = client.geocode("anywhere").await.unwrap_err();
    assert!(err.is_transient());
    assert!(
        matches!(err, Error::Http { status: 503, .. }),
        "expected Http error, got: {err:?}"
    );
}

#[tokio::test]
async fn test_malformed_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/maps/api/geocode/json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let result = client.geocode("anywhere").await;
    assert!(
        matches!(result, Err(Error::Deserialization { .. })),
        "expected Deserialization error, got: {result:?}"
    );
}

// ── Directions ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_directions_driving_route() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/maps/api/directions/json"))
        .and(query_param("origin", "27.7,85.3"))
        .and(query_param("destination", "27.67,85.32"))
        .and(query_param("mode", "driving"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "routes": [{
                "summary": "Ring Rd",
                "overview_polyline": { "points": "_p~iF~ps|U_ulLnnqC_mqNvxq`@" },
                "legs": [{
                    "distance": { "text": "4.2 km", "value": 4200 },
                    "duration": { "text": "15 mins", "value": 900 },
                    "start_address": "A",
                    "end_address": "B",
                    "start_location": { "lat": 27.7, "lng": 85.3 },
                    "end_location": { "lat": 27.67, "lng": 85.32 }
                }]
            }]
        })))
        .mount(&server)
        .await;

    let resp = client
        .directions(
            LatLng::new(27.7, 85.3),
            LatLng::new(27.67, 85.32),
            TravelMode::Driving,
        )
        .await
        .unwrap();

    let route = &resp.routes[0];
    assert_eq!(route.summary, "Ring Rd");
    assert_eq!(route.distance_meters(), 4200);
    assert_eq!(route.duration_seconds(), 900);
    assert_eq!(route.path().unwrap().len(), 3);
}

#[tokio::test]
async fn test_directions_zero_results() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/maps/api/directions/json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "status": "ZERO_RESULTS", "routes": [] })),
        )
        .mount(&server)
        .await;

    let resp = client
        .directions(
            LatLng::new(0.0, 0.0),
            LatLng::new(10.0, 10.0),
            TravelMode::Driving,
        )
        .await
        .unwrap();
    assert!(resp.routes.is_empty());
}

// ── Geolocation ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_geolocate_posts_consider_ip() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/geolocation/v1/geolocate"))
        .and(query_param("key", KEY))
        .and(body_json(json!({ "considerIp": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "location": { "lat": 27.7172, "lng": 85.324 },
            "accuracy": 1500.0
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client.geolocate().await.unwrap();
    assert_eq!(resp.location, LatLng::new(27.7172, 85.324));
    assert!((resp.accuracy - 1500.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_geolocate_error_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/geolocation/v1/geolocate"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {
                "code": 404,
                "message": "Requested entity was not found.",
                "errors": [{ "domain": "geolocation", "reason": "notFound" }]
            }
        })))
        .mount(&server)
        .await;

    let err = client.geolocate().await.unwrap_err();
    assert!(err.is_not_found());
    match err {
        Error::Geolocation { code, reason, .. } => {
            assert_eq!(code, 404);
            assert_eq!(reason, "notFound");
        }
        other => panic!("expected Geolocation error, got: {other:?}"),
    }
}
