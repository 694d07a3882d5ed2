//! Integration tests for the geocoding collaborator client.

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shelfwatch_scraper::{Geocoder, ScraperError};

fn test_geocoder(server: &MockServer) -> Geocoder {
    Geocoder::new(
        &format!("{}/search", server.uri()),
        5,
        "shelfwatch-test/0.1",
    )
    .expect("failed to build test Geocoder")
}

#[tokio::test]
async fn resolves_first_match_to_coordinates() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!([
            {"lat": "18.017874", "lon": "-76.809904", "display_name": "Half Way Tree, Kingston"},
            {"lat": "18.5", "lon": "-77.9", "display_name": "elsewhere"}
        ])))
        .mount(&server)
        .await;

    let coords = test_geocoder(&server)
        .geocode("12 Half Way Tree Road, Kingston 5")
        .await
        .expect("geocode should succeed")
        .expect("expected a match");

    assert!((coords.latitude - 18.017_874).abs() < 1e-9);
    assert!((coords.longitude - -76.809_904).abs() < 1e-9);
}

#[tokio::test]
async fn no_match_is_none_not_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!([])))
        .mount(&server)
        .await;

    let result = test_geocoder(&server)
        .geocode("Nowhere In Particular")
        .await
        .expect("geocode should succeed");

    assert!(result.is_none());
}

#[tokio::test]
async fn address_is_percent_encoded_into_query() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "87 ¾ Barbican Road, Kingston 8"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!([
            {"lat": "18.033", "lon": "-76.783"}
        ])))
        .mount(&server)
        .await;

    let coords = test_geocoder(&server)
        .geocode("87 ¾ Barbican Road, Kingston 8")
        .await
        .expect("geocode should succeed");

    assert!(coords.is_some());
}

#[tokio::test]
async fn server_error_propagates_as_unexpected_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = test_geocoder(&server).geocode("anywhere").await;
    assert!(
        matches!(result, Err(ScraperError::UnexpectedStatus { status: 503, .. })),
        "expected UnexpectedStatus(503), got: {result:?}"
    );
}

#[tokio::test]
async fn non_json_body_is_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>rate limited</html>"))
        .mount(&server)
        .await;

    let result = test_geocoder(&server).geocode("anywhere").await;
    assert!(
        matches!(result, Err(ScraperError::GeocodeParse { .. })),
        "expected GeocodeParse, got: {result:?}"
    );
}

#[tokio::test]
async fn non_numeric_coordinates_resolve_to_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!([
            {"lat": "not-a-number", "lon": "-76.783"}
        ])))
        .mount(&server)
        .await;

    let result = test_geocoder(&server)
        .geocode("anywhere")
        .await
        .expect("geocode should succeed");

    assert!(result.is_none());
}
