//! Integration tests for the HTTP API.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use asterism::{SkyService, SkyServiceBuilder, StarCatalog, CONSTELLATIONS};
use asterism_service::{router, AppState, MISSING_PARAMETERS};
use axum::http::{header, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::Value;
use tempfile::TempDir;

/// Create a test server backed by the built-in star positions.
fn create_test_server() -> TestServer {
    create_server_with(SkyService::builtin())
}

fn create_server_with(sky: SkyService) -> TestServer {
    let state = Arc::new(AppState { sky });
    TestServer::new(router(state)).unwrap()
}

/// Write a minimal `hip_main.dat` holding the marker stars.
fn write_hip_main(dir: &Path) {
    let builtin = StarCatalog::builtin();
    let mut contents = String::new();
    for c in &CONSTELLATIONS {
        let star = builtin.get(c.hip).unwrap();
        contents.push_str(&format!(
            "H|{:>12}| |00 00 00.00|+00 00 00.0| 1.00| |H|{:012.8}|{:+012.8}| |\n",
            c.hip.get(),
            star.ra_degrees,
            star.dec_degrees
        ));
    }
    fs::write(dir.join("hip_main.dat"), contents).unwrap();
}

fn assert_position(entry: &Value, name: &str) {
    assert_eq!(entry["constellation"], name);
    let altitude = entry["altitude_deg"].as_f64().unwrap();
    let azimuth = entry["azimuth_deg"].as_f64().unwrap();
    assert!((-90.0..=90.0).contains(&altitude), "altitude {}", altitude);
    assert!((0.0..360.0).contains(&azimuth), "azimuth {}", azimuth);
    assert!(entry.get("error").is_none());
}

async fn assert_missing_parameters(server: &TestServer, path: &str) {
    let response = server.get(path).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let json: Value = response.json();
    assert_eq!(json, serde_json::json!({ "error": MISSING_PARAMETERS }));
}

#[tokio::test]
async fn test_constellation_endpoint_success() {
    let server = create_test_server();

    let response = server
        .get("/constellation?lat=49.8876&lon=-119.4932&names=leo,lyra,orion")
        .await;

    response.assert_status_ok();
    let json: Value = response.json();
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_position(&entries[0], "leo");
    assert_position(&entries[1], "lyra");
    assert_position(&entries[2], "orion");

    // Exactly three keys per entry
    assert_eq!(entries[0].as_object().unwrap().len(), 3);
}

#[tokio::test]
async fn test_constellation_endpoint_unknown_name() {
    let server = create_test_server();

    let response = server.get("/constellation?lat=0&lon=0&names=Draco").await;

    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(
        json,
        serde_json::json!([{ "constellation": "draco", "error": "Unknown constellation" }])
    );
}

#[tokio::test]
async fn test_constellation_endpoint_mixed() {
    let server = create_test_server();

    let response = server
        .get("/constellation?lat=10&lon=20&names=leo,not_a_thing,lyra")
        .await;

    response.assert_status_ok();
    let json: Value = response.json();
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_position(&entries[0], "leo");
    assert_eq!(entries[1]["constellation"], "not_a_thing");
    assert_eq!(entries[1]["error"], "Unknown constellation");
    assert_position(&entries[2], "lyra");
}

#[tokio::test]
async fn test_constellation_endpoint_case_and_whitespace() {
    let server = create_test_server();

    let response = server
        .get("/constellation?lat=35&lon=139&names=%20Leo%20,LEO,leo")
        .await;

    response.assert_status_ok();
    let json: Value = response.json();
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 3);

    // One request shares one instant, so all three must be identical
    for entry in entries {
        assert_eq!(entry, &entries[0]);
    }
    assert_position(&entries[0], "leo");
}

#[tokio::test]
async fn test_constellation_endpoint_empty_segment() {
    let server = create_test_server();

    let response = server.get("/constellation?lat=0&lon=0&names=leo,,lyra").await;

    response.assert_status_ok();
    let json: Value = response.json();
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[1]["constellation"], "");
    assert_eq!(entries[1]["error"], "Unknown constellation");
}

#[tokio::test]
async fn test_constellation_endpoint_all_entries_in_range() {
    let server = create_test_server();
    let names: Vec<&str> = CONSTELLATIONS.iter().map(|c| c.name).collect();

    for (lat, lon) in [(-89.9, 0.0), (-33.45, -70.67), (0.0, 180.0), (64.2, -21.9)] {
        let response = server
            .get(&format!(
                "/constellation?lat={}&lon={}&names={}",
                lat,
                lon,
                names.join(",")
            ))
            .await;

        response.assert_status_ok();
        let json: Value = response.json();
        let entries = json.as_array().unwrap();
        assert_eq!(entries.len(), CONSTELLATIONS.len());
        for (entry, name) in entries.iter().zip(&names) {
            assert_position(entry, name);
        }
    }
}

#[tokio::test]
async fn test_constellation_endpoint_from_north_pole() {
    let server = create_test_server();

    let response = server.get("/constellation?lat=90&lon=0&names=lyra").await;

    response.assert_status_ok();
    let json: Value = response.json();
    let altitude = json[0]["altitude_deg"].as_f64().unwrap();
    // Vega's altitude from the pole is its apparent declination
    assert!((altitude - 38.78).abs() < 0.5, "altitude {}", altitude);
}

#[tokio::test]
async fn test_constellation_endpoint_missing_parameters() {
    let server = create_test_server();

    assert_missing_parameters(&server, "/constellation").await;
    assert_missing_parameters(&server, "/constellation?lon=0&names=leo").await;
    assert_missing_parameters(&server, "/constellation?lat=0&names=leo").await;
    assert_missing_parameters(&server, "/constellation?lat=0&lon=0").await;
    assert_missing_parameters(&server, "/constellation?lat=0&lon=0&names=").await;
}

#[tokio::test]
async fn test_constellation_endpoint_unparseable_coordinates() {
    let server = create_test_server();

    assert_missing_parameters(&server, "/constellation?lat=north&lon=0&names=leo").await;
    assert_missing_parameters(&server, "/constellation?lat=0&lon=&names=leo").await;
}

#[tokio::test]
async fn test_constellation_endpoint_duplicate_parameters() {
    let server = create_test_server();

    let response = server
        .get("/constellation?lat=1&lat=2&lon=0&names=leo")
        .await;
    response.assert_status_ok();
    let json: Value = response.json();
    assert_position(&json[0], "leo");

    // First value of each parameter is the one used
    let first: Value = server
        .get("/constellation?lat=1&lon=0&names=leo,lyra")
        .await
        .json();
    let repeated: Value = server
        .get("/constellation?names=leo,lyra&lat=1&lon=0&lat=95&names=orion")
        .await
        .json();
    assert_eq!(repeated.as_array().unwrap().len(), 2);
    for i in 0..2 {
        assert_eq!(repeated[i]["constellation"], first[i]["constellation"]);
        let a = repeated[i]["altitude_deg"].as_f64().unwrap();
        let b = first[i]["altitude_deg"].as_f64().unwrap();
        assert!((a - b).abs() < 0.01, "{} vs {}", a, b);
    }
}

#[tokio::test]
async fn test_constellation_endpoint_invalid_observer() {
    let server = create_test_server();

    let response = server.get("/constellation?lat=95&lon=0&names=leo").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let json: Value = response.json();
    assert!(json["error"].as_str().unwrap().contains("out of bounds"));

    let response = server.get("/constellation?lat=NaN&lon=0&names=leo").await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_constellation_endpoint_with_catalog_file() {
    let temp_dir = TempDir::new().unwrap();
    write_hip_main(temp_dir.path());

    let sky = SkyServiceBuilder::new()
        .data_dir(temp_dir.path())
        .build()
        .unwrap();
    let file_server = create_server_with(sky);
    let builtin_server = create_test_server();

    let path = "/constellation?lat=49.8876&lon=-119.4932&names=cassiopeia,scorpius";
    let from_file: Value = file_server.get(path).await.json();
    let from_builtin: Value = builtin_server.get(path).await.json();

    for i in 0..2 {
        assert_eq!(from_file[i]["constellation"], from_builtin[i]["constellation"]);
        let a = from_file[i]["altitude_deg"].as_f64().unwrap();
        let b = from_builtin[i]["altitude_deg"].as_f64().unwrap();
        assert!((a - b).abs() < 0.05, "{} vs {}", a, b);
    }
}

#[tokio::test]
async fn test_cors_headers() {
    let server = create_test_server();

    let response = server
        .get("/constellation?lat=0&lon=0&names=leo")
        .add_header(header::ORIGIN, HeaderValue::from_static("http://example.com"))
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_unknown_route() {
    let server = create_test_server();

    let response = server.get("/elevation").await;
    response.assert_status(StatusCode::NOT_FOUND);
}
