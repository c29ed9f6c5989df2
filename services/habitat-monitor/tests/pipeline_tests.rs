//! End-to-end monitoring runs against local stand-ins for all three providers.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path as UrlPath, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use biodiversity::SpeciesStore;
use habitat_common::Coordinate;
use habitat_monitor::config::MonitorConfig;
use habitat_monitor::pipeline::{run, RunSelection};
use serde_json::json;
use test_utils::{create_band_grid, encode_png, fixture_date, location, spawn_test_server, TestServer};

#[derive(Clone)]
struct Providers {
    /// Dates the imagery endpoint answers with 404
    missing_dates: Vec<&'static str>,
    /// Whether occurrence records carry coordinates
    georeferenced: bool,
    imagery_calls: Arc<Mutex<Vec<String>>>,
    /// Registry answers 401 while set
    registry_down: Arc<AtomicBool>,
    png: Vec<u8>,
}

async fn species_page(State(providers): State<Providers>, UrlPath(page): UrlPath<u32>) -> Response {
    if providers.registry_down.load(Ordering::SeqCst) {
        return (StatusCode::UNAUTHORIZED, "invalid token").into_response();
    }
    if page == 0 {
        Json(json!({
            "page": "0",
            "result": [
                {"taxonid": 3, "scientific_name": "Aaadonta angaurana", "category": "CR"},
                {"taxonid": 4, "scientific_name": "Aaadonta constricta", "category": "EN"}
            ]
        }))
        .into_response()
    } else {
        Json(json!({"page": page.to_string(), "result": []})).into_response()
    }
}

async fn occurrences(
    State(providers): State<Providers>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    assert_eq!(params["scientificName"], "Aaadonta angaurana");
    if !providers.georeferenced {
        return Json(json!({"results": [{"key": 1}]})).into_response();
    }
    Json(json!({
        "results": [
            {"key": 1},
            {"key": 2, "decimalLatitude": location::ANGAUR.0, "decimalLongitude": location::ANGAUR.1}
        ]
    }))
    .into_response()
}

async fn imagery(
    State(providers): State<Providers>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let date = params.get("date").cloned().unwrap_or_default();
    providers.imagery_calls.lock().unwrap().push(date.clone());

    if providers.missing_dates.contains(&date.as_str()) {
        return (StatusCode::NOT_FOUND, "no imagery").into_response();
    }
    Response::builder()
        .header("content-type", "image/png")
        .body(axum::body::Body::from(providers.png.clone()))
        .unwrap()
}

async fn start_providers(providers: Providers) -> TestServer {
    let router = Router::new()
        .route("/api/v3/species/page/:page", get(species_page))
        .route("/v1/occurrence/search", get(occurrences))
        .route("/planetary/earth/imagery", get(imagery))
        .with_state(providers);
    spawn_test_server(router).await
}

fn providers(missing_dates: Vec<&'static str>) -> Providers {
    Providers {
        missing_dates,
        georeferenced: true,
        imagery_calls: Arc::default(),
        registry_down: Arc::default(),
        png: encode_png(&create_band_grid(8, 8, 200, 50)).to_vec(),
    }
}

fn config_for(server: &TestServer, work: &Path) -> MonitorConfig {
    let mut config = MonitorConfig::default();
    config.imagery.source.base_url = server.url("/planetary/earth/imagery");
    config.imagery.source.api_key = "test-key".to_string();
    config.occurrence.base_url = server.url("/v1/occurrence/search");
    config.redlist.base_url = server.url("/api/v3");
    config.redlist.token = "test-token".to_string();
    config.redlist.page_delay_secs = 0;
    config.run.species_file = work.join("data").join("endangered_species.json");
    config.run.output_dir = work.join("output");
    config
}

fn png_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_full_run_skips_failed_dates() {
    let providers = providers(vec!["2023-01-17", "2023-03-06"]);
    let calls = providers.imagery_calls.clone();
    let server = start_providers(providers).await;
    let work = tempfile::tempdir().unwrap();
    let config = config_for(&server, work.path());

    let summary = run(&config, &RunSelection::default()).await.unwrap();

    assert_eq!(summary.species, "Aaadonta angaurana");
    assert_eq!(
        summary.location,
        Coordinate::new(location::ANGAUR.0, location::ANGAUR.1).unwrap()
    );
    assert_eq!(summary.steps_requested, 6);
    assert_eq!(calls.lock().unwrap().len(), 6);
    assert_eq!(summary.steps_skipped(), 2);

    let dates: Vec<_> = summary.samples.iter().map(|s| s.date).collect();
    assert_eq!(
        dates,
        vec![
            fixture_date("2023-01-01"),
            fixture_date("2023-02-02"),
            fixture_date("2023-02-18"),
            fixture_date("2023-03-22"),
        ]
    );

    let names = png_names(&config.run.output_dir);
    assert_eq!(names.len(), 8);
    assert!(names.contains(&"nasa_image_2023-02-18.png".to_string()));
    assert!(names.contains(&"ndvi_2023-02-18.png".to_string()));
    assert!(!names.contains(&"ndvi_2023-01-17.png".to_string()));

    let mean = summary.samples[0].summary.unwrap().mean;
    test_utils::assert_approx_eq!(mean, 0.6, 1e-9);

    // Registry download is persisted for the next run
    let stored = SpeciesStore::new(&config.run.species_file).load().unwrap();
    assert_eq!(stored.len(), 2);
}

#[tokio::test]
async fn test_existing_species_file_is_used() {
    let server = start_providers(providers(vec![])).await;
    let work = tempfile::tempdir().unwrap();
    let mut config = config_for(&server, work.path());
    // Unreachable registry: the stored file must be enough
    config.redlist.base_url = "http://127.0.0.1:9/api/v3".to_string();

    std::fs::create_dir_all(config.run.species_file.parent().unwrap()).unwrap();
    std::fs::write(
        &config.run.species_file,
        r#"[{"taxonid": 3, "scientific_name": "Aaadonta angaurana"}]"#,
    )
    .unwrap();

    let summary = run(&config, &RunSelection::default()).await.unwrap();
    assert_eq!(summary.species, "Aaadonta angaurana");
    assert_eq!(summary.samples.len(), 6);
}

#[tokio::test]
async fn test_overrides_skip_lookups_and_zero_samples_succeeds() {
    let all_dates = test_utils::window::REVISIT_DATES.to_vec();
    let server = start_providers(providers(all_dates)).await;
    let work = tempfile::tempdir().unwrap();
    let mut config = config_for(&server, work.path());
    config.redlist.token = String::new();
    config.occurrence.base_url = "http://127.0.0.1:9/v1/occurrence/search".to_string();

    let selection = RunSelection {
        species: Some("Aaadonta angaurana".to_string()),
        location: Some(Coordinate::new(location::SUNDARBANS.0, location::SUNDARBANS.1).unwrap()),
        show_habitats: false,
    };

    let summary = run(&config, &selection).await.unwrap();
    assert!(summary.samples.is_empty());
    assert_eq!(summary.steps_skipped(), 6);
    assert!(png_names(&config.run.output_dir).is_empty());
    assert!(!config.run.species_file.exists());
}

#[tokio::test]
async fn test_missing_species_file_without_token_fails() {
    let server = start_providers(providers(vec![])).await;
    let work = tempfile::tempdir().unwrap();
    let mut config = config_for(&server, work.path());
    config.redlist.token = String::new();

    let err = run(&config, &RunSelection::default()).await.unwrap_err();
    assert!(err.to_string().contains("REDLIST_TOKEN"));
}

#[tokio::test]
async fn test_species_without_locations_fails() {
    let mut providers = providers(vec![]);
    providers.georeferenced = false;
    let calls = providers.imagery_calls.clone();
    let server = start_providers(providers).await;
    let work = tempfile::tempdir().unwrap();
    let config = config_for(&server, work.path());

    let err = run(&config, &RunSelection::default()).await.unwrap_err();
    assert!(err.to_string().contains("No locations found"));
    assert!(calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_location_index_out_of_range_fails() {
    let server = start_providers(providers(vec![])).await;
    let work = tempfile::tempdir().unwrap();
    let mut config = config_for(&server, work.path());
    config.run.location_index = 5;

    let err = run(&config, &RunSelection::default()).await.unwrap_err();
    assert!(err.to_string().contains("out of range"));
}

#[tokio::test]
async fn test_rejected_registry_download_is_not_persisted() {
    let providers = providers(vec![]);
    let registry_down = providers.registry_down.clone();
    registry_down.store(true, Ordering::SeqCst);
    let server = start_providers(providers).await;
    let work = tempfile::tempdir().unwrap();
    let config = config_for(&server, work.path());

    let err = run(&config, &RunSelection::default()).await.unwrap_err();
    assert!(err.to_string().contains("no records"));
    assert!(!config.run.species_file.exists());

    // Once the registry recovers the next run downloads and proceeds
    registry_down.store(false, Ordering::SeqCst);
    let summary = run(&config, &RunSelection::default()).await.unwrap();
    assert_eq!(summary.species, "Aaadonta angaurana");
    assert_eq!(SpeciesStore::new(&config.run.species_file).load().unwrap().len(), 2);
}
