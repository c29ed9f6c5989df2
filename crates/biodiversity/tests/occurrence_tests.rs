//! Occurrence lookup against a local search endpoint.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use biodiversity::{BiodiversityError, OccurrenceClient, OccurrenceConfig};
use serde_json::json;
use test_utils::{location, spawn_test_server};

type Seen = Arc<Mutex<Vec<HashMap<String, String>>>>;

fn search_router(status: StatusCode, body: serde_json::Value, seen: Seen) -> Router {
    Router::new()
        .route(
            "/v1/occurrence/search",
            get(
                move |State(seen): State<Seen>, Query(params): Query<HashMap<String, String>>| {
                    let body = body.clone();
                    async move {
                        seen.lock().unwrap().push(params);
                        let response: Response = (status, Json(body)).into_response();
                        response
                    }
                },
            ),
        )
        .with_state(seen)
}

fn client(base_url: String) -> OccurrenceClient {
    OccurrenceClient::new(OccurrenceConfig {
        base_url,
        ..OccurrenceConfig::default()
    })
    .unwrap()
}

#[tokio::test]
async fn test_keeps_only_records_with_both_coordinates() {
    let body = json!({
        "offset": 0,
        "results": [
            {"key": 1, "decimalLatitude": 6.9, "decimalLongitude": 134.13},
            {"key": 2, "decimalLatitude": 6.91},
            {"key": 3, "decimalLongitude": 134.2},
            {"key": 4, "decimalLatitude": 7.0, "decimalLongitude": 134.5},
            {"key": 5, "decimalLatitude": location::INVALID_LAT.0, "decimalLongitude": location::INVALID_LAT.1}
        ]
    });
    let seen = Seen::default();
    let server = spawn_test_server(search_router(StatusCode::OK, body, seen.clone())).await;

    let locations = client(server.url("/v1/occurrence/search"))
        .species_locations("Aaadonta angaurana")
        .await
        .unwrap();

    let pairs: Vec<_> = locations.iter().map(|c| (c.lat(), c.lon())).collect();
    assert_eq!(pairs, vec![(6.9, 134.13), (7.0, 134.5)]);

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0]["scientificName"], "Aaadonta angaurana");
    assert_eq!(seen[0]["hasCoordinate"], "true");
    assert_eq!(seen[0]["limit"], "300");
}

#[tokio::test]
async fn test_missing_results_is_empty() {
    let server = spawn_test_server(search_router(StatusCode::OK, json!({}), Seen::default())).await;
    let locations = client(server.url("/v1/occurrence/search"))
        .species_locations("Nobody here")
        .await
        .unwrap();
    assert!(locations.is_empty());
}

#[tokio::test]
async fn test_non_success_status_is_error() {
    let server = spawn_test_server(search_router(
        StatusCode::SERVICE_UNAVAILABLE,
        json!({"error": "down"}),
        Seen::default(),
    ))
    .await;
    let err = client(server.url("/v1/occurrence/search"))
        .species_locations("Panthera tigris")
        .await
        .unwrap_err();
    assert!(matches!(err, BiodiversityError::Status { status: 503, .. }));
}
