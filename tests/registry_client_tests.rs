// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Protected Planet client tests against a local mock of the v3 API.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use water_transitions::error::AppError;
use water_transitions::services::{ProtectedPlanetClient, RegistryClient};

mod common;
use common::{example_park_record, spawn_mock_server};

type Requests = Arc<Mutex<Vec<HashMap<String, String>>>>;

async fn search(
    State(requests): State<Requests>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    requests.lock().unwrap().push(params.clone());
    let page: u32 = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(0);
    let areas = match page {
        1 => json!([{ "name": "Example Park", "wdpa_id": 555, "id": 1 }]),
        2 => json!([{ "name": "Second", "wdpa_id": 2 }, { "name": "Example Park", "wdpa_id": 555 }]),
        3 => json!([]),
        4 => json!([{ "name": "Fourth", "wdpa_id": 4 }]),
        _ => return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
    };
    Json(json!({ "protected_areas": areas })).into_response()
}

async fn protected_area(
    State(requests): State<Requests>,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    requests.lock().unwrap().push(params);
    match id.as_str() {
        "555" => Json(json!({ "protected_area": example_park_record() })).into_response(),
        "777" => Json(json!({ "protected_area": { "wdpa_id": 777, "name": "No Shape" } }))
            .into_response(),
        _ => (StatusCode::NOT_FOUND, "not found").into_response(),
    }
}

async fn setup() -> (ProtectedPlanetClient, Requests) {
    let requests: Requests = Arc::default();
    let router = Router::new()
        .route("/v3/protected_areas/search", get(search))
        .route("/v3/protected_areas/{id}", get(protected_area))
        .with_state(requests.clone());
    let base = spawn_mock_server(router).await;

    let client = ProtectedPlanetClient::new(
        reqwest::Client::new(),
        &format!("{}/v3", base),
        "secret-token",
    );
    (client, requests)
}

#[tokio::test]
async fn test_search_maps_records_and_sends_filter() {
    let (client, requests) = setup().await;

    let items = client.search_by_designation(1).await.unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name, "Example Park");
    assert_eq!(items[0].wdpaid, 555);

    let params = requests.lock().unwrap()[0].clone();
    assert_eq!(params["designation"], "17");
    assert_eq!(params["page"], "1");
    assert_eq!(params["token"], "secret-token");
}

#[tokio::test]
async fn test_fetch_all_pages_concatenates_in_order() {
    let (client, requests) = setup().await;

    let items = client.fetch_all_pages(4).await.unwrap();
    let ids: Vec<u64> = items.iter().map(|i| i.wdpaid).collect();

    assert_eq!(ids, vec![555, 2, 555, 4]);
    let pages: Vec<String> = requests
        .lock()
        .unwrap()
        .iter()
        .map(|p| p["page"].clone())
        .collect();
    assert_eq!(pages, vec!["1", "2", "3", "4"]);
}

#[tokio::test]
async fn test_fetch_all_pages_aborts_on_failed_page() {
    let (client, _) = setup().await;

    let result = client.fetch_all_pages(5).await;

    assert!(matches!(result, Err(AppError::Registry(ref msg)) if msg.contains("500")));
}

#[tokio::test]
async fn test_fetch_feature_requests_geometry() {
    let (client, requests) = setup().await;

    let feature = client.fetch_feature("555").await.unwrap();

    assert_eq!(feature.properties["name"], "Example Park");
    assert!(!feature.properties.contains_key("geojson"));
    assert!(feature.footprint().is_ok());

    let params = requests.lock().unwrap()[0].clone();
    assert_eq!(params["with_geometry"], "1");
    assert_eq!(params["token"], "secret-token");
}

#[tokio::test]
async fn test_fetch_feature_without_geojson_is_missing_geometry() {
    let (client, _) = setup().await;

    let result = client.fetch_feature("777").await;

    assert!(matches!(result, Err(AppError::MissingGeometry(ref id)) if id == "777"));
}

#[tokio::test]
async fn test_fetch_feature_not_found_is_registry_error() {
    let (client, _) = setup().await;

    let err = client.fetch_feature("404").await.unwrap_err();

    assert!(matches!(err, AppError::Registry(_)));
    assert!(!err.to_string().contains("secret-token"));
}

#[tokio::test]
async fn test_transport_error_hides_token() {
    let client = ProtectedPlanetClient::new(
        reqwest::Client::new(),
        "http://127.0.0.1:9/v3",
        "secret-token",
    );

    let err = client.search_by_designation(1).await.unwrap_err();

    assert!(matches!(err, AppError::Registry(_)));
    assert!(!err.to_string().contains("secret-token"));
}
