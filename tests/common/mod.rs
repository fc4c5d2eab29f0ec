// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use geojson::JsonObject;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use water_transitions::config::Config;
use water_transitions::error::AppError;
use water_transitions::models::transition::zip_lookup;
use water_transitions::models::{
    GroupSum, LookupKind, LookupTable, MapTileDescriptor, ProtectedAreaFeature,
    ProtectedAreaSummary,
};
use water_transitions::routes::create_router;
use water_transitions::services::{
    GeospatialClient, MemoryCache, RegistryClient, TransitionService,
};
use water_transitions::templates::TemplateRenderer;
use water_transitions::AppState;

/// In-memory registry with canned pages and records.
#[derive(Default)]
pub struct FakeRegistry {
    pub pages: HashMap<u32, Vec<ProtectedAreaSummary>>,
    pub records: HashMap<String, JsonObject>,
    pub failing_page: Option<u32>,
    pub searched_pages: Mutex<Vec<u32>>,
    pub feature_calls: AtomicUsize,
}

#[allow(dead_code)]
impl FakeRegistry {
    pub fn with_page(mut self, page: u32, items: Vec<(&str, u64)>) -> Self {
        self.pages.insert(
            page,
            items
                .into_iter()
                .map(|(name, wdpaid)| ProtectedAreaSummary {
                    name: name.to_string(),
                    wdpaid,
                })
                .collect(),
        );
        self
    }

    pub fn with_record(mut self, wdpaid: &str, record: serde_json::Value) -> Self {
        let serde_json::Value::Object(record) = record else {
            panic!("record fixture must be a JSON object");
        };
        self.records.insert(wdpaid.to_string(), record);
        self
    }

    pub fn searched_pages(&self) -> Vec<u32> {
        self.searched_pages.lock().unwrap().clone()
    }
}

#[async_trait]
impl RegistryClient for FakeRegistry {
    async fn search_by_designation(
        &self,
        page: u32,
    ) -> Result<Vec<ProtectedAreaSummary>, AppError> {
        self.searched_pages.lock().unwrap().push(page);
        if self.failing_page == Some(page) {
            return Err(AppError::Registry(format!("HTTP 500: page {} failed", page)));
        }
        Ok(self.pages.get(&page).cloned().unwrap_or_default())
    }

    async fn fetch_feature(&self, wdpaid: &str) -> Result<ProtectedAreaFeature, AppError> {
        self.feature_calls.fetch_add(1, Ordering::SeqCst);
        let record = self
            .records
            .get(wdpaid)
            .cloned()
            .ok_or_else(|| AppError::Registry("HTTP 404 Not Found: ".to_string()))?;
        ProtectedAreaFeature::from_record(record)
    }
}

/// Geospatial engine double returning fixed sums and metadata.
pub struct FakeGeospatial {
    pub sums: Vec<GroupSum>,
    pub names: LookupTable,
    pub colors: LookupTable,
    pub compute_calls: AtomicUsize,
    pub metadata_calls: AtomicUsize,
    pub map_calls: AtomicUsize,
}

impl Default for FakeGeospatial {
    fn default() -> Self {
        Self {
            sums: vec![
                GroupSum {
                    transition_class_value: 1,
                    sum: 4_000_000.0,
                },
                GroupSum {
                    transition_class_value: 4,
                    sum: 250_000.0,
                },
            ],
            names: zip_lookup(
                vec![1, 2, 3, 4],
                vec![
                    "Permanent".to_string(),
                    "New permanent".to_string(),
                    "Lost permanent".to_string(),
                    "Seasonal".to_string(),
                ],
            )
            .unwrap(),
            colors: zip_lookup(
                vec![1, 2, 3, 4],
                vec![
                    "0000ff".to_string(),
                    "22b14c".to_string(),
                    "d1102d".to_string(),
                    "99d9ea".to_string(),
                ],
            )
            .unwrap(),
            compute_calls: AtomicUsize::new(0),
            metadata_calls: AtomicUsize::new(0),
            map_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl GeospatialClient for FakeGeospatial {
    async fn fetch_map_tile_descriptor(&self) -> Result<MapTileDescriptor, AppError> {
        self.map_calls.fetch_add(1, Ordering::SeqCst);
        Ok(MapTileDescriptor {
            mapid: "projects/test-project/maps/abc123".to_string(),
            token: "tok456".to_string(),
            tile_url: "https://ee.example.com/v1/projects/test-project/maps/abc123/tiles/{z}/{x}/{y}"
                .to_string(),
        })
    }

    async fn compute_transition_stats(
        &self,
        feature: &ProtectedAreaFeature,
        _scale: f64,
    ) -> Result<Vec<GroupSum>, AppError> {
        self.compute_calls.fetch_add(1, Ordering::SeqCst);
        feature.footprint()?;
        Ok(self.sums.clone())
    }

    async fn fetch_category_metadata(&self, kind: LookupKind) -> Result<LookupTable, AppError> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        Ok(match kind {
            LookupKind::Names => self.names.clone(),
            LookupKind::Colors => self.colors.clone(),
        })
    }
}

/// A record for wdpaid 555 with a one-degree square boundary.
#[allow(dead_code)]
pub fn example_park_record() -> serde_json::Value {
    serde_json::json!({
        "wdpa_id": 555,
        "name": "Example Park",
        "designation": { "id": 17, "name": "World Heritage Site" },
        "geojson": {
            "type": "Feature",
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[10.0, 10.0], [11.0, 10.0], [11.0, 11.0], [10.0, 11.0], [10.0, 10.0]]]
            }
        }
    })
}

/// Test app state around the given doubles.
pub struct TestApp {
    pub router: axum::Router,
    #[allow(dead_code)]
    pub state: Arc<AppState>,
    #[allow(dead_code)]
    pub cache: Arc<MemoryCache>,
}

/// Create a test app with in-memory collaborators.
#[allow(dead_code)]
pub fn create_test_app(
    registry: Arc<FakeRegistry>,
    geospatial: Arc<FakeGeospatial>,
) -> TestApp {
    let config = Config::test_default();
    let cache = Arc::new(MemoryCache::new());
    let transitions = TransitionService::new(
        registry.clone(),
        geospatial.clone(),
        cache.clone(),
        config.cache_expiration,
    );

    let state = Arc::new(AppState {
        config,
        registry,
        geospatial,
        transitions,
        templates: TemplateRenderer::builtin().expect("built-in templates should compile"),
    });

    TestApp {
        router: create_router(state.clone()),
        state,
        cache,
    }
}

/// Issue a GET and return status plus body text.
#[allow(dead_code)]
pub async fn get(router: &axum::Router, uri: &str) -> (Response<Body>, String) {
    let response = router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let (parts, body) = response.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    (Response::from_parts(parts, Body::empty()), text)
}

/// Serve `router` on an ephemeral local port and return its base URL.
#[allow(dead_code)]
pub async fn spawn_mock_server(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}
