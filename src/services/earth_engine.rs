// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Earth Engine REST client for the JRC Global Surface Water dataset.
//!
//! Handles:
//! - Map tile descriptors for the `transition` band
//! - Grouped pixel-area reductions over a protected area footprint
//! - Transition class metadata (names and palette)
//!
//! Requests are expression graphs evaluated by the `v1` REST API.

use crate::error::AppError;
use crate::models::transition::zip_lookup;
use crate::models::{GroupSum, LookupKind, LookupTable, MapTileDescriptor, ProtectedAreaFeature};
use crate::services::credentials::ServiceAccountCredentials;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use std::sync::Arc;

pub const DATASET_ID: &str = "JRC/GSW1_0/GlobalSurfaceWater";
pub const TRANSITION_BAND: &str = "transition";
/// Analysis scale in meters. Fixed for every reduction.
pub const ANALYSIS_SCALE: f64 = 150.0;

const GROUP_NAME: &str = "transition_class_value";
const CLASS_VALUES_PROPERTY: &str = "transition_class_values";
const MAX_PIXELS: f64 = 1e13;

/// Remote geospatial engine operations used by the handlers.
#[async_trait]
pub trait GeospatialClient: Send + Sync {
    /// Request a tile-serving map for the transition band.
    async fn fetch_map_tile_descriptor(&self) -> Result<MapTileDescriptor, AppError>;

    /// Sum pixel areas (m²) per transition class inside the feature.
    async fn compute_transition_stats(
        &self,
        feature: &ProtectedAreaFeature,
        scale: f64,
    ) -> Result<Vec<GroupSum>, AppError>;

    /// Class value → name or color, from the dataset's own metadata.
    async fn fetch_category_metadata(&self, kind: LookupKind) -> Result<LookupTable, AppError>;
}

/// Earth Engine client authenticated with a service account.
#[derive(Clone)]
pub struct EarthEngineClient {
    http: reqwest::Client,
    base_url: String,
    project: String,
    credentials: Arc<ServiceAccountCredentials>,
}

#[derive(Debug, Deserialize)]
struct ComputeValueResponse {
    result: Value,
}

#[derive(Debug, Deserialize)]
struct ReduceRegionResult {
    #[serde(default)]
    groups: Vec<GroupSum>,
}

#[derive(Debug, Deserialize)]
struct MapResponse {
    name: String,
    #[serde(default)]
    token: String,
}

impl EarthEngineClient {
    pub fn new(
        http: reqwest::Client,
        base_url: &str,
        project: &str,
        credentials: Arc<ServiceAccountCredentials>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            project: project.to_string(),
            credentials,
        }
    }

    /// Evaluate an expression graph and return its result.
    async fn compute_value<T: DeserializeOwned>(&self, expression: Value) -> Result<T, AppError> {
        let url = format!("{}/projects/{}/value:compute", self.base_url, self.project);
        let response: ComputeValueResponse = self
            .post_json(&url, &json!({ "expression": expression }))
            .await?;

        serde_json::from_value(response.result)
            .map_err(|e| AppError::Geospatial(format!("Unexpected result shape: {}", e)))
    }

    async fn post_json<T: DeserializeOwned>(&self, url: &str, body: &Value) -> Result<T, AppError> {
        let access_token = self.credentials.access_token().await?;

        let response = self
            .http
            .post(url)
            .bearer_auth(access_token)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::Geospatial(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                tracing::warn!("Earth Engine rate limit hit (429)");
            }

            return Err(AppError::Geospatial(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Geospatial(format!("JSON parse error: {}", e)))
    }
}

#[async_trait]
impl GeospatialClient for EarthEngineClient {
    async fn fetch_map_tile_descriptor(&self) -> Result<MapTileDescriptor, AppError> {
        let url = format!("{}/projects/{}/maps", self.base_url, self.project);
        let body = json!({
            "expression": expr::graph(transition_band()),
            "fileFormat": "AUTO_JPEG_PNG",
            "bandIds": [TRANSITION_BAND],
        });

        let map: MapResponse = self.post_json(&url, &body).await?;
        tracing::info!(map = %map.name, "Earth Engine map created");

        Ok(MapTileDescriptor {
            tile_url: format!("{}/{}/tiles/{{z}}/{{x}}/{{y}}", self.base_url, map.name),
            mapid: map.name,
            token: map.token,
        })
    }

    async fn compute_transition_stats(
        &self,
        feature: &ProtectedAreaFeature,
        scale: f64,
    ) -> Result<Vec<GroupSum>, AppError> {
        // Reject degenerate footprints before spending a remote call.
        feature.footprint()?;

        let expression = expr::graph(grouped_area_sum(geometry_node(&feature.geometry)?, scale));
        let result: ReduceRegionResult = self.compute_value(expression).await?;

        tracing::info!(groups = result.groups.len(), scale, "Transition areas computed");
        Ok(result.groups)
    }

    async fn fetch_category_metadata(&self, kind: LookupKind) -> Result<LookupTable, AppError> {
        let expression = expr::graph(expr::array(vec![
            dataset_property(CLASS_VALUES_PROPERTY),
            dataset_property(kind.metadata_property()),
        ]));

        let (values, labels): (Vec<i64>, Vec<String>) = self.compute_value(expression).await?;
        tracing::info!(property = kind.metadata_property(), count = values.len(), "Fetched class metadata");
        zip_lookup(values, labels)
    }
}

/// Expression graph node builders.
mod expr {
    use serde_json::{json, Value};

    pub fn graph(root: Value) -> Value {
        json!({ "result": "0", "values": { "0": root } })
    }

    pub fn constant(value: Value) -> Value {
        json!({ "constantValue": value })
    }

    pub fn array(values: Vec<Value>) -> Value {
        json!({ "arrayValue": { "values": values } })
    }

    pub fn invoke(function: &str, arguments: Value) -> Value {
        json!({
            "functionInvocationValue": {
                "functionName": function,
                "arguments": arguments,
            }
        })
    }
}

fn dataset() -> Value {
    expr::invoke("Image.load", json!({ "id": expr::constant(json!(DATASET_ID)) }))
}

fn transition_band() -> Value {
    expr::invoke(
        "Image.select",
        json!({
            "input": dataset(),
            "bandSelectors": expr::constant(json!([TRANSITION_BAND])),
        }),
    )
}

fn dataset_property(property: &str) -> Value {
    expr::invoke(
        "Element.get",
        json!({ "object": dataset(), "property": expr::constant(json!(property)) }),
    )
}

/// `pixelArea().addBands(transition).reduceRegion(sum().group(1, ...))`
fn grouped_area_sum(geometry: Value, scale: f64) -> Value {
    let image = expr::invoke(
        "Image.addBands",
        json!({
            "dstImg": expr::invoke("Image.pixelArea", json!({})),
            "srcImg": transition_band(),
        }),
    );
    let reducer = expr::invoke(
        "Reducer.group",
        json!({
            "reducer": expr::invoke("Reducer.sum", json!({})),
            "groupField": expr::constant(json!(1)),
            "groupName": expr::constant(json!(GROUP_NAME)),
        }),
    );

    expr::invoke(
        "Image.reduceRegion",
        json!({
            "image": image,
            "reducer": reducer,
            "geometry": geometry,
            "scale": expr::constant(json!(scale)),
            "maxPixels": expr::constant(json!(MAX_PIXELS)),
        }),
    )
}

fn geometry_node(geometry: &geojson::Geometry) -> Result<Value, AppError> {
    let (constructor, coordinates) = match &geometry.value {
        geojson::Value::Polygon(rings) => ("GeometryConstructors.Polygon", json!(rings)),
        geojson::Value::MultiPolygon(polygons) => {
            ("GeometryConstructors.MultiPolygon", json!(polygons))
        }
        _ => {
            return Err(AppError::DegenerateGeometry(
                "expected Polygon or MultiPolygon".to_string(),
            ))
        }
    };

    Ok(expr::invoke(
        constructor,
        json!({ "coordinates": expr::constant(coordinates) }),
    ))
}
