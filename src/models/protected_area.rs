// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Protected area records from the Protected Planet registry.

use crate::error::AppError;
use geo::{Area, MultiPolygon, Polygon};
use geojson::JsonObject;
use serde::{Deserialize, Serialize};

/// Simplified search result used by the index and search pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtectedAreaSummary {
    pub name: String,
    pub wdpaid: u64,
}

/// A protected area boundary with the rest of its registry record as
/// attributes.
#[derive(Debug, Clone)]
pub struct ProtectedAreaFeature {
    pub geometry: geojson::Geometry,
    pub properties: JsonObject,
}

impl ProtectedAreaFeature {
    /// Build a feature from a full registry record.
    ///
    /// The `geojson` member is removed and its `geometry` becomes the feature
    /// geometry; every other member is kept as an attribute.
    pub fn from_record(mut record: JsonObject) -> Result<Self, AppError> {
        let wdpaid = record
            .get("wdpa_id")
            .map(|v| v.to_string())
            .unwrap_or_else(|| "<unknown>".to_string());

        let geometry = match record.remove("geojson") {
            Some(serde_json::Value::Object(mut geojson)) => geojson.remove("geometry"),
            _ => None,
        }
        .filter(|g| !g.is_null())
        .ok_or(AppError::MissingGeometry(wdpaid))?;

        let geometry: geojson::Geometry = serde_json::from_value(geometry)
            .map_err(|e| AppError::Registry(format!("Invalid geometry: {}", e)))?;

        Ok(Self {
            geometry,
            properties: record,
        })
    }

    /// Boundary as a multipolygon, rejecting anything without area.
    pub fn footprint(&self) -> Result<MultiPolygon<f64>, AppError> {
        let footprint = convert_geometry(self.geometry.value.clone())?;
        if footprint.unsigned_area() <= 0.0 {
            return Err(AppError::DegenerateGeometry(
                "footprint has zero area".to_string(),
            ));
        }
        Ok(footprint)
    }

    /// GeoJSON representation returned to the browser.
    pub fn to_geojson(&self) -> geojson::Feature {
        let id = self
            .properties
            .get("wdpa_id")
            .and_then(|v| v.as_u64())
            .map(|n| geojson::feature::Id::Number(n.into()));

        geojson::Feature {
            bbox: None,
            geometry: Some(self.geometry.clone()),
            id,
            properties: Some(self.properties.clone()),
            foreign_members: None,
        }
    }
}

fn convert_geometry(value: geojson::Value) -> Result<MultiPolygon<f64>, AppError> {
    use std::convert::TryInto;

    let poly_result: Result<Polygon<f64>, _> = value.clone().try_into();
    if let Ok(poly) = poly_result {
        return Ok(MultiPolygon::new(vec![poly]));
    }

    let multi_result: Result<MultiPolygon<f64>, _> = value.try_into();
    if let Ok(multi) = multi_result {
        return Ok(multi);
    }

    Err(AppError::DegenerateGeometry(
        "expected Polygon or MultiPolygon".to_string(),
    ))
}

/// Validate a polygon identifier from a query string.
///
/// Identifiers are interpolated into registry URL paths and used as cache
/// keys, so only plain decimal digits are accepted.
pub fn validate_wdpaid(raw: &str) -> Result<&str, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::BadRequest(format!(
            "Invalid 'wdpaid' parameter: {:?}",
            raw
        )));
    }
    Ok(trimmed)
}
