// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Surface-water transition classes and per-polygon statistics.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const SQUARE_METERS_PER_SQUARE_KILOMETER: f64 = 1_000_000.0;

/// Transition class code to name or display color.
pub type LookupTable = BTreeMap<i64, String>;

/// Which lookup table to build from the dataset metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    Names,
    Colors,
}

impl LookupKind {
    /// Cache key the table is stored under.
    pub fn cache_key(self) -> &'static str {
        match self {
            LookupKind::Names => "lookup",
            LookupKind::Colors => "color",
        }
    }

    /// Dataset property holding the values parallel to `transition_class_values`.
    pub fn metadata_property(self) -> &'static str {
        match self {
            LookupKind::Names => "transition_class_names",
            LookupKind::Colors => "transition_class_palette",
        }
    }

    fn table_name(self) -> &'static str {
        match self {
            LookupKind::Names => "name",
            LookupKind::Colors => "color",
        }
    }
}

/// Zip the parallel class value and name/color lists from dataset metadata.
pub fn zip_lookup(values: Vec<i64>, labels: Vec<String>) -> Result<LookupTable, AppError> {
    if values.len() != labels.len() {
        return Err(AppError::Geospatial(format!(
            "transition class metadata lists differ in length ({} values, {} labels)",
            values.len(),
            labels.len()
        )));
    }
    Ok(values.into_iter().zip(labels).collect())
}

/// Raw grouped-sum row from the reduction query (area in square meters).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSum {
    pub transition_class_value: i64,
    pub sum: f64,
}

/// One transition class observed inside a polygon.
///
/// Serialized as `[label, area_km2, color]`, the shape the map client charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "(String, f64, String)",
    into = "(String, f64, String)"
)]
pub struct TransitionStat {
    pub label: String,
    pub area_km2: f64,
    pub color: String,
}

impl From<(String, f64, String)> for TransitionStat {
    fn from((label, area_km2, color): (String, f64, String)) -> Self {
        Self {
            label,
            area_km2,
            color,
        }
    }
}

impl From<TransitionStat> for (String, f64, String) {
    fn from(stat: TransitionStat) -> Self {
        (stat.label, stat.area_km2, stat.color)
    }
}

/// Convert raw group sums to labelled statistics.
///
/// Every class code must be present in both tables; there is no fallback
/// label, not even for code 0.
pub fn join_transition_stats(
    sums: &[GroupSum],
    names: &LookupTable,
    colors: &LookupTable,
) -> Result<Vec<TransitionStat>, AppError> {
    sums.iter()
        .map(|group| {
            let code = group.transition_class_value;
            let label = lookup(names, LookupKind::Names, code)?;
            let color = lookup(colors, LookupKind::Colors, code)?;
            Ok(TransitionStat {
                label: label.clone(),
                area_km2: group.sum / SQUARE_METERS_PER_SQUARE_KILOMETER,
                color: color.clone(),
            })
        })
        .collect()
}

fn lookup(table: &LookupTable, kind: LookupKind, code: i64) -> Result<&String, AppError> {
    table.get(&code).ok_or(AppError::MissingLookup {
        table: kind.table_name(),
        code,
    })
}

/// Identifier pair the browser uses to pull map tiles straight from Earth Engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapTileDescriptor {
    pub mapid: String,
    pub token: String,
    /// `{z}/{x}/{y}` URL template for the tiles
    pub tile_url: String,
}
