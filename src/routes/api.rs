// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JSON endpoints used by the map page.

use crate::error::Result;
use crate::models::protected_area::validate_wdpaid;
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/getfeature", get(get_feature))
        .route("/details", get(get_details))
}

#[derive(Deserialize)]
struct WdpaQuery {
    wdpaid: String,
}

/// Protected area boundary and attributes as a GeoJSON Feature.
async fn get_feature(
    State(state): State<Arc<AppState>>,
    Query(params): Query<WdpaQuery>,
) -> Result<Json<geojson::Feature>> {
    let wdpaid = validate_wdpaid(&params.wdpaid)?;
    let feature = state.registry.fetch_feature(wdpaid).await?;
    Ok(Json(feature.to_geojson()))
}

/// Transition statistics for a protected area.
///
/// The body is the cached JSON string as stored, so repeated requests get
/// byte-identical responses.
async fn get_details(
    State(state): State<Arc<AppState>>,
    Query(params): Query<WdpaQuery>,
) -> Result<Response> {
    let wdpaid = validate_wdpaid(&params.wdpaid)?;
    let body = state.transitions.get_or_compute_stats(wdpaid).await?;
    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}
