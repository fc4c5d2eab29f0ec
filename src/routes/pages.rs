// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTML pages: protected area index, search results and the map page.

use crate::error::Result;
use crate::templates::{INDEX_TEMPLATE, SEARCH_TEMPLATE, SITE_TEMPLATE};
use crate::AppState;
use axum::{
    extract::{Query, State},
    response::Html,
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tera::Context;

/// Registry pages fetched to build the landing page index.
pub const INDEX_PAGE_COUNT: u32 = 4;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index))
        .route("/site", get(site))
        .route("/search", get(search))
}

/// Landing page listing every protected area in the first index pages.
async fn index(State(state): State<Arc<AppState>>) -> Result<Html<String>> {
    let items = state.registry.fetch_all_pages(INDEX_PAGE_COUNT).await?;
    tracing::debug!(count = items.len(), "Built protected area index");

    let mut context = Context::new();
    context.insert("items", &items);
    Ok(Html(state.templates.render(INDEX_TEMPLATE, &context)?))
}

#[derive(Deserialize)]
struct SiteQuery {
    /// Passed through to the page; the browser uses it for later requests.
    wdpaid: Option<String>,
}

/// Map page for one protected area.
async fn site(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SiteQuery>,
) -> Result<Html<String>> {
    let descriptor = state.geospatial.fetch_map_tile_descriptor().await?;

    let mut context = Context::new();
    context.insert("ee_map_id", &descriptor.mapid);
    context.insert("ee_token", &descriptor.token);
    context.insert("tile_url", &descriptor.tile_url);
    context.insert("wdpaid", &params.wdpaid.unwrap_or_default());
    Ok(Html(state.templates.render(SITE_TEMPLATE, &context)?))
}

#[derive(Deserialize)]
struct SearchQuery {
    /// Registry page number (1-indexed)
    #[serde(default = "default_page")]
    page: u32,
}

fn default_page() -> u32 {
    1
}

/// One page of registry search results as an HTML list.
async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> Result<Html<String>> {
    let items = state.registry.search_by_designation(params.page).await?;

    let mut context = Context::new();
    context.insert("items", &items);
    Ok(Html(state.templates.render(SEARCH_TEMPLATE, &context)?))
}
