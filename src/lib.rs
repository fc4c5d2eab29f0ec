// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Water Transitions: surface-water change inside protected areas
//!
//! This crate provides the backend for a map client that browses protected
//! areas from Protected Planet and shows how surface water changed inside
//! them, using the JRC Global Surface Water dataset on Earth Engine.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod templates;

use config::Config;
use services::{GeospatialClient, RegistryClient, TransitionService};
use std::sync::Arc;
use templates::TemplateRenderer;

/// Shared application state, built once at startup.
pub struct AppState {
    pub config: Config,
    pub registry: Arc<dyn RegistryClient>,
    pub geospatial: Arc<dyn GeospatialClient>,
    pub transitions: TransitionService,
    pub templates: TemplateRenderer,
}
