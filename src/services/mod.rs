// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - remote clients, caching and business logic.

pub mod cache;
pub mod credentials;
pub mod earth_engine;
pub mod registry;
pub mod transitions;

pub use cache::{CacheStore, MemoryCache, ReadThroughCache};
pub use credentials::ServiceAccountCredentials;
pub use earth_engine::{EarthEngineClient, GeospatialClient};
pub use registry::{ProtectedPlanetClient, RegistryClient};
pub use transitions::TransitionService;
