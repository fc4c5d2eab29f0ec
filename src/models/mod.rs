// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod protected_area;
pub mod transition;

pub use protected_area::{ProtectedAreaFeature, ProtectedAreaSummary};
pub use transition::{GroupSum, LookupKind, LookupTable, MapTileDescriptor, TransitionStat};
