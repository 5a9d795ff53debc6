#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Spatial data source trait and implementations.
//!
//! The interpolation engine queries areal population data through the
//! [`SpatialDataSource`] trait: given a query polygon and a spatial
//! predicate, a source returns candidate polygons carrying a population and
//! a reference area. [`layer::MemoryLayer`] is the bundled implementation —
//! a `GeoJSON` `FeatureCollection` loaded into an R-tree for fast envelope
//! pre-filtering, fetched from a local file or any URL that returns
//! standard `GeoJSON` (see [`fetch`]).

pub mod fetch;
pub mod layer;
pub mod parse;

use std::fmt;

use async_trait::async_trait;
use geo::MultiPolygon;
use ring_census_geometry::Srs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during spatial data source operations.
#[derive(Debug, Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error (file read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Data conversion error.
    #[error("Conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}

/// Spatial relationship used to select candidate features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpatialPredicate {
    /// Candidate geometry intersects the query geometry.
    Intersects,
}

impl fmt::Display for SpatialPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Intersects => write!(f, "intersects"),
        }
    }
}

/// An areal unit with the attributes needed for dasymetric redistribution.
///
/// Read-only input: the engine never mutates source features.
#[derive(Debug, Clone)]
pub struct AreaFeature {
    /// Stable feature identifier (from the configured id field, or a
    /// load-order fallback).
    pub id: String,
    /// Feature geometry, in the layer's reference system.
    pub geometry: MultiPolygon<f64>,
    /// Total population of the areal unit. Non-negative.
    pub population: f64,
    /// Reference area of the areal unit, in the same unit the geometry
    /// provider reports clipped areas in. Values that are missing, zero,
    /// negative, or `NaN` cause the feature to be skipped at
    /// interpolation time.
    pub reference_area: f64,
}

/// Property names for extracting attributes from raw `GeoJSON` features.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerFields {
    /// Property holding a stable feature identifier. Optional; features
    /// fall back to a load-order id.
    pub id: Option<String>,
    /// Property holding the population count.
    pub population: String,
    /// Property holding the reference area.
    pub area: String,
}

/// Trait that all spatial data sources implement.
///
/// Query latency and partial failure are the source's concern; the engine
/// treats a query as a black-box async operation that can fail, and a
/// failed query never aborts sibling rings.
#[async_trait]
pub trait SpatialDataSource: Send + Sync {
    /// Returns a unique identifier for this source (e.g., a layer name).
    fn id(&self) -> &str;

    /// The spatial reference system the layer's geometries are expressed
    /// in. Must match the geometry provider's system.
    fn srs(&self) -> Srs;

    /// Returns all features satisfying `predicate` against `geometry`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the query fails.
    async fn query(
        &self,
        geometry: &MultiPolygon<f64>,
        predicate: SpatialPredicate,
    ) -> Result<Vec<AreaFeature>, SourceError>;
}
