#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! End-to-end site computation pipeline.
//!
//! Validates the caller's input before any geometry work, builds the
//! concentric rings, fans the per-ring interpolation out under a bounded
//! concurrency limit, gathers **all** tallies, and aggregates them once.
//! Rings share no mutable state; the fold happens strictly after every
//! ring has resolved, keyed by ring index rather than completion order.
//!
//! [`session::SiteSession`] adds the interactive-caller guard: when a new
//! site is submitted before the previous computation finishes, the stale
//! result is discarded instead of overwriting the newer report.

pub mod session;

use futures::stream::{self, StreamExt as _};
use geo::Point;
use ring_census_geometry::{DistanceUnit, GeometryError, GeometryProvider, Srs};
use ring_census_interpolate::{RingTally, interpolate_ring};
use ring_census_rings::build_rings;
use ring_census_source::SpatialDataSource;
use ring_census_summary::{SiteReport, aggregate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that abort a whole site computation.
///
/// Per-ring and per-candidate degeneracies are absorbed inside the
/// pipeline and only show up as smaller totals (and `complete == false`
/// for failed ring queries); the variants here are the hard stops.
#[derive(Debug, Error)]
pub enum SiteError {
    /// The caller's input was rejected before any geometry work.
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Description of what was rejected.
        message: String,
    },

    /// Point reprojection into the layer's reference system failed.
    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    /// The layer and the geometry provider disagree on the reference
    /// system; areas and clips would be meaningless.
    #[error("Layer '{layer}' is in {layer_srs} but the geometry provider operates in {provider_srs}")]
    SrsMismatch {
        /// Source identifier.
        layer: String,
        /// The layer's reference system.
        layer_srs: Srs,
        /// The provider's reference system.
        provider_srs: Srs,
    },

    /// Every ring degenerated; there is nothing to interpolate.
    #[error("No usable rings could be constructed for site '{site}'")]
    NoRings {
        /// Site name from the input.
        site: String,
    },
}

/// A validated site computation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteInput {
    /// Opaque site name carried through to the report.
    pub name: String,
    /// Site latitude (WGS84).
    pub latitude: f64,
    /// Site longitude (WGS84).
    pub longitude: f64,
    /// Ring distances: strictly ascending, all positive.
    pub distances: Vec<f64>,
    /// Unit the distances are expressed in.
    pub unit: DistanceUnit,
}

impl SiteInput {
    /// Checks the input without performing any geometry work.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::InvalidInput`] for out-of-range coordinates or
    /// an empty, non-positive, non-finite, or non-ascending distance list.
    pub fn validate(&self) -> Result<(), SiteError> {
        let invalid = |message: String| SiteError::InvalidInput { message };

        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(invalid(format!(
                "latitude {} outside [-90, 90]",
                self.latitude
            )));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(invalid(format!(
                "longitude {} outside [-180, 180]",
                self.longitude
            )));
        }
        if self.distances.is_empty() {
            return Err(invalid("distance list is empty".to_string()));
        }
        for pair in self.distances.windows(2) {
            if pair[1] <= pair[0] {
                return Err(invalid(format!(
                    "distances must be strictly ascending: {} then {}",
                    pair[0], pair[1]
                )));
            }
        }
        if let Some(&bad) = self
            .distances
            .iter()
            .find(|d| !d.is_finite() || **d <= 0.0)
        {
            return Err(invalid(format!("distance {bad} is not a positive number")));
        }
        Ok(())
    }
}

/// Tuning knobs for a site computation.
#[derive(Debug, Clone)]
pub struct SiteOptions {
    /// Maximum rings interpolated concurrently. Bounds the query load on
    /// the spatial data source.
    pub concurrency: usize,
}

impl Default for SiteOptions {
    fn default() -> Self {
        Self { concurrency: 4 }
    }
}

/// Runs one full site computation.
///
/// # Errors
///
/// Returns [`SiteError`] for invalid input, a layer/provider reference
/// system mismatch, a failed site-point reprojection, or an all-degenerate
/// ring build. Per-ring query failures do **not** error; they surface as
/// `complete == false` on the returned report.
pub async fn compute_site(
    input: &SiteInput,
    source: &dyn SpatialDataSource,
    provider: &dyn GeometryProvider,
    options: &SiteOptions,
) -> Result<SiteReport, SiteError> {
    input.validate()?;

    if source.srs() != provider.srs() {
        return Err(SiteError::SrsMismatch {
            layer: source.id().to_string(),
            layer_srs: source.srs(),
            provider_srs: provider.srs(),
        });
    }

    let site_wgs84 = Point::new(input.longitude, input.latitude);
    let center = provider.reproject_point(site_wgs84, provider.srs())?;

    let rings = build_rings(center, &input.distances, input.unit, provider);
    if rings.is_empty() {
        return Err(SiteError::NoRings {
            site: input.name.clone(),
        });
    }

    let concurrency = options.concurrency.max(1);
    log::info!(
        "Computing site '{}': {} rings against layer '{}' (concurrency={concurrency})",
        input.name,
        rings.len(),
        source.id()
    );

    // Fan out per-ring work, then gather the complete set of tallies
    // before aggregating; the aggregator re-keys by ring index, so the
    // unordered completion here is harmless.
    let tallies: Vec<RingTally> = stream::iter(
        rings
            .iter()
            .map(|ring| interpolate_ring(ring, source, provider)),
    )
    .buffer_unordered(concurrency)
    .collect()
    .await;

    let report = aggregate(
        &input.name,
        input.latitude,
        input.longitude,
        input.unit,
        tallies,
    );

    log::info!(
        "Site '{}': population {} across {} rings{}",
        report.site_name,
        report.grand_total_population,
        report.rings.len(),
        if report.complete { "" } else { " (partial)" }
    );

    Ok(report)
}
