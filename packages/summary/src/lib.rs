#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Folds per-ring tallies into the final site report.
//!
//! Tallies arrive in whatever order the concurrent per-ring computations
//! complete; aggregation sorts by ring index before folding, so completion
//! order can never reorder the report. Labels come from a single
//! formatting function — every consumer sees the same `"0-1 miles"`
//! convention.

use ring_census_geometry::DistanceUnit;
use ring_census_interpolate::{ClippedRecord, RingTally};
use serde::Serialize;

/// One labeled ring in the final report.
#[derive(Debug, Clone, Serialize)]
pub struct RingReport {
    /// Human-readable band label, e.g. `"1-3 miles"`.
    pub label: String,
    /// Inner edge distance.
    pub inner_distance: f64,
    /// Outer edge distance.
    pub outer_distance: f64,
    /// Population reallocated into this ring.
    pub total_population: u64,
    /// Per-feature contributions, for feature-level consumers.
    pub records: Vec<ClippedRecord>,
    /// Whether this ring's source query failed; a failed ring contributes
    /// zero population and marks the report incomplete.
    pub failed: bool,
}

/// Terminal output of a site computation. Immutable once returned.
#[derive(Debug, Clone, Serialize)]
pub struct SiteReport {
    /// Opaque site name supplied by the caller.
    pub site_name: String,
    /// Site latitude (WGS84).
    pub latitude: f64,
    /// Site longitude (WGS84).
    pub longitude: f64,
    /// Distance unit the ring labels are expressed in.
    pub unit: DistanceUnit,
    /// Rings in ascending distance order.
    pub rings: Vec<RingReport>,
    /// Sum of every ring's total population.
    pub grand_total_population: u64,
    /// `false` when any ring's source query failed; the report is usable
    /// but some area could not be attributed.
    pub complete: bool,
}

/// Formats the canonical ring band label.
///
/// The innermost ring is always labeled from 0, e.g. `"0-1 miles"`.
/// Whole-number distances print without a decimal point.
#[must_use]
pub fn ring_label(inner_distance: f64, outer_distance: f64, unit: DistanceUnit) -> String {
    format!(
        "{}-{} {unit}",
        format_distance(inner_distance),
        format_distance(outer_distance)
    )
}

fn format_distance(distance: f64) -> String {
    if distance.fract() == 0.0 {
        format!("{distance:.0}")
    } else {
        format!("{distance}")
    }
}

/// Folds per-ring tallies into a [`SiteReport`].
///
/// Order-independent: tallies are keyed by ring index, never by arrival
/// order. The grand total is exactly the sum of ring totals; each source
/// polygon was counted in at most one ring because rings are disjoint.
#[must_use]
pub fn aggregate(
    site_name: &str,
    latitude: f64,
    longitude: f64,
    unit: DistanceUnit,
    mut tallies: Vec<RingTally>,
) -> SiteReport {
    tallies.sort_unstable_by_key(|tally| tally.index);

    let mut rings = Vec::with_capacity(tallies.len());
    let mut grand_total_population: u64 = 0;
    let mut complete = true;

    for tally in tallies {
        if let Some(reason) = &tally.error {
            log::warn!(
                "Ring {} of site '{site_name}' is incomplete: {reason}",
                ring_label(tally.inner_distance, tally.outer_distance, unit)
            );
            complete = false;
        }

        grand_total_population += tally.total_population;
        rings.push(RingReport {
            label: ring_label(tally.inner_distance, tally.outer_distance, unit),
            inner_distance: tally.inner_distance,
            outer_distance: tally.outer_distance,
            total_population: tally.total_population,
            records: tally.records,
            failed: tally.error.is_some(),
        });
    }

    SiteReport {
        site_name: site_name.to_string(),
        latitude,
        longitude,
        unit,
        rings,
        grand_total_population,
        complete,
    }
}
