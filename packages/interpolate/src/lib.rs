#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Dasymetric areal interpolation over one ring.
//!
//! For each candidate polygon intersecting a ring, the engine clips the
//! polygon to the ring, derives the fraction of the polygon's reference
//! area that falls inside, and reallocates that fraction of its population
//! — assuming uniform density over the source polygon. One call produces
//! one immutable [`RingTally`]; rings never share state, which is what
//! lets the site pipeline run them concurrently and fold the results
//! afterwards.
//!
//! Clipped and reference areas are compared under the geometry provider's
//! single configured measure; a candidate with an unusable reference area
//! is skipped with a warning, and a failed source query is recorded on the
//! tally instead of aborting sibling rings.

use ring_census_geometry::{GeometryProvider, guards};
use ring_census_rings::Ring;
use ring_census_source::{SpatialDataSource, SpatialPredicate};
use serde::Serialize;

/// One source polygon's contribution to a ring.
#[derive(Debug, Clone, Serialize)]
pub struct ClippedRecord {
    /// Identifier of the contributing source feature.
    pub feature_id: String,
    /// Area of the clipped portion, in the provider's area unit. Never
    /// exceeds the feature's reference area.
    pub clipped_area: f64,
    /// `clipped_area / reference_area`, clamped into `[0, 1]`.
    pub area_ratio: f64,
    /// Population reallocated to the ring, rounded half-up.
    pub population: u64,
}

/// Result of interpolating one ring. Immutable once returned.
#[derive(Debug, Clone, Serialize)]
pub struct RingTally {
    /// Position in the originating distance list.
    pub index: usize,
    /// Inner edge distance.
    pub inner_distance: f64,
    /// Outer edge distance.
    pub outer_distance: f64,
    /// Sum of all record populations.
    pub total_population: u64,
    /// Per-feature contributions, retained for feature-level consumers
    /// such as choropleth rendering.
    pub records: Vec<ClippedRecord>,
    /// Set when the source query for this ring failed; the tally then
    /// carries no contributions but siblings are unaffected.
    pub error: Option<String>,
}

impl RingTally {
    fn failed(ring: &Ring, message: String) -> Self {
        Self {
            index: ring.index,
            inner_distance: ring.inner_distance,
            outer_distance: ring.outer_distance,
            total_population: 0,
            records: Vec::new(),
            error: Some(message),
        }
    }
}

/// Interpolates the population inside one ring.
///
/// Deterministic for a fixed ring and data snapshot: querying and clipping
/// have no side effects, so calling this twice yields identical tallies.
pub async fn interpolate_ring(
    ring: &Ring,
    source: &dyn SpatialDataSource,
    provider: &dyn GeometryProvider,
) -> RingTally {
    let candidates = match source
        .query(&ring.geometry, SpatialPredicate::Intersects)
        .await
    {
        Ok(candidates) => candidates,
        Err(e) => {
            log::warn!(
                "Ring {}-{} query against '{}' failed: {e}",
                ring.inner_distance,
                ring.outer_distance,
                source.id()
            );
            return RingTally::failed(ring, e.to_string());
        }
    };

    let mut records = Vec::new();

    for candidate in &candidates {
        // A candidate can satisfy the envelope predicate while only
        // touching the ring; an empty clip is expected, not an error.
        let Some(clipped) = provider.intersection(&candidate.geometry, &ring.geometry) else {
            log::debug!(
                "Feature '{}' touches ring {} without interior overlap",
                candidate.id,
                ring.index
            );
            continue;
        };

        if !guards::valid_area(candidate.reference_area) {
            log::warn!(
                "Skipping feature '{}': unusable reference area {}",
                candidate.id,
                candidate.reference_area
            );
            continue;
        }

        // Floating-point or measure drift can push the clipped area past
        // the reference area; clamp so the ratio stays in [0, 1] and the
        // reallocated population never exceeds the source population.
        let clipped_area = provider.area(&clipped).min(candidate.reference_area);
        let area_ratio = guards::clamp_ratio(clipped_area / candidate.reference_area);
        let population = guards::round_population(area_ratio, candidate.population);

        records.push(ClippedRecord {
            feature_id: candidate.id.clone(),
            clipped_area,
            area_ratio,
            population,
        });
    }

    let total_population = records.iter().map(|r| r.population).sum();

    log::debug!(
        "Ring {}-{}: {} contributions from {} candidates, population {total_population}",
        ring.inner_distance,
        ring.outer_distance,
        records.len(),
        candidates.len()
    );

    RingTally {
        index: ring.index,
        inner_distance: ring.inner_distance,
        outer_distance: ring.outer_distance,
        total_population,
        records,
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use geo::{LineString, MultiPolygon, Polygon};
    use ring_census_geometry::{AreaUnit, PlanarGeometry, Srs};
    use ring_census_source::{AreaFeature, SourceError};

    fn square(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![Polygon::new(
            LineString::from(vec![
                (min_x, min_y),
                (max_x, min_y),
                (max_x, max_y),
                (min_x, max_y),
                (min_x, min_y),
            ]),
            vec![],
        )])
    }

    fn ring(index: usize, inner: f64, outer: f64, geometry: MultiPolygon<f64>) -> Ring {
        Ring {
            index,
            inner_distance: inner,
            outer_distance: outer,
            geometry,
        }
    }

    fn provider() -> PlanarGeometry {
        PlanarGeometry::new(Srs::WebMercator, 1.0, AreaUnit::SquareMeters)
    }

    /// Source serving a fixed feature list, filtered by intersection.
    struct FixedSource {
        features: Vec<AreaFeature>,
    }

    #[async_trait]
    impl SpatialDataSource for FixedSource {
        fn id(&self) -> &str {
            "fixed"
        }

        fn srs(&self) -> Srs {
            Srs::WebMercator
        }

        async fn query(
            &self,
            geometry: &MultiPolygon<f64>,
            _predicate: SpatialPredicate,
        ) -> Result<Vec<AreaFeature>, SourceError> {
            use geo::Intersects;
            Ok(self
                .features
                .iter()
                .filter(|f| f.geometry.intersects(geometry))
                .cloned()
                .collect())
        }
    }

    /// Source whose queries always fail.
    struct BrokenSource;

    #[async_trait]
    impl SpatialDataSource for BrokenSource {
        fn id(&self) -> &str {
            "broken"
        }

        fn srs(&self) -> Srs {
            Srs::WebMercator
        }

        async fn query(
            &self,
            _geometry: &MultiPolygon<f64>,
            _predicate: SpatialPredicate,
        ) -> Result<Vec<AreaFeature>, SourceError> {
            Err(SourceError::Conversion {
                message: "layer offline".to_string(),
            })
        }
    }

    fn feature(id: &str, geometry: MultiPolygon<f64>, population: f64, area: f64) -> AreaFeature {
        AreaFeature {
            id: id.to_string(),
            geometry,
            population,
            reference_area: area,
        }
    }

    #[tokio::test]
    async fn polygon_fully_inside_one_ring_keeps_all_population() {
        // Two disjoint "rings"; the feature sits entirely in the second.
        let inner_ring = ring(0, 0.0, 1.0, square(0.0, 0.0, 10.0, 10.0));
        let outer_ring = ring(1, 1.0, 2.0, square(20.0, 0.0, 30.0, 10.0));
        let source = FixedSource {
            features: vec![feature("f1", square(22.0, 2.0, 26.0, 6.0), 1_000.0, 16.0)],
        };
        let p = provider();

        let inner_tally = interpolate_ring(&inner_ring, &source, &p).await;
        let outer_tally = interpolate_ring(&outer_ring, &source, &p).await;

        assert_eq!(inner_tally.total_population, 0);
        assert!(inner_tally.records.is_empty());
        assert_eq!(outer_tally.total_population, 1_000);
        assert!((outer_tally.records[0].area_ratio - 1.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn half_overlapping_polygon_contributes_half() {
        // Feature spans x in [5, 15]; the ring covers x in [0, 10].
        let band = ring(1, 1.0, 2.0, square(0.0, 0.0, 10.0, 10.0));
        let source = FixedSource {
            features: vec![feature("f1", square(5.0, 0.0, 15.0, 10.0), 1_000.0, 100.0)],
        };

        let tally = interpolate_ring(&band, &source, &provider()).await;

        assert_eq!(tally.total_population, 500);
        assert!((tally.records[0].area_ratio - 0.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn zero_reference_area_candidate_is_skipped() {
        let band = ring(0, 0.0, 1.0, square(0.0, 0.0, 10.0, 10.0));
        let source = FixedSource {
            features: vec![
                feature("bad", square(1.0, 1.0, 3.0, 3.0), 500.0, 0.0),
                feature("good", square(4.0, 4.0, 6.0, 6.0), 200.0, 4.0),
            ],
        };

        let tally = interpolate_ring(&band, &source, &provider()).await;

        assert_eq!(tally.records.len(), 1);
        assert_eq!(tally.records[0].feature_id, "good");
        assert_eq!(tally.total_population, 200);
    }

    #[tokio::test]
    async fn clipped_area_exceeding_reference_clamps_to_full_population() {
        // True clipped area is 100; the recorded reference area is a hair
        // smaller, as happens when the two were measured differently.
        let band = ring(0, 0.0, 1.0, square(0.0, 0.0, 20.0, 20.0));
        let source = FixedSource {
            features: vec![feature(
                "f1",
                square(0.0, 0.0, 10.0, 10.0),
                12_345.0,
                99.999_9,
            )],
        };

        let tally = interpolate_ring(&band, &source, &provider()).await;

        let record = &tally.records[0];
        assert!((record.area_ratio - 1.0).abs() < f64::EPSILON);
        assert!(record.clipped_area <= 99.999_9);
        assert_eq!(record.population, 12_345);
    }

    #[tokio::test]
    async fn query_failure_lands_on_the_tally() {
        let band = ring(2, 2.0, 3.0, square(0.0, 0.0, 10.0, 10.0));

        let tally = interpolate_ring(&band, &BrokenSource, &provider()).await;

        assert_eq!(tally.index, 2);
        assert_eq!(tally.total_population, 0);
        assert!(tally.records.is_empty());
        assert!(tally.error.as_deref().unwrap().contains("layer offline"));
    }

    #[tokio::test]
    async fn interpolation_is_idempotent() {
        let band = ring(0, 0.0, 1.0, square(0.0, 0.0, 10.0, 10.0));
        let source = FixedSource {
            features: vec![
                feature("a", square(2.0, 2.0, 8.0, 8.0), 777.0, 36.0),
                feature("b", square(5.0, 5.0, 15.0, 15.0), 400.0, 100.0),
            ],
        };
        let p = provider();

        let first = interpolate_ring(&band, &source, &p).await;
        let second = interpolate_ring(&band, &source, &p).await;

        assert_eq!(first.total_population, second.total_population);
        assert_eq!(first.records.len(), second.records.len());
        for (a, b) in first.records.iter().zip(&second.records) {
            assert_eq!(a.feature_id, b.feature_id);
            assert_eq!(a.population, b.population);
            assert!((a.area_ratio - b.area_ratio).abs() < f64::EPSILON);
        }
    }
}
