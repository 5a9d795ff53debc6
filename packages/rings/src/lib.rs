#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Concentric ring polygon construction around a site point.
//!
//! Given an ascending distance list, each ring is the boolean difference
//! between consecutive buffer discs; the first ring is the innermost disc
//! itself. Together the rings partition the outermost disc: pairwise
//! disjoint, no gaps. A ring whose buffer or difference degenerates to
//! nothing is dropped with a warning rather than aborting the build;
//! downstream totals are simply smaller.

use geo::{MultiPolygon, Point};
use ring_census_geometry::{DistanceUnit, GeometryProvider};

/// One annular band around the site.
///
/// `index` is the position of `outer_distance` in the caller's distance
/// list, which stays stable even when sibling rings are dropped.
#[derive(Debug, Clone)]
pub struct Ring {
    /// Position in the originating distance list.
    pub index: usize,
    /// Inner edge distance; 0 for the innermost ring.
    pub inner_distance: f64,
    /// Outer edge distance.
    pub outer_distance: f64,
    /// Annular geometry, in the provider's reference system.
    pub geometry: MultiPolygon<f64>,
}

/// Builds ordered, non-overlapping rings covering the disc of the largest
/// distance.
///
/// `distances` must be strictly ascending and positive — the site pipeline
/// validates this before any geometry work. Degenerate rings are omitted,
/// so the result may be shorter than `distances`; an all-degenerate input
/// yields an empty vector, which callers treat as a failed site
/// computation.
#[must_use]
pub fn build_rings(
    center: Point<f64>,
    distances: &[f64],
    unit: DistanceUnit,
    provider: &dyn GeometryProvider,
) -> Vec<Ring> {
    let buffers: Vec<Option<MultiPolygon<f64>>> = distances
        .iter()
        .map(|&distance| provider.buffer(center, distance, unit))
        .collect();

    let mut rings = Vec::with_capacity(distances.len());

    for (index, outer_distance) in distances.iter().copied().enumerate() {
        let Some(outer) = buffers[index].as_ref() else {
            log::warn!("Dropping ring at {outer_distance} {unit}: degenerate buffer");
            continue;
        };

        let inner_distance = if index == 0 { 0.0 } else { distances[index - 1] };
        let inner = if index == 0 {
            None
        } else {
            buffers[index - 1].as_ref()
        };

        let geometry = match inner {
            Some(inner) => match provider.difference(outer, inner) {
                Some(diff) => diff,
                None => {
                    log::warn!(
                        "Dropping ring {inner_distance}-{outer_distance} {unit}: empty difference"
                    );
                    continue;
                }
            },
            // Innermost ring (or a degenerate inner buffer): the disc
            // itself is the ring.
            None => outer.clone(),
        };

        rings.push(Ring {
            index,
            inner_distance,
            outer_distance,
            geometry,
        });
    }

    log::debug!(
        "Built {} of {} rings around ({}, {})",
        rings.len(),
        distances.len(),
        center.x(),
        center.y()
    );

    rings
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{LineString, Polygon};
    use ring_census_geometry::{
        AreaMeasure, AreaUnit, GeodesicGeometry, GeometryError, Srs,
    };

    const CENTER: (f64, f64) = (-77.0369, 38.9072);

    fn provider() -> GeodesicGeometry {
        GeodesicGeometry::new(AreaUnit::SquareMiles)
    }

    #[test]
    fn rings_ascend_and_carry_distance_bounds() {
        let rings = build_rings(
            Point::new(CENTER.0, CENTER.1),
            &[1.0, 2.0, 3.0],
            DistanceUnit::Miles,
            &provider(),
        );
        assert_eq!(rings.len(), 3);
        assert!((rings[0].inner_distance).abs() < f64::EPSILON);
        assert!((rings[0].outer_distance - 1.0).abs() < f64::EPSILON);
        assert!((rings[2].inner_distance - 2.0).abs() < f64::EPSILON);
        assert!((rings[2].outer_distance - 3.0).abs() < f64::EPSILON);
        assert_eq!(rings[2].index, 2);
    }

    #[test]
    fn rings_partition_the_outer_disc() {
        let p = provider();
        let center = Point::new(CENTER.0, CENTER.1);
        let rings = build_rings(center, &[1.0, 2.0], DistanceUnit::Miles, &p);

        // Pairwise disjoint: shared boundary only, no interior overlap.
        let overlap = p
            .intersection(&rings[0].geometry, &rings[1].geometry)
            .map_or(0.0, |g| p.area(&g));
        assert!(overlap < 1e-6, "ring overlap area: {overlap}");

        // Union of the rings recovers the outer disc.
        let union = p
            .union(&[rings[0].geometry.clone(), rings[1].geometry.clone()])
            .unwrap();
        let disc = p.buffer(center, 2.0, DistanceUnit::Miles).unwrap();
        let diff = (p.area(&union) - p.area(&disc)).abs();
        assert!(diff < 1e-6, "union/disc area gap: {diff}");
    }

    #[test]
    fn single_distance_yields_a_disc() {
        let rings = build_rings(
            Point::new(CENTER.0, CENTER.1),
            &[2.5],
            DistanceUnit::Miles,
            &provider(),
        );
        assert_eq!(rings.len(), 1);
        assert!((rings[0].inner_distance).abs() < f64::EPSILON);
        let area = provider().area(&rings[0].geometry);
        let expected = std::f64::consts::PI * 2.5 * 2.5;
        assert!((area - expected).abs() / expected < 0.02);
    }

    #[test]
    fn empty_distances_yield_no_rings() {
        let rings = build_rings(
            Point::new(CENTER.0, CENTER.1),
            &[],
            DistanceUnit::Miles,
            &provider(),
        );
        assert!(rings.is_empty());
    }

    /// Provider whose differences always degenerate, to exercise the
    /// dropped-ring path.
    struct NoDifference;

    impl GeometryProvider for NoDifference {
        fn srs(&self) -> Srs {
            Srs::WebMercator
        }

        fn measure(&self) -> AreaMeasure {
            AreaMeasure::Planar
        }

        fn area_unit(&self) -> AreaUnit {
            AreaUnit::SquareMeters
        }

        fn buffer(
            &self,
            center: Point<f64>,
            distance: f64,
            _unit: DistanceUnit,
        ) -> Option<MultiPolygon<f64>> {
            let d = distance;
            Some(MultiPolygon(vec![Polygon::new(
                LineString::from(vec![
                    (center.x() - d, center.y() - d),
                    (center.x() + d, center.y() - d),
                    (center.x() + d, center.y() + d),
                    (center.x() - d, center.y() + d),
                    (center.x() - d, center.y() - d),
                ]),
                vec![],
            )]))
        }

        fn difference(
            &self,
            _a: &MultiPolygon<f64>,
            _b: &MultiPolygon<f64>,
        ) -> Option<MultiPolygon<f64>> {
            None
        }

        fn intersection(
            &self,
            _a: &MultiPolygon<f64>,
            _b: &MultiPolygon<f64>,
        ) -> Option<MultiPolygon<f64>> {
            None
        }

        fn union(&self, _polygons: &[MultiPolygon<f64>]) -> Option<MultiPolygon<f64>> {
            None
        }

        fn area(&self, _polygon: &MultiPolygon<f64>) -> f64 {
            0.0
        }

        fn reproject_point(
            &self,
            point: Point<f64>,
            _target: Srs,
        ) -> Result<Point<f64>, GeometryError> {
            Ok(point)
        }
    }

    #[test]
    fn degenerate_difference_drops_ring_without_aborting() {
        let rings = build_rings(
            Point::new(0.0, 0.0),
            &[1.0, 2.0, 3.0],
            DistanceUnit::Meters,
            &NoDifference,
        );
        // Only the innermost disc survives; outer rings need a difference.
        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0].index, 0);
    }
}
