//! Concrete [`GeometryProvider`] implementations.
//!
//! [`GeodesicGeometry`] works directly on WGS84 longitude/latitude layers:
//! buffers are geodesic circles and areas are measured on the ellipsoid, so
//! no layer reprojection is needed. [`PlanarGeometry`] works on projected
//! layers with linear map units and measures planar areas.

use geo::{
    Area, BooleanOps, Coord, Destination, GeodesicArea, Haversine, LineString, MultiPolygon,
    Point, Polygon,
};

use crate::{AreaMeasure, AreaUnit, DistanceUnit, GeometryProvider, Srs};

/// Number of segments used to approximate a circular buffer.
pub const BUFFER_SEGMENTS: u32 = 64;

/// Drops empty boolean-op results down to `None`.
fn non_empty(mp: MultiPolygon<f64>) -> Option<MultiPolygon<f64>> {
    if mp.0.is_empty() { None } else { Some(mp) }
}

/// Folds a slice of multipolygons into their union.
fn union_all(polygons: &[MultiPolygon<f64>]) -> Option<MultiPolygon<f64>> {
    let mut iter = polygons.iter();
    let first = iter.next()?.clone();
    non_empty(iter.fold(first, |acc, p| acc.union(p)))
}

/// Geometry provider for WGS84 longitude/latitude layers.
///
/// Buffers are [`BUFFER_SEGMENTS`]-vertex circles traced with haversine
/// destination points, and every area is the geodesic area on the
/// ellipsoid, converted into the configured [`AreaUnit`]. Reference areas
/// in source data must be expressed in that same unit.
#[derive(Debug, Clone, Copy)]
pub struct GeodesicGeometry {
    area_unit: AreaUnit,
}

impl GeodesicGeometry {
    /// Creates a provider reporting areas in `area_unit`.
    #[must_use]
    pub const fn new(area_unit: AreaUnit) -> Self {
        Self { area_unit }
    }
}

impl Default for GeodesicGeometry {
    fn default() -> Self {
        Self::new(AreaUnit::SquareMiles)
    }
}

impl GeometryProvider for GeodesicGeometry {
    fn srs(&self) -> Srs {
        Srs::Wgs84
    }

    fn measure(&self) -> AreaMeasure {
        AreaMeasure::Geodesic
    }

    fn area_unit(&self) -> AreaUnit {
        self.area_unit
    }

    fn buffer(
        &self,
        center: Point<f64>,
        distance: f64,
        unit: DistanceUnit,
    ) -> Option<MultiPolygon<f64>> {
        if !distance.is_finite() || distance <= 0.0 {
            return None;
        }
        let radius_m = unit.meters(distance);

        let exterior: Vec<Coord<f64>> = (0..BUFFER_SEGMENTS)
            .map(|i| {
                let bearing = f64::from(i) * 360.0 / f64::from(BUFFER_SEGMENTS);
                Haversine.destination(center, bearing, radius_m).into()
            })
            .collect();

        Some(MultiPolygon(vec![Polygon::new(
            LineString::from(exterior),
            vec![],
        )]))
    }

    fn difference(
        &self,
        a: &MultiPolygon<f64>,
        b: &MultiPolygon<f64>,
    ) -> Option<MultiPolygon<f64>> {
        non_empty(a.difference(b))
    }

    fn intersection(
        &self,
        a: &MultiPolygon<f64>,
        b: &MultiPolygon<f64>,
    ) -> Option<MultiPolygon<f64>> {
        non_empty(a.intersection(b))
    }

    fn union(&self, polygons: &[MultiPolygon<f64>]) -> Option<MultiPolygon<f64>> {
        union_all(polygons)
    }

    fn area(&self, polygon: &MultiPolygon<f64>) -> f64 {
        self.area_unit
            .from_square_meters(polygon.geodesic_area_unsigned())
    }
}

/// Geometry provider for projected layers with linear map units.
///
/// Buffers are Euclidean circles and areas are planar shoelace areas,
/// scaled from map units into the configured [`AreaUnit`] via the
/// provider's map-units-per-meter factor.
#[derive(Debug, Clone, Copy)]
pub struct PlanarGeometry {
    srs: Srs,
    /// Map units per meter (1.0 for a metric projected system).
    units_per_meter: f64,
    area_unit: AreaUnit,
}

impl PlanarGeometry {
    /// Creates a provider for a projected system.
    #[must_use]
    pub const fn new(srs: Srs, units_per_meter: f64, area_unit: AreaUnit) -> Self {
        Self {
            srs,
            units_per_meter,
            area_unit,
        }
    }
}

impl GeometryProvider for PlanarGeometry {
    fn srs(&self) -> Srs {
        self.srs
    }

    fn measure(&self) -> AreaMeasure {
        AreaMeasure::Planar
    }

    fn area_unit(&self) -> AreaUnit {
        self.area_unit
    }

    fn buffer(
        &self,
        center: Point<f64>,
        distance: f64,
        unit: DistanceUnit,
    ) -> Option<MultiPolygon<f64>> {
        if !distance.is_finite() || distance <= 0.0 {
            return None;
        }
        let radius = unit.meters(distance) * self.units_per_meter;

        let exterior: Vec<Coord<f64>> = (0..BUFFER_SEGMENTS)
            .map(|i| {
                let theta = f64::from(i) * std::f64::consts::TAU / f64::from(BUFFER_SEGMENTS);
                Coord {
                    x: center.x() + radius * theta.cos(),
                    y: center.y() + radius * theta.sin(),
                }
            })
            .collect();

        Some(MultiPolygon(vec![Polygon::new(
            LineString::from(exterior),
            vec![],
        )]))
    }

    fn difference(
        &self,
        a: &MultiPolygon<f64>,
        b: &MultiPolygon<f64>,
    ) -> Option<MultiPolygon<f64>> {
        non_empty(a.difference(b))
    }

    fn intersection(
        &self,
        a: &MultiPolygon<f64>,
        b: &MultiPolygon<f64>,
    ) -> Option<MultiPolygon<f64>> {
        non_empty(a.intersection(b))
    }

    fn union(&self, polygons: &[MultiPolygon<f64>]) -> Option<MultiPolygon<f64>> {
        union_all(polygons)
    }

    fn area(&self, polygon: &MultiPolygon<f64>) -> f64 {
        let square_meters = polygon.unsigned_area() / (self.units_per_meter * self.units_per_meter);
        self.area_unit.from_square_meters(square_meters)
    }
}
