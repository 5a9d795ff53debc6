#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geometry provider abstraction for ring-buffer population analysis.
//!
//! Buffering, boolean set operations, and area measurement are consumed
//! through the [`GeometryProvider`] trait so the interpolation engine never
//! touches a geometry backend directly. Each provider carries exactly one
//! area measure and one area unit; every area it reports (clipped areas and
//! the reference areas they are compared against) uses that single
//! configuration, so geodesic and planar measures can never be mixed within
//! one computation.
//!
//! Two providers are included: [`GeodesicGeometry`] for WGS84
//! longitude/latitude layers (the default) and [`PlanarGeometry`] for
//! projected layers with linear map units.

pub mod guards;
pub mod project;
mod providers;

pub use providers::{BUFFER_SEGMENTS, GeodesicGeometry, PlanarGeometry};

use std::fmt;
use std::str::FromStr;

use geo::{MultiPolygon, Point};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during geometry operations.
#[derive(Debug, Error)]
pub enum GeometryError {
    /// The provider cannot reproject into the requested reference system.
    #[error("Unsupported reprojection from {from} to {to}")]
    UnsupportedReprojection {
        /// Source reference system.
        from: Srs,
        /// Requested target reference system.
        to: Srs,
    },
}

/// Spatial reference systems understood by the providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Srs {
    /// Geographic longitude/latitude degrees (EPSG:4326).
    Wgs84,
    /// Spherical Web Mercator meters (EPSG:3857).
    WebMercator,
}

impl fmt::Display for Srs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wgs84 => write!(f, "EPSG:4326"),
            Self::WebMercator => write!(f, "EPSG:3857"),
        }
    }
}

/// Linear unit for ring distances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceUnit {
    /// Statute miles.
    Miles,
    /// Kilometers.
    Kilometers,
    /// Meters.
    Meters,
}

impl DistanceUnit {
    /// Converts a distance in this unit to meters.
    #[must_use]
    pub fn meters(self, distance: f64) -> f64 {
        match self {
            Self::Miles => distance * 1_609.344,
            Self::Kilometers => distance * 1_000.0,
            Self::Meters => distance,
        }
    }
}

impl fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Miles => write!(f, "miles"),
            Self::Kilometers => write!(f, "km"),
            Self::Meters => write!(f, "m"),
        }
    }
}

impl FromStr for DistanceUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "miles" | "mi" => Ok(Self::Miles),
            "kilometers" | "km" => Ok(Self::Kilometers),
            "meters" | "m" => Ok(Self::Meters),
            other => Err(format!("unknown distance unit: {other}")),
        }
    }
}

/// Areal unit for clipped and reference areas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaUnit {
    /// Square statute miles.
    SquareMiles,
    /// Square kilometers.
    SquareKilometers,
    /// Square meters.
    SquareMeters,
}

impl AreaUnit {
    /// Converts an area in square meters to this unit.
    #[must_use]
    pub fn from_square_meters(self, area: f64) -> f64 {
        match self {
            Self::SquareMiles => area / 2_589_988.110_336,
            Self::SquareKilometers => area / 1_000_000.0,
            Self::SquareMeters => area,
        }
    }
}

impl fmt::Display for AreaUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SquareMiles => write!(f, "sq mi"),
            Self::SquareKilometers => write!(f, "sq km"),
            Self::SquareMeters => write!(f, "sq m"),
        }
    }
}

impl FromStr for AreaUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "square_miles" | "sq-mi" | "sqmi" => Ok(Self::SquareMiles),
            "square_kilometers" | "sq-km" | "sqkm" => Ok(Self::SquareKilometers),
            "square_meters" | "sq-m" | "sqm" => Ok(Self::SquareMeters),
            other => Err(format!("unknown area unit: {other}")),
        }
    }
}

/// Which area measure a provider applies.
///
/// A provider reports the measure it was built with; it is informational
/// (logging, report metadata). The measure itself is fixed per provider
/// type and cannot vary call to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaMeasure {
    /// Geodesic area on the ellipsoid (WGS84 coordinates).
    Geodesic,
    /// Planar shoelace area (projected coordinates).
    Planar,
}

impl fmt::Display for AreaMeasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Geodesic => write!(f, "geodesic"),
            Self::Planar => write!(f, "planar"),
        }
    }
}

/// Geometric capabilities consumed by the ring builder and the
/// interpolation engine.
///
/// Degenerate results (empty buffers, empty differences or intersections)
/// are `None`, never an error; callers treat `None` as "no geometry".
pub trait GeometryProvider: Send + Sync {
    /// The spatial reference system this provider operates in. Layer
    /// geometries and the site point must be expressed in this system.
    fn srs(&self) -> Srs;

    /// The area measure this provider applies to every area it reports.
    fn measure(&self) -> AreaMeasure;

    /// The unit of every area this provider reports. Reference areas in
    /// source data must be expressed in the same unit.
    fn area_unit(&self) -> AreaUnit;

    /// Builds the polygon of all points within `distance` of `center`.
    ///
    /// Returns `None` for a non-positive or non-finite distance.
    fn buffer(
        &self,
        center: Point<f64>,
        distance: f64,
        unit: DistanceUnit,
    ) -> Option<MultiPolygon<f64>>;

    /// Boolean difference `a \ b`. `None` when nothing remains.
    fn difference(&self, a: &MultiPolygon<f64>, b: &MultiPolygon<f64>)
    -> Option<MultiPolygon<f64>>;

    /// Boolean intersection `a ∩ b`. `None` when the interiors do not
    /// overlap.
    fn intersection(
        &self,
        a: &MultiPolygon<f64>,
        b: &MultiPolygon<f64>,
    ) -> Option<MultiPolygon<f64>>;

    /// Union of all polygons. `None` for an empty input slice.
    fn union(&self, polygons: &[MultiPolygon<f64>]) -> Option<MultiPolygon<f64>>;

    /// Area of `polygon` under this provider's configured measure,
    /// expressed in [`Self::area_unit`].
    fn area(&self, polygon: &MultiPolygon<f64>) -> f64;

    /// Reprojects a WGS84 longitude/latitude point into `target`.
    ///
    /// The site point arrives as validated WGS84 coordinates; the pipeline
    /// uses this to express it in the layer's reference system before any
    /// buffering.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::UnsupportedReprojection`] if the provider
    /// has no projection into `target`.
    fn reproject_point(&self, point: Point<f64>, target: Srs) -> Result<Point<f64>, GeometryError> {
        match target {
            Srs::Wgs84 => Ok(point),
            Srs::WebMercator => Ok(project::wgs84_to_web_mercator(point)),
        }
    }
}
