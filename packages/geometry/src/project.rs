//! Spherical Web Mercator point projection (EPSG:4326 <-> EPSG:3857).
//!
//! Only point reprojection is provided; whole-layer reprojection belongs to
//! the upstream data pipeline that prepares the layer.

use geo::Point;

/// WGS84 semi-major axis, the Web Mercator sphere radius.
pub const EARTH_RADIUS_METERS: f64 = 6_378_137.0;

/// Projects a WGS84 longitude/latitude point to Web Mercator meters.
#[must_use]
pub fn wgs84_to_web_mercator(point: Point<f64>) -> Point<f64> {
    let x = EARTH_RADIUS_METERS * point.x().to_radians();
    let y = EARTH_RADIUS_METERS
        * (std::f64::consts::FRAC_PI_4 + point.y().to_radians() / 2.0)
            .tan()
            .ln();
    Point::new(x, y)
}

/// Projects a Web Mercator point back to WGS84 longitude/latitude degrees.
#[must_use]
pub fn web_mercator_to_wgs84(point: Point<f64>) -> Point<f64> {
    let lng = (point.x() / EARTH_RADIUS_METERS).to_degrees();
    let lat = (2.0 * (point.y() / EARTH_RADIUS_METERS).exp().atan()
        - std::f64::consts::FRAC_PI_2)
        .to_degrees();
    Point::new(lng, lat)
}
