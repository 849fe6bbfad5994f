//! Web Mercator (EPSG:3857) to WGS84 conversion.
//!
//! The factory canvas stores coordinates in Web Mercator meters; the
//! map client wants longitude/latitude degrees.

use std::f64::consts::PI;

/// Half the Web Mercator circumference, in meters.
const HALF_CIRCUMFERENCE: f64 = 20_037_508.34;

/// Converts Web Mercator meters to (longitude, latitude) degrees.
#[must_use]
pub fn to_lng_lat(x: f64, y: f64) -> (f64, f64) {
    let lng = (x / HALF_CIRCUMFERENCE) * 180.0;
    let lat = (y / HALF_CIRCUMFERENCE) * 180.0;
    let lat = 180.0 / PI * (2.0 * (lat * PI / 180.0).exp().atan() - PI / 2.0);
    (lng, lat)
}
