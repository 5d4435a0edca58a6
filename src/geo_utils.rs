//! Geographic utilities: great-circle distance, bounds and unit helpers.
//!
//! Every kilometer figure in the engine comes from the single
//! [`haversine_distance`] implementation here; no component re-derives
//! distance with different math.

use crate::{BoundingBox, GeoPoint, LatLon};

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Kilometers per degree of latitude (approximately constant).
pub const KM_PER_DEGREE_LAT: f64 = 111.0;

/// Great-circle distance between two coordinates in kilometers.
///
/// Standard haversine with R = 6371 km. Inputs are not validated:
/// non-finite coordinates propagate as NaN, which callers at the data
/// boundary are expected to filter beforehand.
///
/// # Example
/// ```
/// use petaloka::geo_utils::haversine_distance;
/// // London to Paris, roughly 344 km
/// let d = haversine_distance(51.5074, -0.1278, 48.8566, 2.3522);
/// assert!((d - 343.5).abs() < 5.0);
/// ```
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Distance between two [`LatLon`] pairs in kilometers.
pub fn distance_between(a: &LatLon, b: &LatLon) -> f64 {
    haversine_distance(a.lat, a.lon, b.lat, b.lon)
}

/// Degrees of latitude spanned by `km` kilometers.
pub fn km_to_lat_degrees(km: f64) -> f64 {
    km / KM_PER_DEGREE_LAT
}

/// Degrees of longitude spanned by `km` kilometers at latitude `at_lat`.
///
/// The cosine is floored to keep the conversion finite near the poles.
pub fn km_to_lon_degrees(km: f64, at_lat: f64) -> f64 {
    km / (KM_PER_DEGREE_LAT * at_lat.to_radians().cos().abs().max(1e-6))
}

/// Mean coordinate of a point set, `(0, 0)` when empty.
pub fn compute_center(points: &[GeoPoint]) -> LatLon {
    if points.is_empty() {
        return LatLon::new(0.0, 0.0);
    }
    let lat_sum: f64 = points.iter().map(|p| p.lat).sum();
    let lon_sum: f64 = points.iter().map(|p| p.lon).sum();
    LatLon::new(lat_sum / points.len() as f64, lon_sum / points.len() as f64)
}

/// Bounding box of a point set, expanded by `padding_fraction` of each
/// axis span. Returns `None` for an empty set.
pub fn compute_bounds(points: &[GeoPoint], padding_fraction: f64) -> Option<BoundingBox> {
    if points.is_empty() {
        return None;
    }

    let mut north = f64::MIN;
    let mut south = f64::MAX;
    let mut east = f64::MIN;
    let mut west = f64::MAX;

    for p in points {
        north = north.max(p.lat);
        south = south.min(p.lat);
        east = east.max(p.lon);
        west = west.min(p.lon);
    }

    let lat_padding = (north - south) * padding_fraction;
    let lon_padding = (east - west) * padding_fraction;

    Some(BoundingBox {
        north: north + lat_padding,
        south: south - lat_padding,
        east: east + lon_padding,
        west: west - lon_padding,
    })
}
