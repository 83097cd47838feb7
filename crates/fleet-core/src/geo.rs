//! Spatial math for flight simulation and distance calculations.
//!
//! Flight simulation works on a flat-earth approximation: degrees are
//! scaled to meters with a fixed latitude factor and a cos-scaled
//! longitude factor. Centroid-to-centroid distances for the planner use
//! the haversine formula.

/// Meters per degree of latitude (flat-earth approximation).
pub const METERS_PER_DEG_LAT: f64 = 111_320.0;

/// Mean earth radius for great-circle distances.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Extra altitude added at the midpoint of a flight's climb/descent arc.
pub const ARC_PEAK_BONUS_M: f64 = 100.0;

/// Simulated altitudes are clamped to this band.
pub const MIN_ALTITUDE_M: f64 = 0.0;
pub const MAX_ALTITUDE_M: f64 = 800.0;

/// Meters per degree of longitude at a given latitude.
pub fn meters_per_deg_lon(lat_deg: f64) -> f64 {
    METERS_PER_DEG_LAT * lat_deg.to_radians().cos()
}

/// Straight-line distance in meters between two (lon, lat) points,
/// scaled at the reference latitude.
pub fn flat_distance_m(lon1: f64, lat1: f64, lon2: f64, lat2: f64, ref_lat_deg: f64) -> f64 {
    let dx = (lon2 - lon1) * meters_per_deg_lon(ref_lat_deg);
    let dy = (lat2 - lat1) * METERS_PER_DEG_LAT;
    (dx * dx + dy * dy).sqrt()
}

/// Calculate distance between two points in meters using the Haversine
/// formula.
///
/// # Arguments
/// * `lat1`, `lon1` - First point coordinates in decimal degrees
/// * `lat2`, `lon2` - Second point coordinates in decimal degrees
///
/// # Returns
/// Distance in meters
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Altitude along a flight at progress fraction `p` in [0, 1].
///
/// Linear interpolation between the route's start and end altitudes plus a
/// parabolic climb/descent arc peaking at mid-route:
/// `start + (end - start) * p + 4 * ARC_PEAK_BONUS_M * p * (1 - p)`,
/// clamped to `[MIN_ALTITUDE_M, MAX_ALTITUDE_M]`.
pub fn arc_altitude(start_alt_m: f64, end_alt_m: f64, progress: f64) -> f64 {
    let p = progress.clamp(0.0, 1.0);
    let alt = start_alt_m + (end_alt_m - start_alt_m) * p + 4.0 * ARC_PEAK_BONUS_M * p * (1.0 - p);
    alt.clamp(MIN_ALTITUDE_M, MAX_ALTITUDE_M)
}
