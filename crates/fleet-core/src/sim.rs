//! Flight-position simulator.
//!
//! Advances one in-progress mission's drone toward the route destination
//! by a fixed time delta on a flat-earth approximation, producing a brand
//! new telemetry sample. The previous sample is never mutated, so readers
//! that only inspect the latest sample observe no change between ticks.

use chrono::{DateTime, Utc};

use crate::geo::{arc_altitude, flat_distance_m, meters_per_deg_lon, METERS_PER_DEG_LAT};
use crate::models::{Mission, TelemetrySample};

/// Outcome of advancing one flight by one tick.
#[derive(Debug, Clone)]
pub struct FlightStep {
    pub sample: TelemetrySample,
    /// The drone reached (or overshot) the destination this tick.
    pub arrived: bool,
}

/// Advance `mission`'s drone from its latest sample by `delta_seconds`.
///
/// When the distance coverable this tick reaches the remaining distance,
/// the position snaps to the exact destination vertex, altitude included.
/// Otherwise the drone moves along the unit vector toward the destination
/// and its altitude follows the parabolic climb/descent arc over the
/// route's whole start-to-destination progress, not just the current leg.
pub fn advance_flight(
    mission: &Mission,
    latest: &TelemetrySample,
    speed_kmh: f64,
    delta_seconds: f64,
    now: DateTime<Utc>,
) -> FlightStep {
    let destination = mission.route.destination();
    let start = mission.route.start();

    let lon = latest.position.lon;
    let lat = latest.position.lat;

    let dx = destination.lon - lon;
    let dy = destination.lat - lat;
    let remaining_m = flat_distance_m(lon, lat, destination.lon, destination.lat, lat);
    let advance_m = (speed_kmh / 3.6) * delta_seconds;

    if advance_m >= remaining_m {
        let sample = TelemetrySample {
            mission_id: mission.id,
            timestamp: now,
            position: destination,
            speed_kmh,
            battery_pct: latest.battery_pct,
        };
        return FlightStep { sample, arrived: true };
    }

    // Direction in degree space, converted back through the same
    // per-degree factors.
    let modulus = (dx * dx + dy * dy).sqrt();
    let new_lat = lat + (dy / modulus) * advance_m / METERS_PER_DEG_LAT;
    let new_lon = lon + (dx / modulus) * advance_m / meters_per_deg_lon(lat);

    // Progress over the full route's straight-line length, at the new
    // position.
    let total_m = flat_distance_m(start.lon, start.lat, destination.lon, destination.lat, lat);
    let progress = if total_m > 0.0 {
        1.0 - (remaining_m - advance_m) / total_m
    } else {
        1.0
    };
    let new_alt = arc_altitude(start.altitude_m, destination.altitude_m, progress);

    let sample = TelemetrySample {
        mission_id: mission.id,
        timestamp: now,
        position: crate::models::RouteVertex {
            lon: new_lon,
            lat: new_lat,
            altitude_m: new_alt,
        },
        speed_kmh,
        battery_pct: latest.battery_pct,
    };
    FlightStep { sample, arrived: false }
}
