//! Core data models for the fleet coordinator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Altitude assigned to route vertices that come in without a Z coordinate.
pub const DEFAULT_ROUTE_ALTITUDE_M: f64 = 50.0;

/// Immutable reference data describing a drone model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DroneModel {
    pub id: i64,
    pub name: String,
    /// Carrying capacity. Collected and reported, never enforced by the
    /// planner (see planner module).
    pub capacity_kg: f64,
    /// Flight-time budget in minutes, consumed directly by the planner.
    pub autonomy_minutes: f64,
    pub cruise_speed_kmh: f64,
}

/// A registered drone of the fleet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Drone {
    pub id: i64,
    pub model_id: i64,
    pub status: DroneStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DroneStatus {
    /// Idle, may be assigned a mission
    #[default]
    Available,
    /// Executing an in-progress mission
    Flying,
    /// Grounded for maintenance
    Maintenance,
}

/// A geographically-routed mission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mission {
    pub id: i64,
    pub mission_type: String,
    pub created_by: i64,
    /// Must be set before the mission may become in-progress.
    pub drone_id: Option<i64>,
    pub planned_start: Option<DateTime<Utc>>,
    pub planned_end: Option<DateTime<Utc>>,
    /// Set exactly on the Pending -> InProgress transition.
    pub actual_start: Option<DateTime<Utc>>,
    /// Set exactly on the -> Completed transition.
    pub actual_end: Option<DateTime<Utc>>,
    pub status: MissionStatus,
    pub route: Route,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionStatus {
    /// Created, waiting for assignment and start
    Pending,
    /// Flying; advanced by the simulator each tick
    InProgress,
    /// Reached its destination
    Completed,
    /// Aborted externally; the simulator takes no further action
    Failed,
}

/// One geodetic route vertex: (lon, lat, altitude).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteVertex {
    pub lon: f64,
    pub lat: f64,
    pub altitude_m: f64,
}

/// An ordered sequence of at least two route vertices.
///
/// Geometry is opaque to the planner and simulator beyond start,
/// destination and centroid; no spatial index is involved.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Route {
    vertices: Vec<RouteVertex>,
}

impl Route {
    pub fn new(vertices: Vec<RouteVertex>) -> Result<Self, CoreError> {
        if vertices.len() < 2 {
            return Err(CoreError::InvalidRoute(format!(
                "route needs at least 2 vertices, got {}",
                vertices.len()
            )));
        }
        Ok(Self { vertices })
    }

    /// Parse a WKT `LINESTRING` (optionally `LINESTRING Z`) into a route.
    ///
    /// Coordinates are `lon lat [alt]`; vertices without an altitude get
    /// [`DEFAULT_ROUTE_ALTITUDE_M`].
    pub fn parse_wkt(wkt: &str) -> Result<Self, CoreError> {
        let trimmed = wkt.trim();
        let upper = trimmed.to_ascii_uppercase();
        if !upper.starts_with("LINESTRING") {
            return Err(CoreError::InvalidRoute(format!(
                "expected LINESTRING, got {:?}",
                trimmed.chars().take(16).collect::<String>()
            )));
        }
        let open = trimmed
            .find('(')
            .ok_or_else(|| CoreError::InvalidRoute("missing opening parenthesis".to_string()))?;
        let close = trimmed
            .rfind(')')
            .filter(|&idx| idx > open)
            .ok_or_else(|| CoreError::InvalidRoute("missing closing parenthesis".to_string()))?;

        let mut vertices = Vec::new();
        for chunk in trimmed[open + 1..close].split(',') {
            let coords: Vec<f64> = chunk
                .split_whitespace()
                .map(|token| {
                    token.parse::<f64>().map_err(|_| {
                        CoreError::InvalidRoute(format!("bad coordinate {:?}", token))
                    })
                })
                .collect::<Result<_, _>>()?;
            match coords.as_slice() {
                [lon, lat] => vertices.push(RouteVertex {
                    lon: *lon,
                    lat: *lat,
                    altitude_m: DEFAULT_ROUTE_ALTITUDE_M,
                }),
                [lon, lat, alt] => vertices.push(RouteVertex {
                    lon: *lon,
                    lat: *lat,
                    altitude_m: *alt,
                }),
                other => {
                    return Err(CoreError::InvalidRoute(format!(
                        "vertex has {} coordinates",
                        other.len()
                    )))
                }
            }
        }
        Self::new(vertices)
    }

    /// Serialize back to WKT `LINESTRING Z` for storage.
    pub fn to_wkt(&self) -> String {
        let coords: Vec<String> = self
            .vertices
            .iter()
            .map(|v| format!("{} {} {}", v.lon, v.lat, v.altitude_m))
            .collect();
        format!("LINESTRING Z ({})", coords.join(", "))
    }

    pub fn vertices(&self) -> &[RouteVertex] {
        &self.vertices
    }

    pub fn start(&self) -> RouteVertex {
        self.vertices[0]
    }

    pub fn destination(&self) -> RouteVertex {
        self.vertices[self.vertices.len() - 1]
    }

    /// Mean of the route's vertices, as (lat, lon).
    pub fn centroid(&self) -> (f64, f64) {
        let mut sum_lat = 0.0;
        let mut sum_lon = 0.0;
        for vertex in &self.vertices {
            sum_lat += vertex.lat;
            sum_lon += vertex.lon;
        }
        let count = self.vertices.len() as f64;
        (sum_lat / count, sum_lon / count)
    }
}

/// One timestamped position+battery reading for a mission in flight.
///
/// Samples form an append-only log per mission, ordered by timestamp; the
/// most recent sample is the mission's current position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetrySample {
    pub mission_id: i64,
    pub timestamp: DateTime<Utc>,
    pub position: RouteVertex,
    pub speed_kmh: f64,
    pub battery_pct: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_wkt_linestring_with_z() {
        let route = Route::parse_wkt("LINESTRING Z (-70.6 -33.4 120, -70.5 -33.3 80)").unwrap();
        assert_eq!(route.vertices().len(), 2);
        assert_eq!(route.start().altitude_m, 120.0);
        assert_eq!(route.destination().lat, -33.3);
    }

    #[test]
    fn parse_wkt_defaults_missing_altitude() {
        let route = Route::parse_wkt("LINESTRING (0 0, 0 0.01)").unwrap();
        assert_eq!(route.start().altitude_m, DEFAULT_ROUTE_ALTITUDE_M);
        assert_eq!(route.destination().altitude_m, DEFAULT_ROUTE_ALTITUDE_M);
    }

    #[test]
    fn parse_wkt_rejects_single_vertex() {
        assert!(Route::parse_wkt("LINESTRING (1 2)").is_err());
    }

    #[test]
    fn parse_wkt_rejects_other_geometry() {
        assert!(Route::parse_wkt("POINT (1 2)").is_err());
        assert!(Route::parse_wkt("not wkt at all").is_err());
    }

    #[test]
    fn wkt_round_trip() {
        let route = Route::parse_wkt("LINESTRING Z (1 2 50, 3 4 60)").unwrap();
        let again = Route::parse_wkt(&route.to_wkt()).unwrap();
        assert_eq!(route.vertices(), again.vertices());
    }

    #[test]
    fn centroid_is_vertex_mean() {
        let route = Route::parse_wkt("LINESTRING (0 0, 2 4)").unwrap();
        let (lat, lon) = route.centroid();
        assert_eq!(lat, 2.0);
        assert_eq!(lon, 1.0);
    }
}
