//! Time-cost model shared by the route planner.
//!
//! Costs are expressed in minutes so they subtract directly from a drone
//! model's autonomy budget.

use chrono::Duration;

use crate::models::Mission;

/// Missions with planned timestamps never cost less than this to execute.
pub const MIN_MISSION_DURATION_MIN: f64 = 10.0;

/// Planned execution time of a mission in minutes.
///
/// Floored at [`MIN_MISSION_DURATION_MIN`] when both planned timestamps
/// exist; 0 when either is missing.
pub fn mission_duration_minutes(mission: &Mission) -> f64 {
    match (mission.planned_start, mission.planned_end) {
        (Some(start), Some(end)) => {
            let minutes = end.signed_duration_since(start).num_minutes() as f64;
            minutes.max(MIN_MISSION_DURATION_MIN)
        }
        _ => 0.0,
    }
}

/// Minutes spent traversing `distance_m` at `speed_kmh`.
pub fn travel_minutes(distance_m: f64, speed_kmh: f64) -> f64 {
    let meters_per_minute = speed_kmh * 1000.0 / 60.0;
    distance_m / meters_per_minute
}

/// Total cost of reaching and executing a mission, in minutes.
pub fn total_cost_minutes(mission: &Mission, distance_m: f64, speed_kmh: f64) -> f64 {
    travel_minutes(distance_m, speed_kmh) + mission_duration_minutes(mission)
}

/// Convenience: planned duration as a chrono `Duration`, if both
/// timestamps exist.
pub fn planned_window(mission: &Mission) -> Option<Duration> {
    match (mission.planned_start, mission.planned_end) {
        (Some(start), Some(end)) => Some(end.signed_duration_since(start)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MissionStatus, Route};
    use chrono::{TimeZone, Utc};

    fn mission_with_window(minutes: Option<i64>) -> Mission {
        let start = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        Mission {
            id: 1,
            mission_type: "delivery".to_string(),
            created_by: 1,
            drone_id: None,
            planned_start: minutes.map(|_| start),
            planned_end: minutes.map(|m| start + Duration::minutes(m)),
            actual_start: None,
            actual_end: None,
            status: MissionStatus::Pending,
            route: Route::parse_wkt("LINESTRING (0 0, 0 0.01)").unwrap(),
        }
    }

    #[test]
    fn duration_uses_planned_window() {
        assert_eq!(mission_duration_minutes(&mission_with_window(Some(20))), 20.0);
    }

    #[test]
    fn duration_floors_at_ten_minutes() {
        assert_eq!(mission_duration_minutes(&mission_with_window(Some(3))), 10.0);
    }

    #[test]
    fn duration_zero_without_window() {
        assert_eq!(mission_duration_minutes(&mission_with_window(None)), 0.0);
    }

    #[test]
    fn travel_minutes_converts_speed() {
        // 60 km/h = 1000 m/min
        assert!((travel_minutes(6000.0, 60.0) - 6.0).abs() < 1e-9);
    }

    #[test]
    fn total_cost_adds_travel_and_duration() {
        let mission = mission_with_window(Some(20));
        assert!((total_cost_minutes(&mission, 6000.0, 60.0) - 26.0).abs() < 1e-9);
    }
}
