//! On-demand batch route optimization.
//!
//! Read-only glue between the state store and the core planner: nothing
//! here mutates drones or missions. The caller persists any assignments
//! it decides to commit from the returned itineraries.

use fleet_core::planner::{plan, PlanOutcome};
use fleet_core::DistanceMatrix;

use crate::state::AppState;

/// Plan itineraries for the given candidate missions across every
/// currently available drone.
pub fn optimize_routes(state: &AppState, mission_ids: &[i64]) -> PlanOutcome {
    let drones = state.available_drone_specs();

    // With no fleet to plan for, every requested id comes back untouched,
    // including unknown or already-assigned ones.
    if drones.is_empty() {
        return PlanOutcome {
            itineraries: Vec::new(),
            unassigned: mission_ids.to_vec(),
            message: "no drones available in the fleet".to_string(),
        };
    }

    let missions = state.plannable_missions(mission_ids);
    let matrix = DistanceMatrix::build(&missions);

    tracing::debug!(
        drones = drones.len(),
        missions = missions.len(),
        pairs = matrix.len(),
        "running route optimization"
    );

    plan(&drones, &missions, &matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use fleet_core::{Drone, DroneModel, DroneStatus, Mission, MissionStatus, Route};
    use std::collections::HashSet;

    fn state_with_fleet(drone_count: usize) -> AppState {
        let state = AppState::new();
        state.upsert_model(DroneModel {
            id: 1,
            name: "HX-1".to_string(),
            capacity_kg: 5.0,
            autonomy_minutes: 120.0,
            cruise_speed_kmh: 60.0,
        });
        for id in 0..drone_count as i64 {
            state.upsert_drone(Drone {
                id: id + 1,
                model_id: 1,
                status: DroneStatus::Available,
            });
        }
        state
    }

    fn pending_mission(id: i64, lon: f64) -> Mission {
        let start = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        let wkt = format!("LINESTRING ({lon} 0, {lon} 0.01)");
        Mission {
            id,
            mission_type: "survey".to_string(),
            created_by: 1,
            drone_id: None,
            planned_start: Some(start),
            planned_end: Some(start + Duration::minutes(15)),
            actual_start: None,
            actual_end: None,
            status: MissionStatus::Pending,
            route: Route::parse_wkt(&wkt).unwrap(),
        }
    }

    #[test]
    fn every_candidate_appears_exactly_once() {
        let state = state_with_fleet(2);
        let ids: Vec<i64> = (1..=5).collect();
        for &id in &ids {
            state.upsert_mission(pending_mission(id, id as f64 * 0.05));
        }

        let outcome = optimize_routes(&state, &ids);
        let mut seen = HashSet::new();
        for itinerary in &outcome.itineraries {
            for stop in &itinerary.stops {
                assert!(seen.insert(stop.mission_id));
            }
        }
        for id in &outcome.unassigned {
            assert!(seen.insert(*id));
        }
        assert_eq!(seen, ids.iter().copied().collect());
    }

    #[test]
    fn optimization_does_not_mutate_state() {
        let state = state_with_fleet(1);
        state.upsert_mission(pending_mission(1, 0.0));

        let _ = optimize_routes(&state, &[1]);
        let mission = state.get_mission(1).unwrap();
        assert_eq!(mission.status, MissionStatus::Pending);
        assert!(mission.drone_id.is_none());
        assert_eq!(state.get_drone(1).unwrap().status, DroneStatus::Available);
    }

    #[test]
    fn no_available_drones_echoes_every_requested_id() {
        let state = state_with_fleet(1);
        state.upsert_drone(Drone {
            id: 1,
            model_id: 1,
            status: DroneStatus::Maintenance,
        });
        state.upsert_mission(pending_mission(1, 0.0));

        // 99 is unknown and must still come back unassigned.
        let outcome = optimize_routes(&state, &[1, 99]);
        assert!(outcome.itineraries.is_empty());
        assert_eq!(outcome.unassigned, vec![1, 99]);
        assert!(outcome.message.contains("no drones available"));
    }
}
