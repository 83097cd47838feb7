//! Greedy multi-drone route planner.
//!
//! Packs pending missions onto available drones one drone at a time:
//! repeatedly pick the nearest not-yet-assigned mission whose total cost
//! fits the drone's remaining battery-minutes, until nothing fits, then
//! move to the next drone. Deterministic nearest-feasible-next heuristic,
//! not a global optimum; intentionally no rebalancing across drones.
//!
//! The planner only reads drone and mission state. Committing the
//! resulting assignments is the caller's responsibility.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::cost::total_cost_minutes;
use crate::distance::DistanceMatrix;
use crate::models::Mission;

/// Flight-relevant specs of one available drone, joined from its model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DroneSpecs {
    pub drone_id: i64,
    pub model_name: String,
    pub autonomy_minutes: f64,
    /// Informational only; never gates feasibility.
    pub capacity_kg: f64,
    pub cruise_speed_kmh: f64,
}

/// One ordered step of a drone's itinerary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItineraryStop {
    pub order: u32,
    pub mission_id: i64,
    pub mission_type: String,
    pub distance_m: f64,
    pub cost_minutes: f64,
}

/// Ordered list of missions assigned to one drone, with running totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DroneItinerary {
    pub drone_id: i64,
    pub model_name: String,
    pub stops: Vec<ItineraryStop>,
    pub total_distance_m: f64,
    pub total_time_minutes: f64,
    pub remaining_battery_minutes: f64,
    /// Carrying capacity, reported for information only.
    pub capacity_kg: f64,
}

/// Result of one planning run. Infeasibility shows up as unassigned
/// mission ids, never as an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanOutcome {
    pub itineraries: Vec<DroneItinerary>,
    pub unassigned: Vec<i64>,
    pub message: String,
}

/// Assign `missions` to `drones` greedily under the battery budget.
///
/// `missions` must already be filtered to pending, unassigned ones; the
/// planner takes them as given. Drones are processed in the order
/// supplied; ties on distance break to the first mission in input order.
pub fn plan(drones: &[DroneSpecs], missions: &[Mission], matrix: &DistanceMatrix) -> PlanOutcome {
    if drones.is_empty() {
        return PlanOutcome {
            itineraries: Vec::new(),
            unassigned: missions.iter().map(|m| m.id).collect(),
            message: "no drones available in the fleet".to_string(),
        };
    }
    if missions.is_empty() {
        return PlanOutcome {
            itineraries: Vec::new(),
            unassigned: Vec::new(),
            message: "no plannable missions (all assigned or not pending)".to_string(),
        };
    }

    let mut assigned: HashSet<i64> = HashSet::new();
    let mut itineraries = Vec::with_capacity(drones.len());

    for drone in drones {
        itineraries.push(fill_itinerary(drone, missions, matrix, &mut assigned));
    }

    let unassigned: Vec<i64> = missions
        .iter()
        .map(|m| m.id)
        .filter(|id| !assigned.contains(id))
        .collect();

    PlanOutcome {
        itineraries,
        unassigned,
        message: "route optimization finished".to_string(),
    }
}

/// Fill one drone's schedule until no remaining mission fits its budget.
fn fill_itinerary(
    drone: &DroneSpecs,
    missions: &[Mission],
    matrix: &DistanceMatrix,
    assigned: &mut HashSet<i64>,
) -> DroneItinerary {
    let mut budget = drone.autonomy_minutes;
    let mut location: Option<i64> = None;
    let mut stops = Vec::new();
    let mut total_distance_m = 0.0;
    let mut total_time_minutes = 0.0;

    while let Some((mission, distance_m, cost_minutes)) =
        nearest_feasible(location, missions, matrix, assigned, budget, drone.cruise_speed_kmh)
    {
        assigned.insert(mission.id);
        budget -= cost_minutes;
        total_distance_m += distance_m;
        total_time_minutes += cost_minutes;
        location = Some(mission.id);

        stops.push(ItineraryStop {
            order: stops.len() as u32 + 1,
            mission_id: mission.id,
            mission_type: mission.mission_type.clone(),
            distance_m,
            cost_minutes,
        });
    }

    DroneItinerary {
        drone_id: drone.drone_id,
        model_name: drone.model_name.clone(),
        stops,
        total_distance_m,
        total_time_minutes,
        remaining_battery_minutes: budget,
        capacity_kg: drone.capacity_kg,
    }
}

/// Nearest unassigned mission whose total cost fits the remaining budget.
///
/// Sentinel-priced pairs still compete here; they are penalized, not
/// excluded.
fn nearest_feasible<'a>(
    location: Option<i64>,
    missions: &'a [Mission],
    matrix: &DistanceMatrix,
    assigned: &HashSet<i64>,
    budget_minutes: f64,
    speed_kmh: f64,
) -> Option<(&'a Mission, f64, f64)> {
    let mut best: Option<(&Mission, f64, f64)> = None;

    for mission in missions {
        if assigned.contains(&mission.id) {
            continue;
        }
        let distance_m = matrix.distance(location, mission.id);
        let cost_minutes = total_cost_minutes(mission, distance_m, speed_kmh);
        if cost_minutes > budget_minutes {
            continue;
        }
        // strict < keeps the first match on equal distances
        match best {
            Some((_, best_distance, _)) if distance_m >= best_distance => {}
            _ => best = Some((mission, distance_m, cost_minutes)),
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::SENTINEL_DISTANCE_M;
    use crate::models::{MissionStatus, Route};
    use chrono::{Duration, TimeZone, Utc};

    fn mission(id: i64, planned_minutes: Option<i64>) -> Mission {
        let start = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        Mission {
            id,
            mission_type: "survey".to_string(),
            created_by: 7,
            drone_id: None,
            planned_start: planned_minutes.map(|_| start),
            planned_end: planned_minutes.map(|m| start + Duration::minutes(m)),
            actual_start: None,
            actual_end: None,
            status: MissionStatus::Pending,
            route: Route::parse_wkt("LINESTRING (0 0, 0 0.01)").unwrap(),
        }
    }

    fn drone(id: i64, autonomy_minutes: f64, speed_kmh: f64) -> DroneSpecs {
        DroneSpecs {
            drone_id: id,
            model_name: "HX-1".to_string(),
            autonomy_minutes,
            capacity_kg: 5.0,
            cruise_speed_kmh: speed_kmh,
        }
    }

    #[test]
    fn greedy_fills_until_budget_runs_out() {
        // 60 min budget at 60 km/h (1000 m/min).
        // M1: base -> dist 0, 20 min execution, remaining 40.
        // M2: 6000 m -> 6 min travel + 10 min floor = 16, remaining 24.
        // M3: 30000 m from M2 -> 30 + 10 = 40 > 24, infeasible.
        let drones = vec![drone(1, 60.0, 60.0)];
        let missions = vec![mission(1, Some(20)), mission(2, Some(5)), mission(3, Some(5))];
        let mut matrix = DistanceMatrix::default();
        matrix.insert(1, 2, 6000.0);
        matrix.insert(1, 3, 30_000.0);
        matrix.insert(2, 3, 30_000.0);

        let outcome = plan(&drones, &missions, &matrix);
        let itinerary = &outcome.itineraries[0];
        let ids: Vec<i64> = itinerary.stops.iter().map(|s| s.mission_id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(outcome.unassigned, vec![3]);
        assert!((itinerary.remaining_battery_minutes - 24.0).abs() < 1e-9);
        assert!((itinerary.total_distance_m - 6000.0).abs() < 1e-9);
        assert!((itinerary.total_time_minutes - 36.0).abs() < 1e-9);
        assert_eq!(itinerary.stops[0].order, 1);
        assert_eq!(itinerary.stops[1].order, 2);
    }

    #[test]
    fn no_drones_degrades_to_all_unassigned() {
        let missions = vec![mission(1, None), mission(2, None)];
        let outcome = plan(&[], &missions, &DistanceMatrix::default());
        assert!(outcome.itineraries.is_empty());
        assert_eq!(outcome.unassigned, vec![1, 2]);
        assert!(outcome.message.contains("no drones available"));
    }

    #[test]
    fn no_missions_yields_explanatory_message() {
        let drones = vec![drone(1, 60.0, 60.0)];
        let outcome = plan(&drones, &[], &DistanceMatrix::default());
        assert!(outcome.itineraries.is_empty());
        assert!(outcome.unassigned.is_empty());
        assert!(outcome.message.contains("no plannable missions"));
    }

    #[test]
    fn every_mission_assigned_exactly_once_or_orphaned() {
        let drones = vec![drone(1, 45.0, 60.0), drone(2, 45.0, 60.0)];
        let missions: Vec<Mission> = (1..=6).map(|id| mission(id, Some(15))).collect();
        let mut matrix = DistanceMatrix::default();
        for a in 1..=6 {
            for b in (a + 1)..=6 {
                matrix.insert(a, b, (a + b) as f64 * 1000.0);
            }
        }

        let outcome = plan(&drones, &missions, &matrix);
        let mut seen = HashSet::new();
        for itinerary in &outcome.itineraries {
            for stop in &itinerary.stops {
                assert!(seen.insert(stop.mission_id), "mission assigned twice");
            }
            assert!(itinerary.remaining_battery_minutes >= 0.0);
        }
        for id in &outcome.unassigned {
            assert!(seen.insert(*id), "orphan also assigned");
        }
        assert_eq!(seen.len(), 6);
    }

    #[test]
    fn sentinel_pairs_are_penalized_not_excluded() {
        // Only mission 9 is reachable through the sentinel; a huge budget
        // still admits it.
        let drones = vec![drone(1, 10_000.0, 60.0)];
        let missions = vec![mission(8, None), mission(9, None)];
        let mut matrix = DistanceMatrix::default();
        matrix.insert(8, 9, SENTINEL_DISTANCE_M * 2.0);

        let outcome = plan(&drones, &missions, &matrix);
        let ids: Vec<i64> = outcome.itineraries[0]
            .stops
            .iter()
            .map(|s| s.mission_id)
            .collect();
        // first pick ties at distance 0, first in input order wins; the
        // second leg costs 200000 m / 1000 m-per-min = 200 min, feasible.
        assert_eq!(ids, vec![8, 9]);
        assert!(outcome.unassigned.is_empty());
    }

    #[test]
    fn capacity_is_reported_but_never_enforced() {
        let mut heavy = drone(1, 60.0, 60.0);
        heavy.capacity_kg = 0.0;
        let missions = vec![mission(1, Some(20))];
        let outcome = plan(&[heavy], &missions, &DistanceMatrix::default());
        assert_eq!(outcome.itineraries[0].stops.len(), 1);
        assert_eq!(outcome.itineraries[0].capacity_kg, 0.0);
    }
}
