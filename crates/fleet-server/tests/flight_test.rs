//! End-to-end flight lifecycle: start a mission, tick the simulator until
//! arrival, and check the state transitions and the telemetry log.

use chrono::{Duration, Utc};
use fleet_core::{Drone, DroneModel, DroneStatus, Mission, MissionStatus, Route};
use fleet_server::loops::sim_loop::run_tick;
use fleet_server::state::AppState;

fn fleet_with_one_mission() -> AppState {
    let state = AppState::new();
    state.upsert_model(DroneModel {
        id: 1,
        name: "HX-1".to_string(),
        capacity_kg: 5.0,
        autonomy_minutes: 60.0,
        cruise_speed_kmh: 40.08,
    });
    state.upsert_drone(Drone {
        id: 3,
        model_id: 1,
        status: DroneStatus::Available,
    });
    state.upsert_mission(Mission {
        id: 11,
        mission_type: "delivery".to_string(),
        created_by: 1,
        drone_id: Some(3),
        planned_start: None,
        planned_end: None,
        actual_start: None,
        actual_end: None,
        status: MissionStatus::Pending,
        // ~1113 m due north, climbing from 0 to 100 m
        route: Route::parse_wkt("LINESTRING Z (0 0 0, 0 0.01 100)").unwrap(),
    });
    state
}

#[test]
fn mission_flies_to_completion() {
    let state = fleet_with_one_mission();
    let t0 = Utc::now();
    state.start_mission(11, t0).unwrap();

    // First 50s tick covers about half the leg.
    let outcomes = run_tick(&state, 50.0, t0 + Duration::seconds(50));
    assert_eq!(outcomes.len(), 1);
    assert!(!outcomes[0].arrived);
    let midway = state.latest_sample(11).unwrap();
    assert!((midway.position.lat - 0.005).abs() < 1e-4);
    assert!((midway.position.altitude_m - 150.0).abs() < 0.5);
    assert_eq!(state.get_mission(11).unwrap().status, MissionStatus::InProgress);
    assert_eq!(state.get_drone(3).unwrap().status, DroneStatus::Flying);

    // Second tick overshoots the destination and snaps to it.
    let outcomes = run_tick(&state, 50.0, t0 + Duration::seconds(100));
    assert_eq!(outcomes.len(), 1);
    assert!(outcomes[0].arrived);
    let last = state.latest_sample(11).unwrap();
    assert_eq!(last.position.lon, 0.0);
    assert_eq!(last.position.lat, 0.01);
    assert_eq!(last.position.altitude_m, 100.0);

    let mission = state.get_mission(11).unwrap();
    assert_eq!(mission.status, MissionStatus::Completed);
    assert_eq!(mission.actual_end, Some(t0 + Duration::seconds(100)));
    assert_eq!(state.get_drone(3).unwrap().status, DroneStatus::Available);

    // Seed sample plus one per tick, strictly increasing timestamps.
    let samples = state.samples_for_mission(11);
    assert_eq!(samples.len(), 3);
    assert!(samples.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
}

#[test]
fn completed_mission_is_not_advanced_again() {
    let state = fleet_with_one_mission();
    let t0 = Utc::now();
    state.start_mission(11, t0).unwrap();

    // Big delta completes in one tick.
    let outcomes = run_tick(&state, 600.0, t0 + Duration::seconds(5));
    assert!(outcomes[0].arrived);

    let outcomes = run_tick(&state, 600.0, t0 + Duration::seconds(10));
    assert!(outcomes.is_empty());
    assert_eq!(state.samples_for_mission(11).len(), 2);
}

#[test]
fn tick_with_missing_drone_skips_that_mission_only() {
    let state = fleet_with_one_mission();

    // Second, healthy flight.
    state.upsert_drone(Drone {
        id: 4,
        model_id: 1,
        status: DroneStatus::Available,
    });
    let template = state.get_mission(11).unwrap();
    state.upsert_mission(Mission {
        id: 12,
        drone_id: Some(4),
        ..template
    });

    let t0 = Utc::now();
    state.start_mission(11, t0).unwrap();
    state.start_mission(12, t0).unwrap();

    // Mission 11's drone record vanishes between ticks.
    let broken = state.get_mission(11).unwrap();
    state.upsert_mission(Mission {
        drone_id: Some(999),
        ..broken
    });

    let outcomes = run_tick(&state, 50.0, t0 + Duration::seconds(50));
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].mission_id, 12);
    assert_eq!(state.samples_for_mission(11).len(), 1);
    assert_eq!(state.samples_for_mission(12).len(), 2);
}
