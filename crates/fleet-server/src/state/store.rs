//! In-memory state store using DashMap.
//!
//! Holds the live fleet: drone models, drones, missions and per-mission
//! append-only telemetry logs. All state transitions go through methods
//! here; a mission entry and its drone are always locked in that order so
//! the transitions stay serialized per drone and a drone is never observed
//! with two in-progress missions.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use fleet_core::planner::DroneSpecs;
use fleet_core::sim::FlightStep;
use fleet_core::{Drone, DroneModel, DroneStatus, Mission, MissionStatus, TelemetrySample};

#[derive(Debug, Error)]
pub enum StateError {
    #[error("mission not found: {0}")]
    MissionNotFound(i64),
    #[error("drone not found: {0}")]
    DroneNotFound(i64),
    #[error("drone model not found: {0}")]
    ModelNotFound(i64),
    #[error("mission {0} has no assigned drone")]
    NoAssignedDrone(i64),
    #[error("mission {0} is not pending")]
    NotPending(i64),
    #[error("mission {0} is already finished")]
    AlreadyFinished(i64),
    #[error("drone {0} is not available")]
    DroneBusy(i64),
}

/// Latest known position of one in-progress mission. Monitoring DTO.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionPosition {
    pub mission_id: i64,
    pub timestamp: DateTime<Utc>,
    pub lat: f64,
    pub lon: f64,
    pub altitude_m: f64,
    pub battery_pct: f64,
}

/// Entities touched by a successful mission start, for write-through.
#[derive(Debug, Clone)]
pub struct StartedMission {
    pub mission: Mission,
    pub drone: Drone,
    pub sample: TelemetrySample,
}

/// What applying one simulator step did to the store.
#[derive(Debug, Clone)]
pub enum StepApplied {
    /// Sample appended; the flight continues.
    Advanced,
    /// Sample appended and the flight finished; carries the updated rows
    /// for write-through.
    Completed(Mission, Drone),
    /// The mission left InProgress between the tick snapshot and now; no
    /// sample was appended and nothing may be persisted.
    Skipped,
}

/// Application state - thread-safe store for the fleet.
#[derive(Default)]
pub struct AppState {
    models: DashMap<i64, DroneModel>,
    drones: DashMap<i64, Drone>,
    missions: DashMap<i64, Mission>,
    telemetry: DashMap<i64, Vec<TelemetrySample>>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    // ----- loading / lookups -----

    pub fn upsert_model(&self, model: DroneModel) {
        self.models.insert(model.id, model);
    }

    pub fn upsert_drone(&self, drone: Drone) {
        self.drones.insert(drone.id, drone);
    }

    pub fn upsert_mission(&self, mission: Mission) {
        self.missions.insert(mission.id, mission);
    }

    pub fn get_model(&self, id: i64) -> Option<DroneModel> {
        self.models.get(&id).map(|r| r.value().clone())
    }

    pub fn get_drone(&self, id: i64) -> Option<Drone> {
        self.drones.get(&id).map(|r| r.value().clone())
    }

    pub fn get_mission(&self, id: i64) -> Option<Mission> {
        self.missions.get(&id).map(|r| r.value().clone())
    }

    pub fn all_drones(&self) -> Vec<Drone> {
        let mut drones: Vec<Drone> = self.drones.iter().map(|r| r.value().clone()).collect();
        drones.sort_by_key(|d| d.id);
        drones
    }

    /// Seed a mission's telemetry log, used when loading persisted samples.
    pub fn load_sample(&self, sample: TelemetrySample) {
        self.telemetry
            .entry(sample.mission_id)
            .or_default()
            .push(sample);
    }

    // ----- planner inputs (read-only) -----

    /// Specs of every available drone, joined with its model, in id order.
    pub fn available_drone_specs(&self) -> Vec<DroneSpecs> {
        let mut specs: Vec<DroneSpecs> = self
            .drones
            .iter()
            .filter(|r| r.value().status == DroneStatus::Available)
            .filter_map(|r| {
                let drone = r.value();
                let model = self.models.get(&drone.model_id)?;
                Some(DroneSpecs {
                    drone_id: drone.id,
                    model_name: model.name.clone(),
                    autonomy_minutes: model.autonomy_minutes,
                    capacity_kg: model.capacity_kg,
                    cruise_speed_kmh: model.cruise_speed_kmh,
                })
            })
            .collect();
        specs.sort_by_key(|s| s.drone_id);
        specs
    }

    /// Missions from `ids`, in the order given, that are still pending and
    /// unassigned. The planner takes this set as given.
    pub fn plannable_missions(&self, ids: &[i64]) -> Vec<Mission> {
        ids.iter()
            .filter_map(|id| self.get_mission(*id))
            .filter(|m| m.drone_id.is_none() && m.status == MissionStatus::Pending)
            .collect()
    }

    // ----- telemetry reads -----

    pub fn latest_sample(&self, mission_id: i64) -> Option<TelemetrySample> {
        self.telemetry
            .get(&mission_id)
            .and_then(|log| log.value().last().cloned())
    }

    pub fn samples_for_mission(&self, mission_id: i64) -> Vec<TelemetrySample> {
        self.telemetry
            .get(&mission_id)
            .map(|log| log.value().clone())
            .unwrap_or_default()
    }

    /// Snapshot of every in-progress mission with its latest sample, in
    /// mission id order. Taken once at the start of a tick; missions
    /// started mid-tick wait for the next one.
    pub fn active_flights(&self) -> Vec<(Mission, TelemetrySample)> {
        let mut flights: Vec<(Mission, TelemetrySample)> = self
            .missions
            .iter()
            .filter(|r| r.value().status == MissionStatus::InProgress)
            .filter_map(|r| {
                let mission = r.value().clone();
                let sample = self.latest_sample(mission.id)?;
                Some((mission, sample))
            })
            .collect();
        flights.sort_by_key(|(m, _)| m.id);
        flights
    }

    /// Latest position per in-progress mission. Strictly read-only; never
    /// drives the simulator.
    pub fn current_positions(&self) -> Vec<MissionPosition> {
        self.active_flights()
            .into_iter()
            .map(|(mission, sample)| MissionPosition {
                mission_id: mission.id,
                timestamp: sample.timestamp,
                lat: sample.position.lat,
                lon: sample.position.lon,
                altitude_m: sample.position.altitude_m,
                battery_pct: sample.battery_pct,
            })
            .collect()
    }

    // ----- state transitions -----

    /// Start a pending mission: mission Pending -> InProgress with
    /// `actual_start`, drone Available -> Flying, first sample seeded at
    /// the route start with a full battery.
    pub fn start_mission(&self, mission_id: i64, now: DateTime<Utc>) -> Result<StartedMission, StateError> {
        let mut mission_entry = self
            .missions
            .get_mut(&mission_id)
            .ok_or(StateError::MissionNotFound(mission_id))?;
        let mission = mission_entry.value_mut();

        if mission.status != MissionStatus::Pending {
            return Err(StateError::NotPending(mission_id));
        }
        let drone_id = mission
            .drone_id
            .ok_or(StateError::NoAssignedDrone(mission_id))?;

        let mut drone_entry = self
            .drones
            .get_mut(&drone_id)
            .ok_or(StateError::DroneNotFound(drone_id))?;
        let drone = drone_entry.value_mut();
        if drone.status != DroneStatus::Available {
            return Err(StateError::DroneBusy(drone_id));
        }
        let model = self
            .models
            .get(&drone.model_id)
            .map(|r| r.value().clone())
            .ok_or(StateError::ModelNotFound(drone.model_id))?;

        mission.status = MissionStatus::InProgress;
        mission.actual_start = Some(now);
        drone.status = DroneStatus::Flying;

        let sample = TelemetrySample {
            mission_id,
            timestamp: now,
            position: mission.route.start(),
            speed_kmh: model.cruise_speed_kmh,
            battery_pct: 100.0,
        };
        self.telemetry
            .entry(mission_id)
            .or_default()
            .push(sample.clone());

        Ok(StartedMission {
            mission: mission.clone(),
            drone: drone.clone(),
            sample,
        })
    }

    /// Append a simulator step's sample and, on arrival, complete the
    /// mission and release its drone.
    pub fn apply_flight_step(&self, step: &FlightStep) -> Result<StepApplied, StateError> {
        let mission_id = step.sample.mission_id;
        let mut mission_entry = self
            .missions
            .get_mut(&mission_id)
            .ok_or(StateError::MissionNotFound(mission_id))?;
        let mission = mission_entry.value_mut();

        // A mission failed mid-tick is left alone.
        if mission.status != MissionStatus::InProgress {
            return Ok(StepApplied::Skipped);
        }

        self.telemetry
            .entry(mission_id)
            .or_default()
            .push(step.sample.clone());

        if !step.arrived {
            return Ok(StepApplied::Advanced);
        }

        mission.status = MissionStatus::Completed;
        mission.actual_end = Some(step.sample.timestamp);

        let drone_id = mission
            .drone_id
            .ok_or(StateError::NoAssignedDrone(mission_id))?;
        let mut drone_entry = self
            .drones
            .get_mut(&drone_id)
            .ok_or(StateError::DroneNotFound(drone_id))?;
        let drone = drone_entry.value_mut();
        drone.status = DroneStatus::Available;

        Ok(StepApplied::Completed(mission.clone(), drone.clone()))
    }

    /// External failure path: mark the mission Failed and release its
    /// drone if it was flying. The simulator takes no further action on a
    /// failed mission.
    pub fn fail_mission(&self, mission_id: i64) -> Result<(Mission, Option<Drone>), StateError> {
        let mut mission_entry = self
            .missions
            .get_mut(&mission_id)
            .ok_or(StateError::MissionNotFound(mission_id))?;
        let mission = mission_entry.value_mut();

        if matches!(mission.status, MissionStatus::Completed | MissionStatus::Failed) {
            return Err(StateError::AlreadyFinished(mission_id));
        }
        let was_flying = mission.status == MissionStatus::InProgress;
        mission.status = MissionStatus::Failed;

        let mut released = None;
        if was_flying {
            if let Some(drone_id) = mission.drone_id {
                if let Some(mut drone_entry) = self.drones.get_mut(&drone_id) {
                    drone_entry.value_mut().status = DroneStatus::Available;
                    released = Some(drone_entry.value().clone());
                }
            }
        }
        Ok((mission.clone(), released))
    }
}
