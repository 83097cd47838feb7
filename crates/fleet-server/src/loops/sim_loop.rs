//! Flight simulation loop.
//!
//! Fires the flight simulator for every in-progress mission on a fixed
//! period and writes the resulting samples and state transitions through
//! to storage. A failure on one mission skips that mission and continues
//! with the rest; there is no global abort.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tokio::time::interval;

use fleet_core::sim::advance_flight;
use fleet_core::{Mission, TelemetrySample};

use crate::persistence::{drones as drones_db, missions as missions_db, telemetry as telemetry_db, Database};
use crate::state::{AppState, StepApplied};

/// What one tick did to one mission.
#[derive(Debug, Clone)]
pub struct TickOutcome {
    pub mission_id: i64,
    pub drone_id: i64,
    pub sample: TelemetrySample,
    pub arrived: bool,
}

pub async fn run_sim_loop(
    state: Arc<AppState>,
    db: Database,
    tick_secs: u64,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut ticker = interval(Duration::from_secs(tick_secs));

    loop {
        tokio::select! {
            _ = shutdown.recv() => {
                tracing::info!("Simulation loop shutting down");
                break;
            }
            _ = ticker.tick() => {
                let outcomes = run_tick(&state, tick_secs as f64, Utc::now());
                persist_outcomes(&db, &state, &outcomes).await;
            }
        }
    }
}

/// Advance every in-progress mission by `delta_seconds`.
///
/// Telemetry is snapshotted once up front; a mission started mid-tick is
/// not advanced until the next tick. Missions whose drone or model record
/// is missing are logged and skipped.
pub fn run_tick(state: &AppState, delta_seconds: f64, now: DateTime<Utc>) -> Vec<TickOutcome> {
    let flights = state.active_flights();
    let mut outcomes = Vec::with_capacity(flights.len());

    for (mission, latest) in flights {
        if let Some(outcome) = advance_one(state, &mission, &latest, delta_seconds, now) {
            outcomes.push(outcome);
        }
    }

    outcomes
}

/// Advance one snapshotted flight. Returns `None` when the mission was
/// skipped and no sample was appended, so nothing reaches storage: missing
/// drone or model records, or a mission that left InProgress (e.g. failed
/// externally) after the snapshot was taken.
fn advance_one(
    state: &AppState,
    mission: &Mission,
    latest: &TelemetrySample,
    delta_seconds: f64,
    now: DateTime<Utc>,
) -> Option<TickOutcome> {
    let Some(drone_id) = mission.drone_id else {
        tracing::warn!(mission_id = mission.id, "in-progress mission has no drone, skipping");
        return None;
    };
    let Some(drone) = state.get_drone(drone_id) else {
        tracing::warn!(mission_id = mission.id, drone_id, "drone record missing, skipping");
        return None;
    };
    let Some(model) = state.get_model(drone.model_id) else {
        tracing::warn!(
            mission_id = mission.id,
            model_id = drone.model_id,
            "drone model missing, skipping"
        );
        return None;
    };

    let step = advance_flight(mission, latest, model.cruise_speed_kmh, delta_seconds, now);
    let arrived = step.arrived;
    match state.apply_flight_step(&step) {
        Ok(StepApplied::Skipped) => None,
        Ok(applied) => {
            if matches!(applied, StepApplied::Completed(..)) {
                tracing::info!(mission_id = mission.id, drone_id, "mission completed");
            }
            Some(TickOutcome {
                mission_id: mission.id,
                drone_id,
                sample: step.sample,
                arrived,
            })
        }
        Err(err) => {
            tracing::warn!(mission_id = mission.id, "failed to apply tick: {}", err);
            None
        }
    }
}

/// Write one tick's outcomes through to storage. A failed write is logged
/// and the remaining outcomes still go through.
async fn persist_outcomes(db: &Database, state: &AppState, outcomes: &[TickOutcome]) {
    for outcome in outcomes {
        if let Err(err) = persist_outcome(db, state, outcome).await {
            tracing::warn!(
                mission_id = outcome.mission_id,
                "tick persistence failed: {}",
                err
            );
        }
    }
}

async fn persist_outcome(db: &Database, state: &AppState, outcome: &TickOutcome) -> Result<()> {
    telemetry_db::insert_sample(db.pool(), &outcome.sample).await?;
    if outcome.arrived {
        if let Some(mission) = state.get_mission(outcome.mission_id) {
            missions_db::upsert_mission(db.pool(), &mission).await?;
        }
        if let Some(drone) = state.get_drone(outcome.drone_id) {
            drones_db::upsert_drone(db.pool(), &drone).await?;
        }
    }
    Ok(())
}
