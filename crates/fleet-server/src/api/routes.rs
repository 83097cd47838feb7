//! REST API routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::api::ApiContext;
use crate::engine;
use crate::persistence::{drones as drones_db, missions as missions_db, telemetry as telemetry_db};
use crate::state::StateError;

/// Create the API router.
pub fn create_router() -> Router<ApiContext> {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/v1/routes/optimize", post(optimize_routes))
        .route("/v1/monitor/positions", get(monitor_positions))
        .route("/v1/drones", get(list_drones))
        .route("/v1/missions/:id/start", post(start_mission))
        .route("/v1/missions/:id/fail", post(fail_mission))
        .route("/v1/missions/:id/telemetry", get(mission_telemetry))
}

#[derive(Debug, Deserialize)]
struct OptimizeRequest {
    mission_ids: Vec<i64>,
}

/// Batch route optimization. Read-only: the returned itineraries are a
/// proposal; committing assignments is a separate (external) operation.
async fn optimize_routes(
    State(ctx): State<ApiContext>,
    Json(request): Json<OptimizeRequest>,
) -> impl IntoResponse {
    let outcome = engine::optimize_routes(&ctx.state, &request.mission_ids);
    Json(outcome)
}

/// Latest position per active mission, for monitoring dashboards.
/// Never drives the simulator.
async fn monitor_positions(State(ctx): State<ApiContext>) -> impl IntoResponse {
    Json(ctx.state.current_positions())
}

async fn list_drones(State(ctx): State<ApiContext>) -> impl IntoResponse {
    Json(ctx.state.all_drones())
}

async fn start_mission(
    State(ctx): State<ApiContext>,
    Path(mission_id): Path<i64>,
) -> impl IntoResponse {
    let started = match ctx.state.start_mission(mission_id, Utc::now()) {
        Ok(started) => started,
        Err(err) => return state_error_response(err),
    };

    let persisted = async {
        missions_db::upsert_mission(ctx.db.pool(), &started.mission).await?;
        drones_db::upsert_drone(ctx.db.pool(), &started.drone).await?;
        telemetry_db::insert_sample(ctx.db.pool(), &started.sample).await
    }
    .await;
    if let Err(err) = persisted {
        tracing::error!(mission_id, "failed to persist mission start: {}", err);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "persistence failure"})),
        );
    }

    (StatusCode::OK, Json(json!({"mission": started.mission})))
}

async fn fail_mission(
    State(ctx): State<ApiContext>,
    Path(mission_id): Path<i64>,
) -> impl IntoResponse {
    let (mission, released) = match ctx.state.fail_mission(mission_id) {
        Ok(result) => result,
        Err(err) => return state_error_response(err),
    };

    let persisted = async {
        missions_db::upsert_mission(ctx.db.pool(), &mission).await?;
        if let Some(drone) = &released {
            drones_db::upsert_drone(ctx.db.pool(), drone).await?;
        }
        anyhow::Ok(())
    }
    .await;
    if let Err(err) = persisted {
        tracing::error!(mission_id, "failed to persist mission failure: {}", err);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "persistence failure"})),
        );
    }

    (StatusCode::OK, Json(json!({"mission": mission})))
}

/// Full sample history for one mission, read from storage so it survives
/// restarts.
async fn mission_telemetry(
    State(ctx): State<ApiContext>,
    Path(mission_id): Path<i64>,
) -> impl IntoResponse {
    if ctx.state.get_mission(mission_id).is_none() {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": format!("mission not found: {mission_id}")})),
        )
            .into_response();
    }
    match telemetry_db::load_samples_for_mission(ctx.db.pool(), mission_id).await {
        Ok(samples) => Json(samples).into_response(),
        Err(err) => {
            tracing::error!(mission_id, "failed to load telemetry: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "persistence failure"})),
            )
                .into_response()
        }
    }
}

fn state_error_response(err: StateError) -> (StatusCode, Json<serde_json::Value>) {
    let status = match err {
        StateError::MissionNotFound(_)
        | StateError::DroneNotFound(_)
        | StateError::ModelNotFound(_) => StatusCode::NOT_FOUND,
        StateError::NoAssignedDrone(_)
        | StateError::NotPending(_)
        | StateError::AlreadyFinished(_)
        | StateError::DroneBusy(_) => StatusCode::CONFLICT,
    };
    (status, Json(json!({"error": err.to_string()})))
}
