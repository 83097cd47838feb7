//! Mission persistence operations.
//!
//! Routes are stored as WKT LINESTRING text and parsed on load; rows with
//! malformed geometry are logged and skipped rather than failing startup.

use anyhow::Result;
use chrono::{DateTime, Utc};
use fleet_core::{Mission, MissionStatus, Route};
use sqlx::SqlitePool;

/// Upsert a mission into the database.
pub async fn upsert_mission(pool: &SqlitePool, mission: &Mission) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO missions (mission_id, mission_type, created_by, drone_id,
                              planned_start, planned_end, actual_start, actual_end,
                              status, route_wkt)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        ON CONFLICT(mission_id) DO UPDATE SET
            mission_type = ?2, created_by = ?3, drone_id = ?4,
            planned_start = ?5, planned_end = ?6, actual_start = ?7, actual_end = ?8,
            status = ?9, route_wkt = ?10
        "#,
    )
    .bind(mission.id)
    .bind(&mission.mission_type)
    .bind(mission.created_by)
    .bind(mission.drone_id)
    .bind(mission.planned_start.map(|t| t.to_rfc3339()))
    .bind(mission.planned_end.map(|t| t.to_rfc3339()))
    .bind(mission.actual_start.map(|t| t.to_rfc3339()))
    .bind(mission.actual_end.map(|t| t.to_rfc3339()))
    .bind(status_label(mission.status))
    .bind(mission.route.to_wkt())
    .execute(pool)
    .await?;

    Ok(())
}

/// Load all missions from the database.
pub async fn load_all_missions(pool: &SqlitePool) -> Result<Vec<Mission>> {
    let rows = sqlx::query_as::<_, MissionRow>(
        "SELECT mission_id, mission_type, created_by, drone_id, planned_start, planned_end, \
         actual_start, actual_end, status, route_wkt FROM missions",
    )
    .fetch_all(pool)
    .await?;

    let mut missions = Vec::with_capacity(rows.len());
    for row in rows {
        match Mission::try_from(row) {
            Ok(mission) => missions.push(mission),
            Err(err) => tracing::warn!("Skipping mission with bad geometry: {}", err),
        }
    }
    Ok(missions)
}

fn status_label(status: MissionStatus) -> &'static str {
    match status {
        MissionStatus::Pending => "pending",
        MissionStatus::InProgress => "in_progress",
        MissionStatus::Completed => "completed",
        MissionStatus::Failed => "failed",
    }
}

fn parse_timestamp(value: Option<String>) -> Option<DateTime<Utc>> {
    value.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    })
}

// Internal row type for SQLx
#[derive(sqlx::FromRow)]
struct MissionRow {
    mission_id: i64,
    mission_type: String,
    created_by: i64,
    drone_id: Option<i64>,
    planned_start: Option<String>,
    planned_end: Option<String>,
    actual_start: Option<String>,
    actual_end: Option<String>,
    status: String,
    route_wkt: String,
}

impl TryFrom<MissionRow> for Mission {
    type Error = fleet_core::CoreError;

    fn try_from(row: MissionRow) -> Result<Self, Self::Error> {
        let status = match row.status.as_str() {
            "in_progress" => MissionStatus::InProgress,
            "completed" => MissionStatus::Completed,
            "failed" => MissionStatus::Failed,
            _ => MissionStatus::Pending,
        };
        Ok(Mission {
            id: row.mission_id,
            mission_type: row.mission_type,
            created_by: row.created_by,
            drone_id: row.drone_id,
            planned_start: parse_timestamp(row.planned_start),
            planned_end: parse_timestamp(row.planned_end),
            actual_start: parse_timestamp(row.actual_start),
            actual_end: parse_timestamp(row.actual_end),
            status,
            route: Route::parse_wkt(&row.route_wkt)?,
        })
    }
}
