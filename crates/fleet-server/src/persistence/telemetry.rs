//! Flight telemetry persistence operations.
//!
//! The sample log is append-only: rows are only ever inserted.

use anyhow::Result;
use chrono::{DateTime, Utc};
use fleet_core::{RouteVertex, TelemetrySample};
use sqlx::SqlitePool;

/// Append one telemetry sample.
pub async fn insert_sample(pool: &SqlitePool, sample: &TelemetrySample) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO flight_samples (mission_id, timestamp, lon, lat, altitude_m, speed_kmh, battery_pct)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(sample.mission_id)
    .bind(sample.timestamp.to_rfc3339())
    .bind(sample.position.lon)
    .bind(sample.position.lat)
    .bind(sample.position.altitude_m)
    .bind(sample.speed_kmh)
    .bind(sample.battery_pct)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load every sample for one mission, ordered by timestamp.
pub async fn load_samples_for_mission(
    pool: &SqlitePool,
    mission_id: i64,
) -> Result<Vec<TelemetrySample>> {
    let rows = sqlx::query_as::<_, SampleRow>(
        "SELECT mission_id, timestamp, lon, lat, altitude_m, speed_kmh, battery_pct \
         FROM flight_samples WHERE mission_id = ?1 ORDER BY timestamp",
    )
    .bind(mission_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

/// Load the most recent sample per mission, for rebuilding live state at
/// startup.
pub async fn load_latest_samples(pool: &SqlitePool) -> Result<Vec<TelemetrySample>> {
    let rows = sqlx::query_as::<_, SampleRow>(
        r#"
        SELECT s.mission_id, s.timestamp, s.lon, s.lat, s.altitude_m, s.speed_kmh, s.battery_pct
        FROM flight_samples s
        JOIN (
            SELECT mission_id, MAX(timestamp) AS latest
            FROM flight_samples
            GROUP BY mission_id
        ) last ON last.mission_id = s.mission_id AND last.latest = s.timestamp
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

// Internal row type for SQLx
#[derive(sqlx::FromRow)]
struct SampleRow {
    mission_id: i64,
    timestamp: String,
    lon: f64,
    lat: f64,
    altitude_m: f64,
    speed_kmh: f64,
    battery_pct: f64,
}

impl From<SampleRow> for TelemetrySample {
    fn from(row: SampleRow) -> Self {
        let timestamp = DateTime::parse_from_rfc3339(&row.timestamp)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());
        TelemetrySample {
            mission_id: row.mission_id,
            timestamp,
            position: RouteVertex {
                lon: row.lon,
                lat: row.lat,
                altitude_m: row.altitude_m,
            },
            speed_kmh: row.speed_kmh,
            battery_pct: row.battery_pct,
        }
    }
}
