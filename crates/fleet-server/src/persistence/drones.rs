//! Drone persistence operations.

use anyhow::Result;
use fleet_core::{Drone, DroneStatus};
use sqlx::SqlitePool;

/// Upsert a drone into the database.
pub async fn upsert_drone(pool: &SqlitePool, drone: &Drone) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO drones (drone_id, model_id, status)
        VALUES (?1, ?2, ?3)
        ON CONFLICT(drone_id) DO UPDATE SET
            model_id = ?2, status = ?3
        "#,
    )
    .bind(drone.id)
    .bind(drone.model_id)
    .bind(status_label(drone.status))
    .execute(pool)
    .await?;

    Ok(())
}

/// Load all drones from the database.
pub async fn load_all_drones(pool: &SqlitePool) -> Result<Vec<Drone>> {
    let rows = sqlx::query_as::<_, DroneRow>("SELECT drone_id, model_id, status FROM drones")
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

fn status_label(status: DroneStatus) -> &'static str {
    match status {
        DroneStatus::Available => "available",
        DroneStatus::Flying => "flying",
        DroneStatus::Maintenance => "maintenance",
    }
}

// Internal row type for SQLx
#[derive(sqlx::FromRow)]
struct DroneRow {
    drone_id: i64,
    model_id: i64,
    status: String,
}

impl From<DroneRow> for Drone {
    fn from(row: DroneRow) -> Self {
        let status = match row.status.as_str() {
            "flying" => DroneStatus::Flying,
            "maintenance" => DroneStatus::Maintenance,
            _ => DroneStatus::Available,
        };
        Drone {
            id: row.drone_id,
            model_id: row.model_id,
            status,
        }
    }
}
