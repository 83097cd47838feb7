//! Drone model persistence operations.

use anyhow::Result;
use fleet_core::DroneModel;
use sqlx::SqlitePool;

/// Upsert a drone model into the database.
pub async fn upsert_model(pool: &SqlitePool, model: &DroneModel) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO drone_models (model_id, name, capacity_kg, autonomy_minutes, cruise_speed_kmh)
        VALUES (?1, ?2, ?3, ?4, ?5)
        ON CONFLICT(model_id) DO UPDATE SET
            name = ?2, capacity_kg = ?3, autonomy_minutes = ?4, cruise_speed_kmh = ?5
        "#,
    )
    .bind(model.id)
    .bind(&model.name)
    .bind(model.capacity_kg)
    .bind(model.autonomy_minutes)
    .bind(model.cruise_speed_kmh)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load all drone models from the database.
pub async fn load_all_models(pool: &SqlitePool) -> Result<Vec<DroneModel>> {
    let rows = sqlx::query_as::<_, ModelRow>(
        "SELECT model_id, name, capacity_kg, autonomy_minutes, cruise_speed_kmh FROM drone_models",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

// Internal row type for SQLx
#[derive(sqlx::FromRow)]
struct ModelRow {
    model_id: i64,
    name: String,
    capacity_kg: f64,
    autonomy_minutes: f64,
    cruise_speed_kmh: f64,
}

impl From<ModelRow> for DroneModel {
    fn from(row: ModelRow) -> Self {
        DroneModel {
            id: row.model_id,
            name: row.name,
            capacity_kg: row.capacity_kg,
            autonomy_minutes: row.autonomy_minutes,
            cruise_speed_kmh: row.cruise_speed_kmh,
        }
    }
}
