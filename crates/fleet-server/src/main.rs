//! Fleet Server - mission planning, flight simulation and monitoring

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fleet_server::api::{self, ApiContext};
use fleet_server::config::Config;
use fleet_server::loops;
use fleet_server::persistence::{self, drones as drones_db, missions as missions_db, models as models_db, telemetry as telemetry_db};
use fleet_server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fleet_server=debug".parse()?),
        )
        .init();

    tracing::info!("Starting Fleet Server...");

    let config = Config::from_env();
    let db = persistence::init_database(&config.db_path, config.db_max_connections).await?;
    let state = Arc::new(AppState::new());

    load_state(&db, &state).await?;

    let (shutdown_tx, _) = broadcast::channel(1);
    tokio::spawn(loops::sim_loop::run_sim_loop(
        state.clone(),
        db.clone(),
        config.tick_secs,
        shutdown_tx.subscribe(),
    ));

    let context = ApiContext {
        state,
        db,
    };
    let app = api::routes()
        .with_state(context)
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    drop(shutdown_tx);
    Ok(())
}

/// Rebuild the in-memory store from persisted rows.
async fn load_state(db: &persistence::Database, state: &AppState) -> Result<()> {
    for model in models_db::load_all_models(db.pool()).await? {
        state.upsert_model(model);
    }
    for drone in drones_db::load_all_drones(db.pool()).await? {
        state.upsert_drone(drone);
    }
    for mission in missions_db::load_all_missions(db.pool()).await? {
        state.upsert_mission(mission);
    }
    for sample in telemetry_db::load_latest_samples(db.pool()).await? {
        state.load_sample(sample);
    }
    tracing::info!("State loaded from database");
    Ok(())
}
