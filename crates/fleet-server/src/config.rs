//! Server configuration from environment.

use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub db_path: String,
    pub db_max_connections: u32,
    /// Simulator tick period in seconds of wall-clock time.
    pub tick_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            server_port: env::var("FLEET_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3000),
            db_path: env::var("FLEET_DB_PATH").unwrap_or_else(|_| "data/fleet.db".to_string()),
            db_max_connections: env::var("FLEET_DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
            tick_secs: env::var("FLEET_TICK_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|&secs| secs > 0)
                .unwrap_or(5),
        }
    }
}
