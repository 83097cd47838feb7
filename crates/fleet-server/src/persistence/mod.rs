//! Persistence layer for the fleet server.
//!
//! Provides SQLite-backed storage for drone models, drones, missions and
//! flight telemetry. State is loaded into the in-memory store at startup
//! and written through on mutation.

pub mod db;
pub mod drones;
pub mod missions;
pub mod models;
pub mod telemetry;

pub use db::{init_database, Database};
