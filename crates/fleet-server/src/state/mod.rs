//! In-memory application state.

pub mod store;

pub use store::{AppState, MissionPosition, StartedMission, StateError, StepApplied};
