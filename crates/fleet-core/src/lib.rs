pub mod cost;
pub mod distance;
pub mod error;
pub mod geo;
pub mod models;
pub mod planner;
pub mod sim;

pub use distance::{DistanceMatrix, SENTINEL_DISTANCE_M};
pub use error::CoreError;
pub use models::{
    Drone, DroneModel, DroneStatus, Mission, MissionStatus, Route, RouteVertex, TelemetrySample,
};
pub use planner::{plan, DroneItinerary, DroneSpecs, ItineraryStop, PlanOutcome};
pub use sim::{advance_flight, FlightStep};
