//! Error taxonomy for the fleet core.

use thiserror::Error;

/// Errors raised by the core planning and simulation routines.
///
/// Infeasibility is deliberately absent: the planner expresses it as
/// unassigned missions, never as an error.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Malformed route geometry, rejected before planning or simulation.
    #[error("invalid route geometry: {0}")]
    InvalidRoute(String),
}
