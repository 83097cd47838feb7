//! Shared library surface for fleet server utilities and tests.

pub mod api;
pub mod config;
pub mod engine;
pub mod loops;
pub mod persistence;
pub mod state;
