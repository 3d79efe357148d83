//! Cross-module tests for the map core.
//!
//! - `helpers.rs`: sample actors and factory functions shared by tests
//! - `integration.rs`: end-to-end scenarios (collision, lifecycle,
//!   persistence round-trips, update-loop mutation)

pub mod helpers;

mod integration;
