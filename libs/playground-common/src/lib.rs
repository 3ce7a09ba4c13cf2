//! Shared building blocks for the playground relay and its clients.
//!
//! The API server and the CLI both depend on this crate so that the wire
//! contract (`types`), the language alias table (`languages`) and the relay
//! policy (`config`) cannot drift between the two sides.

pub mod config;
pub mod languages;
pub mod preview;
pub mod runner;
pub mod templates;
pub mod types;
