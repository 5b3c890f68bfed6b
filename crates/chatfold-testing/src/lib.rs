//! Testing infrastructure for chatfold tests.
//!
//! - `EventScript`: fluent builder for scripted event feeds
//! - `TestWorld`: isolated temp directory for running the CLI
//! - `assertions`: JSON-level checks on CLI output
//! - `fixtures`: ready-made feeds and message lists

pub mod assertions;
pub mod fixtures;
pub mod script;
pub mod world;

pub use script::EventScript;
pub use world::{CliResult, TestWorld};
