// NOTE: CLI layering
//
// - args: clap definitions only
// - commands: resolves config/logging once, then dispatches
// - handlers: one module per subcommand; each loads input, calls the engine, prints
// - The engine never does I/O; every file read happens here.

mod args;
mod commands;
pub mod config;
mod feed;
mod handlers;
pub mod logging;
pub mod types;

pub use args::{Cli, Commands, ConfigCommand};
pub use commands::run;
