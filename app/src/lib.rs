//! FILENAME: app/src/lib.rs
//! PURPOSE: Library side of the `sheet-cli` binary.
//! CONTEXT: Kept separate from `main.rs` so integration tests can drive the
//! shell without spawning a process.

pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;

pub use commands::{Command, Shell};
pub use config::AppConfig;
