//! audiocare-cli library root.
//!
//! Re-exports the command layer so integration tests can drive it against a
//! temporary data directory without going through argument parsing.

pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
