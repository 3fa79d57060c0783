//! `scenecut-cli` library crate.
//!
//! Argument parsing, the per-run session flow and text output. The binary
//! entrypoint lives in `main.rs`.

pub mod args;
pub mod output;
pub mod session;
