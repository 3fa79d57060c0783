//! `scenecut-client` library crate.
//!
//! HTTP client for the processing backend, the job controller that drives
//! the page state machine, media probing and artifact downloads.

pub mod api;
pub mod backend;
pub mod config;
pub mod controller;
pub mod download;
pub mod error;
pub mod events;
pub mod media;
