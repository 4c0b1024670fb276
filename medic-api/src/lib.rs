//! Medic API - HTTP access to the repository-healing agent backend
//!
//! This crate implements the status, start-run and deployment-logs
//! sources used by the synchronization engine in `medic-core`.

mod client;
mod error;

pub use client::ApiClient;
pub use error::{Error, Result};
