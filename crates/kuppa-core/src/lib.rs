//! kuppa-core - Core library for Kuppa
//!
//! This crate provides configuration parsing (`kuppa.yml` plus environment
//! overrides) and the shared error type used across all Kuppa components.

pub mod config;
pub mod error;

pub use config::{AppStatus, Config, Credentials, DatabaseConfig};
pub use error::{CoreError, CoreResult};
