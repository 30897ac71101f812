//! Core types for the Uplink pending-upload tracker.
//!
//! This crate holds the configuration, the unified error type, and the domain
//! models shared by the store, host, service, and API crates.

pub mod config;
pub mod error;
pub mod models;

pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
