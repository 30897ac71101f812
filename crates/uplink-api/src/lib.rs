//! HTTP surface for the pending-upload tracker.
//!
//! Thin transport over the service layer: route parsing, CORS, auth-header
//! checking, and consistent error shapes. The lifecycle semantics live in
//! `uplink-services` and `uplink-store`.

pub mod api_doc;
pub mod auth;
pub mod error;
pub mod handlers;
pub mod health;
pub mod routes;
pub mod state;
pub mod telemetry;
