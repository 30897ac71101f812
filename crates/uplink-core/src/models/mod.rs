//! Domain models shared across crates.

pub mod pending;
pub mod requests;
pub mod sweep;

pub use pending::{ConfirmOutcome, ConfirmedMarker, PendingRecord};
pub use requests::{
    ConfirmFailureReason, ConfirmUploadRequest, ConfirmUploadResponse, InitiateUploadRequest,
    InitiateUploadResponse, SweepRequest,
};
pub use sweep::{SweepItem, SweepItemOutcome, SweepReport};
