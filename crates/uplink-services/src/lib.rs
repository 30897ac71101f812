//! Services driving the pending-upload state machine.
//!
//! Three entry points operate on the same repository concurrently: the
//! initiator registers records, the confirmation service retires them on the
//! success path, and the sweeper reclaims abandoned ones. No locking beyond
//! the store's per-key atomicity; the repository's repair logic covers the
//! cross-key races.

pub mod confirmation;
pub mod initiator;
pub mod sweeper;

pub use confirmation::ConfirmationService;
pub use initiator::UploadInitiator;
pub use sweeper::SweepService;
