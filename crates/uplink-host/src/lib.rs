//! Client for the remote video host.
//!
//! The host is an external collaborator: create a placeholder for a
//! resumable upload, delete a video, organize it into a showcase, and probe
//! the credential. Everything behind the [`VideoHost`] trait so services and
//! tests share one contract.

pub mod client;
pub mod test_helpers;

pub use client::{DeleteOutcome, HostAccount, PlaceholderUpload, RemoteHost, VideoHost};
