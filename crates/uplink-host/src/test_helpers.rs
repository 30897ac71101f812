//! Mock host implementation for testing without network access.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use uplink_core::AppError;

use crate::client::{DeleteOutcome, HostAccount, PlaceholderUpload, VideoHost};

/// Scriptable [`VideoHost`] that records every call.
#[derive(Default)]
pub struct MockVideoHost {
    counter: AtomicU64,
    fail_create: AtomicBool,
    fail_delete_for: Mutex<HashSet<String>>,
    already_gone: Mutex<HashSet<String>>,
    deletes: Mutex<Vec<String>>,
    showcased: Mutex<Vec<String>>,
}

impl MockVideoHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next (and all later) create calls fail.
    pub fn fail_creates(&self) {
        self.fail_create.store(true, Ordering::SeqCst);
    }

    /// Script a transient delete failure for `media_id`.
    pub fn fail_delete_for(&self, media_id: &str) {
        self.fail_delete_for
            .lock()
            .unwrap()
            .insert(media_id.to_string());
    }

    /// Script the host reporting `media_id` as already absent.
    pub fn mark_already_gone(&self, media_id: &str) {
        self.already_gone
            .lock()
            .unwrap()
            .insert(media_id.to_string());
    }

    /// Media ids for which a remote delete was attempted.
    pub fn delete_calls(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }

    pub fn showcased(&self) -> Vec<String> {
        self.showcased.lock().unwrap().clone()
    }
}

#[async_trait]
impl VideoHost for MockVideoHost {
    async fn create_placeholder(
        &self,
        _size_bytes: u64,
        _name: &str,
    ) -> Result<PlaceholderUpload, AppError> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(AppError::RemoteHost("scripted create failure".to_string()));
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(PlaceholderUpload {
            upload_link: format!("https://host.test/upload/{}", n),
            media_id: format!("media-{}", n),
        })
    }

    async fn delete_video(&self, media_id: &str) -> Result<DeleteOutcome, AppError> {
        self.deletes.lock().unwrap().push(media_id.to_string());
        if self.fail_delete_for.lock().unwrap().contains(media_id) {
            return Err(AppError::RemoteHost(format!(
                "scripted delete failure for {}",
                media_id
            )));
        }
        if self.already_gone.lock().unwrap().contains(media_id) {
            return Ok(DeleteOutcome::AlreadyGone);
        }
        Ok(DeleteOutcome::Deleted)
    }

    async fn add_to_showcase(&self, media_id: &str) -> Result<(), AppError> {
        self.showcased.lock().unwrap().push(media_id.to_string());
        Ok(())
    }

    async fn whoami(&self) -> Result<HostAccount, AppError> {
        Ok(HostAccount {
            name: "test account".to_string(),
            uri: "/users/0".to_string(),
        })
    }
}
