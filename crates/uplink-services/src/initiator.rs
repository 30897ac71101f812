//! Upload intent initiation.

use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use tracing::{info, warn};
use uplink_core::models::InitiateUploadResponse;
use uplink_core::AppError;
use uplink_host::VideoHost;
use uplink_store::PendingRepository;

const TOKEN_BYTES: usize = 32;
const DEFAULT_DISPLAY_NAME: &str = "untitled upload";

/// Creates a remote placeholder and registers the pending record that makes
/// abandonment detectable.
#[derive(Clone)]
pub struct UploadInitiator {
    repository: PendingRepository,
    host: Arc<dyn VideoHost>,
}

impl UploadInitiator {
    pub fn new(repository: PendingRepository, host: Arc<dyn VideoHost>) -> Self {
        Self { repository, host }
    }

    /// Obtain an upload destination from the host and register the pending
    /// record.
    ///
    /// Host failure is fatal: no record is written. Registration failure
    /// after host success is not: the caller already holds a usable upload
    /// link, so the outcome is downgraded to `safety_net_registered: false`
    /// and the leak is bounded by the host-side TTL never firing -- the
    /// placeholder simply stays until an operator notices.
    pub async fn initiate(
        &self,
        size_bytes: u64,
        display_name: Option<&str>,
    ) -> Result<InitiateUploadResponse, AppError> {
        if size_bytes == 0 {
            return Err(AppError::InvalidInput(
                "size_bytes must be positive".to_string(),
            ));
        }

        let name = display_name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_DISPLAY_NAME);

        let placeholder = self.host.create_placeholder(size_bytes, name).await?;

        // Best-effort organization; never fails the request.
        if let Err(e) = self.host.add_to_showcase(&placeholder.media_id).await {
            warn!(media_id = %placeholder.media_id, error = %e, "Add to showcase failed");
        }

        let token = generate_token();
        let created_at = Utc::now();

        let safety_net_registered = match self
            .repository
            .create(&token, &placeholder.media_id, created_at)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    media_id = %placeholder.media_id,
                    error = %e,
                    "Pending record registration failed; abandonment safety net not guaranteed"
                );
                false
            }
        };

        info!(
            media_id = %placeholder.media_id,
            size_bytes,
            safety_net_registered,
            "Initiated upload"
        );

        Ok(InitiateUploadResponse {
            upload_link: placeholder.upload_link,
            media_id: placeholder.media_id,
            token,
            safety_net_registered,
        })
    }
}

/// Opaque capability token: 32 random bytes, hex-encoded. ThreadRng is a
/// CSPRNG, which is what makes the token unguessable.
fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_long_and_unique() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), TOKEN_BYTES * 2);
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
