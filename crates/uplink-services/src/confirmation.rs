//! Confirmation handling.

use chrono::{DateTime, Utc};
use tracing::info;
use uplink_core::models::ConfirmOutcome;
use uplink_core::AppError;
use uplink_store::PendingRepository;

/// Pass-through to the repository's confirm with input validation. A single
/// durable write attempt, no retries: the store's own durability is what is
/// relied upon.
#[derive(Clone)]
pub struct ConfirmationService {
    repository: PendingRepository,
}

impl ConfirmationService {
    pub fn new(repository: PendingRepository) -> Self {
        Self { repository }
    }

    pub async fn confirm(
        &self,
        token: &str,
        media_id: &str,
        confirmed_at: Option<DateTime<Utc>>,
    ) -> Result<ConfirmOutcome, AppError> {
        if token.trim().is_empty() {
            return Err(AppError::InvalidInput("token is required".to_string()));
        }
        if media_id.trim().is_empty() {
            return Err(AppError::InvalidInput("media_id is required".to_string()));
        }

        let confirmed_at = confirmed_at.unwrap_or_else(Utc::now);
        let outcome = self.repository.confirm(token, media_id, confirmed_at).await?;

        info!(media_id, ?outcome, "Processed upload confirmation");

        Ok(outcome)
    }
}
