//! Expiry sweeper.
//!
//! One sweep: scan for stale records, delete the remote object, retire the
//! record on delete success. Per-item fault isolation throughout -- one
//! item's failure never aborts the batch. Sweeps may overlap in time; retire
//! and delete-of-already-gone are both idempotent, so two concurrent
//! sweepers can process the same record and both observe success.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::time::interval;
use tracing::{error, info, warn};
use uplink_core::models::{SweepItem, SweepItemOutcome, SweepReport};
use uplink_core::AppError;
use uplink_host::VideoHost;
use uplink_store::{ExpiredEntry, PendingRepository};

#[derive(Clone)]
pub struct SweepService {
    repository: PendingRepository,
    host: Arc<dyn VideoHost>,
}

impl SweepService {
    pub fn new(repository: PendingRepository, host: Arc<dyn VideoHost>) -> Self {
        Self { repository, host }
    }

    /// Run one sweep over records created at or before `cutoff`, processing
    /// at most `limit` of them.
    #[tracing::instrument(skip(self), fields(sweep.limit = limit))]
    pub async fn sweep(
        &self,
        cutoff: DateTime<Utc>,
        limit: usize,
    ) -> Result<SweepReport, AppError> {
        let entries = self.repository.scan_expired(cutoff, limit).await?;
        let found = entries.len();

        let mut items = Vec::with_capacity(found);
        let mut deleted = 0usize;

        for entry in entries {
            let record = match entry {
                ExpiredEntry::Pending(record) => record,
                ExpiredEntry::Malformed { token } => {
                    items.push(SweepItem {
                        token,
                        media_id: None,
                        outcome: SweepItemOutcome::Malformed,
                        error: Some("undecodable pending record".to_string()),
                    });
                    continue;
                }
            };

            let item = self.process_record(&record.token, &record.media_id).await;
            if item.outcome == SweepItemOutcome::Deleted {
                deleted += 1;
            }
            items.push(item);
        }

        info!(found, deleted, "Sweep completed");

        Ok(SweepReport {
            cutoff,
            found,
            deleted,
            items,
        })
    }

    /// Delete one abandoned upload. The confirmed marker is re-checked as
    /// late as practical to narrow the confirm-during-sweep race window;
    /// past that point at-least-once deletion is accepted.
    async fn process_record(&self, token: &str, media_id: &str) -> SweepItem {
        let item = |outcome, error: Option<String>| SweepItem {
            token: token.to_string(),
            media_id: Some(media_id.to_string()),
            outcome,
            error,
        };

        match self.repository.is_confirmed(media_id).await {
            Ok(true) => {
                if let Err(e) = self.repository.retire(token).await {
                    warn!(token, error = %e, "Retire of confirmed record failed");
                    return item(SweepItemOutcome::DeleteFailed, Some(e.to_string()));
                }
                info!(token, media_id, "Skipped confirmed upload during sweep");
                return item(SweepItemOutcome::SkippedConfirmed, None);
            }
            Ok(false) => {}
            Err(e) => {
                // Cannot prove the upload was not confirmed; deleting now
                // would risk the one thing this system must never do.
                warn!(token, media_id, error = %e, "Marker re-check failed; leaving record");
                return item(SweepItemOutcome::DeleteFailed, Some(e.to_string()));
            }
        }

        if let Err(e) = self.host.delete_video(media_id).await {
            warn!(token, media_id, error = %e, "Remote delete failed; next sweep retries");
            return item(SweepItemOutcome::DeleteFailed, Some(e.to_string()));
        }

        // Retire only after the remote object is gone. If this fails the
        // record stays, and the next sweep's delete comes back already-gone.
        if let Err(e) = self.repository.retire(token).await {
            error!(token, media_id, error = %e, "Retire after delete failed");
            return item(SweepItemOutcome::DeleteFailed, Some(e.to_string()));
        }

        info!(token, media_id, "Reclaimed abandoned upload");
        item(SweepItemOutcome::Deleted, None)
    }

    /// Start the periodic background sweep. Returns a JoinHandle for
    /// graceful shutdown.
    pub fn start(
        self: Arc<Self>,
        every: Duration,
        stale_minutes: i64,
        limit: usize,
    ) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut sweep_interval = interval(every);

            loop {
                sweep_interval.tick().await;

                let cutoff = Utc::now() - TimeDelta::minutes(stale_minutes);
                match self.sweep(cutoff, limit).await {
                    Ok(report) => {
                        if report.found > 0 {
                            info!(
                                found = report.found,
                                deleted = report.deleted,
                                "Scheduled sweep finished"
                            );
                        }
                    }
                    Err(e) => {
                        error!(error = %e, "Scheduled sweep failed");
                    }
                }
            }
        })
    }
}
