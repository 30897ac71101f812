//! End-to-end lifecycle tests: initiate, confirm, and sweep against the
//! in-memory store and the mock host.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use uplink_core::models::{ConfirmOutcome, SweepItemOutcome};
use uplink_core::AppError;
use uplink_host::test_helpers::MockVideoHost;
use uplink_host::VideoHost;
use uplink_services::{ConfirmationService, SweepService, UploadInitiator};
use uplink_store::test_helpers::MemoryStore;
use uplink_store::{KvStore, PendingRepository};

struct Fixture {
    store: MemoryStore,
    repository: PendingRepository,
    host: Arc<MockVideoHost>,
    sweeper: SweepService,
}

fn fixture() -> Fixture {
    let store = MemoryStore::new();
    let repository = PendingRepository::new(
        Arc::new(store.clone()),
        Duration::from_secs(6 * 3600),
        Duration::from_secs(30 * 24 * 3600),
    );
    let host = Arc::new(MockVideoHost::new());
    let sweeper = SweepService::new(repository.clone(), host.clone());
    Fixture {
        store,
        repository,
        host,
        sweeper,
    }
}

#[tokio::test]
async fn initiate_returns_complete_outcome() {
    let f = fixture();
    let initiator = UploadInitiator::new(f.repository.clone(), f.host.clone());

    let outcome = initiator.initiate(1024, Some("holiday.mp4")).await.unwrap();

    assert!(!outcome.upload_link.is_empty());
    assert!(!outcome.media_id.is_empty());
    assert!(!outcome.token.is_empty());
    assert!(outcome.safety_net_registered);

    // The pending record backs the returned token.
    let record = f.repository.read(&outcome.token).await.unwrap().unwrap();
    assert_eq!(record.media_id, outcome.media_id);

    // Post-create organization happened.
    assert_eq!(f.host.showcased(), vec![outcome.media_id]);
}

#[tokio::test]
async fn initiate_host_failure_writes_nothing() {
    let f = fixture();
    f.host.fail_creates();
    let initiator = UploadInitiator::new(f.repository.clone(), f.host.clone());

    let err = initiator.initiate(1024, None).await.unwrap_err();
    assert!(matches!(err, AppError::RemoteHost(_)));
    assert_eq!(f.store.live_key_count(), 0);
}

#[tokio::test]
async fn initiate_rejects_zero_size() {
    let f = fixture();
    let initiator = UploadInitiator::new(f.repository.clone(), f.host.clone());

    let err = initiator.initiate(0, None).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));
}

/// Store whose record writes fail, for exercising the degraded initiate
/// path.
struct WriteFailingStore(MemoryStore);

#[async_trait]
impl KvStore for WriteFailingStore {
    async fn set_with_ttl(&self, _: &str, _: &str, _: Duration) -> Result<(), AppError> {
        Err(AppError::Store("scripted write failure".to_string()))
    }
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        self.0.get(key).await
    }
    async fn delete(&self, key: &str) -> Result<(), AppError> {
        self.0.delete(key).await
    }
    async fn zadd(&self, set: &str, member: &str, score: f64) -> Result<(), AppError> {
        self.0.zadd(set, member, score).await
    }
    async fn zrange_by_score(
        &self,
        set: &str,
        max_score: f64,
        limit: usize,
    ) -> Result<Vec<String>, AppError> {
        self.0.zrange_by_score(set, max_score, limit).await
    }
    async fn zrem(&self, set: &str, member: &str) -> Result<(), AppError> {
        self.0.zrem(set, member).await
    }
    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[tokio::test]
async fn initiate_registration_failure_is_not_fatal() {
    let host = Arc::new(MockVideoHost::new());
    let repository = PendingRepository::new(
        Arc::new(WriteFailingStore(MemoryStore::new())),
        Duration::from_secs(3600),
        Duration::from_secs(3600),
    );
    let initiator = UploadInitiator::new(repository, host.clone());

    // The caller still gets a usable upload link, flagged as unprotected.
    let outcome = initiator.initiate(1024, None).await.unwrap();
    assert!(!outcome.upload_link.is_empty());
    assert!(!outcome.safety_net_registered);
}

#[tokio::test]
async fn confirmed_upload_is_never_remote_deleted() {
    let f = fixture();
    let confirmation = ConfirmationService::new(f.repository.clone());
    let now = Utc::now();

    f.repository.create("tok2", "med2", now).await.unwrap();
    let outcome = confirmation.confirm("tok2", "med2", None).await.unwrap();
    assert_eq!(outcome, ConfirmOutcome::Confirmed);

    let report = f
        .sweeper
        .sweep(now + TimeDelta::hours(1), 10)
        .await
        .unwrap();
    assert_eq!(report.found, 0);
    assert_eq!(report.deleted, 0);
    assert!(f.host.delete_calls().is_empty());
}

#[tokio::test]
async fn sweep_reclaims_stale_records() {
    let f = fixture();
    let now = Utc::now();

    f.repository
        .create("tok1", "med1", now - TimeDelta::hours(2))
        .await
        .unwrap();

    // Not yet stale relative to a cutoff in the past.
    let early = f
        .sweeper
        .sweep(now - TimeDelta::hours(3), 10)
        .await
        .unwrap();
    assert_eq!(early.found, 0);

    let report = f.sweeper.sweep(now, 10).await.unwrap();
    assert_eq!(report.found, 1);
    assert_eq!(report.deleted, 1);
    assert_eq!(report.items[0].outcome, SweepItemOutcome::Deleted);
    assert_eq!(f.host.delete_calls(), vec!["med1"]);
    assert!(f.repository.read("tok1").await.unwrap().is_none());
}

#[tokio::test]
async fn sweep_isolates_per_item_failures() {
    let f = fixture();
    let base = Utc::now() - TimeDelta::hours(2);

    f.repository.create("tok1", "med1", base).await.unwrap();
    f.repository
        .create("tok2", "med2", base + TimeDelta::minutes(1))
        .await
        .unwrap();
    f.repository
        .create("tok3", "med3", base + TimeDelta::minutes(2))
        .await
        .unwrap();
    f.host.fail_delete_for("med2");

    let report = f.sweeper.sweep(Utc::now(), 10).await.unwrap();
    assert_eq!(report.found, 3);
    assert_eq!(report.deleted, 2);

    let outcomes: Vec<_> = report.items.iter().map(|i| i.outcome).collect();
    assert_eq!(
        outcomes,
        vec![
            SweepItemOutcome::Deleted,
            SweepItemOutcome::DeleteFailed,
            SweepItemOutcome::Deleted,
        ]
    );

    // The failed item is untouched and naturally retried by the next sweep.
    assert!(f.repository.read("tok1").await.unwrap().is_none());
    assert!(f.repository.read("tok2").await.unwrap().is_some());
    assert!(f.repository.read("tok3").await.unwrap().is_none());

    let retry = f.sweeper.sweep(Utc::now(), 10).await.unwrap();
    assert_eq!(retry.found, 1);
    assert_eq!(retry.deleted, 0);
}

#[tokio::test]
async fn already_gone_remote_object_counts_as_deleted() {
    let f = fixture();
    let now = Utc::now();

    f.repository
        .create("tok", "med-gone", now - TimeDelta::hours(2))
        .await
        .unwrap();
    f.host.mark_already_gone("med-gone");

    let report = f.sweeper.sweep(now, 10).await.unwrap();
    assert_eq!(report.deleted, 1);
    assert!(f.repository.read("tok").await.unwrap().is_none());
}

#[tokio::test]
async fn overlapping_sweeps_are_idempotent() {
    let f = fixture();
    let now = Utc::now();

    f.repository
        .create("tok", "med", now - TimeDelta::hours(2))
        .await
        .unwrap();

    // Two sweep invocations over the same cutoff, as a slow sweep plus a
    // fresh scheduled trigger would produce.
    let (first, second) = tokio::join!(f.sweeper.sweep(now, 10), f.sweeper.sweep(now, 10));
    let total_deleted = first.unwrap().deleted + second.unwrap().deleted;
    assert!(total_deleted >= 1);
    assert!(f.repository.read("tok").await.unwrap().is_none());
}

#[tokio::test]
async fn confirmation_validates_inputs() {
    let f = fixture();
    let confirmation = ConfirmationService::new(f.repository.clone());

    assert!(matches!(
        confirmation.confirm("", "med", None).await.unwrap_err(),
        AppError::InvalidInput(_)
    ));
    assert!(matches!(
        confirmation.confirm("tok", "  ", None).await.unwrap_err(),
        AppError::InvalidInput(_)
    ));
}

#[tokio::test]
async fn late_confirmation_still_leaves_marker() {
    let f = fixture();
    let confirmation = ConfirmationService::new(f.repository.clone());

    // Token was never created (or already swept): data-level NOT_FOUND,
    // but the marker must protect the media object from later sweeps.
    let outcome = confirmation
        .confirm("ghost-token", "med-late", None)
        .await
        .unwrap();
    assert_eq!(outcome, ConfirmOutcome::NotFound);
    assert!(f.repository.is_confirmed("med-late").await.unwrap());
}
