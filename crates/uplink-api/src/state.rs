//! Application state shared by handlers.

use std::sync::Arc;

use uplink_core::Config;
use uplink_host::VideoHost;
use uplink_services::{ConfirmationService, SweepService, UploadInitiator};
use uplink_store::{KvStore, PendingRepository};

pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn KvStore>,
    pub host: Arc<dyn VideoHost>,
    pub repository: PendingRepository,
    pub initiator: UploadInitiator,
    pub confirmation: ConfirmationService,
    pub sweeper: Arc<SweepService>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn KvStore>, host: Arc<dyn VideoHost>) -> Self {
        let repository =
            PendingRepository::new(store.clone(), config.pending_ttl(), config.confirmed_ttl());
        let initiator = UploadInitiator::new(repository.clone(), host.clone());
        let confirmation = ConfirmationService::new(repository.clone());
        let sweeper = Arc::new(SweepService::new(repository.clone(), host.clone()));

        Self {
            config,
            store,
            host,
            repository,
            initiator,
            confirmation,
            sweeper,
        }
    }
}
