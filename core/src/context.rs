use std::sync::Arc;

use crate::authority::{Authenticator, TaskAuthority, WorkshopDirectory};
use crate::config::AppConfig;
use crate::error::CliError;
use crate::store::TaskStore;
use crate::sync::StatusSynchronizer;

#[derive(Clone)]
pub struct Services {
    pub tasks: Arc<dyn TaskAuthority>,
    pub directory: Arc<dyn WorkshopDirectory>,
    pub auth: Arc<dyn Authenticator>,
}

#[async_trait::async_trait]
pub trait ServicesFactory: Send + Sync {
    async fn build_services(&self, cfg: &AppConfig) -> Result<Services, CliError>;
}

/// Configuration plus the one task store shared by every flow.
#[derive(Clone)]
pub struct AppContext {
    cfg: AppConfig,
    store: TaskStore,
    services_factory: Option<Arc<dyn ServicesFactory>>,
}

impl AppContext {
    pub fn new(cfg: AppConfig, services_factory: Option<Arc<dyn ServicesFactory>>) -> Self {
        Self {
            cfg,
            store: TaskStore::new(),
            services_factory,
        }
    }

    pub fn cfg(&self) -> &AppConfig {
        &self.cfg
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub async fn build_services(&self) -> Result<Services, CliError> {
        let Some(factory) = self.services_factory.as_ref() else {
            return Err(CliError::Config(
                "services_factory missing (cannot build api services)".into(),
            ));
        };
        factory.build_services(&self.cfg).await
    }

    /// Synchronizer over this context's store, using the configured policy.
    pub fn synchronizer(&self, services: &Services) -> StatusSynchronizer {
        StatusSynchronizer::new(self.store.clone(), services.tasks.clone())
            .with_policy(self.cfg.sync.in_flight_policy)
    }
}
