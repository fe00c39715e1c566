//! ServicesFactory backed by the HTTP client.
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use workshop_core::api::{AppConfig, CliError, Services, ServicesFactory};

use crate::credentials::CredentialStore;
use crate::http::WorkshopHttpClient;

pub fn build_credentials(cfg: &AppConfig) -> Result<CredentialStore> {
    let store = match cfg.data_dir.as_deref() {
        Some(dir) => CredentialStore::in_dir(Path::new(dir))?,
        None => CredentialStore::in_memory(None),
    };
    Ok(store.with_override(cfg.api.access_token.clone()))
}

pub fn build_http_client(cfg: &AppConfig) -> Result<WorkshopHttpClient> {
    let credentials = Arc::new(build_credentials(cfg)?);
    WorkshopHttpClient::new(&cfg.api.base_url, credentials, cfg.api.timeout_ms)
}

#[derive(Default)]
pub struct HttpServicesFactory;

#[async_trait]
impl ServicesFactory for HttpServicesFactory {
    async fn build_services(&self, cfg: &AppConfig) -> Result<Services, CliError> {
        let client = Arc::new(build_http_client(cfg).map_err(|e| CliError::Config(e.to_string()))?);
        tracing::debug!(
            target: "workshop.http",
            base_url = %cfg.api.base_url,
            timeout_ms = cfg.api.timeout_ms,
            "http services ready"
        );
        Ok(Services {
            tasks: client.clone(),
            directory: client.clone(),
            auth: client,
        })
    }
}
