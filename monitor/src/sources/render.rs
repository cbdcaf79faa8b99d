//! Render strategy: recently updated web services, then their in-progress deploys

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use secrecy::SecretString;
use tracing::{debug, info};

use crate::authn::credentials::{require_credential, CredentialKey, CredentialProvider};
use crate::errors::DeploysError;
use crate::http::render::RenderApi;
use crate::models::deploy::{DeployRecord, Platform};
use crate::models::render::{RenderService, RenderServiceDeploy, BUILD_IN_PROGRESS};
use crate::sources::DeploySource;

/// Render strategy settings
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Dashboard base URL for deploy links
    pub dashboard_url: String,

    /// Services updated longer ago than this are not checked for deploys
    pub recent_window: Duration,

    /// Page size of the deploy lookup
    pub deploy_page_limit: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            dashboard_url: "https://dashboard.render.com".to_string(),
            recent_window: Duration::hours(1),
            deploy_page_limit: 20,
        }
    }
}

pub struct RenderSource {
    api: Arc<dyn RenderApi>,
    options: RenderOptions,
}

impl RenderSource {
    pub fn new(api: Arc<dyn RenderApi>, options: RenderOptions) -> Self {
        Self { api, options }
    }

    fn detail_url(&self, service_id: &str, deploy_id: &str) -> String {
        format!(
            "{}/web/{}/deploys/{}",
            self.options.dashboard_url.trim_end_matches('/'),
            service_id,
            deploy_id
        )
    }
}

/// Web services updated strictly within `window` of `now`, in input order
pub fn select_recent_web_services(
    services: Vec<RenderService>,
    now: DateTime<Utc>,
    window: Duration,
) -> Vec<RenderService> {
    let cutoff = now - window;
    services
        .into_iter()
        .filter(|service| service.is_web_service())
        .filter(|service| service.updated_at > cutoff)
        .collect()
}

#[async_trait]
impl DeploySource for RenderSource {
    type Credentials = SecretString;
    type Candidate = RenderService;
    type Detail = RenderServiceDeploy;

    fn platform(&self) -> Platform {
        Platform::Render
    }

    async fn resolve_credentials(
        &self,
        provider: &dyn CredentialProvider,
    ) -> Result<SecretString, DeploysError> {
        require_credential(provider, CredentialKey::RenderApiKey).await
    }

    async fn fetch_candidates(
        &self,
        api_key: &SecretString,
    ) -> Result<Vec<RenderService>, DeploysError> {
        self.api.list_services(api_key).await
    }

    async fn filter_and_fetch_details(
        &self,
        api_key: &SecretString,
        candidates: Vec<RenderService>,
        now: DateTime<Utc>,
    ) -> Result<Vec<RenderServiceDeploy>, DeploysError> {
        let recent = select_recent_web_services(candidates, now, self.options.recent_window);
        if recent.is_empty() {
            debug!("No recently changed Render web services");
            return Ok(Vec::new());
        }

        // One lookup at a time to stay clear of Render's rate limits
        let mut deploys = Vec::new();
        for service in recent {
            debug!("Checking deploys of recent service {}", service.id);
            let found = self
                .api
                .list_deploys(
                    api_key,
                    &service.id,
                    BUILD_IN_PROGRESS,
                    self.options.deploy_page_limit,
                )
                .await?;

            if !found.is_empty() {
                info!("{} has {} deploy(s) building", service.name, found.len());
            }
            deploys.extend(found.into_iter().map(|deploy| RenderServiceDeploy {
                service: service.clone(),
                deploy,
            }));
        }

        Ok(deploys)
    }

    fn normalize(&self, details: Vec<RenderServiceDeploy>) -> Vec<DeployRecord> {
        details
            .into_iter()
            .map(|RenderServiceDeploy { service, deploy }| DeployRecord {
                platform: Platform::Render,
                detail_url: self.detail_url(&service.id, &deploy.id),
                commit_message: deploy
                    .commit
                    .as_ref()
                    .and_then(|commit| commit.message())
                    .map(str::to_string),
                origin_name: service.name,
                deploy_id: deploy.id,
                source_url: None,
                creator: None,
            })
            .collect()
    }
}
