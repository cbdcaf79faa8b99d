//! Vercel strategy: the team's deployments in the BUILDING state

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use tracing::{info, warn};

use crate::authn::credentials::{require_credential, CredentialKey, CredentialProvider};
use crate::errors::DeploysError;
use crate::http::vercel::VercelApi;
use crate::models::deploy::{DeployRecord, Platform};
use crate::models::vercel::{VercelDeployment, BUILDING};
use crate::sources::DeploySource;

/// Link used when a deployment carries neither an inspector URL nor a hostname
pub const VERCEL_DASHBOARD_URL: &str = "https://vercel.com/dashboard";

/// API key and team scope for one Vercel cycle
pub struct VercelCredentials {
    pub api_key: SecretString,
    pub team_id: SecretString,
}

pub struct VercelSource {
    api: Arc<dyn VercelApi>,
}

impl VercelSource {
    pub fn new(api: Arc<dyn VercelApi>) -> Self {
        Self { api }
    }
}

fn detail_url(deployment: &VercelDeployment) -> String {
    if let Some(inspector) = deployment.inspector_url.as_deref().filter(|u| !u.is_empty()) {
        return inspector.to_string();
    }
    match deployment.url.as_deref().filter(|u| !u.is_empty()) {
        Some(host) if host.starts_with("http") => host.to_string(),
        Some(host) => format!("https://{}", host),
        None => VERCEL_DASHBOARD_URL.to_string(),
    }
}

fn source_url(deployment: &VercelDeployment) -> Option<String> {
    let (org, repo, sha) = deployment.meta.as_ref()?.commit_triple()?;
    Some(format!(
        "https://github.com/{}/{}/commit/{}",
        org, repo, sha
    ))
}

#[async_trait]
impl DeploySource for VercelSource {
    type Credentials = VercelCredentials;
    type Candidate = VercelDeployment;
    type Detail = VercelDeployment;

    fn platform(&self) -> Platform {
        Platform::Vercel
    }

    async fn resolve_credentials(
        &self,
        provider: &dyn CredentialProvider,
    ) -> Result<VercelCredentials, DeploysError> {
        let api_key = require_credential(provider, CredentialKey::VercelApiKey).await?;
        let team_id = require_credential(provider, CredentialKey::VercelTeamId).await?;
        Ok(VercelCredentials { api_key, team_id })
    }

    async fn fetch_candidates(
        &self,
        credentials: &VercelCredentials,
    ) -> Result<Vec<VercelDeployment>, DeploysError> {
        self.api
            .list_deployments(&credentials.api_key, &credentials.team_id, BUILDING)
            .await
    }

    /// The state query already scopes to active builds
    async fn filter_and_fetch_details(
        &self,
        _credentials: &VercelCredentials,
        candidates: Vec<VercelDeployment>,
        _now: DateTime<Utc>,
    ) -> Result<Vec<VercelDeployment>, DeploysError> {
        if !candidates.is_empty() {
            info!("Active Vercel deployments: {}", candidates.len());
        }
        Ok(candidates)
    }

    fn normalize(&self, details: Vec<VercelDeployment>) -> Vec<DeployRecord> {
        details
            .into_iter()
            .filter_map(|deployment| {
                let Some(deploy_id) = deployment.deployment_id().map(str::to_string) else {
                    warn!("Vercel deployment {} has no id, skipping", deployment.name);
                    return None;
                };
                Some(DeployRecord {
                    platform: Platform::Vercel,
                    detail_url: detail_url(&deployment),
                    source_url: source_url(&deployment),
                    commit_message: deployment
                        .meta
                        .as_ref()
                        .and_then(|meta| meta.github_commit_message.clone())
                        .filter(|message| !message.trim().is_empty()),
                    creator: deployment.creator.and_then(|creator| creator.username),
                    origin_name: deployment.name,
                    deploy_id,
                })
            })
            .collect()
    }
}
