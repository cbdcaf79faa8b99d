//! Vercel API client

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::errors::DeploysError;
use crate::http::client::HttpClient;
use crate::models::vercel::{DeploymentListResponse, VercelDeployment};

/// The Vercel endpoint the poller needs
#[async_trait]
pub trait VercelApi: Send + Sync {
    /// List a team's deployments in the given state
    async fn list_deployments(
        &self,
        token: &SecretString,
        team_id: &SecretString,
        state: &str,
    ) -> Result<Vec<VercelDeployment>, DeploysError>;
}

#[async_trait]
impl VercelApi for HttpClient {
    async fn list_deployments(
        &self,
        token: &SecretString,
        team_id: &SecretString,
        state: &str,
    ) -> Result<Vec<VercelDeployment>, DeploysError> {
        let response: DeploymentListResponse = self
            .get(
                "/v6/deployments",
                &[("teamId", team_id.expose_secret()), ("state", state)],
                token,
            )
            .await?;
        Ok(response.deployments)
    }
}
