//! Per-platform polling strategies
//!
//! A poll cycle is the same chain on every platform: resolve credentials, fetch
//! candidates, filter them and fetch whatever details the platform needs, then
//! normalize into [`DeployRecord`]s. Each platform supplies those steps through
//! [`DeploySource`]; [`poll_once`] drives them.

pub mod render;
pub mod vercel;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::authn::credentials::CredentialProvider;
use crate::errors::DeploysError;
use crate::models::deploy::{DeployRecord, Platform, PollSnapshot};

/// Fallback label suffix for deploys without a commit message
pub const NO_MESSAGE: &str = "No message";

/// Platform-specific steps of a poll cycle
#[async_trait]
pub trait DeploySource: Send + Sync {
    /// Secrets one cycle needs, resolved fresh every cycle
    type Credentials: Send + Sync;

    /// Inventory item returned by the first fetch
    type Candidate: Send;

    /// In-progress deploy ready for normalization
    type Detail: Send;

    fn platform(&self) -> Platform;

    async fn resolve_credentials(
        &self,
        provider: &dyn CredentialProvider,
    ) -> Result<Self::Credentials, DeploysError>;

    async fn fetch_candidates(
        &self,
        credentials: &Self::Credentials,
    ) -> Result<Vec<Self::Candidate>, DeploysError>;

    async fn filter_and_fetch_details(
        &self,
        credentials: &Self::Credentials,
        candidates: Vec<Self::Candidate>,
        now: DateTime<Utc>,
    ) -> Result<Vec<Self::Detail>, DeploysError>;

    fn normalize(&self, details: Vec<Self::Detail>) -> Vec<DeployRecord>;
}

/// Run one complete poll cycle. Any failure aborts the whole cycle, so a
/// snapshot is either complete or not produced at all.
pub async fn poll_once<S>(
    source: &S,
    provider: &dyn CredentialProvider,
    now: DateTime<Utc>,
) -> Result<PollSnapshot, DeploysError>
where
    S: DeploySource + ?Sized,
{
    let platform = source.platform();
    let credentials = source.resolve_credentials(provider).await?;

    let candidates = source.fetch_candidates(&credentials).await?;
    debug!("{}: {} candidates", platform, candidates.len());

    let details = source
        .filter_and_fetch_details(&credentials, candidates, now)
        .await?;

    let records = source.normalize(details);
    Ok(PollSnapshot::new(platform, records, now))
}
