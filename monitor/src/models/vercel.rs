//! Vercel API models

use serde::Deserialize;

/// Deployment state filter for builds that have not finished yet
pub const BUILDING: &str = "BUILDING";

/// Response of `GET /v6/deployments`
#[derive(Debug, Clone, Deserialize)]
pub struct DeploymentListResponse {
    #[serde(default)]
    pub deployments: Vec<VercelDeployment>,
}

/// A Vercel deployment
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VercelDeployment {
    /// Project name
    pub name: String,

    /// Deployment id as sent by the v6 API
    #[serde(default)]
    pub uid: Option<String>,

    /// Deployment id in older payloads
    #[serde(default)]
    pub id: Option<String>,

    /// Deployment hostname without scheme
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub inspector_url: Option<String>,

    #[serde(default)]
    pub state: Option<String>,

    #[serde(default)]
    pub creator: Option<VercelCreator>,

    #[serde(default)]
    pub meta: Option<VercelMeta>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VercelCreator {
    #[serde(default)]
    pub username: Option<String>,
}

/// Git metadata attached by the GitHub integration
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VercelMeta {
    #[serde(default)]
    pub github_commit_message: Option<String>,

    #[serde(default)]
    pub github_commit_org: Option<String>,

    #[serde(default)]
    pub github_commit_repo: Option<String>,

    #[serde(default)]
    pub github_commit_sha: Option<String>,
}

impl VercelDeployment {
    /// `uid`, falling back to `id`
    pub fn deployment_id(&self) -> Option<&str> {
        let id = non_empty(self.id.as_deref());
        non_empty(self.uid.as_deref()).or(id)
    }
}

impl VercelMeta {
    /// `(org, repo, sha)` when all three are present and non-empty
    pub fn commit_triple(&self) -> Option<(&str, &str, &str)> {
        let org = non_empty(self.github_commit_org.as_deref())?;
        let repo = non_empty(self.github_commit_repo.as_deref())?;
        let sha = non_empty(self.github_commit_sha.as_deref())?;
        Some((org, repo, sha))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
