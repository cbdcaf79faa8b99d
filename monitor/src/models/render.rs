//! Render API models

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Service type Render uses for web-servable units
pub const WEB_SERVICE_TYPE: &str = "web_service";

/// Deploy status filter for builds that have not finished yet
pub const BUILD_IN_PROGRESS: &str = "build_in_progress";

/// One entry of the paged `GET /services` response
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceListItem {
    #[serde(default)]
    pub cursor: Option<String>,
    pub service: RenderService,
}

/// A Render service
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderService {
    pub id: String,

    pub name: String,

    /// e.g. 'web_service', 'background_worker', 'static_site'
    #[serde(rename = "type")]
    pub service_type: String,

    pub updated_at: DateTime<Utc>,

    #[serde(default)]
    pub dashboard_url: Option<String>,
}

impl RenderService {
    pub fn is_web_service(&self) -> bool {
        self.service_type == WEB_SERVICE_TYPE
    }
}

/// One entry of the paged `GET /services/{id}/deploys` response
#[derive(Debug, Clone, Deserialize)]
pub struct DeployListItem {
    #[serde(default)]
    pub cursor: Option<String>,
    pub deploy: RenderDeploy,
}

/// A deploy of a Render service
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderDeploy {
    pub id: String,

    #[serde(default)]
    pub commit: Option<RenderCommit>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Commit that triggered a deploy. Older payloads carry a bare string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RenderCommit {
    Message(String),
    Detailed(RenderCommitDetails),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderCommitDetails {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl RenderCommit {
    /// The commit message, whichever shape the payload used
    pub fn message(&self) -> Option<&str> {
        match self {
            RenderCommit::Message(message) => Some(message.as_str()),
            RenderCommit::Detailed(details) => details.message.as_deref(),
        }
    }
}

/// A deploy paired with the service it belongs to
#[derive(Debug, Clone, PartialEq)]
pub struct RenderServiceDeploy {
    pub service: RenderService,
    pub deploy: RenderDeploy,
}
