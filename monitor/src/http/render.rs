//! Render API client

use std::collections::HashSet;

use async_trait::async_trait;
use secrecy::SecretString;
use tracing::{debug, warn};

use crate::errors::DeploysError;
use crate::http::client::HttpClient;
use crate::models::render::{DeployListItem, RenderDeploy, RenderService, ServiceListItem};

/// Page size used when listing services
pub const SERVICE_PAGE_LIMIT: usize = 100;

/// Upper bound on service pages fetched in one listing
const MAX_SERVICE_PAGES: usize = 50;

/// The Render endpoints the poller needs
#[async_trait]
pub trait RenderApi: Send + Sync {
    /// List every service visible to the API key
    async fn list_services(&self, token: &SecretString) -> Result<Vec<RenderService>, DeploysError>;

    /// List deploys of one service filtered by status
    async fn list_deploys(
        &self,
        token: &SecretString,
        service_id: &str,
        status: &str,
        limit: u32,
    ) -> Result<Vec<RenderDeploy>, DeploysError>;
}

#[async_trait]
impl RenderApi for HttpClient {
    async fn list_services(
        &self,
        token: &SecretString,
    ) -> Result<Vec<RenderService>, DeploysError> {
        let limit = SERVICE_PAGE_LIMIT.to_string();
        let mut services = Vec::new();
        let mut cursor: Option<String> = None;
        let mut seen_cursors = HashSet::new();

        for _ in 0..MAX_SERVICE_PAGES {
            let mut query = vec![("limit", limit.as_str())];
            if let Some(cursor) = cursor.as_deref() {
                query.push(("cursor", cursor));
            }

            let page: Vec<ServiceListItem> = self.get("/services", &query, token).await?;
            let page_len = page.len();
            let next_cursor = page.last().and_then(|item| item.cursor.clone());
            services.extend(page.into_iter().map(|item| item.service));

            match next_cursor {
                Some(next) if page_len >= SERVICE_PAGE_LIMIT => {
                    if !seen_cursors.insert(next.clone()) {
                        warn!("Render returned a repeated cursor, stopping pagination");
                        break;
                    }
                    cursor = Some(next);
                }
                _ => break,
            }
        }

        debug!("Listed {} Render services", services.len());
        Ok(services)
    }

    async fn list_deploys(
        &self,
        token: &SecretString,
        service_id: &str,
        status: &str,
        limit: u32,
    ) -> Result<Vec<RenderDeploy>, DeploysError> {
        let path = format!("/services/{}/deploys", service_id);
        let limit = limit.to_string();
        let query = [("status", status), ("limit", limit.as_str())];
        let items: Vec<DeployListItem> = self.get(&path, &query, token).await?;
        Ok(items.into_iter().map(|item| item.deploy).collect())
    }
}
