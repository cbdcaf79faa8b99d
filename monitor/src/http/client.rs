//! HTTP client implementation

use std::time::Duration;

use reqwest::{header, Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, error};
use url::Url;

use crate::errors::DeploysError;

/// Default timeout for a single platform request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Bearer-authenticated JSON client for one platform API
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, DeploysError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("pzdeploys/", env!("CARGO_PKG_VERSION")))
            .build()?;

        // Fail at construction rather than on the first poll
        Url::parse(base_url)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build a request URL from a path below the base URL and query pairs
    pub fn url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, DeploysError> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, path))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Make a GET request and decode the JSON body
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        token: &SecretString,
    ) -> Result<T, DeploysError> {
        let url = self.url(path, query)?;
        debug!("GET {}", url);

        let auth = format!("Bearer {}", token.expose_secret());
        let response = self
            .client
            .get(url.clone())
            .header(header::AUTHORIZATION, auth)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("HTTP GET {} failed: {} - {}", url.path(), status, body);
            return Err(status_error(status, body));
        }

        let body = response.json().await?;
        Ok(body)
    }
}

fn status_error(status: StatusCode, body: String) -> DeploysError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            DeploysError::AuthRejected(format!("{}: {}", status, body))
        }
        _ => DeploysError::ApiError {
            status: status.as_u16(),
            body,
        },
    }
}
