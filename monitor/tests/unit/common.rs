//! In-memory fakes shared by the tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::Notify;

use pzdeploys::authn::credentials::{CredentialKey, CredentialProvider};
use pzdeploys::errors::DeploysError;
use pzdeploys::http::render::RenderApi;
use pzdeploys::http::vercel::VercelApi;
use pzdeploys::menu::descriptor::MenuDescriptor;
use pzdeploys::models::deploy::{DeployRecord, Platform};
use pzdeploys::models::render::{RenderCommit, RenderDeploy, RenderService};
use pzdeploys::models::vercel::VercelDeployment;
use pzdeploys::tray::presenter::{TrayPresenter, UrlOpener};

#[derive(Default)]
pub struct FakeCredentials {
    values: Mutex<HashMap<CredentialKey, String>>,
    corrupt: Mutex<Vec<CredentialKey>>,
}

impl FakeCredentials {
    pub fn with(pairs: &[(CredentialKey, &str)]) -> Self {
        let creds = Self::default();
        for (key, value) in pairs {
            creds.set(*key, value);
        }
        creds
    }

    pub fn set(&self, key: CredentialKey, value: &str) {
        self.values.lock().unwrap().insert(key, value.to_string());
    }

    pub fn clear(&self, key: CredentialKey) {
        self.values.lock().unwrap().remove(&key);
    }

    pub fn corrupt(&self, key: CredentialKey) {
        self.corrupt.lock().unwrap().push(key);
    }
}

#[async_trait]
impl CredentialProvider for FakeCredentials {
    async fn get_credential(
        &self,
        key: CredentialKey,
    ) -> Result<Option<SecretString>, DeploysError> {
        if self.corrupt.lock().unwrap().contains(&key) {
            let reason = format!("{} is corrupt", key);
            return Err(DeploysError::CredentialUnavailable(reason));
        }
        Ok(self
            .values
            .lock()
            .unwrap()
            .get(&key)
            .map(|value| SecretString::from(value.clone())))
    }
}

pub fn all_credentials() -> FakeCredentials {
    FakeCredentials::with(&[
        (CredentialKey::RenderApiKey, "rnd_key"),
        (CredentialKey::VercelApiKey, "vercel_key"),
        (CredentialKey::VercelTeamId, "team_1"),
    ])
}

pub fn service(
    id: &str,
    name: &str,
    service_type: &str,
    updated_at: DateTime<Utc>,
) -> RenderService {
    RenderService {
        id: id.to_string(),
        name: name.to_string(),
        service_type: service_type.to_string(),
        updated_at,
        dashboard_url: None,
    }
}

pub fn recent_web_service(id: &str, name: &str) -> RenderService {
    service(id, name, "web_service", Utc::now() - Duration::minutes(10))
}

pub fn render_deploy(id: &str, commit: &str) -> RenderDeploy {
    RenderDeploy {
        id: id.to_string(),
        commit: Some(RenderCommit::Message(commit.to_string())),
        status: Some("build_in_progress".to_string()),
        created_at: None,
        updated_at: None,
    }
}

/// Render API fake: fixed service list, deploys per service id, optional failures
#[derive(Default)]
pub struct FakeRenderApi {
    pub services: Mutex<Vec<RenderService>>,
    pub deploys: Mutex<HashMap<String, Vec<RenderDeploy>>>,
    pub failing_services: Mutex<Vec<String>>,
    pub fail_listing: Mutex<bool>,
    pub deploy_calls: Mutex<Vec<(String, String, u32, String)>>,
}

impl FakeRenderApi {
    pub fn with_services(services: Vec<RenderService>) -> Self {
        let api = Self::default();
        *api.services.lock().unwrap() = services;
        api
    }

    pub fn add_deploys(&self, service_id: &str, deploys: Vec<RenderDeploy>) {
        self.deploys
            .lock()
            .unwrap()
            .insert(service_id.to_string(), deploys);
    }

    pub fn looked_up_services(&self) -> Vec<String> {
        self.deploy_calls
            .lock()
            .unwrap()
            .iter()
            .map(|(id, _, _, _)| id.clone())
            .collect()
    }
}

#[async_trait]
impl RenderApi for FakeRenderApi {
    async fn list_services(
        &self,
        _token: &SecretString,
    ) -> Result<Vec<RenderService>, DeploysError> {
        if *self.fail_listing.lock().unwrap() {
            return Err(DeploysError::ApiError {
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        Ok(self.services.lock().unwrap().clone())
    }

    async fn list_deploys(
        &self,
        token: &SecretString,
        service_id: &str,
        status: &str,
        limit: u32,
    ) -> Result<Vec<RenderDeploy>, DeploysError> {
        self.deploy_calls.lock().unwrap().push((
            service_id.to_string(),
            status.to_string(),
            limit,
            token.expose_secret().to_string(),
        ));
        let failing = self
            .failing_services
            .lock()
            .unwrap()
            .contains(&service_id.to_string());
        if failing {
            return Err(DeploysError::AuthRejected("401 Unauthorized".to_string()));
        }
        Ok(self
            .deploys
            .lock()
            .unwrap()
            .get(service_id)
            .cloned()
            .unwrap_or_default())
    }
}

/// Vercel API fake returning a fixed deployment list. It can fail a number of
/// calls first, or hold each call until released.
#[derive(Default)]
pub struct FakeVercelApi {
    pub deployments: Mutex<Vec<VercelDeployment>>,
    pub calls: Mutex<Vec<(String, String, String)>>,
    pub failures_left: Mutex<usize>,
    pub hold: Mutex<bool>,
    pub entered: Notify,
    pub release: Notify,
}

impl FakeVercelApi {
    pub fn with_json(json: &str) -> Self {
        let api = Self::default();
        *api.deployments.lock().unwrap() = serde_json::from_str(json).unwrap();
        api
    }
}

#[async_trait]
impl VercelApi for FakeVercelApi {
    async fn list_deployments(
        &self,
        token: &SecretString,
        team_id: &SecretString,
        state: &str,
    ) -> Result<Vec<VercelDeployment>, DeploysError> {
        self.calls.lock().unwrap().push((
            token.expose_secret().to_string(),
            team_id.expose_secret().to_string(),
            state.to_string(),
        ));
        self.entered.notify_one();

        let hold = *self.hold.lock().unwrap();
        if hold {
            self.release.notified().await;
        }

        {
            let mut failures_left = self.failures_left.lock().unwrap();
            if *failures_left > 0 {
                *failures_left -= 1;
                return Err(DeploysError::ApiError {
                    status: 502,
                    body: "bad gateway".to_string(),
                });
            }
        }
        Ok(self.deployments.lock().unwrap().clone())
    }
}

/// Presenter recording every rebuilt menu
#[derive(Default)]
pub struct RecordingPresenter {
    pub menus: Mutex<Vec<MenuDescriptor>>,
}

impl RecordingPresenter {
    pub fn count(&self) -> usize {
        self.menus.lock().unwrap().len()
    }

    pub fn last(&self) -> Option<MenuDescriptor> {
        self.menus.lock().unwrap().last().cloned()
    }
}

impl TrayPresenter for RecordingPresenter {
    fn rebuild_menu(&self, menu: &MenuDescriptor) {
        self.menus.lock().unwrap().push(menu.clone());
    }
}

pub fn record(platform: Platform, origin: &str, id: &str, message: &str) -> DeployRecord {
    DeployRecord {
        platform,
        origin_name: origin.to_string(),
        deploy_id: id.to_string(),
        commit_message: Some(message.to_string()),
        detail_url: format!("https://example.com/{}", id),
        source_url: None,
        creator: None,
    }
}

/// Opener recording every URL instead of launching a browser
#[derive(Default)]
pub struct RecordingOpener {
    pub opened: Mutex<Vec<String>>,
}

impl UrlOpener for RecordingOpener {
    fn open_url(&self, url: &str) -> Result<(), DeploysError> {
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }
}
