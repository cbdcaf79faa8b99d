//! Settings file management

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::DeploysError;
use crate::filesys::file::File;
use crate::logs::LogLevel;

/// Monitor settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Emit JSON log lines on stdout
    #[serde(default)]
    pub json_logs: bool,

    /// Also write a daily-rolling log file under the logs directory
    #[serde(default)]
    pub log_to_file: bool,

    /// Render poller configuration
    #[serde(default)]
    pub render: RenderSettings,

    /// Vercel poller configuration
    #[serde(default)]
    pub vercel: VercelSettings,

    /// Tray icon glyphs
    #[serde(default)]
    pub icons: IconSettings,

    /// Tray tooltip
    #[serde(default = "default_tooltip")]
    pub tooltip: String,
}

fn default_true() -> bool {
    true
}

fn default_polling_interval() -> u64 {
    5
}

fn default_tooltip() -> String {
    "pzdeploys".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            json_logs: false,
            log_to_file: false,
            render: RenderSettings::default(),
            vercel: VercelSettings::default(),
            icons: IconSettings::default(),
            tooltip: default_tooltip(),
        }
    }
}

impl Settings {
    /// Load settings, falling back to defaults when the file does not exist
    pub async fn load(file: &File) -> Result<Self, DeploysError> {
        match file.read_json_opt::<Settings>().await {
            Ok(Some(settings)) => settings.validated(),
            Ok(None) => {
                info!(
                    "No settings file at {}, using defaults",
                    file.path().display()
                );
                Ok(Settings::default())
            }
            Err(e) => Err(DeploysError::ConfigError(format!(
                "Unable to read settings file {}: {}",
                file.path().display(),
                e
            ))),
        }
    }

    fn validated(self) -> Result<Self, DeploysError> {
        if self.render.interval_secs == 0 || self.vercel.interval_secs == 0 {
            return Err(DeploysError::ConfigError(
                "Polling intervals must be at least one second".to_string(),
            ));
        }
        if self.render.deploy_page_limit == 0 {
            return Err(DeploysError::ConfigError(
                "render.deploy_page_limit must be positive".to_string(),
            ));
        }
        Ok(self)
    }
}

/// Render API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSettings {
    /// Poll Render at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Base URL for the Render API
    #[serde(default = "default_render_base_url")]
    pub base_url: String,

    /// Base URL of the Render dashboard, used for deploy links
    #[serde(default = "default_render_dashboard_url")]
    pub dashboard_url: String,

    /// Polling interval in seconds
    #[serde(default = "default_polling_interval")]
    pub interval_secs: u64,

    /// Only services updated within this many seconds get a deploy lookup
    #[serde(default = "default_recent_window")]
    pub recent_window_secs: u64,

    /// Page size of the per-service deploy lookup
    #[serde(default = "default_deploy_page_limit")]
    pub deploy_page_limit: u32,
}

fn default_render_base_url() -> String {
    "https://api.render.com/v1".to_string()
}

fn default_render_dashboard_url() -> String {
    "https://dashboard.render.com".to_string()
}

fn default_recent_window() -> u64 {
    3600
}

fn default_deploy_page_limit() -> u32 {
    20
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_render_base_url(),
            dashboard_url: default_render_dashboard_url(),
            interval_secs: default_polling_interval(),
            recent_window_secs: default_recent_window(),
            deploy_page_limit: default_deploy_page_limit(),
        }
    }
}

/// Vercel API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VercelSettings {
    /// Poll Vercel at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Base URL for the Vercel API
    #[serde(default = "default_vercel_base_url")]
    pub base_url: String,

    /// Polling interval in seconds
    #[serde(default = "default_polling_interval")]
    pub interval_secs: u64,
}

fn default_vercel_base_url() -> String {
    "https://api.vercel.com".to_string()
}

impl Default for VercelSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_vercel_base_url(),
            interval_secs: default_polling_interval(),
        }
    }
}

/// Icon glyphs shown by the tray
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IconSettings {
    /// Shown while nothing is deploying
    #[serde(default = "default_idle_icon")]
    pub idle: String,

    /// Shown while at least one deploy is in progress
    #[serde(default = "default_active_icon")]
    pub active: String,
}

fn default_idle_icon() -> String {
    "iconTemplate.png".to_string()
}

fn default_active_icon() -> String {
    "uploadingTemplate.png".to_string()
}

impl Default for IconSettings {
    fn default() -> Self {
        Self {
            idle: default_idle_icon(),
            active: default_active_icon(),
        }
    }
}
