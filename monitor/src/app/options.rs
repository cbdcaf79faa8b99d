//! Application configuration options

use std::time::Duration;

use crate::http::client::DEFAULT_TIMEOUT;
use crate::sources::render::RenderOptions;
use crate::storage::settings::{IconSettings, Settings};
use crate::workers::poller;

/// Longest accepted Render recent-activity window (one year)
const MAX_RECENT_WINDOW_SECS: u64 = 365 * 24 * 3600;

/// Main application options
#[derive(Debug, Clone)]
pub struct AppOptions {
    /// Lifecycle configuration
    pub lifecycle: LifecycleOptions,

    /// Timeout of a single platform request
    pub request_timeout: Duration,

    /// Render poller configuration
    pub render: RenderWorkerOptions,

    /// Vercel poller configuration
    pub vercel: VercelWorkerOptions,

    /// Tray icon glyphs
    pub icons: IconSettings,

    /// Tray tooltip
    pub tooltip: String,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl AppOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            lifecycle: LifecycleOptions::default(),
            request_timeout: DEFAULT_TIMEOUT,
            render: RenderWorkerOptions {
                enabled: settings.render.enabled,
                base_url: settings.render.base_url.clone(),
                poller: poller::Options {
                    interval: Duration::from_secs(settings.render.interval_secs),
                    ..Default::default()
                },
                source: RenderOptions {
                    dashboard_url: settings.render.dashboard_url.clone(),
                    recent_window: chrono::Duration::seconds(
                        settings.render.recent_window_secs.min(MAX_RECENT_WINDOW_SECS) as i64,
                    ),
                    deploy_page_limit: settings.render.deploy_page_limit,
                },
            },
            vercel: VercelWorkerOptions {
                enabled: settings.vercel.enabled,
                base_url: settings.vercel.base_url.clone(),
                poller: poller::Options {
                    interval: Duration::from_secs(settings.vercel.interval_secs),
                    ..Default::default()
                },
            },
            icons: settings.icons.clone(),
            tooltip: settings.tooltip.clone(),
        }
    }
}

/// Lifecycle options
#[derive(Debug, Clone)]
pub struct LifecycleOptions {
    /// Maximum delay for graceful shutdown
    pub max_shutdown_delay: Duration,
}

impl Default for LifecycleOptions {
    fn default() -> Self {
        Self {
            max_shutdown_delay: Duration::from_secs(30),
        }
    }
}

/// Render poller options
#[derive(Debug, Clone)]
pub struct RenderWorkerOptions {
    pub enabled: bool,
    pub base_url: String,
    pub poller: poller::Options,
    pub source: RenderOptions,
}

/// Vercel poller options
#[derive(Debug, Clone)]
pub struct VercelWorkerOptions {
    pub enabled: bool,
    pub base_url: String,
    pub poller: poller::Options,
}
