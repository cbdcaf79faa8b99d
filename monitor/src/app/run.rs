//! Main application run loop

use std::future::Future;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::app::options::{AppOptions, LifecycleOptions};
use crate::app::state::AppState;
use crate::authn::credentials::CredentialProvider;
use crate::errors::DeploysError;
use crate::menu::descriptor::MenuDescriptor;
use crate::tray::presenter::{TrayPresenter, UrlOpener};

/// Run the monitor until `shutdown_signal` resolves or Quit is selected
pub async fn run(
    options: AppOptions,
    credentials: Arc<dyn CredentialProvider>,
    presenter: Arc<dyn TrayPresenter>,
    opener: Arc<dyn UrlOpener>,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), DeploysError> {
    info!("Initializing deploy monitor...");

    // Nothing has been polled yet
    presenter.rebuild_menu(&MenuDescriptor::initial());

    let app_state = Arc::new(AppState::init(&options, credentials, presenter, opener)?);
    let mut quit_rx = app_state.quit_tx.subscribe();
    let mut shutdown_manager = ShutdownManager::new(app_state.clone(), options.lifecycle.clone());

    app_state.start_pollers();

    tokio::select! {
        _ = shutdown_signal => {
            info!("Shutdown signal received, shutting down...");
        }
        _ = quit_rx.recv() => {
            info!("Quit requested, shutting down...");
        }
    }

    shutdown_manager.shutdown().await
}

// ================================= SHUTDOWN ===================================== //

struct ShutdownManager {
    app_state: Arc<AppState>,
    lifecycle_options: LifecycleOptions,
}

impl ShutdownManager {
    fn new(app_state: Arc<AppState>, lifecycle_options: LifecycleOptions) -> Self {
        Self {
            app_state,
            lifecycle_options,
        }
    }

    async fn shutdown(&mut self) -> Result<(), DeploysError> {
        let mut handles: Vec<(&'static str, JoinHandle<()>)> = Vec::new();
        if let Some(handle) = self.app_state.render_poller.as_ref().and_then(|p| p.stop()) {
            handles.push(("render poller", handle));
        }
        if let Some(handle) = self.app_state.vercel_poller.as_ref().and_then(|p| p.stop()) {
            handles.push(("vercel poller", handle));
        }

        match tokio::time::timeout(
            self.lifecycle_options.max_shutdown_delay,
            Self::shutdown_impl(handles),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => {
                error!(
                    "Shutdown timed out after {:?}, abandoning in-flight polls",
                    self.lifecycle_options.max_shutdown_delay
                );
                Err(DeploysError::ShutdownError(format!(
                    "timed out after {:?}",
                    self.lifecycle_options.max_shutdown_delay
                )))
            }
        }
    }

    async fn shutdown_impl(
        handles: Vec<(&'static str, JoinHandle<()>)>,
    ) -> Result<(), DeploysError> {
        info!("Shutting down deploy monitor...");

        for (name, handle) in handles {
            handle
                .await
                .map_err(|e| DeploysError::ShutdownError(format!("{}: {}", name, e)))?;
        }

        info!("Shutdown complete");
        Ok(())
    }
}
