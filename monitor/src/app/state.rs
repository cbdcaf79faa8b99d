//! Application state management

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::info;

use crate::app::options::AppOptions;
use crate::authn::credentials::CredentialProvider;
use crate::errors::DeploysError;
use crate::http::client::HttpClient;
use crate::menu::state::MenuState;
use crate::sources::render::RenderSource;
use crate::sources::vercel::VercelSource;
use crate::tray::dispatch::dispatch;
use crate::tray::presenter::{TrayPresenter, UrlOpener};
use crate::workers::poller::Poller;

/// Main application state
pub struct AppState {
    /// Latest snapshots and the menu derived from them
    pub menu_state: Arc<MenuState>,

    /// Render poller, absent when disabled
    pub render_poller: Option<Arc<Poller<RenderSource>>>,

    /// Vercel poller, absent when disabled
    pub vercel_poller: Option<Arc<Poller<VercelSource>>>,

    /// Opener used for menu clicks
    pub opener: Arc<dyn UrlOpener>,

    /// Fired by the Quit action
    pub quit_tx: broadcast::Sender<()>,
}

impl AppState {
    /// Build clients, sources and pollers, and route both pollers' snapshots
    /// into one menu state
    pub fn init(
        options: &AppOptions,
        credentials: Arc<dyn CredentialProvider>,
        presenter: Arc<dyn TrayPresenter>,
        opener: Arc<dyn UrlOpener>,
    ) -> Result<Self, DeploysError> {
        info!("Initializing application state...");

        let menu_state = Arc::new(MenuState::new(presenter));
        let (quit_tx, _) = broadcast::channel(1);

        let render_poller = if options.render.enabled {
            let client = Arc::new(HttpClient::new(
                &options.render.base_url,
                options.request_timeout,
            )?);
            let source = Arc::new(RenderSource::new(client, options.render.source.clone()));
            let poller = Arc::new(Poller::new(
                source,
                credentials.clone(),
                options.render.poller.clone(),
            ));
            let state = menu_state.clone();
            poller.set_callback(move |snapshot| {
                state.apply(snapshot);
            });
            Some(poller)
        } else {
            info!("Render polling disabled");
            None
        };

        let vercel_poller = if options.vercel.enabled {
            let client = Arc::new(HttpClient::new(
                &options.vercel.base_url,
                options.request_timeout,
            )?);
            let source = Arc::new(VercelSource::new(client));
            let poller = Arc::new(Poller::new(
                source,
                credentials,
                options.vercel.poller.clone(),
            ));
            let state = menu_state.clone();
            poller.set_callback(move |snapshot| {
                state.apply(snapshot);
            });
            Some(poller)
        } else {
            info!("Vercel polling disabled");
            None
        };

        Ok(Self {
            menu_state,
            render_poller,
            vercel_poller,
            opener,
            quit_tx,
        })
    }

    /// Handle a click on a menu action
    pub fn on_menu_action(&self, action: &crate::menu::descriptor::MenuAction) {
        dispatch(action, self.opener.as_ref(), &self.quit_tx);
    }

    pub fn start_pollers(&self) {
        if let Some(poller) = &self.render_poller {
            poller.start();
        }
        if let Some(poller) = &self.vercel_poller {
            poller.start();
        }
    }
}
