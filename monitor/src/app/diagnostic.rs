//! One-shot poll of every enabled platform

use std::sync::Arc;

use chrono::Utc;
use colored::Colorize;

use crate::app::options::AppOptions;
use crate::authn::credentials::CredentialProvider;
use crate::errors::DeploysError;
use crate::http::client::HttpClient;
use crate::menu::descriptor::MenuDescriptor;
use crate::menu::state::MenuState;
use crate::models::deploy::PollSnapshot;
use crate::sources::render::RenderSource;
use crate::sources::vercel::VercelSource;
use crate::sources::{poll_once, DeploySource};
use crate::tray::presenter::TrayPresenter;

async fn check<S: DeploySource>(
    source: &S,
    credentials: &dyn CredentialProvider,
) -> Option<PollSnapshot> {
    let platform = source.platform();
    match poll_once(source, credentials, Utc::now()).await {
        Ok(snapshot) => {
            println!(
                "{} {}: {} deploy(s) in progress",
                "[OK]".green(),
                platform,
                snapshot.len()
            );
            Some(snapshot)
        }
        Err(e) => {
            println!("{} {}: {}", "[FAIL]".red(), platform, e);
            None
        }
    }
}

/// Poll each enabled platform once, print the outcome and hand the resulting
/// menu to `presenter`. Returns the menu.
pub async fn run_diagnostic(
    options: &AppOptions,
    credentials: Arc<dyn CredentialProvider>,
    presenter: Arc<dyn TrayPresenter>,
) -> Result<MenuDescriptor, DeploysError> {
    println!("Deploy monitor diagnostics");
    println!("==========================");

    let menu_state = MenuState::new(presenter);
    let mut menu = menu_state.current_menu();

    if options.render.enabled {
        let client = HttpClient::new(&options.render.base_url, options.request_timeout)?;
        let client = Arc::new(client);
        let source = RenderSource::new(client, options.render.source.clone());
        if let Some(snapshot) = check(&source, credentials.as_ref()).await {
            menu = menu_state.apply(snapshot);
        }
    } else {
        println!("{} Render: disabled", "[SKIP]".yellow());
    }

    if options.vercel.enabled {
        let client = HttpClient::new(&options.vercel.base_url, options.request_timeout)?;
        let client = Arc::new(client);
        let source = VercelSource::new(client);
        if let Some(snapshot) = check(&source, credentials.as_ref()).await {
            menu = menu_state.apply(snapshot);
        }
    } else {
        println!("{} Vercel: disabled", "[SKIP]".yellow());
    }

    println!();
    Ok(menu)
}
