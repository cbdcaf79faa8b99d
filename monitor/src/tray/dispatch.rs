//! Click dispatch for menu actions

use tokio::sync::broadcast;
use tracing::{error, info};

use crate::menu::descriptor::MenuAction;
use crate::tray::presenter::UrlOpener;

/// Route a clicked action: URLs go to the opener, Quit to the shutdown channel
pub fn dispatch(action: &MenuAction, opener: &dyn UrlOpener, quit_tx: &broadcast::Sender<()>) {
    match action {
        MenuAction::OpenUrl(url) => {
            if let Err(e) = opener.open_url(url) {
                error!("Failed to open {}: {}", url, e);
            }
        }
        MenuAction::Quit => {
            info!("Quit selected");
            let _ = quit_tx.send(());
        }
    }
}
