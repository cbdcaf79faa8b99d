//! Presenter contract and the console presenter

use std::sync::Mutex;

use colored::Colorize;
use tracing::info;

use crate::errors::DeploysError;
use crate::menu::descriptor::{IconState, MenuDescriptor, MenuNode};
use crate::storage::settings::IconSettings;

/// Renders the reconciled menu and icon state
pub trait TrayPresenter: Send + Sync {
    /// Replace the whole menu; `menu.has_active_deploys` selects the icon
    fn rebuild_menu(&self, menu: &MenuDescriptor);
}

/// Opens action URLs
pub trait UrlOpener: Send + Sync {
    fn open_url(&self, url: &str) -> Result<(), DeploysError>;
}

/// Opens URLs in the default external browser
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemOpener;

impl UrlOpener for SystemOpener {
    fn open_url(&self, url: &str) -> Result<(), DeploysError> {
        info!("Opening {}", url);
        open::that(url)?;
        Ok(())
    }
}

/// Headless presenter printing the menu to stdout whenever it changes
pub struct ConsolePresenter {
    icons: IconSettings,
    tooltip: String,
    last: Mutex<Option<(MenuDescriptor, IconState)>>,
}

impl ConsolePresenter {
    pub fn new(icons: IconSettings, tooltip: String) -> Self {
        Self {
            icons,
            tooltip,
            last: Mutex::new(None),
        }
    }

    fn icon_path(&self, state: IconState) -> &str {
        match state {
            IconState::Idle => &self.icons.idle,
            IconState::Active => &self.icons.active,
        }
    }
}

/// Render a menu as indented text lines
pub fn render_lines(menu: &MenuDescriptor) -> Vec<String> {
    let mut lines = Vec::new();
    for node in &menu.nodes {
        match node {
            MenuNode::Header { label } => lines.push(label.bold().to_string()),
            MenuNode::Entry { label, actions } => {
                lines.push(format!("  {}", label));
                for action in actions {
                    lines.push(format!("      > {}", action.label.dimmed()));
                }
            }
            MenuNode::Separator => lines.push("-".repeat(24)),
            MenuNode::Item { label, .. } => lines.push(label.to_string()),
        }
    }
    lines
}

impl TrayPresenter for ConsolePresenter {
    fn rebuild_menu(&self, menu: &MenuDescriptor) {
        let icon = menu.icon_state();
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());

        // Reconciliation is repeated on every poll; only print real changes
        if let Some((previous, previous_icon)) = last.as_ref() {
            if previous == menu {
                return;
            }
            if *previous_icon != icon {
                info!("Tray icon -> {}", self.icon_path(icon));
            }
        }

        println!("{} [{}]", self.tooltip.cyan(), self.icon_path(icon));
        for line in render_lines(menu) {
            println!("{}", line);
        }
        println!();

        *last = Some((menu.clone(), icon));
    }
}
