//! Combine the latest snapshot of each platform into one menu

use crate::menu::descriptor::{ActionItem, MenuAction, MenuDescriptor, MenuNode};
use crate::models::deploy::DeployRecord;
use crate::sources::NO_MESSAGE;

pub const RENDER_HEADER: &str = "Render Deploys";
pub const VERCEL_HEADER: &str = "Vercel Deploys";
pub const NO_ACTIVE_DEPLOYS: &str = "No active deploys";
pub const QUIT_LABEL: &str = "Quit";

pub const OPEN_IN_RENDER: &str = "Open in Render";
pub const OPEN_IN_VERCEL: &str = "Open in Vercel";
pub const OPEN_IN_GITHUB: &str = "Open in GitHub";

/// `"<origin name> - <commit message>"`
pub fn entry_label(record: &DeployRecord) -> String {
    let message = record
        .commit_message
        .as_deref()
        .filter(|message| !message.trim().is_empty())
        .unwrap_or(NO_MESSAGE);
    format!("{} - {}", record.origin_name, message)
}

fn render_entry(record: &DeployRecord) -> MenuNode {
    MenuNode::Entry {
        label: entry_label(record),
        actions: vec![ActionItem::open_url(OPEN_IN_RENDER, &record.detail_url)],
    }
}

fn vercel_entry(record: &DeployRecord) -> MenuNode {
    let mut actions = vec![ActionItem::open_url(OPEN_IN_VERCEL, &record.detail_url)];
    if let Some(source_url) = &record.source_url {
        actions.push(ActionItem::open_url(OPEN_IN_GITHUB, source_url));
    }
    MenuNode::Entry {
        label: entry_label(record),
        actions,
    }
}

/// Build the full menu from the latest Render and Vercel deploys.
///
/// Pure: equal inputs always give equal menus.
pub fn reconcile(render: &[DeployRecord], vercel: &[DeployRecord]) -> MenuDescriptor {
    let mut nodes = Vec::with_capacity(render.len() + vercel.len() + 5);

    if !render.is_empty() {
        nodes.push(MenuNode::header(RENDER_HEADER));
        nodes.extend(render.iter().map(render_entry));
    }

    if !vercel.is_empty() {
        if !render.is_empty() {
            nodes.push(MenuNode::Separator);
        }
        nodes.push(MenuNode::header(VERCEL_HEADER));
        nodes.extend(vercel.iter().map(vercel_entry));
    }

    if nodes.is_empty() {
        nodes.push(MenuNode::header(NO_ACTIVE_DEPLOYS));
    }

    nodes.push(MenuNode::Separator);
    nodes.push(MenuNode::Item {
        label: QUIT_LABEL.to_string(),
        action: MenuAction::Quit,
    });

    MenuDescriptor {
        nodes,
        has_active_deploys: render.len() + vercel.len() > 0,
    }
}
