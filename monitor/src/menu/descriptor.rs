//! Presenter-facing menu description

/// What clicking a menu node does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    OpenUrl(String),
    Quit,
}

/// A labelled action inside an entry's submenu
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionItem {
    pub label: String,
    pub action: MenuAction,
}

impl ActionItem {
    pub fn open_url(label: &str, url: &str) -> Self {
        Self {
            label: label.to_string(),
            action: MenuAction::OpenUrl(url.to_string()),
        }
    }
}

/// One node of the menu, in display order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuNode {
    /// Non-selectable label
    Header { label: String },

    /// A deploy, expandable to its actions
    Entry { label: String, actions: Vec<ActionItem> },

    Separator,

    /// Top-level clickable item
    Item { label: String, action: MenuAction },
}

impl MenuNode {
    pub fn header(label: &str) -> Self {
        MenuNode::Header {
            label: label.to_string(),
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            MenuNode::Header { label }
            | MenuNode::Entry { label, .. }
            | MenuNode::Item { label, .. } => Some(label.as_str()),
            MenuNode::Separator => None,
        }
    }
}

/// Tray icon variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconState {
    Idle,
    Active,
}

/// The whole menu, rebuilt from scratch on every reconciliation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuDescriptor {
    pub nodes: Vec<MenuNode>,
    pub has_active_deploys: bool,
}

impl MenuDescriptor {
    /// Placeholder shown before the first reconciliation
    pub fn initial() -> Self {
        Self {
            nodes: vec![MenuNode::header("...")],
            has_active_deploys: false,
        }
    }

    pub fn icon_state(&self) -> IconState {
        if self.has_active_deploys {
            IconState::Active
        } else {
            IconState::Idle
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &MenuNode> {
        self.nodes
            .iter()
            .filter(|node| matches!(node, MenuNode::Entry { .. }))
    }
}
