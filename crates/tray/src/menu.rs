//! Context menu model for the system tray.

use crate::tray::{TrayEvent, TrayUpdate};

/// Actions that can be triggered from the tray context menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    /// User requested to quit the application.
    Quit,
}

impl From<MenuAction> for TrayEvent {
    fn from(action: MenuAction) -> Self {
        match action {
            MenuAction::Quit => TrayEvent::QuitRequested,
        }
    }
}

/// A single menu item.
#[derive(Debug, Clone)]
pub struct MenuItem {
    /// Display text.
    pub label: String,
    /// Whether the item is enabled (clickable).
    pub enabled: bool,
    /// Optional action triggered on click.
    pub action: Option<MenuAction>,
}

impl MenuItem {
    fn info(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            enabled: false,
            action: None,
        }
    }

    fn separator() -> Self {
        Self::info(String::new())
    }
}

/// Current state used to build the context menu.
#[derive(Debug, Clone)]
pub struct MenuState {
    /// Application title shown as the menu header.
    pub title: String,
    /// What the tracker is doing right now.
    pub status: String,
}

impl Default for MenuState {
    fn default() -> Self {
        Self {
            title: "Deadlock Discord RPC".into(),
            status: "Waiting for Deadlock".into(),
        }
    }
}

impl MenuState {
    /// Builds the menu items: title, status, separator, quit.
    pub fn build_menu(&self) -> Vec<MenuItem> {
        vec![
            MenuItem::info(self.title.clone()),
            MenuItem::info(self.status.clone()),
            MenuItem::separator(),
            MenuItem {
                label: "Quit".into(),
                enabled: true,
                action: Some(MenuAction::Quit),
            },
        ]
    }

    /// Applies an update from the app. Returns `false` once the tray should
    /// shut down.
    pub fn apply(&mut self, update: TrayUpdate) -> bool {
        match update {
            TrayUpdate::StatusChanged(status) => {
                self.status = status;
                true
            }
            TrayUpdate::Shutdown => false,
        }
    }
}
