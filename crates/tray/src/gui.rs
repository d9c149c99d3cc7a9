//! Native tray icon on a `tao` event loop.

use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::time::{Duration, Instant};

use tao::event::{Event, StartCause};
use tao::event_loop::{ControlFlow, EventLoopBuilder};
use tao::platform::run_return::EventLoopExtRunReturn;
use tray_icon::menu::{Menu, MenuEvent, MenuId, MenuItem as NativeItem, PredefinedMenuItem};
use tray_icon::{Icon, TrayIcon, TrayIconBuilder};

use crate::menu::{MenuAction, MenuState};
use crate::tray::{TrayConfig, TrayEvent, TrayUpdate};

/// How often the loop wakes up to drain app updates.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

const ICON_SIZE: u32 = 32;

/// Runs the tray until the app sends [`TrayUpdate::Shutdown`] or goes away.
///
/// Must be called from the main thread. Menu clicks are forwarded to
/// `event_tx`; if the icon cannot be created a quit is requested so the app
/// does not run without a way to stop it.
pub fn run_event_loop(
    config: TrayConfig,
    event_tx: Sender<TrayEvent>,
    update_rx: Receiver<TrayUpdate>,
) {
    let mut event_loop = EventLoopBuilder::new().build();
    let mut state = config.initial_state();
    let mut live: Option<LiveTray> = None;

    event_loop.run_return(move |event, _, control_flow| {
        *control_flow = ControlFlow::WaitUntil(Instant::now() + POLL_INTERVAL);

        // The icon can only be created once the loop is running (macOS).
        if let Event::NewEvents(StartCause::Init) = event {
            match LiveTray::build(&state) {
                Ok(tray) => live = Some(tray),
                Err(e) => {
                    tracing::error!("failed to create tray icon: {e}");
                    let _ = event_tx.send(TrayEvent::QuitRequested);
                }
            }
        }

        while let Ok(click) = MenuEvent::receiver().try_recv() {
            if let Some(action) = live.as_ref().and_then(|t| t.action_for(&click.id)) {
                let _ = event_tx.send(TrayEvent::from(action));
            }
        }

        loop {
            match update_rx.try_recv() {
                Ok(update) => {
                    if !state.apply(update) {
                        *control_flow = ControlFlow::Exit;
                        return;
                    }
                    if let Some(tray) = &mut live
                        && let Err(e) = tray.refresh(&state)
                    {
                        tracing::warn!("failed to refresh tray menu: {e}");
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    *control_flow = ControlFlow::Exit;
                    return;
                }
            }
        }
    });

    tracing::debug!("tray event loop finished");
}

/// The native icon plus the menu ids that trigger actions.
struct LiveTray {
    icon: TrayIcon,
    actions: Vec<(MenuId, MenuAction)>,
}

impl LiveTray {
    fn build(state: &MenuState) -> Result<Self, String> {
        let (menu, actions) = native_menu(state)?;
        let icon = TrayIconBuilder::new()
            .with_menu(Box::new(menu))
            .with_tooltip(tooltip(state))
            .with_icon(badge()?)
            .build()
            .map_err(|e| e.to_string())?;
        Ok(Self { icon, actions })
    }

    /// Rebuilds the menu so the status line is current.
    fn refresh(&mut self, state: &MenuState) -> Result<(), String> {
        let (menu, actions) = native_menu(state)?;
        self.icon.set_menu(Some(Box::new(menu)));
        self.actions = actions;
        self.icon
            .set_tooltip(Some(tooltip(state)))
            .map_err(|e| e.to_string())
    }

    fn action_for(&self, id: &MenuId) -> Option<MenuAction> {
        self.actions
            .iter()
            .find(|(item, _)| item == id)
            .map(|(_, action)| action.clone())
    }
}

fn native_menu(state: &MenuState) -> Result<(Menu, Vec<(MenuId, MenuAction)>), String> {
    let menu = Menu::new();
    let mut actions = Vec::new();

    for item in state.build_menu() {
        if item.label.is_empty() {
            menu.append(&PredefinedMenuItem::separator())
                .map_err(|e| e.to_string())?;
            continue;
        }
        let native = NativeItem::new(&item.label, item.enabled, None);
        menu.append(&native).map_err(|e| e.to_string())?;
        if let Some(action) = item.action {
            actions.push((native.id().clone(), action));
        }
    }

    Ok((menu, actions))
}

fn tooltip(state: &MenuState) -> String {
    format!("{}: {}", state.title, state.status)
}

/// A plain orange disc, so no image decoder is needed.
fn badge() -> Result<Icon, String> {
    let center = (ICON_SIZE as f32 - 1.0) / 2.0;
    let radius = ICON_SIZE as f32 / 2.0;
    let mut rgba = Vec::with_capacity((ICON_SIZE * ICON_SIZE * 4) as usize);
    for y in 0..ICON_SIZE {
        for x in 0..ICON_SIZE {
            let dx = x as f32 - center;
            let dy = y as f32 - center;
            let alpha = if dx * dx + dy * dy <= radius * radius { 255 } else { 0 };
            rgba.extend_from_slice(&[0xE8, 0x8A, 0x2E, alpha]);
        }
    }
    Icon::from_rgba(rgba, ICON_SIZE, ICON_SIZE).map_err(|e| e.to_string())
}
