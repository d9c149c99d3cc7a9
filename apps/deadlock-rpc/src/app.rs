//! Application orchestrator — wires the tracker, presence client and tray.

use std::path::PathBuf;
use std::time::Duration;

use deadlock_rpc_game_log::{ConsoleLogSource, HeroTable};
use deadlock_rpc_presence::DiscordIpc;
use deadlock_rpc_session::{GameWatcher, Session, Tracker};
use deadlock_rpc_steam::{DEADLOCK_APP_ID, Paths, console_log_candidates_in, find_app_remote_dir};
use deadlock_rpc_tray::{TrayEvent, TrayHandle};
use tokio_util::sync::CancellationToken;

use crate::config::Config;

/// How long the tracker gets to clear the presence on shutdown.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Runs until the tray or Ctrl-C asks to quit.
///
/// The tray backend holds the other ends of `tray`'s channels.
pub async fn run(config: Config, tray: TrayHandle) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();

    // -- Steam / hero detection --
    let roots = deadlock_rpc_steam::candidate_roots();
    match Paths::new() {
        Ok(steam) => tracing::info!(path = %steam.base_dir().display(), "Steam installation found"),
        Err(e) => tracing::warn!("{e}, hero detection limited to console_log_path"),
    }
    match find_app_remote_dir(&roots, DEADLOCK_APP_ID) {
        Some(dir) => tracing::info!(path = %dir.display(), "Deadlock user data found"),
        None => tracing::debug!("no Deadlock user data folder"),
    }

    let heroes = hero_source(&config, &roots);
    if heroes.is_enabled() {
        if heroes.existing_logs().is_empty() {
            tracing::info!(
                candidates = heroes.candidates().len(),
                "console.log not found yet, hero detection waits for it"
            );
        }
    } else {
        tracing::info!("hero detection disabled");
    }

    let status = tray.status_sender();

    // -- Tracker --
    let tracker = Tracker::new(
        GameWatcher::new(&config.process_name),
        heroes,
        DiscordIpc::new(config.client_id.clone()),
        config.interval(),
    )
    .with_status_fn(Box::new(move |session: &Session| {
        status.send(session.status_line());
    }));

    let tracker_task = tokio::spawn(tracker.run(cancel.clone()));

    tracing::info!(process = %config.process_name, "watching for Deadlock");

    // -- Main loop: wait for shutdown --
    tokio::select! {
        _ = cancel.cancelled() => {
            tracing::info!("shutdown signal received");
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("SIGINT received, shutting down");
        }
        _ = async {
            loop {
                if let Some(TrayEvent::QuitRequested) = tray.try_recv_event() {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        } => {
            tracing::info!("quit requested via tray");
        }
    }

    // -- Graceful shutdown --
    cancel.cancel();
    match tokio::time::timeout(SHUTDOWN_GRACE, tracker_task).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!("tracker task failed: {e}"),
        Err(_) => tracing::warn!("tracker did not stop in time, presence may linger"),
    }
    tray.shutdown();

    Ok(())
}

/// Builds the hero source from the configuration and discovered Steam roots.
///
/// The configured `console_log_path` is tried before the Steam-derived ones.
fn hero_source(config: &Config, roots: &[Paths]) -> ConsoleLogSource {
    if !config.hero_detection {
        return ConsoleLogSource::disabled();
    }

    let mut candidates: Vec<PathBuf> = config.console_log_path.iter().cloned().collect();
    for path in console_log_candidates_in(roots) {
        if !candidates.contains(&path) {
            candidates.push(path);
        }
    }

    let table = HeroTable::with_overrides(&config.heroes);
    ConsoleLogSource::new(candidates, config.log_tail_bytes, table)
}
