//! Deadlock Discord Rich Presence entry point.

mod app;
mod config;

use deadlock_rpc_tray::{TrayConfig, TrayHandle};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "starting Deadlock Discord RPC"
    );

    let config = config::Config::load()?;
    tracing::info!(
        interval_secs = config.interval().as_secs(),
        hero_detection = config.hero_detection,
        "configuration loaded"
    );

    if config.hero_detection {
        tracing::info!(
            "hero detection needs the console log: add -condebug to Deadlock's launch options \
             (or open the console with F7 once in game)"
        );
    }

    let (tray, event_tx, update_rx) = TrayHandle::new();
    let tray_config = TrayConfig::default();
    let rt = tokio::runtime::Runtime::new()?;

    // The native tray needs the main thread; the tracker runs beside it.
    #[cfg(feature = "gui")]
    {
        let worker = std::thread::spawn(move || rt.block_on(app::run(config, tray)));
        deadlock_rpc_tray::run_event_loop(tray_config, event_tx, update_rx);
        worker
            .join()
            .map_err(|_| anyhow::anyhow!("worker thread panicked"))??;
    }

    #[cfg(not(feature = "gui"))]
    {
        drop(event_tx);
        let status_log =
            std::thread::spawn(move || deadlock_rpc_tray::run_headless(tray_config, update_rx));
        rt.block_on(app::run(config, tray))?;
        let _ = status_log.join();
    }

    tracing::info!("shut down cleanly");
    Ok(())
}
