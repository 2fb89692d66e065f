//! Entry Board: binary entrypoint.
//! Boots the Axum HTTP server: config, entry store, routes, metrics.

use entry_board::{metrics::Metrics, BoardConfig};
use shuttle_axum::ShuttleAxum;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Enable compact tracing logs when BOARD_DEV_LOG=1.
/// Filter comes from RUST_LOG, defaulting to `entry_board=info,warn`.
fn enable_dev_tracing() {
    let dev_flag = std::env::var("BOARD_DEV_LOG")
        .ok()
        .is_some_and(|v| v == "1");
    if !dev_flag {
        return;
    }

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("entry_board=info,warn"));

    // The runtime may already own the global subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    enable_dev_tracing();

    let cfg = BoardConfig::load_default()?;
    info!(
        db_path = %cfg.db_path.display(),
        pop_max_wait_secs = cfg.pop_max_wait_secs,
        static_dir = %cfg.static_dir.display(),
        "starting entry board"
    );

    let mut router = entry_board::app(&cfg)?;
    match Metrics::init() {
        Ok(m) => router = router.merge(m.router()),
        Err(e) => warn!(error = ?e, "metrics disabled"),
    }

    Ok(router.into())
}
