// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod clock;
pub mod config;
pub mod entry;
pub mod error;
pub mod log;
pub mod metrics;
pub mod phrases;
pub mod store;
pub mod throttle;
pub mod validate;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, router, AppState};
pub use crate::config::BoardConfig;
pub use crate::entry::{Entry, EntryMap};
pub use crate::error::{StoreError, StoreResult};
pub use crate::store::{PopOutcome, Store, StoreOptions};

use anyhow::Context;

/// Build the full app (API + UI fallback) from a resolved config.
/// Does not install the metrics recorder; the binary does that once.
pub fn app(cfg: &BoardConfig) -> anyhow::Result<axum::Router> {
    let store = Store::open(cfg.store_options())
        .with_context(|| format!("opening entry store at {}", cfg.db_path.display()))?;
    let state = AppState::new(store, cfg.limits());
    Ok(api::router(state, &cfg.static_dir))
}
