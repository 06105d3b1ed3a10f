//! Process-wide default configuration.
//!
//! Nodes created with `new()` snapshot [`shared()`] at construction time.
//! Call [`install`] once during startup to change the default; nodes that
//! already exist keep the configuration they were created with. Use
//! `with_config` constructors for isolated sessions instead.

use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use wadm_registry::Config;

static SHARED: LazyLock<RwLock<Arc<Config>>> =
    LazyLock::new(|| RwLock::new(Arc::new(Config::default())));

/// Returns the current process-wide configuration.
pub fn shared() -> Arc<Config> {
    SHARED
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Replaces the process-wide configuration and returns the new handle.
pub fn install(config: Config) -> Arc<Config> {
    let config = Arc::new(config);
    *SHARED.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&config);
    tracing::debug!(base_url = %config.base_url, fast_mode = config.fast_mode, "Installed default configuration");
    config
}
