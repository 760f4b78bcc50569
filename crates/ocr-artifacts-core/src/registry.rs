//! Process-wide default configuration
//!
//! The registry holds at most one [`EngineConfig`] as an immutable snapshot
//! that is swapped atomically. A reader observes either the whole old value or
//! the whole new one. Concurrent `set` calls race and the last write wins.
//!
//! Resolution code should call [`ConfigRegistry::snapshot`] once per
//! resolution and pass the result down explicitly, so that a `set` landing
//! mid-resolution cannot mix two configurations across roles.

use arc_swap::ArcSwapOption;
use once_cell::sync::Lazy;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::config::EngineConfig;

static GLOBAL: Lazy<Arc<ConfigRegistry>> = Lazy::new(|| Arc::new(ConfigRegistry::new()));

/// Holder of an optional default [`EngineConfig`]
pub struct ConfigRegistry {
    current: ArcSwapOption<EngineConfig>,
}

impl ConfigRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            current: ArcSwapOption::from(None),
        }
    }

    /// The process-wide registry
    pub fn global() -> Arc<ConfigRegistry> {
        Arc::clone(&GLOBAL)
    }

    /// Replace the default configuration
    pub fn set(&self, config: EngineConfig) {
        debug!(strategy = %config.load_strategy, "Setting default engine config");
        self.current.store(Some(Arc::new(config)));
    }

    /// The current default configuration, if any
    pub fn get(&self) -> Option<Arc<EngineConfig>> {
        self.current.load_full()
    }

    /// Alias of [`get`](Self::get) for call sites that read once per resolution
    pub fn snapshot(&self) -> Option<Arc<EngineConfig>> {
        self.get()
    }

    /// Remove the default configuration
    pub fn clear(&self) {
        debug!("Clearing default engine config");
        self.current.store(None);
    }

    /// Whether a default configuration is set
    pub fn has(&self) -> bool {
        self.current.load().is_some()
    }
}

impl Default for ConfigRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ConfigRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigRegistry")
            .field("current", &self.get())
            .finish()
    }
}
