//! # scribe-settings
//!
//! Configuration management with layered sources for Scribe.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults** — [`ScribeSettings::default()`]
//! 2. **User file** — `~/.scribe/settings.json` (deep-merged over defaults)
//! 3. **Environment variables** — `SCRIBE_*` overrides (highest priority)
//!
//! Secret-bearing fields (API tokens, account email) may hold `${VAR}`
//! references resolved from the environment at load time, so the file on
//! disk never needs to contain credentials.
//!
//! The global singleton is reloadable: when the `repo set` command writes a
//! new repository, [`reload_settings_from_path`] swaps the cached value so
//! all subsequent [`get_settings`] calls return fresh data.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{
    deep_merge, load_settings, load_settings_from_path, resolve_env_ref, settings_path,
};
pub use types::*;

use std::path::Path;
use std::sync::{Arc, RwLock};

/// Global settings singleton.
///
/// `RwLock<Option<Arc<ScribeSettings>>>` instead of `OnceLock` so the cached
/// value can be swapped after a reload. Reads are cheap (shared lock +
/// `Arc::clone`); writes only happen on reload.
static SETTINGS: RwLock<Option<Arc<ScribeSettings>>> = RwLock::new(None);

/// Get the global settings instance.
///
/// On first call, loads from `~/.scribe/settings.json` with env overrides;
/// afterwards returns the cached value. If loading fails, compiled defaults
/// apply. Returns an `Arc` so callers hold a consistent snapshot even if
/// another thread reloads concurrently.
pub fn get_settings() -> Arc<ScribeSettings> {
    {
        let guard = SETTINGS.read().expect("settings lock poisoned");
        if let Some(ref settings) = *guard {
            return Arc::clone(settings);
        }
    }

    let mut guard = SETTINGS.write().expect("settings lock poisoned");
    // Another thread may have initialized between the locks.
    if let Some(ref settings) = *guard {
        return Arc::clone(settings);
    }

    let settings = Arc::new(match load_settings() {
        Ok(loaded) => loaded,
        Err(error) => {
            tracing::warn!(%error, "failed to load settings, using defaults");
            ScribeSettings::default()
        }
    });
    *guard = Some(Arc::clone(&settings));
    settings
}

/// Replace the cached settings with a specific value.
///
/// Used by tests and by embedders that resolve the settings path themselves.
pub fn init_settings(settings: ScribeSettings) {
    let mut guard = SETTINGS.write().expect("settings lock poisoned");
    *guard = Some(Arc::new(settings));
}

/// Reload settings from a specific file path and swap the cache.
pub fn reload_settings_from_path(path: &Path) {
    let fresh = Arc::new(match load_settings_from_path(path) {
        Ok(loaded) => loaded,
        Err(error) => {
            tracing::warn!(%error, ?path, "failed to reload settings, falling back to defaults");
            ScribeSettings::default()
        }
    });
    let mut guard = SETTINGS.write().expect("settings lock poisoned");
    *guard = Some(fresh);
    tracing::info!(?path, "settings reloaded from disk");
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
