//! Light/dark theme preference.
//!
//! The theme is presentation state only; nothing in the library's search or
//! reading flow depends on it. [`ThemeState`] reads the persisted preference
//! (key `"theme"`) from a [`CacheStore`] or falls back to an environment
//! default, and persists every change.
//!
//! A process-wide instance is installed once with [`init`] and read with
//! [`global`].
//!
//! ```rust
//! use std::sync::Arc;
//! use folio::cache::MemoryStore;
//! use folio::theme::{Theme, ThemeState};
//!
//! let store = Arc::new(MemoryStore::new());
//! let theme = ThemeState::load(store.clone(), Some("dark"));
//! assert_eq!(theme.current(), Theme::Dark);
//!
//! theme.toggle().unwrap();
//! assert_eq!(ThemeState::load(store, None).current(), Theme::Light);
//! ```

use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::warn;

use crate::cache::CacheStore;
use crate::error::{Error, Result};

/// Storage key of the persisted preference.
pub const THEME_KEY: &str = "theme";

/// Environment variable consulted when nothing is persisted.
pub const THEME_ENV: &str = "FOLIO_THEME";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(Error::parse(format!("Unknown theme: {}", other))),
        }
    }
}

/// The current theme plus the store it is persisted in.
pub struct ThemeState {
    current: RwLock<Theme>,
    store: Arc<dyn CacheStore>,
}

impl ThemeState {
    /// Reads the persisted theme, else `env_default`, else [`Theme::Light`].
    pub fn load(store: Arc<dyn CacheStore>, env_default: Option<&str>) -> Self {
        let persisted = store.get(THEME_KEY).and_then(|raw| match raw.parse() {
            Ok(theme) => Some(theme),
            Err(e) => {
                warn!(error = %e, "ignoring persisted theme");
                None
            }
        });
        let current = persisted
            .or_else(|| env_default.and_then(|raw| raw.parse().ok()))
            .unwrap_or_default();

        Self {
            current: RwLock::new(current),
            store,
        }
    }

    pub fn current(&self) -> Theme {
        *self.current.read()
    }

    /// Sets and persists `theme`.
    ///
    /// The in-memory value changes even if persisting fails.
    pub fn set(&self, theme: Theme) -> Result<()> {
        *self.current.write() = theme;
        self.store.set(THEME_KEY, theme.as_str())
    }

    /// Switches between light and dark, returning the new theme.
    pub fn toggle(&self) -> Result<Theme> {
        let next = self.current().toggled();
        self.set(next)?;
        Ok(next)
    }
}

static GLOBAL: OnceCell<ThemeState> = OnceCell::new();

/// Installs the process-wide theme state, reading `FOLIO_THEME` as default.
///
/// Only the first call installs; later calls return the existing instance.
pub fn init(store: Arc<dyn CacheStore>) -> &'static ThemeState {
    GLOBAL.get_or_init(|| {
        let env_default = std::env::var(THEME_ENV).ok();
        ThemeState::load(store, env_default.as_deref())
    })
}

/// The process-wide theme state, if [`init`] has been called.
pub fn global() -> Option<&'static ThemeState> {
    GLOBAL.get()
}
