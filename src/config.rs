//! Settings loading from `folio.toml` and environment variables.
//!
//! Resolution order, later sources winning:
//!
//! 1. Built-in defaults ([`Settings::default`])
//! 2. `folio.toml` in the working directory, or `folio/folio.toml` in the user
//!    config directory
//! 3. `FOLIO_*` environment variables
//!
//! ```toml
//! api_base = "https://www.googleapis.com/books/v1"
//! api_key = "..."
//! max_results = 21
//! cache_dir = "/home/me/.cache/folio"
//! log_filter = "folio=debug"
//! ```

use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::error::Result;
use crate::types::MAX_RESULTS;

pub const CONFIG_FILE_NAME: &str = "folio.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_base: String,
    pub api_key: Option<String>,
    pub max_results: usize,
    pub cache_dir: Option<PathBuf>,
    pub user_agent: String,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base: "https://www.googleapis.com/books/v1".into(),
            api_key: None,
            max_results: MAX_RESULTS,
            cache_dir: None,
            user_agent: concat!("Folio/", env!("CARGO_PKG_VERSION")).into(),
            log_filter: "folio=info".into(),
        }
    }
}

/// Fields accepted in `folio.toml`. Everything is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    api_base: Option<String>,
    api_key: Option<String>,
    max_results: Option<usize>,
    cache_dir: Option<PathBuf>,
    user_agent: Option<String>,
    log_filter: Option<String>,
}

impl Settings {
    /// Parses settings from TOML text on top of the defaults.
    ///
    /// # Errors
    ///
    /// * [`Error::Config`](crate::Error::Config) - For invalid TOML or unknown keys
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let mut settings = Settings::default();
        settings.apply_file(toml::from_str(raw)?);
        Ok(settings)
    }

    fn apply_file(&mut self, file_cfg: FileSettings) {
        if let Some(v) = file_cfg.api_base {
            self.api_base = v;
        }
        if let Some(v) = file_cfg.api_key {
            self.api_key = Some(v);
        }
        if let Some(v) = file_cfg.max_results {
            self.set_max_results(v);
        }
        if let Some(v) = file_cfg.cache_dir {
            self.cache_dir = Some(v);
        }
        if let Some(v) = file_cfg.user_agent {
            self.user_agent = v;
        }
        if let Some(v) = file_cfg.log_filter {
            self.log_filter = v;
        }
    }

    /// Applies `FOLIO_*` overrides looked up through `lookup`.
    ///
    /// `lookup` is `std::env::var` in production; tests pass a map.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("FOLIO_API_BASE") {
            self.api_base = v;
        }
        if let Some(v) = lookup("FOLIO_API_KEY") {
            self.api_key = Some(v).filter(|key| !key.is_empty());
        }
        if let Some(v) = lookup("FOLIO_MAX_RESULTS") {
            match v.parse::<usize>() {
                Ok(parsed) => self.set_max_results(parsed),
                Err(_) => warn!(value = %v, "ignoring invalid FOLIO_MAX_RESULTS"),
            }
        }
        if let Some(v) = lookup("FOLIO_CACHE_DIR") {
            self.cache_dir = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("FOLIO_LOG") {
            self.log_filter = v;
        }
    }

    fn set_max_results(&mut self, value: usize) {
        if (1..=MAX_RESULTS).contains(&value) {
            self.max_results = value;
        } else {
            warn!(value, max = MAX_RESULTS, "max_results out of range, clamping");
            self.max_results = value.clamp(1, MAX_RESULTS);
        }
    }

    /// The directory used for cached content, falling back to the user cache dir.
    pub fn resolved_cache_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("folio")
        })
    }

    /// Builds a tracing filter, preferring `RUST_LOG` when set.
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.log_filter))
    }
}

/// Loads settings from the config file (if any) and the environment.
///
/// A malformed config file is reported and skipped.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Some(path) = find_config_file() {
        match read_file_settings(&path) {
            Ok(file_cfg) => settings.apply_file(file_cfg),
            Err(e) => warn!(path = %path.display(), error = %e, "ignoring config file"),
        }
    }

    settings.apply_env(|key| std::env::var(key).ok());
    settings
}

fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("folio").join(CONFIG_FILE_NAME))
        .filter(|path| path.is_file())
}

fn read_file_settings(path: &Path) -> Result<FileSettings> {
    let raw = fs::read_to_string(path)?;
    Ok(toml::from_str(&raw)?)
}
