//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. Environment variables, `ROUNDHOUSE__<SECTION>__<KEY>`
//! 3. Config file (`--config`, or the platform config directory)
//! 4. Built-in defaults (always present)

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::debug;

use roundhouse_core::domain::{DEFAULT_BASELINE, SparseIndex};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where the collection lives.
    pub store: StoreConfig,
    /// Sort key spacing for models and train members.
    pub ordering: OrderingConfig,
    /// Output settings.
    pub output: OutputConfig,
    /// Servicing reminders.
    pub maintenance: MaintenanceConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Collection file. `None` means the platform data directory.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderingConfig {
    pub baseline: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
    /// `auto`, `human`, `plain` or `json`; used when `--output-format` is not given.
    pub format: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaintenanceConfig {
    /// Days between oiling a locomotive.
    pub oil_interval_days: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            ordering: OrderingConfig::default(),
            output: OutputConfig::default(),
            maintenance: MaintenanceConfig::default(),
        }
    }
}

impl Default for OrderingConfig {
    fn default() -> Self {
        Self {
            baseline: DEFAULT_BASELINE,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            no_color: false,
            format: "auto".into(),
        }
    }
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            oil_interval_days: 180,
        }
    }
}

impl AppConfig {
    /// Load configuration, layering file and environment over the defaults.
    ///
    /// `config_file` is the path the user passed via `--config`; it must
    /// exist. Without it the default location is read if present.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        let (path, required) = match config_file {
            Some(path) => (path.clone(), true),
            None => (Self::config_path(), false),
        };
        debug!(path = %path.display(), required, "Loading configuration");

        let config = Config::builder()
            .add_source(Config::try_from(&Self::default()).context("encoding defaults")?)
            .add_source(File::from(path.as_path()).format(FileFormat::Toml).required(required))
            .add_source(
                Environment::with_prefix("ROUNDHOUSE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("reading configuration from {}", path.display()))?;

        let loaded: Self = config
            .try_deserialize()
            .context("configuration has the wrong shape")?;
        loaded.sparse_index().context("invalid ordering.baseline")?;
        Ok(loaded)
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.roundhouse.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("org", "roundhouse", "roundhouse")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".roundhouse.toml"))
    }

    /// Collection file to open: `store.path`, else the platform data dir.
    pub fn store_path(&self) -> PathBuf {
        if let Some(path) = &self.store.path {
            return path.clone();
        }
        directories::ProjectDirs::from("org", "roundhouse", "roundhouse")
            .map(|d| d.data_dir().join("collection.json"))
            .unwrap_or_else(|| PathBuf::from("roundhouse.json"))
    }

    /// The allocator configured by `ordering.baseline`.
    pub fn sparse_index(&self) -> Result<SparseIndex, roundhouse_core::domain::DomainError> {
        SparseIndex::try_new(self.ordering.baseline)
    }

    /// Serialise as the TOML `init` writes.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Path shown by `config path`: the explicit one, else the default.
    pub fn active_path(config_file: Option<&Path>) -> PathBuf {
        config_file.map_or_else(Self::config_path, Path::to_path_buf)
    }
}
