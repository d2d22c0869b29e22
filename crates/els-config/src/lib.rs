//! Workspace configuration and `tracing` setup for the Ember language server.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Once, OnceLock};
use std::time::Duration;

use parking_lot::ReentrantMutex;
use serde::{Deserialize, Serialize};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer};

/// `[logging]`: verbosity and output format. Logs always go to stderr since
/// stdout carries the protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// A level name or an `EnvFilter` directive list such as `els.project=trace`.
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            json: false,
        }
    }
}

impl LoggingConfig {
    /// `warning` is accepted for `warn`; blank means `info`.
    fn directives(&self) -> String {
        let level = self.level.trim();
        if level.is_empty() {
            "info".to_owned()
        } else if level.eq_ignore_ascii_case("warning") {
            "warn".to_owned()
        } else {
            level.to_owned()
        }
    }

    /// Filter from `RUST_LOG` when it is set and valid, else from `level`.
    pub fn env_filter(&self) -> EnvFilter {
        std::env::var("RUST_LOG")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .and_then(|value| EnvFilter::try_new(value).ok())
            .or_else(|| EnvFilter::try_new(self.directives()).ok())
            .unwrap_or_else(|| EnvFilter::new("info"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Sub-directory of the workspace that holds the Ember app (`els.appRoot`).
    pub app_root: String,
    /// Addon directories outside the workspace whose files join every project's roots.
    pub local_addons: Vec<PathBuf>,
    /// Package names of projects that are scanned but never own a file.
    pub ignored_projects: Vec<String>,
    /// Scan project files into the registry as soon as a project is added.
    pub eager_registry_initialization: bool,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            app_root: String::new(),
            local_addons: Vec::new(),
            ignored_projects: Vec::new(),
            eager_registry_initialization: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Lifetime of memoized component/route/helper listings.
    pub listing_ttl_ms: u64,
    /// Lifetime of memoized glob searches and parent-root lookups.
    pub glob_search_ttl_ms: u64,
}

impl CacheConfig {
    pub fn listing_ttl(&self) -> Duration {
        Duration::from_millis(self.listing_ttl_ms)
    }

    pub fn glob_search_ttl(&self) -> Duration {
        Duration::from_millis(self.glob_search_ttl_ms)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            listing_ttl_ms: 60_000,
            glob_search_ttl_ms: 600_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinterConfig {
    pub enabled: bool,
    /// Diagnostic `source` the code-action provider reacts to.
    pub source: String,
}

impl Default for LinterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            source: "ember-template-lint".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElsConfig {
    pub logging: LoggingConfig,
    pub project: ProjectConfig,
    pub cache: CacheConfig,
    pub linter: LinterConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Toml(err.message().to_owned())
    }
}

impl ElsConfig {
    pub fn load_from_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::load_from_str(&text)
    }
}

pub const ELS_CONFIG_ENV_VAR: &str = "ELS_CONFIG_PATH";

static CONFIG_ENV_LOCK: OnceLock<ReentrantMutex<()>> = OnceLock::new();

fn config_env_lock() -> &'static ReentrantMutex<()> {
    CONFIG_ENV_LOCK.get_or_init(|| ReentrantMutex::new(()))
}

/// Run `f` while holding the config environment lock.
///
/// Environment variables are process-global; tests that set
/// [`ELS_CONFIG_ENV_VAR`] wrap the mutation and discovery in this helper.
pub fn with_config_env_lock<R>(f: impl FnOnce() -> R) -> R {
    let _guard = config_env_lock().lock();
    f()
}

/// Discover the configuration file for a workspace root.
///
/// Search order:
/// 1) `ELS_CONFIG_PATH` (absolute or relative to `workspace_root`)
/// 2) `els.toml` in `workspace_root`
/// 3) `.els.toml` in `workspace_root`
pub fn discover_config_path(workspace_root: &Path) -> Option<PathBuf> {
    let _guard = config_env_lock().lock();
    if let Some(value) = std::env::var_os(ELS_CONFIG_ENV_VAR) {
        let candidate = PathBuf::from(value);
        let path = if candidate.is_absolute() {
            candidate
        } else {
            workspace_root.join(candidate)
        };
        return Some(path);
    }

    ["els.toml", ".els.toml"]
        .into_iter()
        .map(|name| workspace_root.join(name))
        .find(|path| path.is_file())
}

/// Load the configuration for a workspace root.
///
/// If no config is present, returns [`ElsConfig::default`] and `None`.
pub fn load_for_workspace(
    workspace_root: &Path,
) -> Result<(ElsConfig, Option<PathBuf>), ConfigError> {
    let Some(path) = discover_config_path(workspace_root) else {
        return Ok((ElsConfig::default(), None));
    };

    let config = ElsConfig::load_from_path(&path)?;
    tracing::debug!(target: "els.config", path = %path.display(), "loaded workspace config");
    Ok((config, Some(path)))
}

static TRACING_INIT: Once = Once::new();

/// Install the global stderr subscriber described by `config`.
///
/// Only the first call in a process has an effect; it returns `true` when it
/// installed the subscriber.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let mut installed = false;
    TRACING_INIT.call_once(|| {
        let fmt = tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .with_ansi(false);
        let layer: Box<dyn Layer<_> + Send + Sync> = if config.json {
            fmt.json().boxed()
        } else {
            fmt.boxed()
        };
        let subscriber = tracing_subscriber::registry()
            .with(config.env_filter())
            .with(layer);
        installed = tracing::subscriber::set_global_default(subscriber).is_ok();
        if installed {
            tracing::debug!(
                target: "els.config",
                level = %config.level,
                json = config.json,
                "tracing installed"
            );
        }
    });
    installed
}
