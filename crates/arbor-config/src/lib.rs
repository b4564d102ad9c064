//! Workspace configuration for Arbor.
//!
//! Settings load from `arbor.toml` or `.arbor.toml` at the workspace root;
//! the `ARBOR_CONFIG` environment variable overrides the search. Every field
//! has a default and unknown keys are tolerated, so an absent, partial, or
//! newer-than-this-binary config file all work. Tracing setup lives here too,
//! so every entry point initializes logging the same way.

use std::path::{Path, PathBuf};
use std::sync::Once;

use arbor_core::PackagePresentation;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Environment variable that overrides config discovery. Relative paths
/// resolve against the workspace root.
pub const CONFIG_ENV_VAR: &str = "ARBOR_CONFIG";

const CONFIG_FILE_NAMES: [&str; 2] = ["arbor.toml", ".arbor.toml"];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config at {path}: {message}")]
    Toml { path: PathBuf, message: String },
}

/// Workspace settings for the tree model and its surrounding services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Mirror editor selections into the tree and keep them highlighted.
    pub sync_with_explorer: bool,
    /// How package nodes are grouped for display.
    pub package_presentation: PackagePresentation,
    /// React to file-change notifications with scoped refreshes.
    pub auto_refresh: bool,
    pub logging: LoggingConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sync_with_explorer: true,
            package_presentation: PackagePresentation::default(),
            auto_refresh: true,
            logging: LoggingConfig::default(),
        }
    }
}

impl Settings {
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|err| ConfigError::Toml {
            path: path.to_path_buf(),
            message: err.message().to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Either a bare level (`info`, `debug`, ...) or a full
    /// [`EnvFilter`] directive string such as `info,arbor.model=trace`.
    pub level: String,
    /// Emit log lines as JSON.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl LoggingConfig {
    fn directives(&self) -> &str {
        let trimmed = self.level.trim();
        if trimmed.is_empty() {
            "info"
        } else {
            trimmed
        }
    }

    fn config_filter(&self) -> EnvFilter {
        EnvFilter::try_new(self.directives())
            .unwrap_or_else(|_| EnvFilter::new("info"))
    }

    /// Effective filter: the configured directives, with `RUST_LOG` appended
    /// so its directives win for the targets they name.
    pub fn env_filter(&self) -> EnvFilter {
        let env_directives = std::env::var("RUST_LOG")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        match env_directives {
            Some(env_directives) => {
                let combined = format!("{},{env_directives}", self.directives());
                EnvFilter::try_new(combined)
                    .or_else(|_| EnvFilter::try_new(env_directives))
                    .unwrap_or_else(|_| self.config_filter())
            }
            None => self.config_filter(),
        }
    }
}

/// Locate the workspace config file. `ARBOR_CONFIG` wins when set; otherwise
/// the first of `arbor.toml` and `.arbor.toml` that exists.
pub fn discover_config_path(workspace_root: &Path) -> Option<PathBuf> {
    if let Some(value) = std::env::var_os(CONFIG_ENV_VAR) {
        let candidate = PathBuf::from(value);
        if candidate.is_absolute() {
            return Some(candidate);
        }
        return Some(workspace_root.join(candidate));
    }

    CONFIG_FILE_NAMES
        .into_iter()
        .map(|name| workspace_root.join(name))
        .find(|path| path.is_file())
}

/// Load the settings for a workspace root, along with the path they came
/// from. No config file means defaults.
pub fn load_for_workspace(
    workspace_root: &Path,
) -> Result<(Settings, Option<PathBuf>), ConfigError> {
    let Some(path) = discover_config_path(workspace_root) else {
        tracing::debug!(
            target: "arbor.config",
            root = %workspace_root.display(),
            "no config file, using defaults"
        );
        return Ok((Settings::default(), None));
    };
    let settings = Settings::load_from_path(&path)?;
    tracing::debug!(
        target: "arbor.config",
        path = %path.display(),
        "loaded workspace config"
    );
    Ok((settings, Some(path)))
}

static TRACING_INIT: Once = Once::new();

/// Install the global tracing subscriber. Later calls are no-ops, so every
/// entry point can call this unconditionally.
pub fn init_tracing(logging: &LoggingConfig) {
    TRACING_INIT.call_once(|| {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(logging.env_filter())
            .with_writer(std::io::stderr)
            .with_ansi(false);
        if logging.json {
            let _ = builder.json().try_init();
        } else {
            let _ = builder.try_init();
        }
    });
}
