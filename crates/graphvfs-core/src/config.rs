//! Configuration module for GraphVFS.
//!
//! One YAML file (`graphvfs/config.yaml` under the user config directory)
//! with four sections: `graph`, `watch`, `auth` and `logging`. Every field has
//! a default, so a partial or missing file is valid.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Microsoft Graph v1.0 endpoint
pub const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";

/// Environment variable consulted for a bearer token when no keyring user is set
pub const DEFAULT_TOKEN_ENV: &str = "GRAPHVFS_ACCESS_TOKEN";

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for GraphVFS.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub graph: GraphConfig,
    pub watch: WatchConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

/// Remote API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Base URL every request path is appended to.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

/// Change-notification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Seconds between delta polls.
    pub poll_interval_secs: u64,
    /// Number of undelivered batches buffered per subscriber.
    pub event_buffer: usize,
}

/// Credential lookup settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Keyring account holding the token. `None` falls back to `token_env`.
    pub keyring_user: Option<String>,
    /// Environment variable holding a bearer token.
    pub token_env: String,
}

/// Tracing subscriber settings for the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
    /// Output format: `pretty` or `json`.
    pub format: String,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl Config {
    /// Reads and parses the YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Like [`Config::load`], but any read or parse failure yields the defaults.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Serialize the configuration back to YAML.
    pub fn to_yaml(&self) -> anyhow::Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// `$XDG_CONFIG_HOME/graphvfs/config.yaml`, or the platform equivalent.
    ///
    /// Typically `$XDG_CONFIG_HOME/graphvfs/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("graphvfs")
            .join("config.yaml")
    }
}

impl WatchConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl GraphConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GRAPH_BASE_URL.to_string(),
            request_timeout_secs: 60,
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 10,
            event_buffer: 64,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            keyring_user: None,
            token_env: DEFAULT_TOKEN_ENV.to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// One invalid field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"watch.poll_interval_secs"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Valid values for `logging.format`.
const VALID_LOG_FORMATS: &[&str] = &["pretty", "json"];

impl Config {
    /// Checks every section and collects all problems (empty when valid).
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- graph ---
        if !self.graph.base_url.starts_with("http://") && !self.graph.base_url.starts_with("https://")
        {
            errors.push(ValidationError {
                field: "graph.base_url".into(),
                message: format!("must be an http(s) URL, got {:?}", self.graph.base_url),
            });
        }
        if self.graph.request_timeout_secs == 0 {
            errors.push(ValidationError {
                field: "graph.request_timeout_secs".into(),
                message: "must be greater than 0".into(),
            });
        }

        // --- watch ---
        if self.watch.poll_interval_secs == 0 {
            errors.push(ValidationError {
                field: "watch.poll_interval_secs".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.watch.event_buffer == 0 {
            errors.push(ValidationError {
                field: "watch.event_buffer".into(),
                message: "must be greater than 0".into(),
            });
        }

        // --- auth ---
        if self.auth.keyring_user.is_none() && self.auth.token_env.trim().is_empty() {
            errors.push(ValidationError {
                field: "auth.token_env".into(),
                message: "must be set when auth.keyring_user is absent".into(),
            });
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level {:?}; expected one of {VALID_LOG_LEVELS:?}",
                    self.logging.level
                ),
            });
        }
        if !VALID_LOG_FORMATS.contains(&self.logging.format.as_str()) {
            errors.push(ValidationError {
                field: "logging.format".into(),
                message: format!(
                    "invalid format {:?}; expected one of {VALID_LOG_FORMATS:?}",
                    self.logging.format
                ),
            });
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`Config`].
///
/// ```rust
/// use graphvfs_core::config::ConfigBuilder;
///
/// let cfg = ConfigBuilder::new()
///     .watch_poll_interval_secs(30)
///     .logging_level("debug")
///     .build();
/// assert_eq!(cfg.watch.poll_interval_secs, 30);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    // --- graph ---

    pub fn graph_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.graph.base_url = url.into();
        self
    }

    pub fn graph_request_timeout_secs(mut self, seconds: u64) -> Self {
        self.config.graph.request_timeout_secs = seconds;
        self
    }

    // --- watch ---

    pub fn watch_poll_interval_secs(mut self, seconds: u64) -> Self {
        self.config.watch.poll_interval_secs = seconds;
        self
    }

    pub fn watch_event_buffer(mut self, batches: usize) -> Self {
        self.config.watch.event_buffer = batches;
        self
    }

    // --- auth ---

    pub fn auth_keyring_user(mut self, user: impl Into<String>) -> Self {
        self.config.auth.keyring_user = Some(user.into());
        self
    }

    pub fn auth_token_env(mut self, var: impl Into<String>) -> Self {
        self.config.auth.token_env = var.into();
        self
    }

    // --- logging ---

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn logging_format(mut self, format: impl Into<String>) -> Self {
        self.config.logging.format = format.into();
        self
    }

    // --- build ---

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate in one step. Returns `Err` with the list of
    /// validation errors if the configuration is invalid.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let config = self.build();
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
