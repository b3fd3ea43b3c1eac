//! CLI subcommands and the context they share

pub mod completions;
pub mod config;
pub mod drives;
pub mod fs;
pub mod token;
pub mod watch;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use graphvfs_core::config::Config;
use graphvfs_core::ports::ITokenSource;
use graphvfs_graph::token::{EnvTokenSource, KeyringTokenSource, StaticTokenSource};
use graphvfs_graph::GraphClient;
use graphvfs_vfs::GraphFileSystem;
use tracing::debug;

/// Configuration and credentials resolved from the global flags
#[derive(Debug)]
pub struct AppContext {
    pub config_path: PathBuf,
    pub config: Config,
    token: Option<String>,
}

impl AppContext {
    /// Loads the configuration
    ///
    /// An explicit `--config` file must exist and parse; the default location
    /// falls back to built-in defaults when absent.
    pub fn load(config_path: Option<PathBuf>, token: Option<String>) -> Result<Self> {
        let (config_path, config) = match config_path {
            Some(path) => {
                let config = Config::load(&path)
                    .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
                (path, config)
            }
            None => {
                let path = Config::default_path();
                let config = Config::load_or_default(&path);
                (path, config)
            }
        };
        Ok(Self {
            config_path,
            config,
            token,
        })
    }

    /// Picks the token source: `--token`, then the keyring, then the environment
    pub fn token_source(&self) -> Arc<dyn ITokenSource> {
        if let Some(token) = &self.token {
            debug!("Using token from command line");
            return Arc::new(StaticTokenSource::new(token.clone()));
        }
        match &self.config.auth.keyring_user {
            Some(user) => {
                debug!(user = %user, "Using keyring token");
                Arc::new(KeyringTokenSource::new(user.clone()))
            }
            None => {
                debug!(var = %self.config.auth.token_env, "Using token from environment");
                Arc::new(EnvTokenSource::new(self.config.auth.token_env.clone()))
            }
        }
    }

    pub fn client(&self) -> Result<Arc<GraphClient>> {
        let client = GraphClient::from_config(&self.config.graph, self.token_source())
            .context("Failed to create Graph client")?;
        Ok(Arc::new(client))
    }

    pub fn filesystem(&self) -> Result<GraphFileSystem> {
        Ok(GraphFileSystem::from_config(self.client()?, &self.config.watch))
    }
}
