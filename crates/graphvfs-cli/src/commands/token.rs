//! `graphvfs token` - keep an access token in the system keyring
//!
//! The token is stored under the `auth.keyring_user` account, which is also
//! where the Graph client looks it up.

use std::io::Read;

use anyhow::{Context, Result};
use clap::Subcommand;
use graphvfs_graph::token::KeyringTokenSource;
use tracing::info;

use super::AppContext;
use crate::output::{get_formatter, OutputFormat};

#[derive(Debug, Subcommand)]
pub enum TokenCommand {
    /// Store a token; reads it from stdin when no value is given
    Set {
        /// Access token
        value: Option<String>,
    },
    /// Remove the stored token
    Clear,
}

impl TokenCommand {
    pub async fn execute(&self, ctx: &AppContext, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format);
        let user = ctx
            .config
            .auth
            .keyring_user
            .clone()
            .context("auth.keyring_user is not configured")?;
        let source = KeyringTokenSource::new(user.clone());

        match self {
            TokenCommand::Set { value } => {
                let token = match value {
                    Some(value) => value.trim().to_string(),
                    None => read_stdin_token()?,
                };
                if token.is_empty() {
                    anyhow::bail!("refusing to store an empty token");
                }
                source.store(&token)?;
                info!(user = %user, "Token stored");
                formatter.success(&format!("Token stored for {user}"));
            }
            TokenCommand::Clear => {
                source.clear()?;
                info!(user = %user, "Token cleared");
                formatter.success(&format!("Token removed for {user}"));
            }
        }
        Ok(())
    }
}

fn read_stdin_token() -> Result<String> {
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("Failed to read token from stdin")?;
    Ok(buf.trim().to_string())
}
