//! Bearer token sources
//!
//! Token acquisition itself (the interactive OAuth flow) happens outside this
//! crate. These sources only hand an already-issued access token to the
//! [`GraphClient`](crate::GraphClient).

use anyhow::{Context, Result};
use graphvfs_core::ports::ITokenSource;
use serde::Deserialize;
use tracing::debug;

/// Keyring service name under which tokens are stored
pub const KEYRING_SERVICE: &str = "graphvfs";

// ============================================================================
// StaticTokenSource
// ============================================================================

/// A fixed token, e.g. from a command-line flag or a test
pub struct StaticTokenSource {
    token: String,
}

impl StaticTokenSource {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait::async_trait]
impl ITokenSource for StaticTokenSource {
    async fn access_token(&self) -> Result<String> {
        Ok(self.token.clone())
    }
}

// ============================================================================
// EnvTokenSource
// ============================================================================

/// Reads the token from an environment variable at request time
pub struct EnvTokenSource {
    var: String,
}

impl EnvTokenSource {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

#[async_trait::async_trait]
impl ITokenSource for EnvTokenSource {
    async fn access_token(&self) -> Result<String> {
        let token = std::env::var(&self.var)
            .with_context(|| format!("Environment variable {} is not set", self.var))?;
        let token = token.trim();
        if token.is_empty() {
            anyhow::bail!("Environment variable {} is empty", self.var);
        }
        Ok(token.to_string())
    }
}

// ============================================================================
// KeyringTokenSource
// ============================================================================

/// Token payload as stored by OAuth tooling (only the access token is used)
#[derive(Debug, Deserialize)]
struct StoredTokens {
    access_token: String,
}

/// Reads the token from the system keyring (GNOME Keyring, KDE Wallet, ...)
///
/// The entry may hold either a raw token or a JSON object with an
/// `access_token` field.
pub struct KeyringTokenSource {
    user: String,
}

impl KeyringTokenSource {
    pub fn new(user: impl Into<String>) -> Self {
        Self { user: user.into() }
    }

    /// Stores a raw access token for this source's user
    pub fn store(&self, token: &str) -> Result<()> {
        let entry = keyring::Entry::new(KEYRING_SERVICE, &self.user)
            .context("Failed to create keyring entry")?;
        entry
            .set_password(token)
            .context("Failed to store token in keyring")?;
        debug!(user = %self.user, "Stored token in keyring");
        Ok(())
    }

    /// Removes the stored token; a missing entry is not an error
    pub fn clear(&self) -> Result<()> {
        let entry = keyring::Entry::new(KEYRING_SERVICE, &self.user)
            .context("Failed to create keyring entry")?;
        match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(anyhow::Error::new(e).context("Failed to delete from keyring")),
        }
    }

    fn load(user: &str) -> Result<String> {
        let entry =
            keyring::Entry::new(KEYRING_SERVICE, user).context("Failed to create keyring entry")?;
        let secret = match entry.get_password() {
            Ok(secret) => secret,
            Err(keyring::Error::NoEntry) => {
                anyhow::bail!("No token stored in keyring for user {user}")
            }
            Err(e) => return Err(anyhow::Error::new(e).context("Failed to read from keyring")),
        };
        debug!(user, "Loaded token from keyring");
        Ok(parse_stored_token(&secret))
    }
}

#[async_trait::async_trait]
impl ITokenSource for KeyringTokenSource {
    async fn access_token(&self) -> Result<String> {
        let user = self.user.clone();
        tokio::task::spawn_blocking(move || Self::load(&user))
            .await
            .context("Keyring lookup task failed")?
    }
}

/// Extracts the access token from a stored secret
fn parse_stored_token(secret: &str) -> String {
    match serde_json::from_str::<StoredTokens>(secret) {
        Ok(stored) => stored.access_token,
        Err(_) => secret.trim().to_string(),
    }
}
