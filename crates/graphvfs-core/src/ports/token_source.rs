//! Token source port (driven/secondary port)
//!
//! Acquiring and refreshing OAuth tokens is an external concern. The remote
//! client only needs an opaque bearer string, obtained lazily and cached for
//! the lifetime of the client until the caller asks for a new one.

/// Supplies a usable bearer credential
///
/// ## Implementation Notes
///
/// - Implementations may block on user interaction or a keyring lookup; the
///   client calls [`access_token`](ITokenSource::access_token) at most once per
///   cached token.
/// - Errors use `anyhow::Result` because their causes are adapter-specific.
#[async_trait::async_trait]
pub trait ITokenSource: Send + Sync {
    /// Returns a bearer token for the remote API
    async fn access_token(&self) -> anyhow::Result<String>;
}
