//! Token credential trait.

use async_trait::async_trait;

use super::error::AuthError;
use super::token::AccessToken;

/// A source of bearer tokens for one or more scopes.
#[async_trait]
pub trait TokenCredential: Send + Sync {
    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Acquire a token valid for `scopes`.
    async fn get_token(&self, scopes: &[&str]) -> Result<AccessToken, AuthError>;
}
