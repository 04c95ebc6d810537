//! Ordered credential chain with per-source exclusion.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Duration;

use super::cli::{AzureCliCredential, AzureDeveloperCliCredential};
use super::credential::TokenCredential;
use super::environment::EnvironmentCredential;
use super::error::AuthError;
use super::managed_identity::ManagedIdentityCredential;
use super::token::AccessToken;

/// Tokens are refreshed this long before they expire.
const REFRESH_MARGIN_MINUTES: i64 = 5;

/// Which sources [`DefaultCredential`] may try.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialOptions {
    pub exclude_environment_credential: bool,
    pub exclude_managed_identity_credential: bool,
    pub exclude_azure_cli_credential: bool,
    pub exclude_azure_developer_cli_credential: bool,
    /// Restrict the CLI sources to one tenant.
    pub tenant_id: Option<String>,
}

impl CredentialOptions {
    /// Developer-workstation chain: no service principal from the
    /// environment, no managed identity.
    pub fn interactive_only() -> Self {
        Self {
            exclude_environment_credential: true,
            exclude_managed_identity_credential: true,
            ..Self::default()
        }
    }
}

/// Tries each configured source in order until one yields a token.
///
/// Order: environment, managed identity, Azure CLI, Azure Developer CLI.
/// An unavailable source hands over to the next; a source that fails
/// authentication ends the chain with its error.
pub struct DefaultCredential {
    sources: Vec<Arc<dyn TokenCredential>>,
    cache: Mutex<Option<CachedToken>>,
}

#[derive(Clone)]
struct CachedToken {
    scopes: Vec<String>,
    token: AccessToken,
}

impl DefaultCredential {
    pub fn new(options: CredentialOptions) -> Self {
        let mut sources: Vec<Arc<dyn TokenCredential>> = Vec::new();
        if !options.exclude_environment_credential {
            sources.push(Arc::new(EnvironmentCredential::from_env()));
        }
        if !options.exclude_managed_identity_credential {
            sources.push(Arc::new(ManagedIdentityCredential::new()));
        }
        if !options.exclude_azure_cli_credential {
            let mut az = AzureCliCredential::new();
            if let Some(tenant) = options.tenant_id.as_deref() {
                az = az.with_tenant_id(tenant);
            }
            sources.push(Arc::new(az));
        }
        if !options.exclude_azure_developer_cli_credential {
            let mut azd = AzureDeveloperCliCredential::new();
            if let Some(tenant) = options.tenant_id.as_deref() {
                azd = azd.with_tenant_id(tenant);
            }
            sources.push(Arc::new(azd));
        }
        Self::from_sources(sources)
    }

    /// Build a chain from explicit sources, tried in the given order.
    pub fn from_sources(sources: Vec<Arc<dyn TokenCredential>>) -> Self {
        Self {
            sources,
            cache: Mutex::new(None),
        }
    }

    /// Names of the sources in the order they are tried.
    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    fn cached(&self, scopes: &[&str]) -> Option<AccessToken> {
        let guard = self.cache.lock().ok()?;
        let cached = guard.as_ref()?;
        let same_scopes = cached.scopes.len() == scopes.len()
            && cached.scopes.iter().zip(scopes).all(|(a, b)| a == b);
        let fresh = !cached
            .token
            .is_expired_within(Duration::minutes(REFRESH_MARGIN_MINUTES));
        (same_scopes && fresh).then(|| cached.token.clone())
    }

    fn store(&self, scopes: &[&str], token: &AccessToken) {
        if let Ok(mut guard) = self.cache.lock() {
            *guard = Some(CachedToken {
                scopes: scopes.iter().map(|s| s.to_string()).collect(),
                token: token.clone(),
            });
        }
    }
}

#[async_trait]
impl TokenCredential for DefaultCredential {
    fn name(&self) -> &'static str {
        "DefaultCredential"
    }

    async fn get_token(&self, scopes: &[&str]) -> Result<AccessToken, AuthError> {
        if let Some(token) = self.cached(scopes) {
            return Ok(token);
        }

        let mut reasons = Vec::new();
        for source in &self.sources {
            match source.get_token(scopes).await {
                Ok(token) => {
                    tracing::info!(credential = source.name(), "acquired access token");
                    self.store(scopes, &token);
                    return Ok(token);
                }
                Err(err) if err.is_unavailable() => {
                    tracing::debug!(credential = source.name(), error = %err, "credential unavailable");
                    reasons.push(format!("- {err}"));
                }
                Err(err) => return Err(err),
            }
        }

        if reasons.is_empty() {
            reasons.push("- every credential source was excluded".to_string());
        }
        Err(AuthError::ChainExhausted(reasons.join("\n")))
    }
}
