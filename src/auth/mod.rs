//! Entra ID credentials for the agent service.
//!
//! [`DefaultCredential`] walks an ordered chain of token sources. Each source
//! either yields a token, reports itself unavailable (the chain moves on), or
//! fails outright (the chain stops).

pub mod chain;
pub mod cli;
pub mod credential;
pub mod environment;
pub mod error;
pub mod managed_identity;
pub mod token;

pub use chain::{CredentialOptions, DefaultCredential};
pub use cli::{AzureCliCredential, AzureDeveloperCliCredential};
pub use credential::TokenCredential;
pub use environment::EnvironmentCredential;
pub use error::AuthError;
pub use managed_identity::ManagedIdentityCredential;
pub use token::AccessToken;

/// Scope requested for the agent service data plane.
pub const AGENT_SERVICE_SCOPE: &str = "https://ai.azure.com/.default";

/// Turn a `.default` scope into the bare resource URI some sources expect.
pub(crate) fn scope_to_resource(scope: &str) -> &str {
    scope.strip_suffix("/.default").unwrap_or(scope)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_to_resource_strips_default_suffix() {
        assert_eq!(scope_to_resource(AGENT_SERVICE_SCOPE), "https://ai.azure.com");
        assert_eq!(scope_to_resource("https://vault.azure.net"), "https://vault.azure.net");
    }
}
