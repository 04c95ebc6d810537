//! Client-secret credential configured through `AZURE_*` variables.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde::Deserialize;

use super::credential::TokenCredential;
use super::error::AuthError;
use super::token::AccessToken;

const NAME: &str = "EnvironmentCredential";
const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";

pub const ENV_TENANT_ID: &str = "AZURE_TENANT_ID";
pub const ENV_CLIENT_ID: &str = "AZURE_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "AZURE_CLIENT_SECRET";
pub const ENV_AUTHORITY_HOST: &str = "AZURE_AUTHORITY_HOST";

#[derive(Debug, Clone)]
struct ClientSecret {
    tenant_id: String,
    client_id: String,
    client_secret: String,
}

/// Service-principal credential using the OAuth client-credentials grant.
///
/// Unavailable unless tenant id, client id and secret are all present.
pub struct EnvironmentCredential {
    client: reqwest::Client,
    authority: String,
    secret: Option<ClientSecret>,
}

impl EnvironmentCredential {
    /// Read `AZURE_TENANT_ID`, `AZURE_CLIENT_ID`, `AZURE_CLIENT_SECRET` and
    /// the optional `AZURE_AUTHORITY_HOST`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let secret = match (get(ENV_TENANT_ID), get(ENV_CLIENT_ID), get(ENV_CLIENT_SECRET)) {
            (Some(tenant_id), Some(client_id), Some(client_secret)) => Some(ClientSecret {
                tenant_id,
                client_id,
                client_secret,
            }),
            _ => None,
        };
        Self {
            client: reqwest::Client::new(),
            authority: get(ENV_AUTHORITY_HOST).unwrap_or_else(|| DEFAULT_AUTHORITY.to_string()),
            secret,
        }
    }

    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            authority: DEFAULT_AUTHORITY.to_string(),
            secret: Some(ClientSecret {
                tenant_id: tenant_id.into(),
                client_id: client_id.into(),
                client_secret: client_secret.into(),
            }),
        }
    }

    pub fn with_authority(mut self, authority: impl Into<String>) -> Self {
        self.authority = authority.into();
        self
    }

    fn token_url(&self, tenant_id: &str) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.authority.trim_end_matches('/'),
            tenant_id
        )
    }
}

#[async_trait]
impl TokenCredential for EnvironmentCredential {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn get_token(&self, scopes: &[&str]) -> Result<AccessToken, AuthError> {
        let secret = self.secret.as_ref().ok_or_else(|| {
            AuthError::unavailable(
                NAME,
                format!("{ENV_TENANT_ID}, {ENV_CLIENT_ID} and {ENV_CLIENT_SECRET} must all be set"),
            )
        })?;

        let scope = scopes.join(" ");
        let resp = self
            .client
            .post(self.token_url(&secret.tenant_id))
            .header("Accept", "application/json")
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", secret.client_id.as_str()),
                ("client_secret", secret.client_secret.as_str()),
                ("scope", scope.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            let message = serde_json::from_str::<TokenErrorResponse>(&body)
                .map(|e| e.error_description.unwrap_or(e.error))
                .unwrap_or_else(|_| format!("token request failed with status {status}"));
            return Err(AuthError::failed(NAME, message));
        }

        let payload: TokenResponse = serde_json::from_str(&body)?;
        tracing::debug!(credential = NAME, expires_in = payload.expires_in, "acquired token");
        Ok(AccessToken::new(
            payload.access_token,
            Utc::now() + Duration::seconds(payload.expires_in),
        ))
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    error_description: Option<String>,
}
