//! Managed identity via the instance metadata service (IMDS).

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::credential::TokenCredential;
use super::error::AuthError;
use super::scope_to_resource;
use super::token::AccessToken;

const NAME: &str = "ManagedIdentityCredential";
const DEFAULT_IMDS_ENDPOINT: &str = "http://169.254.169.254/metadata/identity/oauth2/token";
const IMDS_API_VERSION: &str = "2018-02-01";
const PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// Token source for code running on an Azure host with an assigned identity.
pub struct ManagedIdentityCredential {
    endpoint: String,
    client_id: Option<String>,
}

impl Default for ManagedIdentityCredential {
    fn default() -> Self {
        Self::new()
    }
}

impl ManagedIdentityCredential {
    pub fn new() -> Self {
        Self {
            endpoint: DEFAULT_IMDS_ENDPOINT.to_string(),
            client_id: None,
        }
    }

    /// Use a user-assigned identity.
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl TokenCredential for ManagedIdentityCredential {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn get_token(&self, scopes: &[&str]) -> Result<AccessToken, AuthError> {
        let [scope] = scopes else {
            return Err(AuthError::failed(NAME, "managed identity accepts exactly one scope"));
        };

        let client = reqwest::Client::builder()
            .connect_timeout(PROBE_TIMEOUT)
            .build()?;

        let mut query = vec![
            ("api-version", IMDS_API_VERSION),
            ("resource", scope_to_resource(scope)),
        ];
        if let Some(client_id) = self.client_id.as_deref() {
            query.push(("client_id", client_id));
        }

        // Anything short of a response means no metadata service on this host.
        let resp = match client
            .get(&self.endpoint)
            .header("Metadata", "true")
            .query(&query)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(err) => return Err(AuthError::unavailable(NAME, err.to_string())),
        };

        let status = resp.status();
        if status.as_u16() == 400 {
            return Err(AuthError::unavailable(
                NAME,
                "no managed identity is assigned to this host",
            ));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AuthError::failed(NAME, format!("status {status}: {body}")));
        }

        let payload: ImdsTokenResponse = resp.json().await?;
        let expires_on = parse_epoch(&payload.expires_on)?;
        Ok(AccessToken::new(payload.access_token, expires_on))
    }
}

#[derive(Debug, Deserialize)]
struct ImdsTokenResponse {
    access_token: String,
    expires_on: serde_json::Value,
}

/// IMDS returns `expires_on` as epoch seconds, as a string or a number.
fn parse_epoch(value: &serde_json::Value) -> Result<DateTime<Utc>, AuthError> {
    let secs = match value {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
    .ok_or_else(|| AuthError::InvalidResponse(format!("unexpected expires_on: {value}")))?;
    DateTime::<Utc>::from_timestamp(secs, 0)
        .ok_or_else(|| AuthError::InvalidResponse(format!("expires_on out of range: {secs}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn epoch_accepts_string_and_number() {
        let from_str = parse_epoch(&json!("1700000000")).unwrap();
        let from_num = parse_epoch(&json!(1700000000)).unwrap();
        assert_eq!(from_str, from_num);
        assert_eq!(from_str.timestamp(), 1_700_000_000);
    }

    #[test]
    fn epoch_rejects_garbage() {
        assert!(parse_epoch(&json!("tomorrow")).is_err());
        assert!(parse_epoch(&json!(null)).is_err());
    }
}
