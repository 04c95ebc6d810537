//! Credentials borrowed from a signed-in developer CLI (`az`, `azd`).

use std::process::Output;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;

use super::credential::TokenCredential;
use super::error::AuthError;
use super::scope_to_resource;
use super::token::AccessToken;

const AZ_NAME: &str = "AzureCliCredential";
const AZD_NAME: &str = "AzureDeveloperCliCredential";
const CLI_TIMEOUT: Duration = Duration::from_secs(10);

/// Token from `az account get-access-token`.
#[derive(Debug, Clone, Default)]
pub struct AzureCliCredential {
    tenant_id: Option<String>,
}

impl AzureCliCredential {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tenant_id(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }
}

#[async_trait]
impl TokenCredential for AzureCliCredential {
    fn name(&self) -> &'static str {
        AZ_NAME
    }

    async fn get_token(&self, scopes: &[&str]) -> Result<AccessToken, AuthError> {
        let [scope] = scopes else {
            return Err(AuthError::failed(AZ_NAME, "the Azure CLI accepts exactly one scope"));
        };
        let mut args = vec![
            "account",
            "get-access-token",
            "--output",
            "json",
            "--resource",
            scope_to_resource(scope),
        ];
        if let Some(tenant) = self.tenant_id.as_deref() {
            args.extend(["--tenant", tenant]);
        }

        let output = run_cli(AZ_NAME, "az", &args).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_cli_failure(AZ_NAME, &stderr, "az login"));
        }
        parse_az_output(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Token from `azd auth token`.
#[derive(Debug, Clone, Default)]
pub struct AzureDeveloperCliCredential {
    tenant_id: Option<String>,
}

impl AzureDeveloperCliCredential {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tenant_id(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }
}

#[async_trait]
impl TokenCredential for AzureDeveloperCliCredential {
    fn name(&self) -> &'static str {
        AZD_NAME
    }

    async fn get_token(&self, scopes: &[&str]) -> Result<AccessToken, AuthError> {
        let mut args = vec!["auth", "token", "--output", "json"];
        for scope in scopes {
            args.extend(["--scope", *scope]);
        }
        if let Some(tenant) = self.tenant_id.as_deref() {
            args.extend(["--tenant-id", tenant]);
        }

        let output = run_cli(AZD_NAME, "azd", &args).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_cli_failure(AZD_NAME, &stderr, "azd auth login"));
        }
        parse_azd_output(&String::from_utf8_lossy(&output.stdout))
    }
}

async fn run_cli(credential: &'static str, program: &str, args: &[&str]) -> Result<Output, AuthError> {
    let mut command = if cfg!(windows) {
        let mut c = tokio::process::Command::new("cmd");
        c.arg("/C").arg(program);
        c
    } else {
        tokio::process::Command::new(program)
    };
    command.args(args).kill_on_drop(true);

    tracing::debug!(credential, program, "invoking developer CLI");
    match tokio::time::timeout(CLI_TIMEOUT, command.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(err)) if err.kind() == std::io::ErrorKind::NotFound => Err(AuthError::unavailable(
            credential,
            format!("'{program}' was not found on PATH"),
        )),
        Ok(Err(err)) => Err(AuthError::unavailable(credential, err.to_string())),
        Err(_) => Err(AuthError::unavailable(
            credential,
            format!("'{program}' did not respond within {}s", CLI_TIMEOUT.as_secs()),
        )),
    }
}

/// A CLI that is installed but signed out is unavailable, not failed.
fn classify_cli_failure(credential: &'static str, stderr: &str, login_hint: &str) -> AuthError {
    let lowered = stderr.to_ascii_lowercase();
    let signed_out = lowered.contains(login_hint)
        || lowered.contains("not logged in")
        || lowered.contains("not recognized as an internal or external command")
        || lowered.contains("command not found");
    if signed_out {
        AuthError::unavailable(credential, format!("please run '{login_hint}'"))
    } else {
        AuthError::failed(credential, stderr.trim().to_string())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AzTokenOutput {
    access_token: String,
    expires_on: Option<String>,
    #[serde(rename = "expires_on")]
    expires_on_epoch: Option<i64>,
}

/// Parse `az account get-access-token` JSON.
///
/// Newer CLIs emit `expires_on` (epoch seconds); older ones only the local
/// timestamp `expiresOn`.
pub fn parse_az_output(stdout: &str) -> Result<AccessToken, AuthError> {
    let raw: AzTokenOutput = serde_json::from_str(stdout.trim())?;
    let expires_on = match (raw.expires_on_epoch, raw.expires_on.as_deref()) {
        (Some(secs), _) => DateTime::<Utc>::from_timestamp(secs, 0)
            .ok_or_else(|| AuthError::InvalidResponse(format!("expires_on out of range: {secs}")))?,
        (None, Some(local)) => parse_local_timestamp(local)?,
        (None, None) => {
            return Err(AuthError::InvalidResponse(
                "Azure CLI output has no expiry".to_string(),
            ))
        }
    };
    Ok(AccessToken::new(raw.access_token, expires_on))
}

fn parse_local_timestamp(value: &str) -> Result<DateTime<Utc>, AuthError> {
    let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f")
        .map_err(|e| AuthError::InvalidResponse(format!("bad expiresOn '{value}': {e}")))?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| AuthError::InvalidResponse(format!("ambiguous expiresOn '{value}'")))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AzdTokenOutput {
    token: String,
    expires_on: DateTime<Utc>,
}

/// Parse `azd auth token --output json`.
pub fn parse_azd_output(stdout: &str) -> Result<AccessToken, AuthError> {
    let raw: AzdTokenOutput = serde_json::from_str(stdout.trim())?;
    Ok(AccessToken::new(raw.token, raw.expires_on))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn az_output_prefers_epoch_expiry() {
        let token = parse_az_output(
            r#"{
                "accessToken": "az-token",
                "expiresOn": "2023-11-14 22:13:20.000000",
                "expires_on": 1700000000,
                "subscription": "sub",
                "tenant": "tenant",
                "tokenType": "Bearer"
            }"#,
        )
        .unwrap();
        assert_eq!(token.token, "az-token");
        assert_eq!(token.expires_on.timestamp(), 1_700_000_000);
    }

    #[test]
    fn az_output_falls_back_to_local_timestamp() {
        let token = parse_az_output(
            r#"{"accessToken": "old-az", "expiresOn": "2030-01-02 03:04:05.678901"}"#,
        )
        .unwrap();
        assert_eq!(token.token, "old-az");
        let expected = Local
            .with_ymd_and_hms(2030, 1, 2, 3, 4, 5)
            .earliest()
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(token.expires_on.timestamp(), expected.timestamp());
    }

    #[test]
    fn az_output_without_expiry_is_invalid() {
        let err = parse_az_output(r#"{"accessToken": "x"}"#).unwrap_err();
        assert!(matches!(err, AuthError::InvalidResponse(_)));
    }

    #[test]
    fn azd_output_parses_rfc3339() {
        let token =
            parse_azd_output(r#"{"token": "azd-token", "expiresOn": "2030-05-06T07:08:09Z"}"#)
                .unwrap();
        assert_eq!(token.token, "azd-token");
        assert_eq!(token.expires_on.to_rfc3339(), "2030-05-06T07:08:09+00:00");
    }

    #[test]
    fn signed_out_cli_is_unavailable() {
        let err = classify_cli_failure(
            AZ_NAME,
            "ERROR: Please run 'az login' to setup account.",
            "az login",
        );
        assert!(err.is_unavailable());
    }

    #[test]
    fn other_cli_errors_fail_the_chain() {
        let err = classify_cli_failure(AZ_NAME, "ERROR: AADSTS70043: token expired", "az login");
        assert!(!err.is_unavailable());
        assert!(err.to_string().contains("AADSTS70043"));
    }
}
