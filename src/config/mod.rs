//! Session configuration (layered: CLI flags > env > `.env` file).
//!
//! The configuration is read once at startup into a [`DeskConfig`] and passed
//! by value into the client and the chat session. Nothing reads the process
//! environment after that.

use std::path::PathBuf;
use std::time::Duration;

use bon::Builder;

use crate::error::DeskError;

/// Agents REST API version sent with every request.
pub const DEFAULT_API_VERSION: &str = "v1";

/// Delay between run status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

pub const ENV_PROJECT_ENDPOINT: &str = "PROJECT_ENDPOINT";
pub const ENV_MODEL_DEPLOYMENT: &str = "MODEL_DEPLOYMENT_NAME";
pub const ENV_TICKET_DIR: &str = "TICKET_DIR";
pub const ENV_API_VERSION: &str = "AGENT_API_VERSION";
pub const ENV_POLL_INTERVAL_MS: &str = "AGENT_POLL_INTERVAL_MS";

/// Everything the session needs to talk to the agent service.
#[derive(Debug, Clone, Builder, PartialEq)]
pub struct DeskConfig {
    /// Project endpoint, e.g. `https://<resource>.services.ai.azure.com/api/projects/<project>`.
    #[builder(into)]
    pub endpoint: String,
    /// Model deployment the agent is bound to.
    #[builder(into)]
    pub model_deployment: String,
    #[builder(into, default = DEFAULT_API_VERSION.to_string())]
    pub api_version: String,
    #[builder(default = DEFAULT_POLL_INTERVAL)]
    pub poll_interval: Duration,
    /// Where the support-ticket tool writes its files.
    #[builder(into, default = PathBuf::from("."))]
    pub ticket_dir: PathBuf,
}

impl DeskConfig {
    /// Load from the process environment, after reading `.env` if present.
    pub fn from_env() -> Result<Self, DeskError> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary variable source.
    ///
    /// `PROJECT_ENDPOINT` and `MODEL_DEPLOYMENT_NAME` are required; blank
    /// values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DeskError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let endpoint = get(ENV_PROJECT_ENDPOINT).ok_or_else(|| missing(ENV_PROJECT_ENDPOINT))?;
        let model_deployment =
            get(ENV_MODEL_DEPLOYMENT).ok_or_else(|| missing(ENV_MODEL_DEPLOYMENT))?;

        let poll_interval = match get(ENV_POLL_INTERVAL_MS) {
            Some(raw) => parse_poll_interval(&raw)?,
            None => DEFAULT_POLL_INTERVAL,
        };

        Ok(Self::builder()
            .endpoint(endpoint)
            .model_deployment(model_deployment)
            .api_version(get(ENV_API_VERSION).unwrap_or_else(|| DEFAULT_API_VERSION.to_string()))
            .poll_interval(poll_interval)
            .ticket_dir(get(ENV_TICKET_DIR).map(PathBuf::from).unwrap_or_else(|| PathBuf::from(".")))
            .build())
    }
}

/// Parse a poll interval given in milliseconds.
pub fn parse_poll_interval(raw: &str) -> Result<Duration, DeskError> {
    let millis: u64 = raw.trim().parse().map_err(|_| {
        DeskError::Configuration(format!(
            "{ENV_POLL_INTERVAL_MS} must be a whole number of milliseconds, got '{raw}'"
        ))
    })?;
    poll_interval_from_millis(millis)
}

/// A zero interval would poll the service in a tight loop.
pub fn poll_interval_from_millis(millis: u64) -> Result<Duration, DeskError> {
    if millis == 0 {
        return Err(DeskError::Configuration(format!(
            "{ENV_POLL_INTERVAL_MS} must be at least 1 millisecond"
        )));
    }
    Ok(Duration::from_millis(millis))
}

fn missing(key: &str) -> DeskError {
    DeskError::Configuration(format!("{key} is not set"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn required_values_load_with_defaults() {
        let config = DeskConfig::from_lookup(lookup(&[
            (ENV_PROJECT_ENDPOINT, "https://example.services.ai.azure.com/api/projects/p1"),
            (ENV_MODEL_DEPLOYMENT, "gpt-4o"),
        ]))
        .unwrap();

        assert_eq!(config.endpoint, "https://example.services.ai.azure.com/api/projects/p1");
        assert_eq!(config.model_deployment, "gpt-4o");
        assert_eq!(config.api_version, DEFAULT_API_VERSION);
        assert_eq!(config.poll_interval, DEFAULT_POLL_INTERVAL);
        assert_eq!(config.ticket_dir, PathBuf::from("."));
    }

    #[test]
    fn missing_endpoint_is_configuration_error() {
        let err = DeskConfig::from_lookup(lookup(&[(ENV_MODEL_DEPLOYMENT, "gpt-4o")])).unwrap_err();
        assert!(matches!(err, DeskError::Configuration(ref m) if m.contains(ENV_PROJECT_ENDPOINT)));
    }

    #[test]
    fn blank_model_deployment_counts_as_missing() {
        let err = DeskConfig::from_lookup(lookup(&[
            (ENV_PROJECT_ENDPOINT, "https://example"),
            (ENV_MODEL_DEPLOYMENT, "   "),
        ]))
        .unwrap_err();
        assert!(matches!(err, DeskError::Configuration(ref m) if m.contains(ENV_MODEL_DEPLOYMENT)));
    }

    #[test]
    fn optional_values_override_defaults() {
        let config = DeskConfig::from_lookup(lookup(&[
            (ENV_PROJECT_ENDPOINT, "https://example"),
            (ENV_MODEL_DEPLOYMENT, "gpt-4o-mini"),
            (ENV_API_VERSION, "2025-05-15-preview"),
            (ENV_POLL_INTERVAL_MS, "250"),
            (ENV_TICKET_DIR, "/tmp/tickets"),
        ]))
        .unwrap();

        assert_eq!(config.api_version, "2025-05-15-preview");
        assert_eq!(config.poll_interval, Duration::from_millis(250));
        assert_eq!(config.ticket_dir, PathBuf::from("/tmp/tickets"));
    }

    #[test]
    fn non_numeric_poll_interval_is_rejected() {
        let err = DeskConfig::from_lookup(lookup(&[
            (ENV_PROJECT_ENDPOINT, "https://example"),
            (ENV_MODEL_DEPLOYMENT, "gpt-4o"),
            (ENV_POLL_INTERVAL_MS, "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, DeskError::Configuration(_)));
    }
    #[test]
    fn zero_poll_interval_is_rejected() {
        let err = DeskConfig::from_lookup(lookup(&[
            (ENV_PROJECT_ENDPOINT, "https://example"),
            (ENV_MODEL_DEPLOYMENT, "gpt-4o"),
            (ENV_POLL_INTERVAL_MS, "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, DeskError::Configuration(ref m) if m.contains(ENV_POLL_INTERVAL_MS)));
        assert_eq!(poll_interval_from_millis(1).unwrap(), Duration::from_millis(1));
    }
}
