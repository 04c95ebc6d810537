//! Command-line flags for the `agent-desk` binary.

use std::path::PathBuf;
use clap::Parser;

use crate::config::{poll_interval_from_millis, DeskConfig};
use crate::error::DeskError;

/// Chat with a hosted support agent that can file tickets locally.
///
/// Values not given as flags come from the environment (or `.env`):
/// PROJECT_ENDPOINT, MODEL_DEPLOYMENT_NAME, TICKET_DIR, AGENT_API_VERSION,
/// AGENT_POLL_INTERVAL_MS.
#[derive(Parser, Debug, Default, PartialEq)]
#[command(name = "agent-desk", version, about = "Chat with a hosted support agent")]
pub struct Cli {
    /// Agent service project endpoint
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Model deployment name
    #[arg(short, long)]
    pub model: Option<String>,

    /// Directory for support-ticket files
    #[arg(long)]
    pub ticket_dir: Option<PathBuf>,

    /// Agents API version
    #[arg(long)]
    pub api_version: Option<String>,

    /// Delay between run status polls, in milliseconds
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,
}

impl Cli {
    /// Parse CLI arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Resolve configuration: flags win over the environment.
    pub fn resolve_config(&self) -> Result<DeskConfig, DeskError> {
        let _ = dotenvy::dotenv();
        self.resolve_with(|key| std::env::var(key).ok())
    }

    /// Resolve against an explicit variable source.
    pub fn resolve_with<F>(&self, lookup: F) -> Result<DeskConfig, DeskError>
    where
        F: Fn(&str) -> Option<String>,
    {
        use crate::config::{ENV_MODEL_DEPLOYMENT, ENV_PROJECT_ENDPOINT};

        let config = DeskConfig::from_lookup(|key| match key {
            ENV_PROJECT_ENDPOINT if self.endpoint.is_some() => self.endpoint.clone(),
            ENV_MODEL_DEPLOYMENT if self.model.is_some() => self.model.clone(),
            _ => lookup(key),
        })?;
        self.apply(config)
    }

    fn apply(&self, mut config: DeskConfig) -> Result<DeskConfig, DeskError> {
        if let Some(dir) = &self.ticket_dir {
            config.ticket_dir = dir.clone();
        }
        if let Some(version) = &self.api_version {
            config.api_version = version.clone();
        }
        if let Some(ms) = self.poll_interval_ms {
            config.poll_interval = poll_interval_from_millis(ms)?;
        }
        Ok(config)
    }
}
