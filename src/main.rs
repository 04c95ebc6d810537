//! agent-desk binary entry point.

use std::sync::Arc;

use agent_desk::auth::{CredentialOptions, DefaultCredential};
use agent_desk::cli::Cli;
use agent_desk::client::AgentsClient;
use agent_desk::error::DeskError;
use agent_desk::session::{AgentSettings, ChatSession};
use agent_desk::tools::support;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_logging();
    let cli = Cli::parse_args();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        eprintln!("Hint: {}", e.recovery_suggestion().hint());
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), DeskError> {
    let config = cli.resolve_config()?;
    tracing::debug!(?config, "configuration loaded");

    let credential = Arc::new(DefaultCredential::new(CredentialOptions::interactive_only()));

    let toolset = support::toolset(&config.ticket_dir);
    let settings = AgentSettings::builder()
        .model(config.model_deployment.clone())
        .tools(toolset.definitions())
        .build();

    let mut client = AgentsClient::from_config(&config, credential)?;
    client.enable_auto_function_calls(toolset);

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    let client = ChatSession::new(client, settings)
        .run(stdin, &mut stdout, tokio::signal::ctrl_c())
        .await?;
    client.close();
    Ok(())
}
