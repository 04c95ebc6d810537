//! agent-desk: console support desk on a hosted agent service.
//!
//! Creates a remote agent bound to local tool functions, relays console
//! prompts to it, and prints its replies. The agent can file support tickets
//! on the local disk through [`tools::support`].
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use agent_desk::prelude::*;
//!
//! # async fn example() -> agent_desk::error::Result<()> {
//! let config = DeskConfig::from_env()?;
//! let credential = Arc::new(DefaultCredential::new(CredentialOptions::interactive_only()));
//!
//! let toolset = agent_desk::tools::support::toolset(&config.ticket_dir);
//! let settings = AgentSettings::builder()
//!     .model(config.model_deployment.clone())
//!     .tools(toolset.definitions())
//!     .build();
//!
//! let mut client = AgentsClient::from_config(&config, credential)?;
//! client.enable_auto_function_calls(toolset);
//!
//! let stdin = tokio::io::BufReader::new(tokio::io::stdin());
//! let client = ChatSession::new(client, settings)
//!     .run(stdin, &mut std::io::stdout(), tokio::signal::ctrl_c())
//!     .await?;
//! client.close();
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod prelude;
pub mod session;
pub mod tools;

#[cfg(feature = "cli")]
pub mod cli;
