//! Convenience re-exports.

pub use crate::auth::{AccessToken, CredentialOptions, DefaultCredential, TokenCredential};
pub use crate::client::{AgentService, AgentsClient, MessageRole, RunStatus, ThreadRun};
pub use crate::config::DeskConfig;
pub use crate::error::{DeskError, Result};
pub use crate::session::{AgentSettings, ChatSession, TurnOutcome};
pub use crate::tools::{AgentTool, AgentToolParameters, FunctionToolSet, Tool};
