//! Support-desk functions exposed to the agent.
//!
//! ```rust,no_run
//! use agent_desk::tools::support;
//!
//! let tools = support::toolset("./tickets");
//! assert_eq!(tools.len(), 1);
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::json;

use crate::error::DeskError;
use crate::tools::tool::{AgentTool, Tool, ToolExecutionContext};
use crate::tools::toolset::FunctionToolSet;
use crate::tools::types::AgentToolParameters;

pub const SUBMIT_SUPPORT_TICKET: &str = "submit_support_ticket";

/// A ticket written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedTicket {
    pub number: String,
    pub file_name: String,
    pub path: PathBuf,
}

/// Every function the support agent may call.
pub fn toolset(ticket_dir: impl Into<PathBuf>) -> FunctionToolSet {
    FunctionToolSet::new().with(submit_support_ticket_tool(ticket_dir))
}

/// Create the `submit_support_ticket` tool.
///
/// Writes `ticket-<number>.txt` into `ticket_dir` and answers with a message
/// naming the file, which the agent relays to the user.
pub fn submit_support_ticket_tool(ticket_dir: impl Into<PathBuf>) -> Arc<dyn Tool> {
    let ticket_dir = ticket_dir.into();
    Arc::new(AgentTool::new(
        SUBMIT_SUPPORT_TICKET,
        "Submit a technical support ticket for the user and save it as a text file",
        AgentToolParameters::object()
            .string("email_address", "The user's email address", true)
            .string("description", "A description of the technical issue", true)
            .build(),
        move |args, _ctx: ToolExecutionContext| {
            let ticket_dir = ticket_dir.clone();
            async move {
                let email = args.get_str("email_address")?;
                let description = args.get_str("description")?;
                let ticket = submit_support_ticket(&ticket_dir, email, description).await?;
                Ok::<_, DeskError>(json!({
                    "message": format!(
                        "Support ticket {} submitted. The ticket file is saved as {}",
                        ticket.number, ticket.file_name
                    )
                }))
            }
        },
    ))
}

/// Write a support ticket file and return where it went.
pub async fn submit_support_ticket(
    ticket_dir: &Path,
    email_address: &str,
    description: &str,
) -> Result<SubmittedTicket, DeskError> {
    let number = ticket_number();
    let file_name = format!("ticket-{number}.txt");
    let path = ticket_dir.join(&file_name);
    let text = format!(
        "Support ticket: {number}\nSubmitted by: {email_address}\nDescription:\n{description}"
    );

    let written = async {
        tokio::fs::create_dir_all(ticket_dir).await?;
        tokio::fs::write(&path, text).await
    };
    written.await.map_err(|e: std::io::Error| DeskError::ToolExecution {
        tool_name: SUBMIT_SUPPORT_TICKET.into(),
        message: format!("{}: {e}", path.display()),
    })?;

    tracing::info!(ticket = %number, path = %path.display(), "support ticket saved");
    Ok(SubmittedTicket {
        number,
        file_name,
        path,
    })
}

/// Six hex characters taken from a fresh v4 UUID.
fn ticket_number() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..6].to_string()
}
