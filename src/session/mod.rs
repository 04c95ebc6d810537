//! Console chat session against a remote agent.
//!
//! A [`ChatSession`] creates an agent and a thread, relays console prompts
//! to the thread, prints each run's reply, and on exit prints the whole
//! conversation and deletes the agent. Tool calls never surface here; the
//! service client answers them while it processes a run.

use std::future::Future;
use std::io::Write;

use bon::Builder;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::client::{
    Agent, AgentService, AgentThread, CreateAgentRequest, ListSortOrder, MessageRole, RunStatus,
    ThreadMessage,
};
use crate::error::DeskError;
use crate::tools::ToolDefinition;

pub const AGENT_NAME: &str = "support-agent";

pub const AGENT_INSTRUCTIONS: &str = "You are a technical support agent.\n\
When a user has a technical issue, you collect their email and problem description.\n\
Then call the function to submit a support ticket.\n\
If a file is saved, tell the user the file name.";

/// Typing this (any case) ends the conversation.
pub const EXIT_COMMAND: &str = "quit";

const INPUT_PROMPT: &str = "Enter a prompt (or type 'quit' to exit): ";
const BLANK_PROMPT_NOTICE: &str = "Please enter a prompt.";

/// Definition of the agent a session creates.
#[derive(Debug, Clone, Builder, PartialEq)]
pub struct AgentSettings {
    #[builder(into, default = AGENT_NAME.to_string())]
    pub name: String,
    #[builder(into, default = AGENT_INSTRUCTIONS.to_string())]
    pub instructions: String,
    #[builder(into)]
    pub model: String,
    #[builder(default)]
    pub tools: Vec<ToolDefinition>,
}

impl AgentSettings {
    fn create_request(&self) -> CreateAgentRequest {
        CreateAgentRequest {
            model: self.model.clone(),
            name: self.name.clone(),
            instructions: self.instructions.clone(),
            tools: self.tools.clone(),
        }
    }
}

/// What a line of console input asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt<'a> {
    Quit,
    Blank,
    Text(&'a str),
}

impl<'a> Prompt<'a> {
    /// Classify a line as read from the console, terminator included.
    pub fn classify(line: &'a str) -> Self {
        let text = line.trim_end_matches(&['\n', '\r'][..]);
        if text.eq_ignore_ascii_case(EXIT_COMMAND) {
            Prompt::Quit
        } else if text.trim().is_empty() {
            Prompt::Blank
        } else {
            Prompt::Text(text)
        }
    }
}

/// Result of one prompt sent to the agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The run finished; carries the latest agent reply, if any.
    Replied(Option<String>),
    /// The run failed with this detail.
    Failed(String),
}

/// Drives one conversation with a freshly created agent.
pub struct ChatSession<S> {
    service: S,
    settings: AgentSettings,
    agent: Option<Agent>,
    thread: Option<AgentThread>,
}

impl<S: AgentService> ChatSession<S> {
    pub fn new(service: S, settings: AgentSettings) -> Self {
        Self {
            service,
            settings,
            agent: None,
            thread: None,
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn into_service(self) -> S {
        self.service
    }

    pub fn agent(&self) -> Option<&Agent> {
        self.agent.as_ref()
    }

    pub fn thread(&self) -> Option<&AgentThread> {
        self.thread.as_ref()
    }

    /// Create the agent and the thread, then greet.
    pub async fn start<W: Write>(&mut self, out: &mut W) -> Result<(), DeskError> {
        let agent = self
            .service
            .create_agent(&self.settings.create_request())
            .await?;
        let thread = self.service.create_thread().await?;
        tracing::info!(agent_id = %agent.id, thread_id = %thread.id, "session started");

        writeln!(out, "You're chatting with: {} ({})\n", agent.display_name(), agent.id)?;
        self.agent = Some(agent);
        self.thread = Some(thread);
        Ok(())
    }

    /// Send one prompt and wait for the agent's answer.
    pub async fn send_prompt(&mut self, prompt: &str) -> Result<TurnOutcome, DeskError> {
        let (agent_id, thread_id) = self.ids()?;

        self.service
            .create_message(&thread_id, MessageRole::User, prompt)
            .await?;
        let run = self
            .service
            .create_and_process_run(&thread_id, &agent_id)
            .await?;

        if run.status == RunStatus::Failed {
            tracing::warn!(run_id = %run.id, error = %run.error_detail(), "run failed");
            return Ok(TurnOutcome::Failed(run.error_detail()));
        }

        let reply = self
            .service
            .last_message_text_by_role(&thread_id, MessageRole::Agent)
            .await?;
        Ok(TurnOutcome::Replied(reply))
    }

    /// Read prompts until `quit` or end of input.
    pub async fn converse<R, W>(&mut self, input: R, out: &mut W) -> Result<(), DeskError>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        self.converse_until(input, out, std::future::pending::<()>())
            .await
    }

    /// Like [`converse`](Self::converse), but also stops when `interrupt`
    /// completes, either while waiting for input or while a run is being
    /// processed. An interrupted turn is abandoned.
    pub async fn converse_until<R, W, F>(
        &mut self,
        mut input: R,
        out: &mut W,
        interrupt: F,
    ) -> Result<(), DeskError>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
        F: Future,
    {
        tokio::pin!(interrupt);
        let mut line = String::new();
        loop {
            write!(out, "{INPUT_PROMPT}")?;
            out.flush()?;

            line.clear();
            let read = tokio::select! {
                read = input.read_line(&mut line) => read?,
                _ = &mut interrupt => {
                    writeln!(out)?;
                    tracing::info!("interrupted; ending conversation");
                    break;
                }
            };
            if read == 0 {
                writeln!(out)?;
                break;
            }

            match Prompt::classify(&line) {
                Prompt::Quit => break,
                Prompt::Blank => writeln!(out, "{BLANK_PROMPT_NOTICE}")?,
                Prompt::Text(text) => {
                    let outcome = tokio::select! {
                        outcome = self.send_prompt(text) => outcome?,
                        _ = &mut interrupt => {
                            writeln!(out)?;
                            tracing::info!("interrupted while waiting on a run; ending conversation");
                            break;
                        }
                    };
                    match outcome {
                        TurnOutcome::Failed(detail) => writeln!(out, "Run failed: {detail}")?,
                        TurnOutcome::Replied(Some(reply)) => writeln!(out, "\nAgent: {reply} \n")?,
                        TurnOutcome::Replied(None) => {}
                    }
                }
            }
        }
        Ok(())
    }

    /// Print the conversation log and delete the agent.
    ///
    /// Returns the messages that were printed, oldest first.
    pub async fn shutdown<W: Write>(&mut self, out: &mut W) -> Result<Vec<ThreadMessage>, DeskError> {
        let (agent_id, thread_id) = self.ids()?;

        writeln!(out, "\nConversation Log:\n")?;
        let messages = self
            .service
            .list_messages(&thread_id, ListSortOrder::Ascending)
            .await?;
        let mut printed = Vec::with_capacity(messages.len());
        for message in messages {
            if let Some(text) = message.last_text() {
                writeln!(out, "{}: {}\n", message.role, text)?;
                printed.push(message);
            }
        }

        self.service.delete_agent(&agent_id).await?;
        self.agent = None;
        writeln!(out, "Deleted agent")?;
        Ok(printed)
    }

    /// Whole lifecycle: start, converse until quit or `interrupt`, shut down.
    pub async fn run<R, W, F>(mut self, input: R, out: &mut W, interrupt: F) -> Result<S, DeskError>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
        F: Future,
    {
        self.start(out).await?;
        self.converse_until(input, out, interrupt).await?;
        self.shutdown(out).await?;
        Ok(self.service)
    }

    fn ids(&self) -> Result<(String, String), DeskError> {
        match (&self.agent, &self.thread) {
            (Some(agent), Some(thread)) => Ok((agent.id.clone(), thread.id.clone())),
            _ => Err(DeskError::InvalidState(
                "session has not been started".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quit_matches_in_any_case() {
        assert_eq!(Prompt::classify("quit\n"), Prompt::Quit);
        assert_eq!(Prompt::classify("QUIT\r\n"), Prompt::Quit);
        assert_eq!(Prompt::classify("QuIt"), Prompt::Quit);
    }

    #[test]
    fn quit_with_other_text_is_a_prompt() {
        assert_eq!(Prompt::classify("quit now\n"), Prompt::Text("quit now"));
    }

    #[test]
    fn whitespace_only_is_blank() {
        assert_eq!(Prompt::classify("   \n"), Prompt::Blank);
        assert_eq!(Prompt::classify("\t\r\n"), Prompt::Blank);
        assert_eq!(Prompt::classify(""), Prompt::Blank);
    }

    #[test]
    fn prompt_text_keeps_inner_spacing() {
        assert_eq!(Prompt::classify("  Hello there\n"), Prompt::Text("  Hello there"));
    }

    #[test]
    fn settings_default_to_support_agent() {
        let settings = AgentSettings::builder().model("gpt-4o").build();
        let request = settings.create_request();

        assert_eq!(request.name, AGENT_NAME);
        assert!(request.instructions.starts_with("You are a technical support agent."));
        assert!(request.instructions.contains("tell the user the file name"));
        assert_eq!(request.model, "gpt-4o");
        assert!(request.tools.is_empty());
    }
}
