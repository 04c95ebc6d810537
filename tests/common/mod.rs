//! Shared test helpers: a fixed credential and an in-memory agent service.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use agent_desk::auth::{AccessToken, AuthError, TokenCredential};
use agent_desk::client::*;
use agent_desk::error::DeskError;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::Notify;

/// Credential that always hands out the same token.
pub struct StaticCredential(pub &'static str);

#[async_trait]
impl TokenCredential for StaticCredential {
    fn name(&self) -> &'static str {
        "StaticCredential"
    }

    async fn get_token(&self, _scopes: &[&str]) -> Result<AccessToken, AuthError> {
        Ok(AccessToken::new(self.0, Utc::now() + Duration::hours(1)))
    }
}

/// Calls the fake service has seen, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateAgent(String),
    DeleteAgent(String),
    CreateThread,
    CreateMessage(String),
    Run,
    LastMessage,
    ListMessages(ListSortOrder),
}

/// How the next run ends.
#[derive(Debug, Clone)]
pub enum RunScript {
    Reply(String),
    Fail(String),
    Silent,
    /// Never reaches a terminal status.
    Hang,
}

#[derive(Default)]
struct State {
    calls: Vec<Call>,
    messages: Vec<ThreadMessage>,
    scripts: VecDeque<RunScript>,
    next_id: u64,
}

/// In-memory agent service that appends replies according to a script.
#[derive(Default)]
pub struct FakeAgentService {
    state: Mutex<State>,
    run_started: Arc<Notify>,
}

impl FakeAgentService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(self, run: RunScript) -> Self {
        self.state.lock().unwrap().scripts.push_back(run);
        self
    }

    /// Notified each time a run starts processing.
    pub fn run_started(&self) -> Arc<Notify> {
        Arc::clone(&self.run_started)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn stored_messages(&self) -> Vec<ThreadMessage> {
        self.state.lock().unwrap().messages.clone()
    }

    pub fn count(&self, wanted: fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| wanted(c)).count()
    }

    fn append(state: &mut State, role: MessageRole, text: &str) -> ThreadMessage {
        state.next_id += 1;
        let message = ThreadMessage {
            id: format!("msg_{}", state.next_id),
            thread_id: "thread_1".to_string(),
            role,
            created_at: state.next_id as i64,
            content: vec![MessageContent::Text {
                text: MessageText {
                    value: text.to_string(),
                },
            }],
            run_id: None,
        };
        state.messages.push(message.clone());
        message
    }
}

#[async_trait]
impl AgentService for FakeAgentService {
    async fn create_agent(&self, request: &CreateAgentRequest) -> Result<Agent, DeskError> {
        self.state
            .lock()
            .unwrap()
            .calls
            .push(Call::CreateAgent(request.name.clone()));
        Ok(Agent {
            id: "asst_1".to_string(),
            name: Some(request.name.clone()),
            model: request.model.clone(),
            instructions: Some(request.instructions.clone()),
            tools: request.tools.clone(),
            created_at: 0,
        })
    }

    async fn delete_agent(&self, agent_id: &str) -> Result<AgentDeletionStatus, DeskError> {
        self.state
            .lock()
            .unwrap()
            .calls
            .push(Call::DeleteAgent(agent_id.to_string()));
        Ok(AgentDeletionStatus {
            id: agent_id.to_string(),
            deleted: true,
        })
    }

    async fn create_thread(&self) -> Result<AgentThread, DeskError> {
        self.state.lock().unwrap().calls.push(Call::CreateThread);
        Ok(AgentThread {
            id: "thread_1".to_string(),
            created_at: 0,
        })
    }

    async fn create_message(
        &self,
        _thread_id: &str,
        role: MessageRole,
        content: &str,
    ) -> Result<ThreadMessage, DeskError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::CreateMessage(content.to_string()));
        Ok(Self::append(&mut state, role, content))
    }

    async fn list_messages(
        &self,
        _thread_id: &str,
        order: ListSortOrder,
    ) -> Result<Vec<ThreadMessage>, DeskError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::ListMessages(order));
        let mut messages = state.messages.clone();
        if order == ListSortOrder::Descending {
            messages.reverse();
        }
        Ok(messages)
    }

    async fn create_and_process_run(
        &self,
        thread_id: &str,
        agent_id: &str,
    ) -> Result<ThreadRun, DeskError> {
        let script = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(Call::Run);
            state.scripts.pop_front().unwrap_or(RunScript::Silent)
        };
        self.run_started.notify_one();
        if matches!(script, RunScript::Hang) {
            return std::future::pending().await;
        }

        let mut state = self.state.lock().unwrap();
        let (status, last_error) = match script {
            RunScript::Reply(text) => {
                Self::append(&mut state, MessageRole::Agent, &text);
                (RunStatus::Completed, None)
            }
            RunScript::Fail(message) => (
                RunStatus::Failed,
                Some(RunError {
                    code: "server_error".to_string(),
                    message,
                }),
            ),
            RunScript::Silent | RunScript::Hang => (RunStatus::Completed, None),
        };
        Ok(ThreadRun {
            id: format!("run_{}", state.next_id),
            thread_id: thread_id.to_string(),
            assistant_id: agent_id.to_string(),
            status,
            last_error,
            required_action: None,
        })
    }

    async fn last_message_text_by_role(
        &self,
        _thread_id: &str,
        role: MessageRole,
    ) -> Result<Option<String>, DeskError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::LastMessage);
        Ok(state
            .messages
            .iter()
            .rev()
            .find(|m| m.role == role)
            .and_then(|m| m.last_text())
            .map(str::to_string))
    }
}
