//! Client for the hosted agents REST API.
//!
//! [`AgentsClient`] covers the calls a chat session makes: agents, threads,
//! messages and runs. [`AgentsClient::create_and_process_run`] polls a run to
//! a terminal status and, once [`AgentsClient::enable_auto_function_calls`]
//! has attached a toolset, answers the run's tool calls on the way.
//!
//! ```no_run
//! use std::sync::Arc;
//! use agent_desk::auth::{CredentialOptions, DefaultCredential};
//! use agent_desk::client::{AgentService, AgentsClient};
//!
//! # async fn example() -> agent_desk::error::Result<()> {
//! let credential = Arc::new(DefaultCredential::new(CredentialOptions::interactive_only()));
//! let client = AgentsClient::new("https://res.services.ai.azure.com/api/projects/demo", credential)?;
//! let thread = client.create_thread().await?;
//! println!("{}", thread.id);
//! # Ok(())
//! # }
//! ```

pub mod http;
pub mod types;

pub use types::*;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::auth::{TokenCredential, AGENT_SERVICE_SCOPE};
use crate::config::{DeskConfig, DEFAULT_API_VERSION, DEFAULT_POLL_INTERVAL};
use crate::error::DeskError;
use crate::tools::{FunctionToolSet, ToolExecutionContext};

/// Page size used when walking message listings.
const PAGE_LIMIT: u32 = 100;

/// Operations a chat session needs from the agent service.
#[async_trait]
pub trait AgentService: Send + Sync {
    async fn create_agent(&self, request: &CreateAgentRequest) -> Result<Agent, DeskError>;

    async fn delete_agent(&self, agent_id: &str) -> Result<AgentDeletionStatus, DeskError>;

    async fn create_thread(&self) -> Result<AgentThread, DeskError>;

    async fn create_message(
        &self,
        thread_id: &str,
        role: MessageRole,
        content: &str,
    ) -> Result<ThreadMessage, DeskError>;

    /// Every message of the thread in the given order.
    async fn list_messages(
        &self,
        thread_id: &str,
        order: ListSortOrder,
    ) -> Result<Vec<ThreadMessage>, DeskError>;

    /// Start a run and wait for it to reach a terminal status.
    async fn create_and_process_run(
        &self,
        thread_id: &str,
        agent_id: &str,
    ) -> Result<ThreadRun, DeskError>;

    /// Last text of the newest message written by `role`.
    async fn last_message_text_by_role(
        &self,
        thread_id: &str,
        role: MessageRole,
    ) -> Result<Option<String>, DeskError> {
        let messages = self.list_messages(thread_id, ListSortOrder::Descending).await?;
        Ok(messages
            .iter()
            .find(|m| m.role == role)
            .and_then(|m| m.last_text())
            .map(str::to_string))
    }
}

/// REST client for one agent-service project endpoint.
pub struct AgentsClient {
    http: reqwest::Client,
    endpoint: String,
    api_version: String,
    credential: Arc<dyn TokenCredential>,
    poll_interval: Duration,
    toolset: Option<FunctionToolSet>,
}

impl AgentsClient {
    pub fn new(
        endpoint: impl Into<String>,
        credential: Arc<dyn TokenCredential>,
    ) -> Result<Self, DeskError> {
        Ok(Self {
            http: http::build_client()?,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            credential,
            poll_interval: DEFAULT_POLL_INTERVAL,
            toolset: None,
        })
    }

    /// Client for the endpoint, API version and poll interval in `config`.
    pub fn from_config(
        config: &DeskConfig,
        credential: Arc<dyn TokenCredential>,
    ) -> Result<Self, DeskError> {
        Ok(Self::new(config.endpoint.clone(), credential)?
            .with_api_version(config.api_version.clone())
            .with_poll_interval(config.poll_interval))
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Answer tool calls from `toolset` while processing runs.
    ///
    /// Without a toolset, a run that asks for tool output is cancelled.
    pub fn enable_auto_function_calls(&mut self, toolset: FunctionToolSet) {
        tracing::debug!(?toolset, "automatic function calls enabled");
        self.toolset = Some(toolset);
    }

    pub fn auto_function_calls_enabled(&self) -> bool {
        self.toolset.is_some()
    }

    /// Consume and drop the client, releasing its connection pool.
    ///
    /// Dropping the client has the same effect; this makes the end of a
    /// session explicit at the call site.
    pub fn close(self) {
        tracing::debug!(endpoint = %self.endpoint, "closing agents client");
    }

    pub async fn create_run(&self, thread_id: &str, agent_id: &str) -> Result<ThreadRun, DeskError> {
        let body = CreateRunRequest {
            assistant_id: agent_id.to_string(),
        };
        self.post(&format!("threads/{thread_id}/runs"), &body).await
    }

    pub async fn get_run(&self, thread_id: &str, run_id: &str) -> Result<ThreadRun, DeskError> {
        self.get(&format!("threads/{thread_id}/runs/{run_id}"), &[])
            .await
    }

    pub async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        tool_outputs: Vec<ToolOutput>,
    ) -> Result<ThreadRun, DeskError> {
        let body = SubmitToolOutputsRequest { tool_outputs };
        self.post(
            &format!("threads/{thread_id}/runs/{run_id}/submit_tool_outputs"),
            &body,
        )
        .await
    }

    pub async fn cancel_run(&self, thread_id: &str, run_id: &str) -> Result<ThreadRun, DeskError> {
        self.post(
            &format!("threads/{thread_id}/runs/{run_id}/cancel"),
            &serde_json::json!({}),
        )
        .await
    }

    /// Fetch one page of messages.
    pub async fn list_messages_page(
        &self,
        thread_id: &str,
        order: ListSortOrder,
        limit: u32,
        after: Option<&str>,
    ) -> Result<MessageList, DeskError> {
        let mut query = vec![("order", order.to_string()), ("limit", limit.to_string())];
        if let Some(after) = after {
            query.push(("after", after.to_string()));
        }
        self.get(&format!("threads/{thread_id}/messages"), &query)
            .await
    }

    /// Run every call in `calls` against the attached toolset.
    ///
    /// Failures become `{"error": ...}` outputs so the model can react.
    async fn execute_tool_calls(
        &self,
        toolset: &FunctionToolSet,
        run_id: &str,
        calls: &[RequiredToolCall],
    ) -> Vec<ToolOutput> {
        let mut outputs = Vec::with_capacity(calls.len());
        for call in calls {
            let RequiredToolCall::Function { id, function } = call else {
                tracing::warn!(run_id, "skipping unsupported tool call type");
                continue;
            };
            let ctx = ToolExecutionContext {
                run_id: run_id.to_string(),
                call_id: id.clone(),
            };
            let output = match toolset.execute(&function.name, &function.arguments, &ctx).await {
                Ok(serde_json::Value::String(text)) => text,
                Ok(value) => value.to_string(),
                Err(err) => {
                    tracing::warn!(tool = %function.name, error = %err, "tool call failed");
                    serde_json::json!({ "error": err.to_string() }).to_string()
                }
            };
            outputs.push(ToolOutput {
                tool_call_id: id.clone(),
                output,
            });
        }
        outputs
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path)
    }

    async fn authorized(&self, method: Method, path: &str) -> Result<RequestBuilder, DeskError> {
        let token = self.credential.get_token(&[AGENT_SERVICE_SCOPE]).await?;
        Ok(self
            .http
            .request(method, self.url(path))
            .headers(http::bearer_headers(&token.token)?)
            .query(&[("api-version", self.api_version.as_str())]))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, DeskError> {
        let request = self.authorized(Method::GET, path).await?.query(query);
        self.send(request, path).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, DeskError> {
        let request = self.authorized(Method::POST, path).await?.json(body);
        self.send(request, path).await
    }

    async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, DeskError> {
        let request = self.authorized(Method::DELETE, path).await?;
        self.send(request, path).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        path: &str,
    ) -> Result<T, DeskError> {
        let resp = request.send().await?;
        let status = resp.status();
        tracing::debug!(path, status = status.as_u16(), "agent service response");
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(http::status_to_error(status.as_u16(), &body));
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl AgentService for AgentsClient {
    async fn create_agent(&self, request: &CreateAgentRequest) -> Result<Agent, DeskError> {
        let agent: Agent = self.post("assistants", request).await?;
        tracing::info!(agent_id = %agent.id, name = %agent.display_name(), "created agent");
        Ok(agent)
    }

    async fn delete_agent(&self, agent_id: &str) -> Result<AgentDeletionStatus, DeskError> {
        let status: AgentDeletionStatus = self.delete(&format!("assistants/{agent_id}")).await?;
        tracing::info!(agent_id, deleted = status.deleted, "deleted agent");
        Ok(status)
    }

    async fn create_thread(&self) -> Result<AgentThread, DeskError> {
        self.post("threads", &serde_json::json!({})).await
    }

    async fn create_message(
        &self,
        thread_id: &str,
        role: MessageRole,
        content: &str,
    ) -> Result<ThreadMessage, DeskError> {
        let body = CreateMessageRequest {
            role,
            content: content.to_string(),
        };
        self.post(&format!("threads/{thread_id}/messages"), &body)
            .await
    }

    async fn list_messages(
        &self,
        thread_id: &str,
        order: ListSortOrder,
    ) -> Result<Vec<ThreadMessage>, DeskError> {
        let mut messages = Vec::new();
        let mut after: Option<String> = None;
        loop {
            let page = self
                .list_messages_page(thread_id, order, PAGE_LIMIT, after.as_deref())
                .await?;
            messages.extend(page.data);
            match (page.has_more, page.last_id) {
                (true, Some(last_id)) => after = Some(last_id),
                _ => break,
            }
        }
        Ok(messages)
    }

    async fn create_and_process_run(
        &self,
        thread_id: &str,
        agent_id: &str,
    ) -> Result<ThreadRun, DeskError> {
        let mut run = self.create_run(thread_id, agent_id).await?;
        tracing::debug!(run_id = %run.id, status = %run.status, "run created");

        while !run.status.is_terminal() {
            tokio::time::sleep(self.poll_interval).await;
            run = self.get_run(thread_id, &run.id).await?;
            tracing::debug!(run_id = %run.id, status = %run.status, "run polled");

            if run.status != RunStatus::RequiresAction {
                continue;
            }
            let calls = match (&run.required_action, &self.toolset) {
                (Some(RequiredAction::SubmitToolOutputs { submit_tool_outputs }), Some(toolset)) => {
                    Some((toolset, submit_tool_outputs.tool_calls.as_slice()))
                }
                _ => None,
            };
            let outputs = match calls {
                Some((toolset, calls)) => self.execute_tool_calls(toolset, &run.id, calls).await,
                None => Vec::new(),
            };
            run = if outputs.is_empty() {
                tracing::warn!(run_id = %run.id, "run requires an action that cannot be answered; cancelling");
                self.cancel_run(thread_id, &run.id).await?
            } else {
                self.submit_tool_outputs(thread_id, &run.id, outputs).await?
            };
        }

        tracing::info!(run_id = %run.id, status = %run.status, "run finished");
        Ok(run)
    }

    async fn last_message_text_by_role(
        &self,
        thread_id: &str,
        role: MessageRole,
    ) -> Result<Option<String>, DeskError> {
        let mut after: Option<String> = None;
        loop {
            let page = self
                .list_messages_page(thread_id, ListSortOrder::Descending, PAGE_LIMIT, after.as_deref())
                .await?;
            if let Some(message) = page.data.iter().find(|m| m.role == role) {
                return Ok(message.last_text().map(str::to_string));
            }
            match (page.has_more, page.last_id) {
                (true, Some(last_id)) => after = Some(last_id),
                _ => return Ok(None),
            }
        }
    }
}

impl std::fmt::Debug for AgentsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentsClient")
            .field("endpoint", &self.endpoint)
            .field("api_version", &self.api_version)
            .field("poll_interval", &self.poll_interval)
            .field("toolset", &self.toolset)
            .finish()
    }
}
