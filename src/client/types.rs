//! Wire types for the agents REST API.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::tools::ToolDefinition;

/// Agent definition as stored by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub tools: Vec<ToolDefinition>,
    #[serde(default)]
    pub created_at: i64,
}

impl Agent {
    /// Display name, falling back to the id for unnamed agents.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// Body of a create-agent request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateAgentRequest {
    pub model: String,
    pub name: String,
    pub instructions: String,
    pub tools: Vec<ToolDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDeletionStatus {
    pub id: String,
    pub deleted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentThread {
    pub id: String,
    #[serde(default)]
    pub created_at: i64,
}

/// Author of a thread message. The service calls the agent side `assistant`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MessageRole {
    User,
    #[serde(rename = "assistant")]
    #[strum(serialize = "assistant")]
    Agent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
pub enum ListSortOrder {
    #[serde(rename = "asc")]
    #[strum(serialize = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    #[strum(serialize = "desc")]
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageText {
    pub value: String,
}

/// One content item of a message. Only text is read; images and other kinds
/// are kept opaque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    Text { text: MessageText },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadMessage {
    pub id: String,
    #[serde(default)]
    pub thread_id: String,
    pub role: MessageRole,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub content: Vec<MessageContent>,
    #[serde(default)]
    pub run_id: Option<String>,
}

impl ThreadMessage {
    /// Text items of this message, in order.
    pub fn text_messages(&self) -> Vec<&MessageText> {
        self.content
            .iter()
            .filter_map(|c| match c {
                MessageContent::Text { text } => Some(text),
                MessageContent::Other => None,
            })
            .collect()
    }

    /// The final text item, which is what the conversation log shows.
    pub fn last_text(&self) -> Option<&str> {
        self.text_messages().last().map(|t| t.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateMessageRequest {
    pub role: MessageRole,
    pub content: String,
}

/// One page of a message listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageList {
    pub data: Vec<ThreadMessage>,
    #[serde(default)]
    pub first_id: Option<String>,
    #[serde(default)]
    pub last_id: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}

/// Run status as reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Expired,
    Incomplete,
}

impl RunStatus {
    /// True once the run can no longer change.
    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            Self::Queued | Self::InProgress | Self::RequiresAction | Self::Cancelling
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.code.is_empty(), self.message.is_empty()) {
            (false, false) => write!(f, "{}: {}", self.code, self.message),
            (true, false) => f.write_str(&self.message),
            (false, true) => f.write_str(&self.code),
            (true, true) => f.write_str("unknown error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded arguments chosen by the model.
    #[serde(default)]
    pub arguments: String,
}

/// A tool call the run is waiting on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RequiredToolCall {
    Function { id: String, function: FunctionCall },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitToolOutputsDetails {
    pub tool_calls: Vec<RequiredToolCall>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RequiredAction {
    SubmitToolOutputs {
        submit_tool_outputs: SubmitToolOutputsDetails,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadRun {
    pub id: String,
    #[serde(default)]
    pub thread_id: String,
    #[serde(default)]
    pub assistant_id: String,
    pub status: RunStatus,
    #[serde(default)]
    pub last_error: Option<RunError>,
    #[serde(default)]
    pub required_action: Option<RequiredAction>,
}

impl ThreadRun {
    /// Error detail for a failed run, as printed to the user.
    pub fn error_detail(&self) -> String {
        self.last_error
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "no error detail reported".to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateRunRequest {
    pub assistant_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub tool_call_id: String,
    pub output: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitToolOutputsRequest {
    pub tool_outputs: Vec<ToolOutput>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn agent_role_uses_assistant_on_the_wire() {
        assert_eq!(serde_json::to_value(MessageRole::Agent).unwrap(), json!("assistant"));
        assert_eq!(MessageRole::Agent.to_string(), "assistant");
        assert_eq!(MessageRole::User.to_string(), "user");
        let parsed: MessageRole = serde_json::from_value(json!("assistant")).unwrap();
        assert_eq!(parsed, MessageRole::Agent);
    }

    #[test]
    fn sort_order_renders_query_values() {
        assert_eq!(ListSortOrder::Ascending.to_string(), "asc");
        assert_eq!(ListSortOrder::Descending.to_string(), "desc");
    }

    #[test]
    fn terminal_statuses() {
        for status in [RunStatus::Queued, RunStatus::InProgress, RunStatus::RequiresAction, RunStatus::Cancelling] {
            assert!(!status.is_terminal(), "{status} should not be terminal");
        }
        for status in [
            RunStatus::Completed,
            RunStatus::Failed,
            RunStatus::Cancelled,
            RunStatus::Expired,
            RunStatus::Incomplete,
        ] {
            assert!(status.is_terminal(), "{status} should be terminal");
        }
    }

    #[test]
    fn message_keeps_last_text_and_skips_images() {
        let msg: ThreadMessage = serde_json::from_value(json!({
            "id": "msg_1",
            "object": "thread.message",
            "thread_id": "thread_1",
            "role": "assistant",
            "created_at": 1,
            "content": [
                { "type": "text", "text": { "value": "first", "annotations": [] } },
                { "type": "image_file", "image_file": { "file_id": "f" } },
                { "type": "text", "text": { "value": "second", "annotations": [] } }
            ]
        }))
        .unwrap();

        assert_eq!(msg.text_messages().len(), 2);
        assert_eq!(msg.last_text(), Some("second"));
    }

    #[test]
    fn run_with_tool_calls_deserializes() {
        let run: ThreadRun = serde_json::from_value(json!({
            "id": "run_1",
            "thread_id": "thread_1",
            "assistant_id": "asst_1",
            "status": "requires_action",
            "required_action": {
                "type": "submit_tool_outputs",
                "submit_tool_outputs": {
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": { "name": "submit_support_ticket", "arguments": "{}" }
                    }]
                }
            },
            "last_error": null
        }))
        .unwrap();

        match run.required_action {
            Some(RequiredAction::SubmitToolOutputs { submit_tool_outputs }) => {
                assert_eq!(submit_tool_outputs.tool_calls.len(), 1);
            }
            other => panic!("expected SubmitToolOutputs, got {other:?}"),
        }
    }

    #[test]
    fn run_error_detail_formats_code_and_message() {
        let run = ThreadRun {
            id: "run_1".into(),
            thread_id: "t".into(),
            assistant_id: "a".into(),
            status: RunStatus::Failed,
            last_error: Some(RunError {
                code: "rate_limit_exceeded".into(),
                message: "Rate limit is exceeded.".into(),
            }),
            required_action: None,
        };
        assert_eq!(run.error_detail(), "rate_limit_exceeded: Rate limit is exceeded.");
    }
}
