//! Static table of the functions an agent may call.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::arguments::ToolArguments;
use super::tool::{Tool, ToolExecutionContext};
use super::types::ToolDefinition;
use super::validation::validate_arguments;
use crate::error::DeskError;

/// Name → tool table built once at startup.
///
/// The set is handed to the agents client, which runs the matching tool
/// whenever a run asks for one. Registration order is kept for the
/// definitions sent to the service.
#[derive(Clone, Default)]
pub struct FunctionToolSet {
    order: Vec<String>,
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl FunctionToolSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool. A later tool with the same name replaces the earlier one.
    pub fn with(mut self, tool: Arc<dyn Tool>) -> Self {
        self.add(tool);
        self
    }

    pub fn add(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), tool).is_none() {
            self.order.push(name);
        }
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    /// Declarations for the agent definition, in registration order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| ToolDefinition::function(tool.definition()))
            .collect()
    }

    /// Run one function call requested by the service.
    ///
    /// `raw_arguments` is the JSON string from the call. Unknown names,
    /// malformed or schema-violating arguments never reach a tool.
    pub async fn execute(
        &self,
        name: &str,
        raw_arguments: &str,
        ctx: &ToolExecutionContext,
    ) -> Result<serde_json::Value, DeskError> {
        let tool = self.tools.get(name).ok_or_else(|| DeskError::ToolExecution {
            tool_name: name.to_string(),
            message: "no such function is registered".to_string(),
        })?;
        let args = ToolArguments::parse(raw_arguments)?;
        validate_arguments(args.raw(), &tool.parameters().schema)
            .map_err(|message| DeskError::InvalidArgument(format!("{name}: {message}")))?;

        tracing::info!(tool = name, run_id = %ctx.run_id, call_id = %ctx.call_id, "executing tool");
        tool.execute(&args, ctx).await
    }
}

impl std::fmt::Debug for FunctionToolSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionToolSet")
            .field("tools", &self.order)
            .finish()
    }
}
