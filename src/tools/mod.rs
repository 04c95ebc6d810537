//! Local functions the agent service can call during a run.

pub mod arguments;
pub mod support;
pub mod tool;
pub mod toolset;
pub mod types;
pub mod validation;

pub use arguments::ToolArguments;
pub use tool::{AgentTool, Tool, ToolExecutionContext};
pub use toolset::FunctionToolSet;
pub use types::{AgentToolParameters, FunctionDefinition, ToolDefinition};
