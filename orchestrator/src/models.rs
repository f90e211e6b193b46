use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{ExecutorError, RegistryError, ToolError, ValidationError};

/// Argument mapping handed between planners, validator and tools.
pub type ToolArgs = serde_json::Map<String, Value>;

/// A (tool, arguments) pair proposed by exactly one planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub tool_name: String,
    pub tool_args: ToolArgs,
}

impl Plan {
    pub fn new(tool_name: impl Into<String>, tool_args: ToolArgs) -> Self {
        Self {
            tool_name: tool_name.into(),
            tool_args,
        }
    }
}

/// Which planner produced the plan a response was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanSource {
    Model,
    RuleBased,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionResult {
    Success { payload: Value },
    Failure { error: ExecutionFailure },
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionResult::Success { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionFailure {
    UnknownTool(RegistryError),
    InvalidArguments(ValidationError),
    Tool(ToolError),
}

impl From<ExecutorError> for ExecutionResult {
    fn from(err: ExecutorError) -> Self {
        let error = match err {
            ExecutorError::UnknownTool(e) => ExecutionFailure::UnknownTool(e),
            ExecutorError::InvalidArguments(e) => ExecutionFailure::InvalidArguments(e),
        };
        ExecutionResult::Failure { error }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseStatus {
    Success,
    InvalidArguments,
    UnknownTool,
    ToolError,
}

impl ResponseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseStatus::Success => "SUCCESS",
            ResponseStatus::InvalidArguments => "INVALID_ARGUMENTS",
            ResponseStatus::UnknownTool => "UNKNOWN_TOOL",
            ResponseStatus::ToolError => "TOOL_ERROR",
        }
    }
}

/// Terminal artifact of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalResponse {
    pub tool_name: String,
    pub tool_args: ToolArgs,
    pub final_response: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub payload: Option<Value>,
    pub status: ResponseStatus,
    pub planner: PlanSource,
    pub fallback_used: bool,
}

// API Request/Response models
#[derive(Debug, Deserialize)]
pub struct OrchestrateRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct OrchestrateResponse {
    pub request_id: Uuid,
    #[serde(flatten)]
    pub response: FinalResponse,
}
