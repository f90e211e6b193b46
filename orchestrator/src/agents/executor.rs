// Executor Agent: validates a plan and invokes the chosen tool exactly once

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{error, info, warn};

use crate::context::StudentContext;
use crate::error::{ExecutorError, ToolError};
use crate::models::{ExecutionFailure, ExecutionResult, Plan, ToolArgs};
use crate::tools::{validator, ToolRegistry, ToolSpec};

pub struct ExecutorAgent {
    registry: Arc<ToolRegistry>,
    context: Option<StudentContext>,
}

impl ExecutorAgent {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            context: None,
        }
    }

    /// Parameters a plan leaves out are filled from the profile before
    /// defaults apply. The plan itself is not modified.
    pub fn with_context(mut self, context: StudentContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Unknown tools and invalid arguments are returned as errors; anything
    /// the tool itself raises (including a panic) becomes a failed result.
    pub async fn execute(&self, plan: &Plan) -> Result<ExecutionResult, ExecutorError> {
        let tool = self.registry.tool(&plan.tool_name)?;
        let args = match &self.context {
            Some(context) => {
                let hinted = with_hints(tool.spec(), &plan.tool_args, context);
                validator::validate(tool.spec(), &hinted)?
            }
            None => validator::validate(tool.spec(), &plan.tool_args)?,
        };

        info!("Executor: invoking {}", plan.tool_name);

        match AssertUnwindSafe(tool.invoke(&args)).catch_unwind().await {
            Ok(Ok(payload)) => {
                info!("Executor: {} executed successfully", plan.tool_name);
                Ok(ExecutionResult::Success { payload })
            }
            Ok(Err(err)) => {
                warn!("Executor: {} failed: {}", plan.tool_name, err);
                Ok(ExecutionResult::Failure {
                    error: ExecutionFailure::Tool(err),
                })
            }
            Err(_) => {
                error!("Executor: {} panicked", plan.tool_name);
                Ok(ExecutionResult::Failure {
                    error: ExecutionFailure::Tool(ToolError::new(&plan.tool_name, "tool panicked")),
                })
            }
        }
    }
}

fn with_hints(spec: &ToolSpec, args: &ToolArgs, context: &StudentContext) -> ToolArgs {
    let mut filled = args.clone();
    for param in &spec.parameters {
        if filled.get(&param.name).map_or(true, |v| v.is_null()) {
            if let Some(hint) = context.argument_hint(&param.name) {
                filled.insert(param.name.clone(), hint);
            }
        }
    }
    filled
}
