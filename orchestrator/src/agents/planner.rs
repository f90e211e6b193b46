// Planner Agent: asks the reasoning service which tool to run

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info};

use super::reasoning::{ReasoningRequest, ReasoningService};
use crate::context::StudentContext;
use crate::error::PlanningError;
use crate::models::{Plan, ToolArgs};
use crate::tools::ToolRegistry;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct PlannerAgent {
    service: Arc<dyn ReasoningService>,
    registry: Arc<ToolRegistry>,
    context: StudentContext,
    timeout: Duration,
}

impl PlannerAgent {
    pub fn new(service: Arc<dyn ReasoningService>, registry: Arc<ToolRegistry>) -> Self {
        Self {
            service,
            registry,
            context: StudentContext::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_context(mut self, context: StudentContext) -> Self {
        self.context = context;
        self
    }

    pub async fn plan(&self, message: &str) -> Result<Plan, PlanningError> {
        info!("Planner: asking reasoning service to route message");

        let request = ReasoningRequest {
            message: message.to_string(),
            tools: self.registry.list_specs().into_iter().cloned().collect(),
            context: self.context.clone(),
        };

        let raw = tokio::time::timeout(self.timeout, self.service.propose(&request))
            .await
            .map_err(|_| PlanningError::Timeout(self.timeout))??;

        debug!("Planner: raw response {}", raw);
        parse_plan(&raw, &self.registry)
    }
}

/// Shape the reasoning service must answer with. Anything else is rejected.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CandidatePlan {
    #[serde(alias = "tool", alias = "name")]
    tool_name: String,
    #[serde(alias = "args", alias = "parameters", alias = "tool_input")]
    tool_args: ToolArgs,
}

/// Strictly decodes a reasoning-service answer into a [`Plan`] naming a
/// registered tool.
pub fn parse_plan(raw: &str, registry: &ToolRegistry) -> Result<Plan, PlanningError> {
    let unparsable = |reason: String| PlanningError::Unparsable {
        reason,
        raw: raw.to_string(),
    };

    let body = strip_code_fence(raw).ok_or_else(|| unparsable("unterminated code fence".into()))?;
    let candidate: CandidatePlan =
        serde_json::from_str(body).map_err(|e| unparsable(format!("invalid plan JSON: {e}")))?;

    let tool_name = candidate.tool_name.trim();
    if !registry.contains(tool_name) {
        return Err(unparsable(format!("unregistered tool {tool_name:?}")));
    }

    Ok(Plan::new(tool_name, candidate.tool_args))
}

/// Removes one surrounding markdown fence (with optional language tag).
/// Returns `None` for an opening fence without a closing one.
fn strip_code_fence(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return Some(trimmed);
    };
    let inner = rest.strip_suffix("```")?;
    Some(inner.trim_start_matches(|c: char| c.is_ascii_alphabetic()).trim())
}
