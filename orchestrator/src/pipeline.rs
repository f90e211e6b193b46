//! Request pipeline: plan, execute, format.
//!
//! ```text
//! Start -> Planning -> Executing -> Formatting -> Done
//!              |  ^
//!              v  |
//!        PlanningFailed        (model planner failed; rule planner takes over)
//! ```
//!
//! `Done` always carries a [`FinalResponse`]. The only planning step that can
//! fail is the model-driven one, and the rule-based planner that replaces it
//! cannot fail, so every run reaches `Executing`.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, instrument, warn};

use crate::agents::{ExecutorAgent, FormatterAgent, PlannerAgent, RuleBasedPlanner};
use crate::context::StudentContext;
use crate::error::PlanningError;
use crate::metrics;
use crate::models::{ExecutionResult, FinalResponse, Plan, PlanSource};
use crate::tools::ToolRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Start,
    Planning,
    PlanningFailed,
    Executing,
    Formatting,
    Done,
}

/// Outcome of one run with the stages it passed through.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub response: FinalResponse,
    pub stages: Vec<PipelineStage>,
}

struct StageTrace {
    stages: Vec<PipelineStage>,
}

impl StageTrace {
    fn new() -> Self {
        Self {
            stages: vec![PipelineStage::Start],
        }
    }

    fn enter(&mut self, next: PipelineStage) {
        let from = self.stages.last().copied().unwrap_or(PipelineStage::Start);
        debug!("Pipeline stage {:?} -> {:?}", from, next);
        self.stages.push(next);
    }
}

pub struct Pipeline {
    planner: Option<PlannerAgent>,
    fallback: RuleBasedPlanner,
    executor: ExecutorAgent,
    formatter: FormatterAgent,
}

impl Pipeline {
    /// Without a model planner every request is planned by the rule-based one.
    pub fn new(registry: Arc<ToolRegistry>, planner: Option<PlannerAgent>) -> Self {
        Self {
            planner,
            fallback: RuleBasedPlanner::new(registry.clone()),
            executor: ExecutorAgent::new(registry),
            formatter: FormatterAgent::new(),
        }
    }

    /// Tools receive the student's profile for parameters a plan omits.
    pub fn with_context(mut self, context: StudentContext) -> Self {
        self.executor = self.executor.with_context(context);
        self
    }

    pub async fn handle(&self, message: &str) -> FinalResponse {
        self.run(message).await.response
    }

    #[instrument(skip(self, message), fields(message_len = message.len()))]
    pub async fn run(&self, message: &str) -> PipelineRun {
        let started = Instant::now();
        let mut trace = StageTrace::new();

        trace.enter(PipelineStage::Planning);
        let (plan, source) = self.plan(message, &mut trace).await;

        trace.enter(PipelineStage::Executing);
        let result = match self.executor.execute(&plan).await {
            Ok(result) => result,
            Err(err) => {
                warn!("Execution rejected plan for {}: {}", plan.tool_name, err);
                ExecutionResult::from(err)
            }
        };

        trace.enter(PipelineStage::Formatting);
        let response = self.formatter.format(&plan, &result, source);

        trace.enter(PipelineStage::Done);
        metrics::REQUESTS_TOTAL
            .with_label_values(&[response.tool_name.as_str(), response.status.as_str()])
            .inc();
        metrics::PIPELINE_DURATION.observe(started.elapsed().as_secs_f64());
        info!(
            "Pipeline finished: tool={} status={} planner={:?}",
            response.tool_name,
            response.status.as_str(),
            response.planner
        );

        PipelineRun {
            response,
            stages: trace.stages,
        }
    }

    async fn plan(&self, message: &str, trace: &mut StageTrace) -> (Plan, PlanSource) {
        let failure = match &self.planner {
            Some(planner) => match planner.plan(message).await {
                Ok(plan) => return (plan, PlanSource::Model),
                Err(err) => err,
            },
            None => PlanningError::Unavailable("no reasoning service configured".to_string()),
        };

        trace.enter(PipelineStage::PlanningFailed);
        warn!("Model planner failed, using rule-based planner: {}", failure);
        metrics::PLANNER_FALLBACKS_TOTAL
            .with_label_values(&[failure.kind()])
            .inc();

        trace.enter(PipelineStage::Planning);
        (self.fallback.plan(message), PlanSource::RuleBased)
    }
}
