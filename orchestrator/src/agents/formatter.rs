// Formatter Agent: turns an execution result into the reply the student sees

use serde_json::Value;

use crate::models::{
    ExecutionFailure, ExecutionResult, FinalResponse, Plan, PlanSource, ResponseStatus,
};
use crate::tools::{explainer, flashcards, note_maker};

pub struct FormatterAgent;

impl FormatterAgent {
    pub fn new() -> Self {
        Self
    }

    /// Pure and infallible: missing payload fields degrade to a generic reply.
    pub fn format(&self, plan: &Plan, result: &ExecutionResult, source: PlanSource) -> FinalResponse {
        let (final_response, payload, status) = match result {
            ExecutionResult::Success { payload } => (
                success_message(&plan.tool_name, payload)
                    .unwrap_or_else(|| format!("✅ Your {} results are ready.", tool_label(&plan.tool_name))),
                Some(payload.clone()),
                ResponseStatus::Success,
            ),
            ExecutionResult::Failure { error } => {
                let (message, status) = failure_message(&plan.tool_name, error);
                (message, None, status)
            }
        };

        FinalResponse {
            tool_name: plan.tool_name.clone(),
            tool_args: plan.tool_args.clone(),
            final_response,
            payload,
            status,
            planner: source,
            fallback_used: source == PlanSource::RuleBased,
        }
    }
}

impl Default for FormatterAgent {
    fn default() -> Self {
        Self::new()
    }
}

fn success_message(tool: &str, payload: &Value) -> Option<String> {
    match tool {
        note_maker::NAME => {
            let topic = payload.get("topic")?.as_str()?;
            let style = payload.get("style")?.as_str()?.replace('_', " ");
            let examples = payload.get("include_examples").and_then(Value::as_bool) == Some(true);
            let analogies = payload.get("include_analogies").and_then(Value::as_bool) == Some(true);
            let extras = match (examples, analogies) {
                (true, true) => " with examples and analogies",
                (true, false) => " with examples",
                (false, true) => " with analogies",
                (false, false) => "",
            };
            Some(format!(
                "📘 Here are your {style} notes on **{topic}**{extras}. Ready to start?"
            ))
        }
        flashcards::NAME => {
            let topic = payload.get("topic")?.as_str()?;
            let count = payload.get("flashcards")?.as_array()?.len();
            let difficulty = payload.get("difficulty")?.as_str()?;
            let noun = if count == 1 { "flashcard" } else { "flashcards" };
            Some(format!(
                "🃏 Generated {count} {difficulty} {noun} on **{topic}**. Flip through them whenever you're ready!"
            ))
        }
        explainer::NAME => {
            let concept = payload.get("concept")?.as_str()?;
            let depth = payload.get("depth")?.as_str()?;
            let explanation = payload.get("explanation")?.as_str()?;
            Some(format!(
                "🧠 Here's a {depth} explanation of **{concept}**: {explanation}"
            ))
        }
        other => Some(format!("✅ {} finished successfully.", tool_label(other))),
    }
}

fn failure_message(tool: &str, error: &ExecutionFailure) -> (String, ResponseStatus) {
    match error {
        ExecutionFailure::UnknownTool(_) => (
            "⚠️ Sorry, I couldn't find a study tool that fits your request. Could you rephrase it?"
                .to_string(),
            ResponseStatus::UnknownTool,
        ),
        ExecutionFailure::InvalidArguments(err) => (
            format!(
                "⚠️ Sorry, I couldn't run the {}: the \"{}\" detail in your request was missing or invalid. Could you add it and try again?",
                tool_label(tool),
                err.parameter()
            ),
            ResponseStatus::InvalidArguments,
        ),
        ExecutionFailure::Tool(_) => (
            format!(
                "⚠️ Sorry, the {} ran into a problem while preparing your material. Please try again in a moment.",
                tool_label(tool)
            ),
            ResponseStatus::ToolError,
        ),
    }
}

/// `flashcard_generator` -> `flashcard generator`.
fn tool_label(tool: &str) -> String {
    tool.replace('_', " ")
}
