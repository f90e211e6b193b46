use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use tutor_orchestrator::agents::{PlannerAgent, ReasoningRequest, ReasoningService};
use tutor_orchestrator::context::StudentContext;
use tutor_orchestrator::error::PlanningError;
use tutor_orchestrator::models::{PlanSource, ResponseStatus};
use tutor_orchestrator::pipeline::{Pipeline, PipelineStage};
use tutor_orchestrator::tools::ToolRegistry;

enum FakeModel {
    Down,
    Answers(&'static str),
    Hangs,
}

#[async_trait]
impl ReasoningService for FakeModel {
    async fn propose(&self, _request: &ReasoningRequest) -> Result<String, PlanningError> {
        match self {
            FakeModel::Down => Err(PlanningError::Unavailable("connection refused".to_string())),
            FakeModel::Answers(raw) => Ok(raw.to_string()),
            FakeModel::Hangs => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(String::new())
            }
        }
    }
}

fn pipeline_with(model: Option<FakeModel>) -> Pipeline {
    let registry = Arc::new(ToolRegistry::with_builtin_tools().unwrap());
    let planner = model.map(|model| {
        PlannerAgent::new(Arc::new(model), registry.clone()).with_timeout(Duration::from_millis(50))
    });
    Pipeline::new(registry, planner)
}

#[tokio::test]
async fn structured_notes_through_fallback() {
    let pipeline = pipeline_with(Some(FakeModel::Down));

    let run = pipeline
        .run("Generate structured notes on protein synthesis and include examples.")
        .await;

    assert_eq!(
        run.stages,
        vec![
            PipelineStage::Start,
            PipelineStage::Planning,
            PipelineStage::PlanningFailed,
            PipelineStage::Planning,
            PipelineStage::Executing,
            PipelineStage::Formatting,
            PipelineStage::Done,
        ]
    );

    let response = run.response;
    assert_eq!(response.tool_name, "note_maker");
    assert_eq!(response.tool_args["topic"], json!("Protein Synthesis"));
    assert_eq!(response.tool_args["note_taking_style"], json!("structured"));
    assert_eq!(response.tool_args["include_examples"], json!(true));
    assert_eq!(response.status, ResponseStatus::Success);
    assert_eq!(response.planner, PlanSource::RuleBased);
    assert!(response.fallback_used);
    assert!(response.final_response.contains("Protein Synthesis"));
    assert!(response.final_response.contains("notes"));
    assert!(response.payload.is_some());
}

#[tokio::test]
async fn flashcards_without_model_planner() {
    let pipeline = pipeline_with(None);

    let response = pipeline
        .handle("Generate 10 flashcards on Newton's Laws of Motion for quick revision.")
        .await;

    assert_eq!(response.tool_name, "flashcard_generator");
    assert_eq!(response.tool_args["topic"], json!("Newton's Laws of Motion"));
    assert_eq!(response.tool_args["count"], json!(10));
    assert_eq!(response.tool_args["difficulty"], json!("medium"));
    assert_eq!(response.status, ResponseStatus::Success);
    assert!(response.fallback_used);

    let cards = response.payload.as_ref().unwrap()["flashcards"].as_array().unwrap();
    assert_eq!(cards.len(), 10);
    assert!(response.final_response.contains("Newton's Laws of Motion"));
}

#[tokio::test]
async fn explanation_after_model_timeout() {
    let pipeline = pipeline_with(Some(FakeModel::Hangs));

    let run = pipeline.run("Explain quantum entanglement in simple terms.").await;

    assert!(run.stages.contains(&PipelineStage::PlanningFailed));
    assert_eq!(run.response.tool_name, "concept_explainer");
    assert_eq!(run.response.tool_args["concept_to_explain"], json!("Quantum Entanglement"));
    assert_eq!(run.response.tool_args["desired_depth"], json!("basic"));
    assert_eq!(run.response.status, ResponseStatus::Success);
    assert!(run.response.final_response.contains("Quantum Entanglement"));
}

#[tokio::test]
async fn unregistered_tool_from_model_falls_back() {
    let pipeline = pipeline_with(Some(FakeModel::Answers(
        r#"{"tool_name": "essay_grader", "tool_args": {"essay": "..."}}"#,
    )));

    let response = pipeline.handle("Explain quantum entanglement in simple terms.").await;

    assert_eq!(response.tool_name, "concept_explainer");
    assert_eq!(response.status, ResponseStatus::Success);
    assert!(response.fallback_used);
}

#[tokio::test]
async fn garbage_from_model_falls_back() {
    let pipeline = pipeline_with(Some(FakeModel::Answers("I think notes would help!")));

    let response = pipeline
        .handle("Generate structured notes on protein synthesis and include examples.")
        .await;

    assert_eq!(response.tool_name, "note_maker");
    assert_eq!(response.planner, PlanSource::RuleBased);
}

#[tokio::test]
async fn model_plan_is_used_when_valid() {
    let pipeline = pipeline_with(Some(FakeModel::Answers(
        r#"```json
{"tool_name": "flashcard_generator", "tool_args": {"topic": "Photosynthesis", "count": "3", "difficulty": "Hard"}}
```"#,
    )));

    let run = pipeline.run("quiz me on photosynthesis").await;

    assert!(!run.stages.contains(&PipelineStage::PlanningFailed));
    let response = run.response;
    assert_eq!(response.planner, PlanSource::Model);
    assert!(!response.fallback_used);
    assert_eq!(response.tool_name, "flashcard_generator");
    assert_eq!(response.status, ResponseStatus::Success);

    let payload = response.payload.unwrap();
    assert_eq!(payload["difficulty"], json!("hard"));
    assert_eq!(payload["flashcards"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn invalid_model_arguments_reach_the_formatter() {
    let pipeline = pipeline_with(Some(FakeModel::Answers(
        r#"{"tool_name": "note_maker", "tool_args": {"topic": "Cells"}}"#,
    )));

    let run = pipeline.run("notes on cells please").await;

    assert_eq!(run.stages.last(), Some(&PipelineStage::Done));
    let response = run.response;
    assert_eq!(response.planner, PlanSource::Model);
    assert_eq!(response.status, ResponseStatus::InvalidArguments);
    assert!(response.payload.is_none());
    assert!(response.final_response.contains("note_taking_style"));
}

#[tokio::test]
async fn student_profile_reaches_tools_but_not_the_plan() {
    let pipeline = pipeline_with(None).with_context(StudentContext::default());

    let response = pipeline
        .handle("Generate structured notes on protein synthesis and include examples.")
        .await;

    assert_eq!(response.status, ResponseStatus::Success);
    assert!(!response.tool_args.contains_key("subject"));
    assert_eq!(response.payload.unwrap()["subject"], json!("Biology"));
}
