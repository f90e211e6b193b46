use async_trait::async_trait;
use serde_json::{json, Value};

use super::{opt_str_arg, str_arg, ParameterSpec, Tool, ToolSpec};
use crate::error::ToolError;
use crate::models::ToolArgs;

pub const NAME: &str = "concept_explainer";
pub const DEPTHS: &[&str] = &["basic", "intermediate", "advanced", "comprehensive"];

pub struct ConceptExplainer {
    spec: ToolSpec,
}

impl ConceptExplainer {
    pub fn new() -> Self {
        Self {
            spec: ToolSpec::new(
                NAME,
                "Explains a concept at the requested depth.",
                vec![
                    ParameterSpec::string("concept_to_explain").required(),
                    ParameterSpec::enumeration("desired_depth", DEPTHS).required(),
                    ParameterSpec::string("current_topic")
                        .describe("What the student is currently studying"),
                ],
            ),
        }
    }
}

impl Default for ConceptExplainer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for ConceptExplainer {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn invoke(&self, args: &ToolArgs) -> Result<Value, ToolError> {
        let concept = str_arg(NAME, args, "concept_to_explain")?.trim();
        let depth = str_arg(NAME, args, "desired_depth")?;
        let current_topic = opt_str_arg(args, "current_topic");

        if concept.is_empty() {
            return Err(ToolError::new(NAME, "nothing to explain"));
        }

        let lead = match depth {
            "basic" => format!("In simple terms, {concept} is best understood through one core idea."),
            "advanced" => format!("At an advanced level, {concept} rests on formal definitions and their consequences."),
            "comprehensive" => format!("A complete treatment of {concept} covers its origins, mechanics and applications."),
            _ => format!("{concept} builds on a few connected ideas."),
        };
        let explanation = match current_topic {
            Some(topic) => format!("{lead} It connects to {topic}, which you studied recently."),
            None => lead,
        };

        Ok(json!({
            "concept": concept,
            "depth": depth,
            "explanation": explanation,
            "key_points": [
                format!("Definition of {concept}"),
                format!("Why {concept} matters"),
            ],
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mentions_current_topic_when_given() {
        let args = json!({
            "concept_to_explain": "Osmosis",
            "desired_depth": "basic",
            "current_topic": "Photosynthesis",
        });
        let payload = ConceptExplainer::new()
            .invoke(args.as_object().unwrap())
            .await
            .unwrap();

        let text = payload["explanation"].as_str().unwrap();
        assert!(text.starts_with("In simple terms, Osmosis"));
        assert!(text.contains("Photosynthesis"));
    }

    #[tokio::test]
    async fn blank_concept_fails() {
        let args = json!({"concept_to_explain": "  ", "desired_depth": "basic"});
        assert!(ConceptExplainer::new()
            .invoke(args.as_object().unwrap())
            .await
            .is_err());
    }
}
