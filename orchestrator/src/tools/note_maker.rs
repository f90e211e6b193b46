use async_trait::async_trait;
use serde_json::{json, Value};

use super::{bool_arg, opt_str_arg, str_arg, ParameterSpec, Tool, ToolSpec};
use crate::error::ToolError;
use crate::models::ToolArgs;

pub const NAME: &str = "note_maker";
pub const STYLES: &[&str] = &["outline", "bullet_points", "narrative", "structured"];

/// Generates study notes for a topic.
pub struct NoteMaker {
    spec: ToolSpec,
}

impl NoteMaker {
    pub fn new() -> Self {
        Self {
            spec: ToolSpec::new(
                NAME,
                "Generates study notes on a topic in the requested style.",
                vec![
                    ParameterSpec::string("topic")
                        .required()
                        .describe("Topic the notes cover"),
                    ParameterSpec::enumeration("note_taking_style", STYLES)
                        .required()
                        .describe("Layout of the notes"),
                    ParameterSpec::string("subject")
                        .with_default("General")
                        .describe("Academic subject"),
                    ParameterSpec::boolean("include_examples").with_default(true),
                    ParameterSpec::boolean("include_analogies").with_default(false),
                ],
            ),
        }
    }
}

impl Default for NoteMaker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for NoteMaker {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn invoke(&self, args: &ToolArgs) -> Result<Value, ToolError> {
        let topic = str_arg(NAME, args, "topic")?;
        let style = str_arg(NAME, args, "note_taking_style")?;
        let subject = opt_str_arg(args, "subject").unwrap_or("General");
        let examples = bool_arg(args, "include_examples");
        let analogies = bool_arg(args, "include_analogies");

        let mut sections = vec![
            section("Overview", vec![format!("What {topic} is and why it matters in {subject}.")]),
            section(
                "Key Ideas",
                vec![
                    format!("Core definitions behind {topic}."),
                    format!("How the parts of {topic} fit together."),
                ],
            ),
        ];
        if examples {
            sections.push(section("Examples", vec![format!("A worked example of {topic}.")]));
        }
        if analogies {
            sections.push(section(
                "Analogies",
                vec![format!("An everyday comparison that makes {topic} easier to picture.")],
            ));
        }
        sections.push(section("Summary", vec![format!("The essentials of {topic} in one line.")]));

        Ok(json!({
            "topic": topic,
            "style": style,
            "subject": subject,
            "include_examples": examples,
            "include_analogies": analogies,
            "sections": sections,
        }))
    }
}

fn section(heading: &str, points: Vec<String>) -> Value {
    json!({ "heading": heading, "points": points })
}
