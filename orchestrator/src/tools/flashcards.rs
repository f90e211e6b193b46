use async_trait::async_trait;
use serde_json::{json, Value};

use super::{int_arg, opt_str_arg, str_arg, ParameterSpec, Tool, ToolSpec};
use crate::error::ToolError;
use crate::models::ToolArgs;

pub const NAME: &str = "flashcard_generator";
pub const DIFFICULTIES: &[&str] = &["easy", "medium", "hard"];
pub const MIN_CARDS: i64 = 1;
pub const MAX_CARDS: i64 = 20;

pub struct FlashcardGenerator {
    spec: ToolSpec,
}

impl FlashcardGenerator {
    pub fn new() -> Self {
        Self {
            spec: ToolSpec::new(
                NAME,
                "Generates question/answer flashcards for a topic.",
                vec![
                    ParameterSpec::string("topic").required(),
                    ParameterSpec::integer("count")
                        .required()
                        .range(MIN_CARDS, MAX_CARDS)
                        .describe("Number of cards"),
                    ParameterSpec::enumeration("difficulty", DIFFICULTIES).required(),
                    ParameterSpec::string("subject").with_default("General"),
                ],
            ),
        }
    }
}

impl Default for FlashcardGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for FlashcardGenerator {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn invoke(&self, args: &ToolArgs) -> Result<Value, ToolError> {
        let topic = str_arg(NAME, args, "topic")?;
        let count = int_arg(NAME, args, "count")?;
        let difficulty = str_arg(NAME, args, "difficulty")?;
        let subject = opt_str_arg(args, "subject").unwrap_or("General");

        if !(MIN_CARDS..=MAX_CARDS).contains(&count) {
            return Err(ToolError::new(NAME, format!("cannot generate {count} cards")));
        }

        let flashcards: Vec<Value> = (1..=count)
            .map(|i| {
                json!({
                    "question": format!("What is key point {i} about {topic}?"),
                    "answer": format!("Key point {i} of {topic} ({difficulty})."),
                })
            })
            .collect();

        Ok(json!({
            "topic": topic,
            "subject": subject,
            "difficulty": difficulty,
            "flashcards": flashcards,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn generates_requested_number_of_cards() {
        let args = json!({"topic": "Optics", "count": 4, "difficulty": "easy"});
        let payload = FlashcardGenerator::new()
            .invoke(args.as_object().unwrap())
            .await
            .unwrap();

        assert_eq!(payload["flashcards"].as_array().unwrap().len(), 4);
        assert_eq!(payload["subject"], "General");
    }

    #[tokio::test]
    async fn out_of_range_count_fails() {
        let args = json!({"topic": "Optics", "count": 0, "difficulty": "easy"});
        let err = FlashcardGenerator::new()
            .invoke(args.as_object().unwrap())
            .await
            .unwrap_err();
        assert!(err.reason.contains("0 cards"));
    }
}
