use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Learner profile handed to the reasoning service for personalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentContext {
    pub user_id: String,
    pub name: String,
    pub subject: String,
    pub grade_level: String,
    pub emotional_state: String,
    pub last_topic: String,
    pub mastery_score: u8,
    pub preferred_style: String,
}

impl Default for StudentContext {
    fn default() -> Self {
        Self {
            user_id: "std-48293".to_string(),
            name: "Student Example".to_string(),
            subject: "Biology".to_string(),
            grade_level: "10".to_string(),
            emotional_state: "Confused".to_string(),
            last_topic: "Photosynthesis".to_string(),
            mastery_score: 4,
            preferred_style: "Socratic".to_string(),
        }
    }
}

impl StudentContext {
    /// Value the profile supplies for a tool parameter a plan left out.
    pub fn argument_hint(&self, parameter: &str) -> Option<Value> {
        let hint = match parameter {
            "subject" => &self.subject,
            "current_topic" => &self.last_topic,
            _ => return None,
        };
        let hint = hint.trim();
        (!hint.is_empty()).then(|| Value::from(hint))
    }
}
