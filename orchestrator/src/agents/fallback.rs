// Rule-Based Planner: deterministic keyword routing used when the model is unavailable

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::info;

use crate::models::{Plan, ToolArgs};
use crate::tools::{explainer, flashcards, note_maker, ToolRegistry};

/// End of an extracted phrase: a joining word or punctuation.
const STOP: &str = r"(?:\s+(?:and|for|with|in|using|so|because|please)\b|[.,;:!?]|$)";

const DEFAULT_CARD_COUNT: i64 = 5;

static FLASHCARD_TRIGGER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:flash\s?cards?|quiz(?:zes)?|practice\s+questions?|revision\s+cards?)\b").unwrap()
});

static NOTE_TRIGGER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:notes?|summar(?:y|ies|ise|ize)|outlines?|study\s+(?:guide|sheet))\b").unwrap()
});

static EXPLAIN_TRIGGER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:explain|define|describe|clarify|what\s+(?:is|are|does)|how\s+(?:does|do|is))\b").unwrap()
});

static TOPIC_AFTER_PREPOSITION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)\b(?:on|about|regarding|covering)\s+(.+?){STOP}")).unwrap()
});

static TOPIC_AFTER_NOTES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?:notes?|summar(?:y|ise|ize)|outline)\s+(?:of\s+|for\s+)?(?:the\s+)?(.+?){STOP}"
    ))
    .unwrap()
});

static TOPIC_AFTER_CARDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?:flash\s?cards?|quiz(?:zes)?)\s+(?:of\s+|for\s+)?(?:the\s+)?(.+?){STOP}"
    ))
    .unwrap()
});

static CONCEPT_AFTER_VERB: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?:explain|define|describe|clarify)\s+(?:to\s+me\s+|me\s+)?(?:about\s+)?(?:what\s+(?:is|are)\s+|how\s+)?(?:the\s+concept\s+of\s+)?(?:an?\s+|the\s+)?(.+?){STOP}"
    ))
    .unwrap()
});

static CONCEPT_AFTER_WHAT_IS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)\bwhat\s+(?:is|are)\s+(?:an?\s+|the\s+)?(.+?){STOP}")).unwrap()
});

static COUNT_BEFORE_CARDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d+)\s+(?:[a-z'-]+\s+){0,2}?(?:flash\s?cards?|cards?|questions?)\b").unwrap()
});

static ANY_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d+)\b").unwrap());

struct Rule {
    tool: &'static str,
    trigger: &'static Lazy<Regex>,
    extract: fn(&str) -> ToolArgs,
}

/// Checked in order; the first registered tool whose trigger matches wins.
static RULES: [Rule; 3] = [
    Rule {
        tool: flashcards::NAME,
        trigger: &FLASHCARD_TRIGGER,
        extract: flashcard_args,
    },
    Rule {
        tool: note_maker::NAME,
        trigger: &NOTE_TRIGGER,
        extract: note_args,
    },
    Rule {
        tool: explainer::NAME,
        trigger: &EXPLAIN_TRIGGER,
        extract: explainer_args,
    },
];

/// Deterministic planner that never fails. Same message, same plan.
pub struct RuleBasedPlanner {
    registry: Arc<ToolRegistry>,
}

impl RuleBasedPlanner {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub fn plan(&self, message: &str) -> Plan {
        let rule = RULES
            .iter()
            .filter(|rule| self.registry.contains(rule.tool))
            .find(|rule| rule.trigger.is_match(message));

        let plan = match rule {
            Some(rule) => Plan::new(rule.tool, (rule.extract)(message)),
            None => Plan::new(explainer::NAME, default_args(message)),
        };
        info!("Rule planner: selected {}", plan.tool_name);
        plan
    }
}

fn flashcard_args(message: &str) -> ToolArgs {
    let lower = message.to_lowercase();
    let topic = phrase(&[&TOPIC_AFTER_PREPOSITION, &TOPIC_AFTER_CARDS], message);
    let count = first_capture(&[&COUNT_BEFORE_CARDS, &ANY_NUMBER], message)
        // digits only, so a parse failure means overflow
        .map(|n| n.parse::<i64>().unwrap_or(i64::MAX))
        .unwrap_or(DEFAULT_CARD_COUNT)
        .clamp(flashcards::MIN_CARDS, flashcards::MAX_CARDS);

    let mut args = ToolArgs::new();
    args.insert("topic".into(), Value::from(topic));
    args.insert("count".into(), Value::from(count));
    args.insert("difficulty".into(), Value::from(difficulty(&lower)));
    args
}

fn note_args(message: &str) -> ToolArgs {
    let lower = message.to_lowercase();
    let topic = phrase(&[&TOPIC_AFTER_PREPOSITION, &TOPIC_AFTER_NOTES], message);

    let mut args = ToolArgs::new();
    args.insert("topic".into(), Value::from(topic));
    args.insert("note_taking_style".into(), Value::from(note_style(&lower)));
    args.insert("include_examples".into(), Value::from(lower.contains("example")));
    args.insert(
        "include_analogies".into(),
        Value::from(lower.contains("analog") || lower.contains("confus")),
    );
    args
}

fn explainer_args(message: &str) -> ToolArgs {
    let concept = phrase(
        &[&CONCEPT_AFTER_VERB, &CONCEPT_AFTER_WHAT_IS, &TOPIC_AFTER_PREPOSITION],
        message,
    );

    let mut args = ToolArgs::new();
    args.insert("concept_to_explain".into(), Value::from(concept));
    args.insert("desired_depth".into(), Value::from(depth(&message.to_lowercase())));
    args
}

/// Nothing matched: explain the message itself.
fn default_args(message: &str) -> ToolArgs {
    let mut args = ToolArgs::new();
    args.insert("concept_to_explain".into(), Value::from(placeholder(message)));
    args.insert("desired_depth".into(), Value::from(depth(&message.to_lowercase())));
    args
}

/// Title-cased phrase captured by the first matching pattern, or the raw
/// message when none match.
fn phrase(patterns: &[&Lazy<Regex>], message: &str) -> String {
    first_capture(patterns, message)
        .map(|p| title_case(&p))
        .unwrap_or_else(|| placeholder(message))
}

fn first_capture(patterns: &[&Lazy<Regex>], message: &str) -> Option<String> {
    patterns.iter().find_map(|re| {
        re.captures(message)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim_matches(|c: char| c.is_whitespace() || c == '"' || c == '\''))
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
    })
}

fn placeholder(message: &str) -> String {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        "General".to_string()
    } else {
        trimmed.to_string()
    }
}

/// "newton's laws of motion" -> "Newton's Laws of Motion". Existing capitals
/// are kept; minor words stay lower case unless they lead.
fn title_case(phrase: &str) -> String {
    const MINOR: &[&str] = &[
        "a", "an", "and", "as", "at", "by", "for", "in", "of", "on", "or", "the", "to", "vs",
    ];

    phrase
        .split_whitespace()
        .enumerate()
        .map(|(i, word)| {
            let lower = word.to_lowercase();
            if i > 0 && MINOR.contains(&lower.as_str()) {
                lower
            } else {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn difficulty(lower: &str) -> &'static str {
    if contains_any(lower, &["easy", "simple", "beginner"]) {
        "easy"
    } else if contains_any(lower, &["hard", "difficult", "challenging", "tough", "advanced"]) {
        "hard"
    } else {
        "medium"
    }
}

fn note_style(lower: &str) -> &'static str {
    if lower.contains("bullet") {
        "bullet_points"
    } else if lower.contains("outline") {
        "outline"
    } else if contains_any(lower, &["narrative", "story", "prose"]) {
        "narrative"
    } else {
        "structured"
    }
}

fn depth(lower: &str) -> &'static str {
    if contains_any(lower, &["simple", "basic", "beginner", "eli5", "easy"]) {
        "basic"
    } else if contains_any(lower, &["comprehensive", "thorough", "everything"]) {
        "comprehensive"
    } else if contains_any(lower, &["advanced", "detailed", "in depth", "in-depth"]) {
        "advanced"
    } else {
        "intermediate"
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::validator;
    use serde_json::json;

    fn planner() -> RuleBasedPlanner {
        RuleBasedPlanner::new(Arc::new(ToolRegistry::with_builtin_tools().unwrap()))
    }

    fn args(value: Value) -> ToolArgs {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn structured_notes_request() {
        let plan = planner().plan("Generate structured notes on protein synthesis and include examples.");

        assert_eq!(
            plan,
            Plan::new(
                "note_maker",
                args(json!({
                    "topic": "Protein Synthesis",
                    "note_taking_style": "structured",
                    "include_examples": true,
                    "include_analogies": false,
                }))
            )
        );
    }

    #[test]
    fn flashcard_request_with_count() {
        let plan = planner().plan("Generate 10 flashcards on Newton's Laws of Motion for quick revision.");

        assert_eq!(
            plan,
            Plan::new(
                "flashcard_generator",
                args(json!({
                    "topic": "Newton's Laws of Motion",
                    "count": 10,
                    "difficulty": "medium",
                }))
            )
        );
    }

    #[test]
    fn explain_request_in_simple_terms() {
        let plan = planner().plan("Explain quantum entanglement in simple terms.");

        assert_eq!(
            plan,
            Plan::new(
                "concept_explainer",
                args(json!({
                    "concept_to_explain": "Quantum Entanglement",
                    "desired_depth": "basic",
                }))
            )
        );
    }

    #[test]
    fn unmatched_message_defaults_to_explainer_with_raw_text() {
        let plan = planner().plan("  mitochondria?? ");
        assert_eq!(plan.tool_name, "concept_explainer");
        assert_eq!(plan.tool_args["concept_to_explain"], json!("mitochondria??"));
        assert_eq!(plan.tool_args["desired_depth"], json!("intermediate"));
    }

    #[test]
    fn count_is_clamped_and_defaulted() {
        let p = planner();
        assert_eq!(p.plan("Make 99 flashcards about cells").tool_args["count"], json!(20));
        assert_eq!(p.plan("Make 1000 flashcards about cells").tool_args["count"], json!(20));
        assert_eq!(
            p.plan("Make 99999999999999999999999 flashcards about cells").tool_args["count"],
            json!(20)
        );
        assert_eq!(p.plan("quiz me about cells").tool_args["count"], json!(5));
        assert_eq!(p.plan("I want 3 hard practice questions on optics").tool_args["count"], json!(3));
        assert_eq!(
            p.plan("I want 3 hard practice questions on optics").tool_args["difficulty"],
            json!("hard")
        );
    }

    #[test]
    fn note_style_and_analogies_are_spotted() {
        let plan = planner().plan("I'm confused, give me bullet notes about the Krebs cycle");
        assert_eq!(plan.tool_args["note_taking_style"], json!("bullet_points"));
        assert_eq!(plan.tool_args["include_analogies"], json!(true));
        assert_eq!(plan.tool_args["topic"], json!("The Krebs Cycle"));
    }

    #[test]
    fn title_case_keeps_minor_words_and_capitals() {
        assert_eq!(title_case("newton's laws of motion"), "Newton's Laws of Motion");
        assert_eq!(title_case("the  role of DNA"), "The Role of DNA");
        assert_eq!(title_case("of mice and men"), "Of Mice and Men");
    }

    #[test]
    fn what_is_question_extracts_concept() {
        let plan = planner().plan("What is a covalent bond?");
        assert_eq!(plan.tool_name, "concept_explainer");
        assert_eq!(plan.tool_args["concept_to_explain"], json!("Covalent Bond"));
    }

    #[test]
    fn rules_for_unregistered_tools_are_skipped() {
        let mut registry = ToolRegistry::new();
        registry
            .register(Arc::new(crate::tools::explainer::ConceptExplainer::new()))
            .unwrap();
        let plan = RuleBasedPlanner::new(Arc::new(registry)).plan("Generate 10 flashcards on optics");
        assert_eq!(plan.tool_name, "concept_explainer");
    }

    #[test]
    fn planning_is_total_and_deterministic() {
        let p = planner();
        let inputs = [
            "",
            "   ",
            "notes",
            "flashcards",
            "explain",
            "on",
            "¿Qué es la fotosíntesis?",
            "🧪🧪🧪 quiz 0 cards",
            "Summarize chapter 4 of my biology book, with examples and analogies!",
            "What is a covalent bond?",
        ];

        for input in inputs {
            let first = p.plan(input);
            let second = p.plan(input);
            assert_eq!(first, second, "non-deterministic for {input:?}");
        }
    }

    #[test]
    fn rule_plans_pass_validation() {
        let registry = ToolRegistry::with_builtin_tools().unwrap();
        let p = RuleBasedPlanner::new(Arc::new(registry.clone()));
        let inputs = ["", "quiz 0 cards", "notes", "explain", "what is", "hello there"];

        for input in inputs {
            let plan = p.plan(input);
            let spec = registry.lookup(&plan.tool_name).unwrap();
            assert!(
                validator::validate(spec, &plan.tool_args).is_ok(),
                "invalid plan for {input:?}: {plan:?}"
            );
        }
    }
}
