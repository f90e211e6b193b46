//! Client side of the external reasoning service used by the model-driven
//! planner.
//!
//! [`ReasoningService`] is the seam the planner talks to; [`GeminiService`]
//! implements it against the Gemini `generateContent` REST endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::StudentContext;
use crate::error::PlanningError;
use crate::tools::ToolSpec;

/// Everything the service needs to propose a plan.
#[derive(Debug, Clone, Serialize)]
pub struct ReasoningRequest {
    pub message: String,
    pub tools: Vec<ToolSpec>,
    pub context: StudentContext,
}

#[async_trait]
pub trait ReasoningService: Send + Sync {
    /// Returns the raw text of the service's answer.
    async fn propose(&self, request: &ReasoningRequest) -> Result<String, PlanningError>;
}

/// Instruction sent alongside the student's message.
pub fn build_system_prompt(request: &ReasoningRequest) -> String {
    let tools: Vec<String> = request
        .tools
        .iter()
        .map(|spec| format!("- {}: {}", spec.signature(), spec.description))
        .collect();
    let context = serde_json::to_string(&request.context).unwrap_or_default();

    format!(
        "You are an AI tutor orchestrator. Select exactly one tool for the student's message \
         and return its arguments.\n\n\
         Available tools (`?` marks optional parameters):\n{}\n\n\
         Student context: {}\n\n\
         Rules:\n\
         - Output ONLY a JSON object of the form {{\"tool_name\": \"...\", \"tool_args\": {{...}}}}.\n\
         - Use only the tools and parameters listed above.\n\
         - Infer reasonable values for required parameters the student did not state.",
        tools.join("\n"),
        context
    )
}

// ─── Gemini ─────────────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    response_mime_type: &'static str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

pub struct GeminiService {
    http: HttpClient,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiService {
    pub fn new(
        endpoint: String,
        model: String,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model,
            api_key,
        })
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

#[async_trait]
impl ReasoningService for GeminiService {
    async fn propose(&self, request: &ReasoningRequest) -> Result<String, PlanningError> {
        let body = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: build_system_prompt(request),
                }],
            },
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: request.message.clone(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.0,
                response_mime_type: "application/json",
            },
        };

        debug!("Sending plan request to {}", self.url());

        let resp = self
            .http
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| PlanningError::Unavailable(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            return Err(PlanningError::Unavailable(format!(
                "HTTP {}: {}",
                status.as_u16(),
                error_text
            )));
        }

        let parsed: GenerateContentResponse =
            resp.json().await.map_err(|e| PlanningError::Unparsable {
                reason: format!("invalid response body: {e}"),
                raw: String::new(),
            })?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| content.parts.into_iter().map(|p| p.text).collect::<String>())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(PlanningError::Unparsable {
                reason: "empty completion".to_string(),
                raw: text,
            });
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolRegistry;
    use warp::http::StatusCode;
    use warp::Filter;

    /// Serves one canned reply on an ephemeral port; returns the endpoint base.
    fn fake_endpoint(status: StatusCode, body: &'static str) -> String {
        let route = warp::post().map(move || {
            warp::reply::with_status(
                warp::reply::with_header(body, "content-type", "application/json"),
                status,
            )
        });
        let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        format!("http://{addr}/v1beta")
    }

    fn service(endpoint: String) -> GeminiService {
        GeminiService::new(endpoint, "gemini-test".into(), "key".into(), Duration::from_secs(2)).unwrap()
    }

    fn request() -> ReasoningRequest {
        ReasoningRequest {
            message: "make notes on cells".into(),
            tools: ToolRegistry::with_builtin_tools()
                .unwrap()
                .list_specs()
                .into_iter()
                .cloned()
                .collect(),
            context: StudentContext::default(),
        }
    }

    #[tokio::test]
    async fn server_error_is_unavailable() {
        let endpoint = fake_endpoint(StatusCode::INTERNAL_SERVER_ERROR, "boom");

        let err = service(endpoint).propose(&request()).await.unwrap_err();
        match err {
            PlanningError::Unavailable(reason) => assert_eq!(reason, "HTTP 500: boom"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_candidates_are_unparsable() {
        let endpoint = fake_endpoint(StatusCode::OK, r#"{"candidates":[]}"#);

        let err = service(endpoint).propose(&request()).await.unwrap_err();
        assert!(matches!(err, PlanningError::Unparsable { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn candidate_text_is_returned() {
        let endpoint = fake_endpoint(
            StatusCode::OK,
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"{\"tool_name\": \"note_maker\", "},{"text":"\"tool_args\": {}}"}]}}]}"#,
        );

        let text = service(endpoint).propose(&request()).await.unwrap();
        assert_eq!(text, r#"{"tool_name": "note_maker", "tool_args": {}}"#);
    }

    #[tokio::test]
    async fn refused_connection_is_unavailable() {
        let addr = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();

        let err = service(format!("http://{addr}/v1beta"))
            .propose(&request())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "unavailable");
    }

    #[test]
    fn prompt_lists_every_tool_and_the_context() {
        let registry = ToolRegistry::with_builtin_tools().unwrap();
        let request = ReasoningRequest {
            message: "help".to_string(),
            tools: registry.list_specs().into_iter().cloned().collect(),
            context: StudentContext::default(),
        };

        let prompt = build_system_prompt(&request);
        for spec in registry.list_specs() {
            assert!(prompt.contains(&spec.signature()));
        }
        assert!(prompt.contains("Photosynthesis"));
        assert!(prompt.contains("\"tool_name\""));
    }

    #[test]
    fn url_has_no_double_slash() {
        let service = GeminiService::new(
            "https://example.test/v1beta/".into(),
            "gemini-2.0-flash".into(),
            "key".into(),
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(
            service.url(),
            "https://example.test/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }
}
