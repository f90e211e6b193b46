use std::time::Duration;

use thiserror::Error;
use warp::http::StatusCode;
use warp::{reject::Reject, Rejection, Reply};

/// Registry configuration errors. These indicate a programming error and are
/// fatal at startup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("tool already registered: {0}")]
    DuplicateTool(String),

    #[error("tool {tool} declares parameter {parameter} more than once")]
    DuplicateParameter { tool: String, parameter: String },

    #[error("unknown tool: {0}")]
    UnknownTool(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required parameter: {parameter}")]
    MissingRequiredParameter { parameter: String },

    #[error("parameter {parameter} must be of type {expected}")]
    InvalidParameterType { parameter: String, expected: String },

    #[error("parameter {parameter} must be one of [{}]", allowed.join(", "))]
    InvalidEnumValue { parameter: String, allowed: Vec<String> },

    #[error("parameter {parameter} must be between {min} and {max}")]
    ParameterOutOfRange { parameter: String, min: i64, max: i64 },
}

impl ValidationError {
    pub fn parameter(&self) -> &str {
        match self {
            ValidationError::MissingRequiredParameter { parameter }
            | ValidationError::InvalidParameterType { parameter, .. }
            | ValidationError::InvalidEnumValue { parameter, .. }
            | ValidationError::ParameterOutOfRange { parameter, .. } => parameter,
        }
    }
}

/// Model-driven planner failures. Always recovered by the rule-based planner.
#[derive(Error, Debug)]
pub enum PlanningError {
    #[error("reasoning service unavailable: {0}")]
    Unavailable(String),

    #[error("reasoning service timed out after {0:?}")]
    Timeout(Duration),

    #[error("unparsable plan: {reason}")]
    Unparsable { reason: String, raw: String },
}

impl PlanningError {
    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            PlanningError::Unavailable(_) => "unavailable",
            PlanningError::Timeout(_) => "timeout",
            PlanningError::Unparsable { .. } => "unparsable",
        }
    }
}

/// Raised by a tool implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("tool {tool} failed: {reason}")]
pub struct ToolError {
    pub tool: String,
    pub reason: String,
}

impl ToolError {
    pub fn new(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            reason: reason.into(),
        }
    }
}

/// Errors the executor propagates instead of capturing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutorError {
    #[error(transparent)]
    UnknownTool(#[from] RegistryError),

    #[error(transparent)]
    InvalidArguments(#[from] ValidationError),
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,
}

impl Reject for ApiError {}

pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Rejection> {
    let (code, message, details) = if let Some(api_err) = err.find::<ApiError>() {
        match api_err {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "Bad request", api_err.to_string()),
            ApiError::RateLimitExceeded => (
                StatusCode::TOO_MANY_REQUESTS,
                "Rate limit exceeded",
                api_err.to_string(),
            ),
        }
    } else if let Some(query_err) = err.find::<warp::reject::InvalidQuery>() {
        (StatusCode::BAD_REQUEST, "Bad request", query_err.to_string())
    } else if let Some(body_err) = err.find::<warp::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, "Bad request", body_err.to_string())
    } else {
        return Err(err);
    };

    let json = warp::reply::json(&serde_json::json!({
        "error": message,
        "details": details,
    }));

    Ok(warp::reply::with_status(json, code))
}
