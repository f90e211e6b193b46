//! Educational tools and the schema types describing them.
//!
//! Every tool is a struct implementing [`Tool`]; the set shipped with the
//! service is closed and registered by [`ToolRegistry::with_builtin_tools`].

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::error::ToolError;
use crate::models::ToolArgs;

pub mod explainer;
pub mod flashcards;
pub mod note_maker;
pub mod registry;
pub mod validator;

pub use registry::ToolRegistry;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParameterKind {
    String,
    Integer {
        #[serde(skip_serializing_if = "Option::is_none")]
        min: Option<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max: Option<i64>,
    },
    Boolean,
    Enum { allowed: Vec<String> },
}

impl ParameterKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            ParameterKind::String => "string",
            ParameterKind::Integer { .. } => "integer",
            ParameterKind::Boolean => "boolean",
            ParameterKind::Enum { .. } => "enum",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterSpec {
    pub name: String,
    pub description: String,
    pub kind: ParameterKind,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl ParameterSpec {
    fn new(name: &str, kind: ParameterKind) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            kind,
            required: false,
            default: None,
        }
    }

    pub fn string(name: &str) -> Self {
        Self::new(name, ParameterKind::String)
    }

    pub fn integer(name: &str) -> Self {
        Self::new(name, ParameterKind::Integer { min: None, max: None })
    }

    pub fn boolean(name: &str) -> Self {
        Self::new(name, ParameterKind::Boolean)
    }

    pub fn enumeration(name: &str, allowed: &[&str]) -> Self {
        Self::new(
            name,
            ParameterKind::Enum {
                allowed: allowed.iter().map(|v| v.to_string()).collect(),
            },
        )
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Inclusive bounds; only meaningful for integer parameters.
    pub fn range(mut self, lo: i64, hi: i64) -> Self {
        if let ParameterKind::Integer { min, max } = &mut self.kind {
            *min = Some(lo);
            *max = Some(hi);
        }
        self
    }

    /// Compact form used in prompts, e.g. `count: integer[1..=20]`.
    pub fn signature(&self) -> String {
        let ty = match &self.kind {
            ParameterKind::Integer {
                min: Some(lo),
                max: Some(hi),
            } => format!("integer[{lo}..={hi}]"),
            ParameterKind::Enum { allowed } => format!("enum[{}]", allowed.join("|")),
            other => other.type_name().to_string(),
        };
        let marker = if self.required { "" } else { "?" };
        format!("{}{}: {}", self.name, marker, ty)
    }
}

/// Static schema of a tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ParameterSpec>,
}

impl ToolSpec {
    pub fn new(name: &str, description: &str, parameters: Vec<ParameterSpec>) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            parameters,
        }
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn signature(&self) -> String {
        let params: Vec<String> = self.parameters.iter().map(ParameterSpec::signature).collect();
        format!("{}({})", self.name, params.join(", "))
    }
}

/// A named capability with a fixed parameter schema.
///
/// `invoke` only ever receives arguments that passed
/// [`validator::validate`] against `spec()`.
#[async_trait]
pub trait Tool: Send + Sync {
    fn spec(&self) -> &ToolSpec;

    async fn invoke(&self, args: &ToolArgs) -> Result<Value, ToolError>;
}

// Accessors for validated arguments.

pub(crate) fn str_arg<'a>(tool: &str, args: &'a ToolArgs, name: &str) -> Result<&'a str, ToolError> {
    args.get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| ToolError::new(tool, format!("argument {name} is not a string")))
}

pub(crate) fn int_arg(tool: &str, args: &ToolArgs, name: &str) -> Result<i64, ToolError> {
    args.get(name)
        .and_then(Value::as_i64)
        .ok_or_else(|| ToolError::new(tool, format!("argument {name} is not an integer")))
}

pub(crate) fn bool_arg(args: &ToolArgs, name: &str) -> bool {
    args.get(name).and_then(Value::as_bool).unwrap_or(false)
}

pub(crate) fn opt_str_arg<'a>(args: &'a ToolArgs, name: &str) -> Option<&'a str> {
    args.get(name).and_then(Value::as_str)
}
