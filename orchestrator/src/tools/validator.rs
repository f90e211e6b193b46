//! Argument validation against a [`ToolSpec`].
//!
//! Parameters are checked in declaration order and the first failure wins, so
//! error reporting is deterministic. Arguments the tool does not declare are
//! dropped. Output is canonical: validating it again yields the same map.

use serde_json::Value;
use tracing::debug;

use super::{ParameterKind, ParameterSpec, ToolSpec};
use crate::error::ValidationError;
use crate::models::ToolArgs;

pub fn validate(spec: &ToolSpec, raw_args: &ToolArgs) -> Result<ToolArgs, ValidationError> {
    let mut validated = ToolArgs::new();

    for param in &spec.parameters {
        match raw_args.get(&param.name).filter(|v| !v.is_null()) {
            Some(value) => {
                validated.insert(param.name.clone(), check(param, value)?);
            }
            None if param.required => {
                return Err(ValidationError::MissingRequiredParameter {
                    parameter: param.name.clone(),
                });
            }
            None => {
                if let Some(default) = &param.default {
                    validated.insert(param.name.clone(), default.clone());
                }
            }
        }
    }

    for extra in raw_args.keys().filter(|k| spec.parameter(k).is_none()) {
        debug!("Dropping undeclared argument {} for {}", extra, spec.name);
    }

    Ok(validated)
}

fn check(param: &ParameterSpec, value: &Value) -> Result<Value, ValidationError> {
    let type_error = || ValidationError::InvalidParameterType {
        parameter: param.name.clone(),
        expected: param.kind.type_name().to_string(),
    };

    match &param.kind {
        ParameterKind::String => value
            .as_str()
            .map(|s| Value::String(s.to_string()))
            .ok_or_else(type_error),
        ParameterKind::Boolean => coerce_bool(value).map(Value::Bool).ok_or_else(type_error),
        ParameterKind::Integer { min, max } => {
            let n = coerce_int(value).ok_or_else(type_error)?;
            let lo = min.unwrap_or(i64::MIN);
            let hi = max.unwrap_or(i64::MAX);
            if n < lo || n > hi {
                return Err(ValidationError::ParameterOutOfRange {
                    parameter: param.name.clone(),
                    min: lo,
                    max: hi,
                });
            }
            Ok(Value::from(n))
        }
        ParameterKind::Enum { allowed } => {
            let raw = value.as_str().ok_or_else(type_error)?.trim();
            allowed
                .iter()
                .find(|candidate| candidate.eq_ignore_ascii_case(raw))
                .map(|canonical| Value::String(canonical.clone()))
                .ok_or_else(|| ValidationError::InvalidEnumValue {
                    parameter: param.name.clone(),
                    allowed: allowed.clone(),
                })
        }
    }
}

fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            // integral floats only, and only inside i64 range so the cast is exact
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" => Some(true),
            "false" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}
