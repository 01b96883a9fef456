use crate::fence::strip_fence;
use portfix_types::plan::MigrationPlan;
use serde_json::{Map, Value};
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// A plan proposal that does not satisfy the plan contract.
///
/// Carries the JSON-path of the offending field and the raw payload so the
/// operator can see exactly what the oracle returned.
#[derive(Debug, Clone, Error)]
#[error("invalid migration plan at {path}: {reason}")]
pub struct ValidationError {
    pub path: String,
    pub reason: String,
    pub raw: String,
}

#[derive(Debug, Clone)]
pub struct ValidateOptions {
    /// Reject plans with no file mappings. Disable only for dependency-only plans.
    pub require_mappings: bool,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            require_mappings: true,
        }
    }
}

pub fn validate_plan(raw: &str) -> Result<MigrationPlan, ValidationError> {
    validate_plan_with(raw, &ValidateOptions::default())
}

/// Strip one fence layer, parse, and check `raw` against the plan contract.
pub fn validate_plan_with(
    raw: &str,
    opts: &ValidateOptions,
) -> Result<MigrationPlan, ValidationError> {
    let fail = |path: String, reason: String| ValidationError {
        path,
        reason,
        raw: raw.to_string(),
    };

    let body = strip_fence(raw).trim();
    let value: Value = serde_json::from_str(body)
        .map_err(|e| fail("$".to_string(), format!("not valid JSON: {e}")))?;

    check_shape(&value).map_err(|(path, reason)| fail(path, reason))?;

    let plan: MigrationPlan = serde_json::from_value(value)
        .map_err(|e| fail("$".to_string(), format!("does not match the plan schema: {e}")))?;

    check_semantics(&plan, opts).map_err(|(path, reason)| fail(path, reason))?;

    debug!(
        project = %plan.project_name,
        dependencies = plan.dependencies.len(),
        mappings = plan.file_mappings.len(),
        "plan validated"
    );
    Ok(plan)
}

type Issue = (String, String);

fn check_shape(value: &Value) -> Result<(), Issue> {
    let root = value
        .as_object()
        .ok_or_else(|| ("$".to_string(), "expected a JSON object".to_string()))?;

    require_string(root, "$", "project_name")?;
    for key in ["group_id", "artifact_id", "java_version", "spring_boot_version"] {
        optional_string(root, "$", key)?;
    }

    let deps = require(root, "$", "dependencies")?
        .as_array()
        .ok_or_else(|| ("$.dependencies".to_string(), "expected an array".to_string()))?;
    for (i, dep) in deps.iter().enumerate() {
        let at = format!("$.dependencies[{i}]");
        let obj = dep
            .as_object()
            .ok_or_else(|| (at.clone(), "expected an object".to_string()))?;
        require_string(obj, &at, "group_id")?;
        require_string(obj, &at, "artifact_id")?;
        nullable_string(obj, &at, "version")?;
        optional_string(obj, &at, "scope")?;
    }

    let mappings = require(root, "$", "file_mappings")?
        .as_array()
        .ok_or_else(|| ("$.file_mappings".to_string(), "expected an array".to_string()))?;
    for (i, mapping) in mappings.iter().enumerate() {
        let at = format!("$.file_mappings[{i}]");
        let obj = mapping
            .as_object()
            .ok_or_else(|| (at.clone(), "expected an object".to_string()))?;
        for key in ["source_file", "target_path", "package_name"] {
            require_string(obj, &at, key)?;
        }
    }

    let props = require(root, "$", "application_properties")?
        .as_object()
        .ok_or_else(|| {
            (
                "$.application_properties".to_string(),
                "expected an object".to_string(),
            )
        })?;
    for (key, v) in props {
        if !v.is_string() {
            return Err((
                format!("$.application_properties[{key:?}]"),
                format!("expected a string, found {}", type_name(v)),
            ));
        }
    }

    Ok(())
}

fn check_semantics(plan: &MigrationPlan, opts: &ValidateOptions) -> Result<(), Issue> {
    if opts.require_mappings && plan.file_mappings.is_empty() {
        return Err((
            "$.file_mappings".to_string(),
            "must contain at least one mapping".to_string(),
        ));
    }

    for (i, dep) in plan.dependencies.iter().enumerate() {
        if dep.group_id.trim().is_empty() {
            return Err((
                format!("$.dependencies[{i}].group_id"),
                "must not be empty".to_string(),
            ));
        }
        if dep.artifact_id.trim().is_empty() {
            return Err((
                format!("$.dependencies[{i}].artifact_id"),
                "must not be empty".to_string(),
            ));
        }
    }

    let mut sources: HashMap<&str, usize> = HashMap::new();
    let mut targets: HashMap<String, usize> = HashMap::new();
    for (i, m) in plan.file_mappings.iter().enumerate() {
        for (key, v) in [
            ("source_file", &m.source_file),
            ("target_path", &m.target_path),
            ("package_name", &m.package_name),
        ] {
            if v.trim().is_empty() {
                return Err((
                    format!("$.file_mappings[{i}].{key}"),
                    "must not be empty".to_string(),
                ));
            }
        }

        if let Some(first) = sources.insert(m.source_file.as_str(), i) {
            return Err((
                format!("$.file_mappings[{i}].source_file"),
                format!(
                    "duplicate source file '{}' (also mapped at index {first})",
                    m.source_file
                ),
            ));
        }
        let Some(target) = contained_target(&m.target_path) else {
            return Err((
                format!("$.file_mappings[{i}].target_path"),
                format!(
                    "'{}' must be a relative path inside the output root",
                    m.target_path
                ),
            ));
        };
        if let Some(first) = targets.insert(target, i) {
            return Err((
                format!("$.file_mappings[{i}].target_path"),
                format!(
                    "duplicate target path '{}' (also produced at index {first})",
                    m.target_path
                ),
            ));
        }
    }

    Ok(())
}

/// `target` as a `/`-separated path with `.` and empty segments removed, or
/// `None` when it is absolute or has a `..` segment.
pub fn contained_target(target: &str) -> Option<String> {
    let absolute = target.starts_with(['/', '\\'])
        || target.get(1..2) == Some(":")
        || std::path::Path::new(target).is_absolute();
    if absolute {
        return None;
    }

    let mut segments = Vec::new();
    for segment in target.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => return None,
            s => segments.push(s),
        }
    }
    if segments.is_empty() {
        return None;
    }
    Some(segments.join("/"))
}

fn require<'a>(obj: &'a Map<String, Value>, at: &str, key: &str) -> Result<&'a Value, Issue> {
    obj.get(key)
        .ok_or_else(|| (format!("{at}.{key}"), "required field is missing".to_string()))
}

fn require_string(obj: &Map<String, Value>, at: &str, key: &str) -> Result<(), Issue> {
    let v = require(obj, at, key)?;
    if v.is_string() {
        Ok(())
    } else {
        Err((
            format!("{at}.{key}"),
            format!("expected a string, found {}", type_name(v)),
        ))
    }
}

fn optional_string(obj: &Map<String, Value>, at: &str, key: &str) -> Result<(), Issue> {
    match obj.get(key) {
        None | Some(Value::String(_)) => Ok(()),
        Some(v) => Err((
            format!("{at}.{key}"),
            format!("expected a string, found {}", type_name(v)),
        )),
    }
}

/// Like `optional_string`, but `null` is also accepted.
fn nullable_string(obj: &Map<String, Value>, at: &str, key: &str) -> Result<(), Issue> {
    match obj.get(key) {
        None | Some(Value::Null) | Some(Value::String(_)) => Ok(()),
        Some(v) => Err((
            format!("{at}.{key}"),
            format!("expected a string, found {}", type_name(v)),
        )),
    }
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
