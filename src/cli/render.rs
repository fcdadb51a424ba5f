//! Terminal rendering of API payloads

use std::fmt::Write as _;

use deckhand::api::{
    ApiError, ExecutionResponse, TemplatedPipelineError, TemplatedPipelineErrorResponse,
};
use deckhand::task::FailureDetail;
use tracing::warn;

/// Indents a JSON document; falls back to the raw text when it does not parse
pub fn pretty_json(raw: &[u8]) -> String {
    match serde_json::from_slice::<serde_json::Value>(raw)
        .and_then(|value| serde_json::to_string_pretty(&value))
    {
        Ok(pretty) => pretty,
        Err(e) => {
            warn!(error = %e, "failed prettifying response");
            String::from_utf8_lossy(raw).into_owned()
        }
    }
}

/// Server body carried by the first API error in `err`'s chain
///
/// `None` when no call in the chain got a response, or the response was
/// empty.
pub fn error_body(err: &anyhow::Error) -> Option<String> {
    let body = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<ApiError>())
        .and_then(ApiError::body)?;
    if body.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    Some(pretty_json(body))
}

/// Describes why a task failed
pub fn task_failure(execution: &ExecutionResponse, detail: &FailureDetail) -> String {
    match detail {
        FailureDetail::Structured(details) if !details.response_body.is_empty() => {
            pretty_json(details.response_body.as_bytes())
        }
        FailureDetail::Structured(details) => to_pretty(details),
        FailureDetail::Malformed { reason, raw } => {
            warn!(reason = %reason, "Task exception has an unexpected shape");
            format!("{}\n{}", to_pretty(raw), to_pretty(execution))
        }
        FailureDetail::Unavailable => to_pretty(execution),
    }
}

/// Renders plan validation errors as an indented tree
pub fn validation_errors(response: &TemplatedPipelineErrorResponse) -> String {
    let mut out = String::new();
    match (response.message.is_empty(), response.status.is_empty()) {
        (false, false) => {
            let _ = writeln!(out, "{} ({})", response.message, response.status);
        }
        (false, true) => {
            let _ = writeln!(out, "{}", response.message);
        }
        _ => {}
    }
    for error in &response.errors {
        write_error(&mut out, error, 0);
    }
    out
}

fn write_error(out: &mut String, error: &TemplatedPipelineError, depth: usize) {
    let indent = "  ".repeat(depth);
    let severity = if error.severity.is_empty() {
        String::new()
    } else {
        format!("[{}] ", error.severity)
    };

    if error.location.is_empty() {
        let _ = writeln!(out, "{indent}- {severity}{}", error.message);
    } else {
        let _ = writeln!(out, "{indent}- {severity}{}: {}", error.location, error.message);
    }
    if !error.cause.is_empty() {
        let _ = writeln!(out, "{indent}    cause: {}", error.cause);
    }
    if !error.suggestion.is_empty() {
        let _ = writeln!(out, "{indent}    suggestion: {}", error.suggestion);
    }
    for (key, value) in &error.detail {
        let _ = writeln!(out, "{indent}    {key}: {value}");
    }
    for nested in &error.nested_errors {
        write_error(out, nested, depth + 1);
    }
}

fn to_pretty<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("<unprintable: {e}>"))
}
