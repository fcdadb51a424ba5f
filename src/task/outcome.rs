//! Interpretation of a finished task

use serde::Deserialize;
use serde_json::Value;

use crate::api::model::ExceptionVariable;
use crate::api::{ExecutionResponse, ExecutionStatus, RetrofitErrorResponse};

/// Key of the execution variable holding a server-side failure
pub const EXCEPTION_VARIABLE: &str = "exception";

/// What a terminal snapshot means for the caller
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome {
    /// The task did not fail
    Succeeded(ExecutionResponse),
    /// The task ended in a failure status
    Failed {
        /// The terminal snapshot
        execution: ExecutionResponse,
        /// Structured failure, when the server recorded one
        detail: FailureDetail,
    },
}

impl TaskOutcome {
    /// Returns true for [`TaskOutcome::Succeeded`]
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }

    /// The terminal snapshot, whatever the outcome
    #[must_use]
    pub fn execution(&self) -> &ExecutionResponse {
        match self {
            Self::Succeeded(execution) | Self::Failed { execution, .. } => execution,
        }
    }

    /// Final status
    #[must_use]
    pub fn status(&self) -> &ExecutionStatus {
        &self.execution().status
    }
}

/// Failure information extracted from a failed execution
#[derive(Debug, Clone, PartialEq)]
pub enum FailureDetail {
    /// The `exception` variable decoded cleanly
    Structured(RetrofitErrorResponse),
    /// The `exception` variable exists but has an unexpected shape
    Malformed {
        /// Decoder message
        reason: String,
        /// The variable's raw value
        raw: Value,
    },
    /// No `exception` variable was recorded
    Unavailable,
}

/// Classifies a terminal snapshot
///
/// Only [`ExecutionStatus::Terminal`] is a failure; any other status,
/// including ones this client does not know, counts as success.
#[must_use]
pub fn interpret(execution: ExecutionResponse) -> TaskOutcome {
    if !execution.status.is_failure() {
        return TaskOutcome::Succeeded(execution);
    }

    let detail = match execution.variable(EXCEPTION_VARIABLE) {
        None => FailureDetail::Unavailable,
        Some(variable) => match decode_exception(&variable.value) {
            Ok(details) => FailureDetail::Structured(details),
            Err(e) => FailureDetail::Malformed {
                reason: e.to_string(),
                raw: variable.value.clone(),
            },
        },
    };

    TaskOutcome::Failed { execution, detail }
}

/// Decodes `details` of the first `exception` variable
///
/// Returns `None` when the execution has no such variable.
#[must_use]
pub fn extract_retrofit_error(
    execution: &ExecutionResponse,
) -> Option<Result<RetrofitErrorResponse, serde_json::Error>> {
    execution
        .variable(EXCEPTION_VARIABLE)
        .map(|variable| decode_exception(&variable.value))
}

fn decode_exception(value: &Value) -> Result<RetrofitErrorResponse, serde_json::Error> {
    ExceptionVariable::deserialize(value).map(|exception| exception.details)
}
