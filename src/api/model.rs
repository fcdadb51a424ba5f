//! Wire types exchanged with the API
//!
//! Only the fields the client acts on are typed. Everything else is kept as
//! [`serde_json::Value`] and passed through.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Untyped JSON object, as loaded from a template or configuration file
pub type JsonMap = serde_json::Map<String, Value>;

/// Deserializes `null` as the type's default
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Handle to an asynchronous task accepted by the server
///
/// Deliberately not `Clone`: a reference is consumed by exactly one
/// poll-until-terminal cycle.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRef {
    #[serde(rename = "ref")]
    reference: String,
}

impl TaskRef {
    /// Wraps a reference string
    #[must_use]
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
        }
    }

    /// The reference, usually a path such as `/tasks/01H...`
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.reference
    }

    /// Returns true if the server sent an empty reference
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reference.trim().is_empty()
    }
}

impl fmt::Display for TaskRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reference)
    }
}

/// Status of an execution as reported by the orchestration engine
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExecutionStatus {
    /// Not started yet
    #[default]
    NotStarted,
    /// Executing
    Running,
    /// Paused by a user
    Paused,
    /// Waiting on an external signal
    Suspended,
    /// Completed successfully
    Succeeded,
    /// Failed, but configured to let the execution continue
    FailedContinue,
    /// Irrecoverably failed
    Terminal,
    /// Canceled
    Canceled,
    /// Stopped
    Stopped,
    /// Skipped
    Skipped,
    /// Queued behind another execution
    Buffered,
    /// Any value this client does not know
    Other(String),
}

impl ExecutionStatus {
    /// Wire representation
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::NotStarted => "NOT_STARTED",
            Self::Running => "RUNNING",
            Self::Paused => "PAUSED",
            Self::Suspended => "SUSPENDED",
            Self::Succeeded => "SUCCEEDED",
            Self::FailedContinue => "FAILED_CONTINUE",
            Self::Terminal => "TERMINAL",
            Self::Canceled => "CANCELED",
            Self::Stopped => "STOPPED",
            Self::Skipped => "SKIPPED",
            Self::Buffered => "BUFFERED",
            Self::Other(value) => value.as_str(),
        }
    }

    /// Returns true for the irrecoverable failure status
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Terminal)
    }
}

impl From<&str> for ExecutionStatus {
    fn from(value: &str) -> Self {
        match value {
            "NOT_STARTED" => Self::NotStarted,
            "RUNNING" => Self::Running,
            "PAUSED" => Self::Paused,
            "SUSPENDED" => Self::Suspended,
            "SUCCEEDED" => Self::Succeeded,
            "FAILED_CONTINUE" => Self::FailedContinue,
            "TERMINAL" => Self::Terminal,
            "CANCELED" => Self::Canceled,
            "STOPPED" => Self::Stopped,
            "SKIPPED" => Self::Skipped,
            "BUFFERED" => Self::Buffered,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ExecutionStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value: Option<String> = Option::deserialize(deserializer)?;
        Ok(value.as_deref().map(Self::from).unwrap_or_default())
    }
}

impl Serialize for ExecutionStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// Snapshot of a task taken by one status fetch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResponse {
    /// Execution id
    #[serde(default, deserialize_with = "nullable")]
    pub id: String,

    /// Execution name
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,

    /// Owning application
    #[serde(default, deserialize_with = "nullable")]
    pub application: String,

    /// Current status
    #[serde(default)]
    pub status: ExecutionStatus,

    /// Build timestamp (epoch millis)
    #[serde(default)]
    pub build_time: Option<i64>,

    /// Start timestamp (epoch millis)
    #[serde(default)]
    pub start_time: Option<i64>,

    /// End timestamp (epoch millis); absent or zero while running
    #[serde(default)]
    pub end_time: Option<i64>,

    /// Execution detail, passed through uninterpreted
    #[serde(default)]
    pub execution: Value,

    /// Step summaries
    #[serde(default, deserialize_with = "nullable")]
    pub steps: Vec<ExecutionStep>,

    /// Key/value variables attached to the execution
    #[serde(default, deserialize_with = "nullable")]
    pub variables: Vec<ExecutionVariable>,
}

impl ExecutionResponse {
    /// Returns true once an end time has been recorded
    ///
    /// This is the completion signal; the status string is not consulted.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.end_time.is_some_and(|end| end > 0)
    }

    /// First variable with the given key
    #[must_use]
    pub fn variable(&self, key: &str) -> Option<&ExecutionVariable> {
        self.variables.iter().find(|v| v.key == key)
    }
}

/// Summary of one execution step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionStep {
    /// Step id
    #[serde(default, deserialize_with = "nullable")]
    pub id: String,
    /// Step name
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    /// Start timestamp
    #[serde(default)]
    pub start_time: Option<i64>,
    /// End timestamp
    #[serde(default)]
    pub end_time: Option<i64>,
    /// Step status
    #[serde(default)]
    pub status: ExecutionStatus,
}

/// Key/value pair attached to an execution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionVariable {
    /// Variable key
    #[serde(default, deserialize_with = "nullable")]
    pub key: String,
    /// Arbitrary JSON value
    #[serde(default)]
    pub value: Value,
}

/// Error recorded by the server when one of its downstream calls failed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrofitErrorResponse {
    /// Short error string
    #[serde(default, deserialize_with = "nullable")]
    pub error: String,
    /// Error messages
    #[serde(default, deserialize_with = "nullable")]
    pub errors: Vec<String>,
    /// Error classification
    #[serde(default, deserialize_with = "nullable")]
    pub kind: String,
    /// Raw body returned by the failed downstream call
    #[serde(default, deserialize_with = "nullable")]
    pub response_body: String,
    /// Status code of the failed downstream call
    #[serde(default, deserialize_with = "nullable")]
    pub status: i64,
    /// URL of the failed downstream call
    #[serde(default, deserialize_with = "nullable")]
    pub url: String,
}

/// Shape of the `exception` variable's value
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ExceptionVariable {
    #[serde(default, deserialize_with = "nullable")]
    pub details: RetrofitErrorResponse,
}

/// Validation payload returned by a rejected plan
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplatedPipelineErrorResponse {
    /// Individual validation errors
    #[serde(default, deserialize_with = "nullable")]
    pub errors: Vec<TemplatedPipelineError>,
    /// Summary message
    #[serde(default, deserialize_with = "nullable")]
    pub message: String,
    /// Status label
    #[serde(default, deserialize_with = "nullable")]
    pub status: String,
}

/// A single template validation error, possibly with nested causes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplatedPipelineError {
    /// Where in the template or configuration the error is
    #[serde(default, deserialize_with = "nullable")]
    pub location: String,
    /// What is wrong
    #[serde(default, deserialize_with = "nullable")]
    pub message: String,
    /// How to fix it
    #[serde(default, deserialize_with = "nullable")]
    pub suggestion: String,
    /// Underlying cause
    #[serde(default, deserialize_with = "nullable")]
    pub cause: String,
    /// Severity label
    #[serde(default, deserialize_with = "nullable")]
    pub severity: String,
    /// Extra detail
    #[serde(default, deserialize_with = "nullable")]
    pub detail: BTreeMap<String, Value>,
    /// Errors nested under this one
    #[serde(default, deserialize_with = "nullable")]
    pub nested_errors: Vec<TemplatedPipelineError>,
}

/// Body of `POST /pipelines/start`
#[derive(Debug, Serialize)]
pub(crate) struct TemplatedPipelineRequest<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub config: &'a JsonMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<&'a JsonMap>,
    pub plan: bool,
}

/// Orchestration task submitted to an application
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    /// Target application
    pub application: String,
    /// Human-readable description
    pub description: String,
    /// Jobs run by the task
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub job: Vec<TaskJob>,
}

impl Task {
    /// Task creating `name`, owned by `email`
    #[must_use]
    pub fn create_application(name: &str, email: &str) -> Self {
        Self {
            application: name.to_string(),
            description: format!("Create Application: {name}"),
            job: vec![TaskJob::CreateApplication {
                application: ApplicationAttributes {
                    name: name.to_string(),
                    email: Some(email.to_string()),
                },
            }],
        }
    }

    /// Task deleting `name`
    #[must_use]
    pub fn delete_application(name: &str) -> Self {
        Self {
            application: name.to_string(),
            description: format!("Delete Application: {name}"),
            job: vec![TaskJob::DeleteApplication {
                application: ApplicationAttributes {
                    name: name.to_string(),
                    email: None,
                },
            }],
        }
    }
}

/// A job inside a [`Task`], tagged by its `type`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TaskJob {
    /// Creates an application
    CreateApplication {
        /// Application to create.
        application: ApplicationAttributes,
    },
    /// Deletes an application
    DeleteApplication {
        /// Application to delete.
        application: ApplicationAttributes,
    },
}

/// Application attributes carried by application jobs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationAttributes {
    /// Application name
    pub name: String,
    /// Owner email
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Entry of the application list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationInfo {
    /// Application name
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
}

/// Stored pipeline configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineConfig {
    /// Config id; absent for a new pipeline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Pipeline type, e.g. `templatedPipeline`
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Pipeline name
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    /// Owning application
    #[serde(default, deserialize_with = "nullable")]
    pub application: String,
    /// Description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Execution engine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_engine: Option<String>,
    /// Run stages in parallel
    #[serde(default, deserialize_with = "nullable")]
    pub parallel: bool,
    /// Limit concurrent executions
    #[serde(default, deserialize_with = "nullable")]
    pub limit_concurrent: bool,
    /// Keep waiting executions queued
    #[serde(default, deserialize_with = "nullable")]
    pub keep_waiting_pipelines: bool,
    /// Stage definitions
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Vec::is_empty")]
    pub stages: Vec<JsonMap>,
    /// Trigger definitions
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Vec::is_empty")]
    pub triggers: Vec<JsonMap>,
    /// Parameter definitions
    #[serde(
        default,
        rename = "parameterConfig",
        deserialize_with = "nullable",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub parameters: Vec<JsonMap>,
    /// Notification definitions
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Vec::is_empty")]
    pub notifications: Vec<JsonMap>,
    /// Last editor
    #[serde(default, deserialize_with = "nullable")]
    pub last_modified_by: String,
    /// Templated pipeline configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
    /// Last update timestamp
    #[serde(default)]
    pub update_ts: Option<Value>,
}
