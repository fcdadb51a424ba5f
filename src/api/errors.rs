//! Error types for the Gate API client

use std::time::Duration;

use http::StatusCode;
use thiserror::Error;

use crate::transport::TransportError;

/// Result alias used throughout the API layer
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors that can occur while talking to the API
///
/// A task that finishes with a failure status is not an error here; see
/// [`TaskOutcome`](crate::task::TaskOutcome).
#[derive(Error, Debug)]
pub enum ApiError {
    /// The call never produced a response
    #[error("{context}")]
    Transport {
        /// What was being attempted.
        context: String,
        /// Transport failure.
        #[source]
        source: TransportError,
    },

    /// The endpoint answered with a status it does not use for success
    #[error("{operation} failed: unexpected status {status}")]
    UnexpectedStatus {
        /// Operation that was attempted.
        operation: String,
        /// Status code received.
        status: StatusCode,
        /// Raw response body, kept for diagnosis.
        body: Vec<u8>,
    },

    /// A plan was rejected because the template or configuration is invalid
    #[error("pipeline template is invalid")]
    InvalidPipelineTemplate {
        /// Raw validation payload.
        body: Vec<u8>,
    },

    /// A response body did not match the expected schema
    #[error("decoding {context}")]
    Decode {
        /// What was being decoded.
        context: String,
        /// Decoder failure.
        #[source]
        source: serde_json::Error,
    },

    /// A request body could not be encoded
    #[error("encoding {context}")]
    Encode {
        /// What was being encoded.
        context: String,
        /// Encoder failure.
        #[source]
        source: serde_json::Error,
    },

    /// The task did not finish before the deadline
    #[error("timed out after {timeout:?} waiting for task {task_ref} to complete")]
    Timeout {
        /// Reference of the task being polled.
        task_ref: String,
        /// Deadline that elapsed.
        timeout: Duration,
    },

    /// A status fetch failed while polling a task
    #[error("failed polling task status")]
    Poll {
        /// Reference of the task being polled.
        task_ref: String,
        /// Failure of the individual fetch.
        #[source]
        source: Box<ApiError>,
    },

    /// An existence check answered neither "found" nor "not found"
    #[error("unable to determine state of {resource}, status: {status}")]
    IndeterminateState {
        /// Resource whose state was checked.
        resource: String,
        /// Status code received.
        status: StatusCode,
    },

    /// The caller supplied an unusable argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl ApiError {
    pub(crate) fn transport(context: impl Into<String>, source: TransportError) -> Self {
        Self::Transport {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn decode(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            context: context.into(),
            source,
        }
    }

    /// Raw server body carried by this error, if any
    #[must_use]
    pub fn body(&self) -> Option<&[u8]> {
        match self {
            Self::UnexpectedStatus { body, .. } | Self::InvalidPipelineTemplate { body } => {
                Some(body)
            }
            Self::Poll { source, .. } => source.body(),
            _ => None,
        }
    }

    /// Returns true for poll deadline errors
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Returns true for the plan "invalid template" signal
    #[must_use]
    pub fn is_invalid_template(&self) -> bool {
        matches!(self, Self::InvalidPipelineTemplate { .. })
    }
}
