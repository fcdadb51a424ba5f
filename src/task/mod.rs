//! Following asynchronous tasks to completion
//!
//! [`TaskPoller`] turns a [`TaskRef`](crate::api::TaskRef) into a terminal
//! [`ExecutionResponse`](crate::api::ExecutionResponse); [`interpret`] then
//! decides whether that execution failed and extracts the server's error.

mod outcome;
mod poller;

pub use outcome::{EXCEPTION_VARIABLE, FailureDetail, TaskOutcome, extract_retrofit_error, interpret};
pub use poller::{DEFAULT_POLL_INTERVAL, TaskPoller};
