//! # deckhand - a client for the Spinnaker Gate API
//!
//! deckhand manages applications, pipeline configs and pipeline templates.
//! Most operations are a single request; the ones the server runs as
//! asynchronous tasks (application create/delete, template publish/delete)
//! are followed to completion by polling.
//!
//! ## Layers
//!
//! - [`transport`]: one HTTP attempt per call, returning status and raw body
//! - [`api`]: wire model, error taxonomy and [`GateClient`], whose
//!   operations are grouped into capability traits
//! - [`task`]: [`TaskPoller`] and the result interpreter
//! - [`ops`]: operation drivers combining the above
//! - [`infrastructure`]: configuration and logging
//!
//! ## Example
//!
//! ```no_run
//! use deckhand::prelude::*;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::new("https://gate.example.com".parse()?);
//! let client = GateClient::from_config(&config)?;
//! let runner = TaskRunner::new(MonitorOptions::default());
//!
//! let report = create_application(&client, &runner, "myapp", "me@example.com").await?;
//! assert!(report.is_success());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod api;
pub mod infrastructure;
pub mod ops;
pub mod task;
pub mod transport;

// Prelude module for common imports
pub mod prelude;

// Re-export commonly used types
pub use api::{
    ApiError, ApiResult, ApplicationApi, ExecutionResponse, ExecutionStatus, GateClient,
    PipelineApi, RetrofitErrorResponse, SessionApi, TaskApi, TaskRef, TemplateApi,
};
pub use infrastructure::{Config, ConfigError};
pub use ops::{MonitorOptions, PlanReport, TaskReport, TaskRunner};
pub use task::{FailureDetail, TaskOutcome, TaskPoller, interpret};
pub use transport::{ClientConfig, ReqwestTransport, Transport, TransportError};

/// Version of the deckhand crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
