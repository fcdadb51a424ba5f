//! Operation drivers
//!
//! Each asynchronous operation submits one request, receives a task
//! reference and hands it to a [`TaskRunner`], which polls it (unless
//! monitoring is off) and interprets the terminal execution. Plans and
//! pipeline config writes are synchronous and return directly.

mod application;
mod pipeline;
mod template;

use std::time::Duration;

use tracing::{error, info};

use crate::api::{ApiResult, TaskApi, TaskRef};
use crate::task::{TaskOutcome, TaskPoller, interpret};

pub use application::{create_application, delete_application};
pub use pipeline::{save_pipeline, save_templated_pipeline, templated_pipeline_config};
pub use template::{PlanReport, delete_template, plan, publish_template};

/// Default time allowed for a task to finish
pub const DEFAULT_TASK_TIMEOUT: Duration = Duration::from_secs(60);

/// How asynchronous operations are followed after submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorOptions {
    /// Poll the task until it finishes
    pub monitor: bool,
    /// Deadline for the task to finish
    pub timeout: Duration,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        Self {
            monitor: true,
            timeout: DEFAULT_TASK_TIMEOUT,
        }
    }
}

/// Result of an asynchronous operation
#[derive(Debug, PartialEq)]
pub enum TaskReport {
    /// Submitted, not followed
    Submitted(TaskRef),
    /// Followed to a terminal state
    Finished(TaskOutcome),
}

impl TaskReport {
    /// Returns false only for a task that finished in failure
    #[must_use]
    pub fn is_success(&self) -> bool {
        match self {
            Self::Submitted(_) => true,
            Self::Finished(outcome) => outcome.is_success(),
        }
    }
}

/// Follows submitted tasks according to [`MonitorOptions`]
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskRunner {
    poller: TaskPoller,
    options: MonitorOptions,
}

impl TaskRunner {
    /// Creates a runner with the default poll interval
    #[must_use]
    pub fn new(options: MonitorOptions) -> Self {
        Self {
            poller: TaskPoller::new(),
            options,
        }
    }

    /// Replaces the poller
    #[must_use]
    pub fn with_poller(mut self, poller: TaskPoller) -> Self {
        self.poller = poller;
        self
    }

    /// Active options
    #[must_use]
    pub fn options(&self) -> &MonitorOptions {
        &self.options
    }

    /// Polls `task_ref` to completion and interprets the result
    ///
    /// # Errors
    ///
    /// Propagates poller failures: timeout, failed fetch, bad arguments.
    pub async fn follow<A>(&self, tasks: &A, task_ref: TaskRef) -> ApiResult<TaskReport>
    where
        A: TaskApi + ?Sized,
    {
        if !self.options.monitor {
            info!(task_ref = %task_ref, "Task submitted, not monitoring");
            return Ok(TaskReport::Submitted(task_ref));
        }

        let execution = self.poller.wait(tasks, task_ref, self.options.timeout).await?;
        let outcome = interpret(execution);

        if outcome.is_success() {
            info!(status = %outcome.status(), "Task completed");
        } else {
            error!(status = %outcome.status(), "Task failed");
        }
        Ok(TaskReport::Finished(outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::GateClient;
    use crate::task::FailureDetail;
    use crate::transport::testing::ScriptedTransport;

    #[tokio::test]
    async fn test_no_monitor_returns_reference_without_fetching() {
        let client = GateClient::new("https://gate", ScriptedTransport::new());
        let runner = TaskRunner::new(MonitorOptions {
            monitor: false,
            ..MonitorOptions::default()
        });

        let report = runner.follow(&client, TaskRef::new("/tasks/1")).await.unwrap();

        assert_eq!(report, TaskReport::Submitted(TaskRef::new("/tasks/1")));
        assert!(report.is_success());
        assert!(client.transport().requests().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_follow_interprets_terminal_execution() {
        let client = GateClient::new(
            "https://gate",
            ScriptedTransport::new()
                .respond(200, r#"{"endTime": 0}"#)
                .respond(200, r#"{"endTime": 5, "status": "TERMINAL"}"#),
        );
        let runner = TaskRunner::new(MonitorOptions::default());

        let report = runner.follow(&client, TaskRef::new("/tasks/1")).await.unwrap();

        assert!(!report.is_success());
        assert!(matches!(
            report,
            TaskReport::Finished(TaskOutcome::Failed { detail: FailureDetail::Unavailable, .. })
        ));
        assert_eq!(client.transport().requests().len(), 2);
    }
}
