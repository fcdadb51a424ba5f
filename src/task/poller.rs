//! Poll-until-terminal loop for asynchronous tasks
//!
//! Fetches are strictly sequential: a fetch is fully checked before the next
//! interval starts. A snapshot with an end time is terminal whatever its
//! status says. The deadline also bounds an in-flight fetch, so a hung
//! status call cannot push the poller past `timeout`.

use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::api::{ApiError, ApiResult, ExecutionResponse, TaskApi, TaskRef};

/// Delay between two status fetches
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Deadline used when `now + timeout` is not representable
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Waits for tasks to reach a terminal state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskPoller {
    interval: Duration,
}

impl TaskPoller {
    /// Creates a poller with the default one-second interval
    #[must_use]
    pub fn new() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Sets the delay between fetches
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Delay between fetches
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Polls `task_ref` until it completes or `timeout` elapses
    ///
    /// The first fetch is issued immediately. Consumes the reference: a
    /// task is followed exactly once.
    ///
    /// # Errors
    ///
    /// - [`ApiError::InvalidArgument`] for an empty reference or a zero
    ///   timeout or interval
    /// - [`ApiError::Poll`] wrapping the first failed fetch; failed fetches
    ///   are not retried
    /// - [`ApiError::Timeout`] when the deadline passes first
    pub async fn wait<A>(
        &self,
        tasks: &A,
        task_ref: TaskRef,
        timeout: Duration,
    ) -> ApiResult<ExecutionResponse>
    where
        A: TaskApi + ?Sized,
    {
        if task_ref.is_empty() {
            return Err(ApiError::InvalidArgument("empty task reference".to_string()));
        }
        if timeout.is_zero() {
            return Err(ApiError::InvalidArgument(
                "task timeout must be positive".to_string(),
            ));
        }
        if self.interval.is_zero() {
            return Err(ApiError::InvalidArgument(
                "poll interval must be positive".to_string(),
            ));
        }

        info!(task_ref = %task_ref, "Waiting for task to complete...");

        let now = Instant::now();
        let deadline = now.checked_add(timeout).unwrap_or(now + FAR_FUTURE);
        let timed_out = || ApiError::Timeout {
            task_ref: task_ref.to_string(),
            timeout,
        };

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let execution = match tokio::time::timeout_at(deadline, tasks.get_task(&task_ref)).await
            {
                Ok(fetched) => fetched.map_err(|e| ApiError::Poll {
                    task_ref: task_ref.to_string(),
                    source: Box::new(e),
                })?,
                Err(_) => return Err(timed_out()),
            };

            if execution.is_complete() {
                debug!(task_ref = %task_ref, status = %execution.status, "Task reached a terminal state");
                return Ok(execution);
            }

            if Instant::now() >= deadline {
                return Err(timed_out());
            }

            debug!(status = %execution.status, "Polling task");
        }
    }
}

impl Default for TaskPoller {
    fn default() -> Self {
        Self::new()
    }
}
