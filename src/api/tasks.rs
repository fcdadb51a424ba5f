//! Task status

use async_trait::async_trait;
use http::StatusCode;
use tracing::warn;
use url::Url;

use super::model::{ExecutionResponse, TaskRef};
use super::{ApiError, ApiResult, GateClient, decode, expect_status};
use crate::transport::Transport;

/// Read access to asynchronous tasks
#[async_trait]
#[allow(clippy::missing_errors_doc)]
pub trait TaskApi: Send + Sync {
    /// Fetches one snapshot of the task behind `task_ref`
    ///
    /// An absolute reference must point at the client's own endpoint.
    async fn get_task(&self, task_ref: &TaskRef) -> ApiResult<ExecutionResponse>;
}

#[async_trait]
impl<T: Transport> TaskApi for GateClient<T> {
    async fn get_task(&self, task_ref: &TaskRef) -> ApiResult<ExecutionResponse> {
        let reference = task_ref.as_str();
        let url = if reference.starts_with("http://") || reference.starts_with("https://") {
            let absolute = Url::parse(reference).map_err(|e| {
                ApiError::InvalidArgument(format!("invalid task reference {reference}: {e}"))
            })?;
            if absolute.origin() != self.endpoint_url()?.origin() {
                warn!(task_ref = reference, endpoint = %self.endpoint, "Task reference points at another host");
                return Err(ApiError::InvalidArgument(format!(
                    "task reference {reference} is not served by {}",
                    self.endpoint
                )));
            }
            String::from(absolute)
        } else {
            self.url(reference)
        };

        let response = self.get("getting task status", &url).await?;
        let response = expect_status(response, StatusCode::OK, "get task status")?;
        decode(&response.body, "task status response")
    }
}
