//! Plan and pipeline config operations

use async_trait::async_trait;
use http::StatusCode;

use super::model::{JsonMap, PipelineConfig, TemplatedPipelineRequest};
use super::{ApiError, ApiResult, GateClient, decode, expect_status};
use crate::transport::Transport;

/// Planning and pipeline config management
#[async_trait]
#[allow(clippy::missing_errors_doc)]
pub trait PipelineApi: Send + Sync {
    /// Resolves `configuration` (optionally against an inline `template`)
    /// without running it
    ///
    /// Returns the resolved pipeline JSON. A configuration the server
    /// rejects yields [`ApiError::InvalidPipelineTemplate`] carrying the
    /// validation payload; any other non-200 answer is
    /// [`ApiError::UnexpectedStatus`].
    async fn plan(&self, configuration: &JsonMap, template: Option<&JsonMap>) -> ApiResult<Vec<u8>>;

    /// Stored config `id` of `app`, or `None` if there is none
    async fn get_pipeline_config(&self, app: &str, id: &str) -> ApiResult<Option<PipelineConfig>>;

    /// Every stored config of `app`
    async fn list_pipeline_configs(&self, app: &str) -> ApiResult<Vec<PipelineConfig>>;

    /// Creates or updates a pipeline config
    async fn save_pipeline_config(&self, config: &PipelineConfig) -> ApiResult<()>;

    /// Deletes pipeline `id` of `app`
    async fn delete_pipeline(&self, app: &str, id: &str) -> ApiResult<()>;
}

#[async_trait]
impl<T: Transport> PipelineApi for GateClient<T> {
    async fn plan(&self, configuration: &JsonMap, template: Option<&JsonMap>) -> ApiResult<Vec<u8>> {
        let body = TemplatedPipelineRequest {
            kind: "templatedPipeline",
            config: configuration,
            template,
            plan: true,
        };

        let url = self.url("/pipelines/start");
        let response = self.post_json("pipeline template plan", &url, &body).await?;

        match response.status {
            StatusCode::OK => Ok(response.body),
            StatusCode::BAD_REQUEST => Err(ApiError::InvalidPipelineTemplate {
                body: response.body,
            }),
            status => Err(ApiError::UnexpectedStatus {
                operation: "plan request".to_string(),
                status,
                body: response.body,
            }),
        }
    }

    async fn get_pipeline_config(&self, app: &str, id: &str) -> ApiResult<Option<PipelineConfig>> {
        let url = self.resource_url(&["applications", app, "pipelineConfigs", id])?;
        let response = self.get("getting pipeline config", url.as_str()).await?;

        if response.status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = expect_status(response, StatusCode::OK, "get pipeline config")?;

        // A missing config can come back as 200 with an empty body
        if response.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }

        decode(&response.body, "pipeline config response").map(Some)
    }

    async fn list_pipeline_configs(&self, app: &str) -> ApiResult<Vec<PipelineConfig>> {
        let url = self.resource_url(&["applications", app, "pipelineConfigs"])?;
        let response = self.get("unable to get pipeline list", url.as_str()).await?;
        let response = expect_status(response, StatusCode::OK, "fetch pipeline list")?;
        decode(&response.body, "pipeline list")
    }

    async fn save_pipeline_config(&self, config: &PipelineConfig) -> ApiResult<()> {
        let url = self.url("/pipelines");
        let response = self.post_json("save pipeline config", &url, config).await?;
        expect_status(response, StatusCode::OK, "save pipeline request")?;
        Ok(())
    }

    async fn delete_pipeline(&self, app: &str, id: &str) -> ApiResult<()> {
        let url = self.resource_url(&["pipelines", app, id])?;
        let response = self.delete("delete pipeline config", url.as_str()).await?;
        expect_status(response, StatusCode::OK, "delete pipeline request")?;
        Ok(())
    }
}
