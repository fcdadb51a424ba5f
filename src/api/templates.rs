//! Pipeline template operations
//!
//! Publishing checks whether the template already exists and then posts to
//! either the collection (create) or the template's own path (update). The
//! check and the post are two separate calls; a concurrent publisher can slip
//! in between, in which case the server resolves the conflict.

use async_trait::async_trait;
use http::StatusCode;
use serde_json::Value;
use tracing::debug;

use super::model::{JsonMap, TaskRef};
use super::{ApiError, ApiResult, GateClient, decode, expect_status};
use crate::transport::Transport;

/// Options for [`TemplateApi::publish_template`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishTemplateOptions {
    /// Do not re-plan pipelines that depend on the template
    pub skip_plan: bool,
    /// Overrides the template's `id`
    pub template_id: Option<String>,
    /// Overrides the template's `source`
    pub source: Option<String>,
}

/// Pipeline template management
#[async_trait]
#[allow(clippy::missing_errors_doc)]
pub trait TemplateApi: Send + Sync {
    /// Returns whether a template with `id` exists
    async fn template_exists(&self, id: &str) -> ApiResult<bool>;

    /// Creates or updates `template`; the change runs as a task
    async fn publish_template(
        &self,
        template: JsonMap,
        options: &PublishTemplateOptions,
    ) -> ApiResult<TaskRef>;

    /// Deletes the template `id`; the deletion runs as a task
    async fn delete_template(&self, id: &str) -> ApiResult<TaskRef>;
}

#[async_trait]
impl<T: Transport> TemplateApi for GateClient<T> {
    async fn template_exists(&self, id: &str) -> ApiResult<bool> {
        let url = self.resource_url(&["pipelineTemplates", id])?;
        let response = self.get("checking pipeline template", url.as_str()).await?;

        match response.status {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(ApiError::IndeterminateState {
                resource: format!("pipeline template {id}"),
                status,
            }),
        }
    }

    async fn publish_template(
        &self,
        mut template: JsonMap,
        options: &PublishTemplateOptions,
    ) -> ApiResult<TaskRef> {
        if let Some(id) = &options.template_id {
            template.insert("id".to_string(), Value::String(id.clone()));
        }
        if let Some(source) = &options.source {
            template.insert("source".to_string(), Value::String(source.clone()));
        }

        let id = match template.get("id") {
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            _ => {
                return Err(ApiError::InvalidArgument(
                    "pipeline template must have a string `id`".to_string(),
                ));
            }
        };

        let exists = self.template_exists(&id).await?;

        let mut url = if exists {
            self.resource_url(&["pipelineTemplates", id.as_str()])?
        } else {
            self.resource_url(&["pipelineTemplates"])?
        };
        if options.skip_plan {
            url.query_pairs_mut().append_pair("skipPlanDependents", "true");
        }
        debug!(template_id = %id, exists, url = %url, "Publishing pipeline template");

        let response = self
            .post_json("pipeline template publish", url.as_str(), &template)
            .await?;
        let response = expect_status(response, StatusCode::ACCEPTED, "create template request")?;
        decode(&response.body, "create template response")
    }

    async fn delete_template(&self, id: &str) -> ApiResult<TaskRef> {
        let url = self.resource_url(&["pipelineTemplates", id])?;
        let response = self.delete("delete request failed", url.as_str()).await?;
        let response = expect_status(response, StatusCode::ACCEPTED, "delete template request")?;
        decode(&response.body, "delete template response")
    }
}
