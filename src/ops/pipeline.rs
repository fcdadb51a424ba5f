//! Pipeline config saves
//!
//! A save looks up an existing config with the same application and name
//! first; if one exists its id is reused so the save updates in place.

use serde_json::Value;
use tracing::{debug, warn};

use crate::api::{ApiError, ApiResult, JsonMap, PipelineApi, PipelineConfig};

const TEMPLATED_PIPELINE: &str = "templatedPipeline";

/// Maps a templated pipeline configuration onto a pipeline config
///
/// The configuration is kept whole under `config`. Concurrency flags come
/// from `configuration.concurrentExecutions`: `parallel` and
/// `limitConcurrent` default to true, `keepWaitingPipelines` to false.
///
/// # Errors
///
/// [`ApiError::InvalidArgument`] when `pipeline.application` or
/// `pipeline.name` is missing.
pub fn templated_pipeline_config(configuration: &JsonMap) -> ApiResult<PipelineConfig> {
    if !configuration.contains_key("schema") {
        warn!("Pipeline save command currently only supports pipeline template configurations");
    }

    let pipeline = configuration.get("pipeline").and_then(Value::as_object);
    let field = |key: &str| {
        pipeline
            .and_then(|p| p.get(key))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let application = field("application").ok_or_else(|| {
        ApiError::InvalidArgument("configuration is missing pipeline.application".to_string())
    })?;
    let name = field("name").ok_or_else(|| {
        ApiError::InvalidArgument("configuration is missing pipeline.name".to_string())
    })?;

    let settings = configuration.get("configuration").and_then(Value::as_object);
    let concurrency = |key: &str, default: bool| {
        settings
            .and_then(|s| s.get("concurrentExecutions"))
            .and_then(|c| c.get(key))
            .and_then(Value::as_bool)
            .unwrap_or(default)
    };

    Ok(PipelineConfig {
        id: field("pipelineConfigId"),
        kind: Some(TEMPLATED_PIPELINE.to_string()),
        description: settings
            .and_then(|s| s.get("description"))
            .and_then(Value::as_str)
            .map(str::to_string),
        parallel: concurrency("parallel", true),
        limit_concurrent: concurrency("limitConcurrent", true),
        keep_waiting_pipelines: concurrency("keepWaitingPipelines", false),
        config: Some(Value::Object(configuration.clone())),
        application,
        name,
        ..PipelineConfig::default()
    })
}

/// Saves `config`, reusing the id of an existing config with the same name
///
/// Returns the payload that was sent.
///
/// # Errors
///
/// Fails when the lookup or the save call fails.
pub async fn save_pipeline<C>(client: &C, mut config: PipelineConfig) -> ApiResult<PipelineConfig>
where
    C: PipelineApi + ?Sized,
{
    if config.application.is_empty() || config.name.is_empty() {
        return Err(ApiError::InvalidArgument(
            "pipeline application and name are required".to_string(),
        ));
    }

    if let Some(existing) = client
        .get_pipeline_config(&config.application, &config.name)
        .await?
    {
        debug!(id = ?existing.id, "Updating existing pipeline config");
        config.id = existing.id;
    }

    client.save_pipeline_config(&config).await?;
    Ok(config)
}

/// Saves a templated pipeline configuration
///
/// # Errors
///
/// See [`templated_pipeline_config`] and [`save_pipeline`].
pub async fn save_templated_pipeline<C>(client: &C, configuration: &JsonMap) -> ApiResult<PipelineConfig>
where
    C: PipelineApi + ?Sized,
{
    let config = templated_pipeline_config(configuration)?;
    save_pipeline(client, config).await
}
