//! Pipeline template publish, delete and plan

use tracing::{info, warn};

use super::{TaskReport, TaskRunner};
use crate::api::{
    ApiError, ApiResult, JsonMap, PipelineApi, PublishTemplateOptions, TaskApi, TemplateApi,
    TemplatedPipelineErrorResponse,
};

/// Publishes `template`, creating or updating it
///
/// # Errors
///
/// Fails when the template has no usable id, the existence check is
/// inconclusive, the submission is rejected, or polling fails.
pub async fn publish_template<C>(
    client: &C,
    runner: &TaskRunner,
    template: JsonMap,
    options: &PublishTemplateOptions,
) -> ApiResult<TaskReport>
where
    C: TemplateApi + TaskApi + ?Sized,
{
    info!("Publishing template");
    let task_ref = client.publish_template(template, options).await?;
    runner.follow(client, task_ref).await
}

/// Deletes template `id`
///
/// # Errors
///
/// Fails when the submission is rejected or polling fails.
pub async fn delete_template<C>(client: &C, runner: &TaskRunner, id: &str) -> ApiResult<TaskReport>
where
    C: TemplateApi + TaskApi + ?Sized,
{
    if id.trim().is_empty() {
        return Err(ApiError::InvalidArgument(
            "pipeline template id is required".to_string(),
        ));
    }
    info!(template_id = id, "Deleting template");
    let task_ref = client.delete_template(id).await?;
    runner.follow(client, task_ref).await
}

/// Answer to a plan request
#[derive(Debug, Clone, PartialEq)]
pub enum PlanReport {
    /// Resolved pipeline JSON
    Planned(Vec<u8>),
    /// The configuration or template is invalid
    Rejected {
        /// Raw validation payload
        body: Vec<u8>,
        /// Decoded payload; `None` when it does not match the error schema
        errors: Option<TemplatedPipelineErrorResponse>,
    },
}

/// Plans `configuration`, optionally against an inline `template`
///
/// A validation rejection is a [`PlanReport::Rejected`], not an error.
///
/// # Errors
///
/// Transport failures and any non-200, non-400 answer.
pub async fn plan<C>(
    client: &C,
    configuration: &JsonMap,
    template: Option<&JsonMap>,
) -> ApiResult<PlanReport>
where
    C: PipelineApi + ?Sized,
{
    match client.plan(configuration, template).await {
        Ok(body) => Ok(PlanReport::Planned(body)),
        Err(ApiError::InvalidPipelineTemplate { body }) => {
            let errors = match serde_json::from_slice::<TemplatedPipelineErrorResponse>(&body) {
                Ok(errors) => Some(errors),
                Err(e) => {
                    warn!(error = %e, "Could not decode validation errors");
                    None
                }
            };
            Ok(PlanReport::Rejected { body, errors })
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::GateClient;
    use crate::ops::MonitorOptions;
    use crate::task::{TaskOutcome, TaskPoller};
    use crate::transport::testing::ScriptedTransport;
    use serde_json::{Value, json};
    use std::time::Duration;

    fn map(value: Value) -> JsonMap {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_publish_polls_until_success() {
        let client = GateClient::new(
            "https://gate",
            ScriptedTransport::new()
                .respond(404, "")
                .respond(202, r#"{"ref": "/tasks/123"}"#)
                .respond(200, r#"{"endTime": 0}"#)
                .respond(200, r#"{"endTime": 0}"#)
                .respond(200, r#"{"endTime": 0}"#)
                .respond(200, r#"{"endTime": 1500, "status": "SUCCEEDED"}"#),
        );
        let started = tokio::time::Instant::now();

        let report = publish_template(
            &client,
            &TaskRunner::new(MonitorOptions::default()),
            map(json!({"schema": "1", "id": "wait"})),
            &PublishTemplateOptions::default(),
        )
        .await
        .unwrap();

        let TaskReport::Finished(outcome) = report else {
            panic!("expected a followed task");
        };
        assert!(matches!(outcome, TaskOutcome::Succeeded(_)));
        assert_eq!(client.transport().requests().len(), 6);
        assert_eq!(started.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_template_times_out() {
        let mut transport = ScriptedTransport::new().respond(202, r#"{"ref": "/tasks/9"}"#);
        for _ in 0..10 {
            transport = transport.respond(200, r#"{"endTime": 0}"#);
        }
        let client = GateClient::new("https://gate", transport);
        let runner = TaskRunner::new(MonitorOptions {
            monitor: true,
            timeout: Duration::from_secs(3),
        })
        .with_poller(TaskPoller::new());

        let err = delete_template(&client, &runner, "wait").await.unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn test_plan_success_returns_body() {
        let client = GateClient::new(
            "https://gate",
            ScriptedTransport::new().respond(200, r#"{"stages": []}"#),
        );
        let report = plan(&client, &map(json!({"schema": "1"})), None).await.unwrap();
        assert_eq!(report, PlanReport::Planned(br#"{"stages": []}"#.to_vec()));
    }

    #[tokio::test]
    async fn test_plan_rejection_decodes_errors() {
        let payload = json!({
            "errors": [{"location": "configuration:stages", "message": "stage missing"}],
            "message": "Pipeline template is invalid",
            "status": "BAD_REQUEST"
        });
        let client = GateClient::new(
            "https://gate",
            ScriptedTransport::new().respond_json(400, &payload),
        );

        let report = plan(&client, &JsonMap::new(), None).await.unwrap();
        let PlanReport::Rejected { body, errors } = report else {
            panic!("expected a rejection");
        };
        assert_eq!(body, payload.to_string().into_bytes());
        assert_eq!(errors.unwrap().errors[0].message, "stage missing");
    }

    #[tokio::test]
    async fn test_plan_rejection_with_unreadable_payload_keeps_body() {
        let client = GateClient::new("https://gate", ScriptedTransport::new().respond(400, "nope"));
        let report = plan(&client, &JsonMap::new(), None).await.unwrap();
        assert_eq!(
            report,
            PlanReport::Rejected {
                body: b"nope".to_vec(),
                errors: None
            }
        );
    }

    #[tokio::test]
    async fn test_plan_server_error_is_error() {
        let client = GateClient::new("https://gate", ScriptedTransport::new().respond(502, ""));
        let err = plan(&client, &JsonMap::new(), None).await.unwrap_err();
        assert!(matches!(err, ApiError::UnexpectedStatus { .. }));
    }
}
