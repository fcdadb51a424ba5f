//! Application create/delete tasks

use tracing::info;

use super::{TaskReport, TaskRunner};
use crate::api::{ApiError, ApiResult, ApplicationApi, Task, TaskApi};

/// Creates application `name` owned by `email`
///
/// # Errors
///
/// Fails on an empty name, a rejected submission, or a poll failure. A task
/// that ends in failure is reported through [`TaskReport`], not as an error.
pub async fn create_application<C>(
    client: &C,
    runner: &TaskRunner,
    name: &str,
    email: &str,
) -> ApiResult<TaskReport>
where
    C: ApplicationApi + TaskApi + ?Sized,
{
    require_name(name)?;
    info!(app = name, "Sending create app task");

    let task = Task::create_application(name, email);
    let task_ref = client.submit_task(name, &task).await?;
    runner.follow(client, task_ref).await
}

/// Deletes application `name`
///
/// # Errors
///
/// Same as [`create_application`].
pub async fn delete_application<C>(
    client: &C,
    runner: &TaskRunner,
    name: &str,
) -> ApiResult<TaskReport>
where
    C: ApplicationApi + TaskApi + ?Sized,
{
    require_name(name)?;
    info!(app = name, "Sending delete app task");

    let task = Task::delete_application(name);
    let task_ref = client.submit_task(name, &task).await?;
    runner.follow(client, task_ref).await
}

fn require_name(name: &str) -> ApiResult<()> {
    if name.trim().is_empty() {
        return Err(ApiError::InvalidArgument(
            "application name is required".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::GateClient;
    use crate::ops::MonitorOptions;
    use crate::task::{FailureDetail, TaskOutcome};
    use crate::transport::testing::ScriptedTransport;
    use serde_json::json;

    #[tokio::test(start_paused = true)]
    async fn test_create_application_terminal_with_exception() {
        let terminal = json!({
            "endTime": 1500,
            "status": "TERMINAL",
            "variables": [{"key": "exception", "value": {"details": {
                "error": "Bad Request",
                "status": 400,
                "url": "http://front50/v2/applications",
                "responseBody": "{\"message\": \"application exists\"}"
            }}}]
        });
        let client = GateClient::new(
            "https://gate",
            ScriptedTransport::new()
                .respond(200, r#"{"ref": "/tasks/42"}"#)
                .respond_json(200, &terminal),
        );

        let report = create_application(
            &client,
            &TaskRunner::new(MonitorOptions::default()),
            "myapp",
            "me@example.com",
        )
        .await
        .unwrap();

        let TaskReport::Finished(TaskOutcome::Failed { detail, .. }) = report else {
            panic!("expected a failed task");
        };
        let FailureDetail::Structured(details) = detail else {
            panic!("expected structured detail");
        };
        assert_eq!(details.status, 400);
        assert_eq!(details.response_body, r#"{"message": "application exists"}"#);

        let requests = client.transport().requests();
        assert_eq!(requests[0].url, "https://gate/applications/myapp/tasks");
        assert_eq!(requests[1].url, "https://gate/tasks/42");
    }

    #[tokio::test]
    async fn test_delete_application_submits_delete_job() {
        let client = GateClient::new(
            "https://gate",
            ScriptedTransport::new()
                .respond(200, r#"{"ref": "/tasks/7"}"#)
                .respond(200, r#"{"endTime": 10, "status": "SUCCEEDED"}"#),
        );

        let report = delete_application(&client, &TaskRunner::default(), "myapp")
            .await
            .unwrap();
        assert!(report.is_success());

        let body = client.transport().requests()[0].json.clone().unwrap();
        assert_eq!(body["job"][0]["type"], json!("deleteApplication"));
    }

    #[tokio::test]
    async fn test_empty_name_is_rejected_before_submission() {
        let client = GateClient::new("https://gate", ScriptedTransport::new());
        let err = create_application(&client, &TaskRunner::default(), " ", "me@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidArgument(_)));
        assert!(client.transport().requests().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_submission_skips_polling() {
        let client = GateClient::new(
            "https://gate",
            ScriptedTransport::new().respond(500, "internal"),
        );
        let err = create_application(&client, &TaskRunner::default(), "myapp", "me@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::UnexpectedStatus { .. }));
        assert_eq!(client.transport().requests().len(), 1);
    }
}
