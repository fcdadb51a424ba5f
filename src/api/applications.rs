//! Application operations

use async_trait::async_trait;
use http::StatusCode;

use super::model::{ApplicationInfo, Task, TaskRef};
use super::{ApiError, ApiResult, GateClient, decode, expect_status};
use crate::transport::Transport;

/// Application tasks and lookups
#[async_trait]
#[allow(clippy::missing_errors_doc)]
pub trait ApplicationApi: Send + Sync {
    /// Submits an orchestration task for `app` and returns its reference
    async fn submit_task(&self, app: &str, task: &Task) -> ApiResult<TaskRef>;

    /// Raw application document, or `None` when it does not exist or is
    /// not visible to the caller
    async fn get_application(&self, app: &str) -> ApiResult<Option<Vec<u8>>>;

    /// Every application visible to the caller
    async fn list_applications(&self) -> ApiResult<Vec<ApplicationInfo>>;
}

#[async_trait]
impl<T: Transport> ApplicationApi for GateClient<T> {
    async fn submit_task(&self, app: &str, task: &Task) -> ApiResult<TaskRef> {
        let url = self.resource_url(&["applications", app, "tasks"])?;
        let response = self
            .post_json("create application submit task", url.as_str(), task)
            .await?;
        let response = expect_status(response, StatusCode::OK, "submit task")?;
        decode(&response.body, "task create response")
    }

    async fn get_application(&self, app: &str) -> ApiResult<Option<Vec<u8>>> {
        let url = self.resource_url(&["applications", app])?;
        let response = self.get("unable to get application info", url.as_str()).await?;

        match response.status {
            StatusCode::OK => Ok(Some(response.body)),
            StatusCode::NOT_FOUND | StatusCode::FORBIDDEN => Ok(None),
            status => Err(ApiError::IndeterminateState {
                resource: format!("application {app}"),
                status,
            }),
        }
    }

    async fn list_applications(&self) -> ApiResult<Vec<ApplicationInfo>> {
        let url = self.url("/applications");
        let response = self.get("unable to get application list", &url).await?;
        let response = expect_status(response, StatusCode::OK, "fetch application list")?;
        decode(&response.body, "application list")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::testing::ScriptedTransport;
    use http::Method;
    use serde_json::json;

    fn client(transport: ScriptedTransport) -> GateClient<ScriptedTransport> {
        GateClient::new("https://gate", transport)
    }

    #[tokio::test]
    async fn test_submit_task_posts_to_application_tasks() {
        let client = client(ScriptedTransport::new().respond(200, r#"{"ref": "/tasks/123"}"#));
        let task = Task::create_application("myapp", "me@example.com");

        let task_ref = client.submit_task("myapp", &task).await.unwrap();
        assert_eq!(task_ref.as_str(), "/tasks/123");

        let requests = client.transport().requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::POST);
        assert_eq!(requests[0].url, "https://gate/applications/myapp/tasks");
        assert_eq!(
            requests[0].json.as_ref().unwrap()["job"][0]["type"],
            json!("createApplication")
        );
    }

    #[tokio::test]
    async fn test_application_name_is_percent_encoded() {
        let client = client(ScriptedTransport::new().respond(404, ""));
        client.get_application("my app/x").await.unwrap();
        assert_eq!(
            client.transport().requests()[0].url,
            "https://gate/applications/my%20app%2Fx"
        );
    }

    #[tokio::test]
    async fn test_submit_task_rejects_non_200() {
        let client = client(ScriptedTransport::new().respond(202, r#"{"ref": "/tasks/123"}"#));
        let err = client
            .submit_task("myapp", &Task::delete_application("myapp"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ApiError::UnexpectedStatus { status: StatusCode::ACCEPTED, .. }
        ));
    }

    #[tokio::test]
    async fn test_submit_task_undecodable_ref() {
        let client = client(ScriptedTransport::new().respond(200, "not json"));
        let err = client
            .submit_task("myapp", &Task::delete_application("myapp"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_get_application_absent_on_404_and_403() {
        let client = client(ScriptedTransport::new().respond(404, "").respond(403, ""));
        assert!(client.get_application("a").await.unwrap().is_none());
        assert!(client.get_application("a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_application_indeterminate_on_500() {
        let client = client(ScriptedTransport::new().respond(500, "oops"));
        let err = client.get_application("a").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "unable to determine state of application a, status: 500 Internal Server Error"
        );
    }

    #[tokio::test]
    async fn test_list_applications() {
        let client = client(
            ScriptedTransport::new()
                .respond_json(200, &json!([{"name": "alpha"}, {"name": "beta", "email": "x"}])),
        );
        let apps = client.list_applications().await.unwrap();
        let names: Vec<_> = apps.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["alpha", "beta"]);
    }
}
