//! End-to-end tests of the reqwest transport against a local HTTP server

use std::time::Duration;

use deckhand::prelude::*;
use mockito::{Matcher, Server};
use serde_json::{Value, json};

fn client_for(server: &Server, config: impl FnOnce(ClientConfig) -> ClientConfig) -> GateClient {
    let base = ClientConfig::new(server.url().parse().unwrap());
    GateClient::from_config(&config(base)).unwrap()
}

fn fast_runner() -> TaskRunner {
    TaskRunner::new(MonitorOptions {
        monitor: true,
        timeout: Duration::from_secs(10),
    })
    .with_poller(TaskPoller::new().with_interval(Duration::from_millis(10)))
}

fn map(value: Value) -> JsonMap {
    match value {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn test_bearer_token_sent_with_task_submission() {
    let mut server = Server::new_async().await;
    let submit = server
        .mock("POST", "/applications/myapp/tasks")
        .match_header("authorization", "Bearer iap-token")
        .match_body(Matcher::PartialJson(json!({
            "application": "myapp",
            "description": "Create Application: myapp"
        })))
        .with_status(200)
        .with_body(r#"{"ref": "/tasks/1"}"#)
        .create_async()
        .await;

    let client = client_for(&server, |c| c.with_bearer_token("iap-token"));
    let runner = TaskRunner::new(MonitorOptions {
        monitor: false,
        ..MonitorOptions::default()
    });

    let report = create_application(&client, &runner, "myapp", "me@example.com")
        .await
        .unwrap();

    submit.assert_async().await;
    assert_eq!(report, TaskReport::Submitted(TaskRef::new("/tasks/1")));
}

#[tokio::test]
async fn test_session_cookie_sent() {
    let mut server = Server::new_async().await;
    let list = server
        .mock("GET", "/applications")
        .match_header("cookie", "SESSION=abc123")
        .with_status(200)
        .with_body(r#"[{"name": "alpha"}, {"name": "beta"}]"#)
        .create_async()
        .await;

    let client = client_for(&server, |c| c.with_session("abc123"));
    let apps = client.list_applications().await.unwrap();

    list.assert_async().await;
    let names: Vec<_> = apps.into_iter().map(|a| a.name).collect();
    assert_eq!(names, vec!["alpha", "beta"]);
}

#[tokio::test]
async fn test_login_posts_urlencoded_form() {
    let mut server = Server::new_async().await;
    let login = server
        .mock("POST", "/login")
        .match_header("content-type", "application/x-www-form-urlencoded")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("username".into(), "alice".into()),
            Matcher::UrlEncoded("password".into(), "p@ss word".into()),
            Matcher::UrlEncoded("submit".into(), "Login".into()),
        ]))
        .with_status(200)
        .create_async()
        .await;

    let client = client_for(&server, |c| c);
    client.login("alice", "p@ss word").await.unwrap();

    login.assert_async().await;
}

#[tokio::test]
async fn test_publish_then_poll_to_success() {
    let mut server = Server::new_async().await;
    let exists = server
        .mock("GET", "/pipelineTemplates/wait")
        .with_status(404)
        .create_async()
        .await;
    let publish = server
        .mock("POST", "/pipelineTemplates")
        .match_body(Matcher::PartialJson(json!({"id": "wait", "schema": "1"})))
        .with_status(202)
        .with_body(r#"{"ref": "/tasks/123"}"#)
        .create_async()
        .await;
    let poll = server
        .mock("GET", "/tasks/123")
        .with_status(200)
        .with_body(r#"{"endTime": 1500, "status": "SUCCEEDED"}"#)
        .create_async()
        .await;

    let client = client_for(&server, |c| c);
    let report = publish_template(
        &client,
        &fast_runner(),
        map(json!({"schema": "1", "id": "wait", "stages": []})),
        &PublishTemplateOptions::default(),
    )
    .await
    .unwrap();

    exists.assert_async().await;
    publish.assert_async().await;
    poll.assert_async().await;
    assert!(matches!(report, TaskReport::Finished(TaskOutcome::Succeeded(_))));
}

#[tokio::test]
async fn test_publish_existing_template_with_skip_plan() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/pipelineTemplates/wait")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;
    let update = server
        .mock("POST", "/pipelineTemplates/wait")
        .match_query(Matcher::UrlEncoded("skipPlanDependents".into(), "true".into()))
        .with_status(202)
        .with_body(r#"{"ref": "/tasks/5"}"#)
        .create_async()
        .await;

    let client = client_for(&server, |c| c);
    let options = PublishTemplateOptions {
        skip_plan: true,
        ..PublishTemplateOptions::default()
    };
    let task_ref = client
        .publish_template(map(json!({"id": "wait"})), &options)
        .await
        .unwrap();

    update.assert_async().await;
    assert_eq!(task_ref.as_str(), "/tasks/5");
}

#[tokio::test]
async fn test_terminal_task_exposes_retrofit_error() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/applications/myapp/tasks")
        .with_status(200)
        .with_body(r#"{"ref": "/tasks/9"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/tasks/9")
        .with_status(200)
        .with_body(
            json!({
                "endTime": 1500,
                "status": "TERMINAL",
                "variables": [{"key": "exception", "value": {"details": {
                    "error": "Bad Request",
                    "status": 400,
                    "url": "http://front50/v2/applications",
                    "responseBody": "{\"message\":\"invalid email\"}"
                }}}]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server, |c| c);
    let report = create_application(&client, &fast_runner(), "myapp", "nope")
        .await
        .unwrap();

    let TaskReport::Finished(TaskOutcome::Failed { execution, detail }) = report else {
        panic!("expected a failed task");
    };
    assert_eq!(execution.status, ExecutionStatus::Terminal);
    let FailureDetail::Structured(details) = detail else {
        panic!("expected a structured failure");
    };
    assert_eq!(details.error, "Bad Request");
    assert_eq!(details.status, 400);
    assert_eq!(details.response_body, r#"{"message":"invalid email"}"#);
}

#[tokio::test]
async fn test_plan_rejection_returns_validation_payload() {
    let mut server = Server::new_async().await;
    let payload = json!({
        "errors": [{"location": "configuration:stages", "message": "stage is missing a type"}],
        "message": "Pipeline template is invalid",
        "status": "BAD_REQUEST"
    });
    let plan_mock = server
        .mock("POST", "/pipelines/start")
        .match_body(Matcher::PartialJson(json!({"type": "templatedPipeline", "plan": true})))
        .with_status(400)
        .with_body(payload.to_string())
        .create_async()
        .await;

    let client = client_for(&server, |c| c);
    let report = plan(&client, &map(json!({"schema": "1"})), None).await.unwrap();

    plan_mock.assert_async().await;
    let PlanReport::Rejected { body, errors } = report else {
        panic!("expected a rejection");
    };
    assert_eq!(body, payload.to_string().into_bytes());
    assert_eq!(errors.unwrap().errors[0].message, "stage is missing a type");
}

#[tokio::test]
async fn test_plan_success_returns_pipeline() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/pipelines/start")
        .with_status(200)
        .with_body(r#"{"stages": [{"type": "wait"}]}"#)
        .create_async()
        .await;

    let client = client_for(&server, |c| c);
    let report = plan(&client, &map(json!({"schema": "1"})), None).await.unwrap();

    assert_eq!(
        report,
        PlanReport::Planned(br#"{"stages": [{"type": "wait"}]}"#.to_vec())
    );
}

#[tokio::test]
async fn test_unexpected_status_keeps_body() {
    let mut server = Server::new_async().await;
    server
        .mock("DELETE", "/pipelines/myapp/deploy")
        .with_status(500)
        .with_body("kaboom")
        .create_async()
        .await;

    let client = client_for(&server, |c| c);
    let err = client.delete_pipeline("myapp", "deploy").await.unwrap_err();

    assert!(matches!(err, ApiError::UnexpectedStatus { .. }));
    assert_eq!(err.body(), Some(&b"kaboom"[..]));
}

#[tokio::test]
async fn test_connection_failure_is_transport_error() {
    let config = ClientConfig::new("http://127.0.0.1:1".parse().unwrap())
        .with_request_timeout(Duration::from_secs(2));
    let client = GateClient::from_config(&config).unwrap();

    let err = client.list_applications().await.unwrap_err();
    assert!(matches!(err, ApiError::Transport { .. }));
}
