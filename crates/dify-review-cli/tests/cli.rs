//! Command tests: mocked console for `fetch`, temp files for `build`

use std::io::Write;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use clap::Parser;
use dify_review_cli::{run, CliError, ExitCode, ReviewCli};
use dify_trace::{item_id, ReviewTask, TASK_DESCRIPTION};
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// Far enough ahead that no refresh happens during the test
const FAR_FUTURE: i64 = 4_000_000_000;

fn make_token(exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(json!({ "exp": exp }).to_string());
    format!("{}.{}.sig", header, payload)
}

fn run_document() -> Value {
    json!({
        "data": [
            { "node_type": "start", "title": "Start", "inputs": { "sys.query": "What is Dify?" } },
            {
                "node_type": "llm",
                "title": "Answer",
                "elapsed_time": 1.5,
                "process_data": { "model_name": "gpt-4o" },
                "outputs": { "text": "A platform" }
            }
        ]
    })
}

fn fetch_cli(server: &MockServer, extra: &[&str]) -> ReviewCli {
    let uri = server.uri();
    let mut args = vec![
        "dify-review",
        "fetch",
        "--base-url",
        uri.as_str(),
        "--email",
        "ops@example.com",
        "--password",
        "hunter2",
        "--app-id",
        "app-1",
        "--run-id",
        "run-1",
    ];
    args.extend_from_slice(extra);
    ReviewCli::try_parse_from(args).unwrap()
}

async fn mount_login(server: &MockServer, access_token: &str) {
    Mock::given(method("POST"))
        .and(path("/console/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": "success",
            "data": { "access_token": access_token, "refresh_token": "refresh-1" }
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_fetch_builds_task_from_run() {
    let server = MockServer::start().await;
    let access = make_token(FAR_FUTURE);
    mount_login(&server, &access).await;

    let authorization = format!("Bearer {}", access);
    Mock::given(method("GET"))
        .and(path("/console/api/apps/app-1/workflow-runs/run-1/node-executions"))
        .and(header("Authorization", authorization.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(run_document()))
        .expect(1)
        .mount(&server)
        .await;

    let document = run(fetch_cli(&server, &[])).await.unwrap();
    let task: ReviewTask = serde_json::from_str(&document).unwrap();

    assert_eq!(task.task, TASK_DESCRIPTION);
    assert_eq!(task.prompt, "What is Dify?");
    assert_eq!(task.items.len(), 2);
    assert_eq!(task.items[0].title, "Answer-gpt-4o");
    assert_eq!(task.items[0].id, item_id("Answer-gpt-4o"));
}

#[tokio::test]
async fn test_fetch_envelope_format() {
    let server = MockServer::start().await;
    mount_login(&server, &make_token(FAR_FUTURE)).await;

    Mock::given(method("GET"))
        .and(path("/console/api/apps/app-1/workflow-runs/run-1/node-executions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(run_document()))
        .mount(&server)
        .await;

    let document = run(fetch_cli(&server, &["--format", "envelope"]))
        .await
        .unwrap();

    let envelope: Value = serde_json::from_str(&document).unwrap();
    let task: ReviewTask = serde_json::from_str(envelope["data"].as_str().unwrap()).unwrap();
    assert_eq!(task.prompt, "What is Dify?");
}

#[tokio::test]
async fn test_fetch_rejected_login() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/console/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": "fail",
            "message": "Invalid email or password"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(run_document()))
        .expect(0)
        .mount(&server)
        .await;

    let err = run(fetch_cli(&server, &[])).await.unwrap_err();
    assert_eq!(ExitCode::from_error(&err), ExitCode::AuthenticationError);
}

#[tokio::test]
async fn test_fetch_unknown_run() {
    let server = MockServer::start().await;
    mount_login(&server, &make_token(FAR_FUTURE)).await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("run not found"))
        .mount(&server)
        .await;

    let err = run(fetch_cli(&server, &[])).await.unwrap_err();
    assert_eq!(ExitCode::from_error(&err), ExitCode::RequestError);
    assert!(err.to_string().contains("404"));
}

#[tokio::test]
async fn test_build_from_json_file() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(file, "{}", run_document()).unwrap();

    let cli = ReviewCli::try_parse_from([
        "dify-review",
        "build",
        "--file",
        file.path().to_str().unwrap(),
    ])
    .unwrap();

    let task: ReviewTask = serde_json::from_str(&run(cli).await.unwrap()).unwrap();
    assert_eq!(task.items[0].title, "Answer-gpt-4o");
}

#[tokio::test]
async fn test_build_from_yaml_file() {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    writeln!(
        file,
        r#"- node_type: start
  inputs:
    sys.query: "Q"
- node_type: knowledge-retrieval
  title: Docs
  elapsed_time: 0.4
  outputs:
    result:
      - content: c
        title: t
        metadata:
          score: 0.9
"#
    )
    .unwrap();

    let cli = ReviewCli::try_parse_from([
        "dify-review",
        "build",
        "--file",
        file.path().to_str().unwrap(),
    ])
    .unwrap();

    let task: ReviewTask = serde_json::from_str(&run(cli).await.unwrap()).unwrap();
    assert_eq!(task.prompt, "Q");
    assert_eq!(task.items.len(), 1);
    assert_eq!(task.items[0].title, "Docs");
}

#[tokio::test]
async fn test_build_rejects_wrong_shape() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(file, "{}", json!({ "nodes": [] })).unwrap();

    let cli = ReviewCli::try_parse_from([
        "dify-review",
        "build",
        "--file",
        file.path().to_str().unwrap(),
    ])
    .unwrap();

    let err = run(cli).await.unwrap_err();
    assert!(matches!(err, CliError::Trace(_)));
    assert_eq!(ExitCode::from_error(&err), ExitCode::InvalidInput);
}

#[tokio::test]
async fn test_build_invalid_json() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(file, "not json").unwrap();

    let cli = ReviewCli::try_parse_from([
        "dify-review",
        "build",
        "--file",
        file.path().to_str().unwrap(),
    ])
    .unwrap();

    let err = run(cli).await.unwrap_err();
    assert!(matches!(err, CliError::Parse { .. }));
    assert_eq!(ExitCode::from_error(&err), ExitCode::FileError);
}
