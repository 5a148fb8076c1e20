//! End-to-end tests for the HTTP surface, driven against a server spawned on
//! an ephemeral port with a mock completion backend.

use std::sync::Arc;

use serde_json::Value;
use tempfile::TempDir;

use prompt_chain::backend::MockBackend;
use prompt_chain::client::CompletionClient;
use prompt_chain::config::CompletionConfig;
use prompt_chain::server::upload::UploadConfig;
use prompt_chain::server::{self, AppState};

struct TestServer {
    base_url: String,
    uploads_dir: std::path::PathBuf,
    handle: tokio::task::JoinHandle<()>,
    _workspace: TempDir,
}

impl TestServer {
    /// Spawn the app with canned model responses and an upload cap.
    async fn start(responses: Vec<&str>, max_upload_bytes: u64) -> Self {
        let workspace = TempDir::new().expect("temp workspace should be created");
        let uploads_dir = workspace.path().join("uploads");

        let client = Arc::new(CompletionClient::with_backend(
            CompletionConfig::new("sk-test"),
            Arc::new(MockBackend::new(
                responses.into_iter().map(String::from).collect(),
            )),
        ));
        let state = AppState::new(
            client,
            UploadConfig::new(uploads_dir.clone()).with_max_bytes(max_upload_bytes),
        );
        let app = server::router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("ephemeral listener should bind");
        let port = listener
            .local_addr()
            .expect("listener should expose local address")
            .port();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("server run");
        });

        Self {
            base_url: format!("http://127.0.0.1:{port}"),
            uploads_dir,
            handle,
            _workspace: workspace,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn stored_uploads(&self) -> Vec<String> {
        match std::fs::read_dir(&self.uploads_dir) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect(),
            Err(_) => Vec::new(),
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// ── liveness ──

#[tokio::test]
async fn index_and_health_respond() {
    let server = TestServer::start(vec!["unused"], 1024).await;
    let client = reqwest::Client::new();

    let resp = client.get(server.url("/")).send().await.unwrap();
    assert_eq!(resp.status(), 200);

    let resp = client.get(server.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

// ── /task/parse ──

#[tokio::test]
async fn task_parse_returns_ordered_tasks() {
    let server =
        TestServer::start(vec![r#"["设计数据库表结构", "实现登录接口", "编写集成测试"]"#], 1024)
            .await;

    let resp = reqwest::Client::new()
        .post(server.url("/task/parse"))
        .json(&serde_json::json!({"prompt": "做一个带登录的博客系统"}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let tasks = body["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 3);
    assert_eq!(tasks[0], "设计数据库表结构");
    assert_eq!(tasks[2], "编写集成测试");
}

#[tokio::test]
async fn task_parse_rejects_unparseable_model_output() {
    let server = TestServer::start(vec!["好的，让我来帮你拆解这个需求！"], 1024).await;

    let resp = reqwest::Client::new()
        .post(server.url("/task/parse"))
        .json(&serde_json::json!({"prompt": "做一个博客"}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 422);
    let body: Value = resp.json().await.unwrap();
    assert!(body["detail"].as_str().unwrap().contains("not valid JSON"));
}

#[tokio::test]
async fn task_parse_rejects_empty_task_array() {
    let server = TestServer::start(vec!["[]"], 1024).await;

    let resp = reqwest::Client::new()
        .post(server.url("/task/parse"))
        .json(&serde_json::json!({"prompt": "x"}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 422);
}

// ── /analyze-diary ──

#[tokio::test]
async fn analyze_diary_returns_model_verdict() {
    let server = TestServer::start(
        vec![r#"{"mood":"negative","emoji":"😢","keywords":["加班","疲惫","压力","困倦"],"suggestions":["早点休息","适当运动","找人倾诉"]}"#],
        1024,
    )
    .await;

    let resp = reqwest::Client::new()
        .post(server.url("/analyze-diary"))
        .json(&serde_json::json!({"content": "今天加班到很晚，非常疲惫。"}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["mood"], "negative");
    assert_eq!(body["emoji"], "😢");
    assert_eq!(body["keywords"].as_array().unwrap().len(), 4);
    assert_eq!(body["suggestions"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn analyze_diary_corrects_stubborn_neutral() {
    // Model insists on neutral; the diary has three positive hits and one
    // negative, so the corrector flips the verdict.
    let server = TestServer::start(
        vec![r#"{"mood":"neutral","emoji":"😐","keywords":["一天"],"suggestions":["继续保持"]}"#],
        1024,
    )
    .await;

    let resp = reqwest::Client::new()
        .post(server.url("/analyze-diary"))
        .json(&serde_json::json!({"content": "今天很开心，工作满足，心情愉快，只有一点压力。"}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["mood"], "positive");
    assert_eq!(body["emoji"], "😀");
}

#[tokio::test]
async fn analyze_diary_rejects_schema_violation() {
    let server = TestServer::start(
        vec![r#"{"mood":"positive","emoji":"😀","keywords":["x"]}"#],
        1024,
    )
    .await;

    let resp = reqwest::Client::new()
        .post(server.url("/analyze-diary"))
        .json(&serde_json::json!({"content": "今天"}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 422);
    let body: Value = resp.json().await.unwrap();
    assert!(body["detail"].as_str().unwrap().contains("suggestions"));
}

// ── /api/v1/upload ──

const UPLOAD_CAP: u64 = 4096;

#[tokio::test]
async fn upload_at_exact_cap_succeeds() {
    let server = TestServer::start(vec!["unused"], UPLOAD_CAP).await;

    let part = reqwest::multipart::Part::bytes(vec![0u8; UPLOAD_CAP as usize])
        .file_name("Report.BIN");
    let form = reqwest::multipart::Form::new().part("file", part);

    let resp = reqwest::Client::new()
        .post(server.url("/api/v1/upload"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let url = body["url"].as_str().unwrap();
    assert!(url.starts_with("/uploads/"));
    // extension is lower-cased, name is random
    assert!(url.ends_with(".bin"));
    assert!(!url.contains("Report"));

    let stored = server.stored_uploads();
    assert_eq!(stored.len(), 1);
    assert!(stored[0].ends_with(".bin"));
}

#[tokio::test]
async fn upload_over_cap_rejected_and_no_file_remains() {
    let server = TestServer::start(vec!["unused"], UPLOAD_CAP).await;

    let part = reqwest::multipart::Part::bytes(vec![0u8; UPLOAD_CAP as usize + 1])
        .file_name("big.bin");
    let form = reqwest::multipart::Form::new().part("file", part);

    let resp = reqwest::Client::new()
        .post(server.url("/api/v1/upload"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 413);
    assert!(server.stored_uploads().is_empty());
}

#[tokio::test]
async fn upload_without_file_field_is_bad_request() {
    let server = TestServer::start(vec!["unused"], UPLOAD_CAP).await;

    let form = reqwest::multipart::Form::new().text("note", "no file here");

    let resp = reqwest::Client::new()
        .post(server.url("/api/v1/upload"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
}
