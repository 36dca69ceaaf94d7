//! # CLI Command Tests
//!
//! Runs the `ragfile` binary against a `wiremock` stand-in for the service.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use serde_json::json;
use std::fs;
use std::process::{Command, Output};
use tempfile::{tempdir, TempDir};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds a `ragfile` command that logs into a temporary directory.
fn ragfile(log_dir: &TempDir, server_url: &str) -> Command {
    let mut cmd = Command::cargo_bin("ragfile").unwrap();
    cmd.current_dir(log_dir.path())
        .env("RAGFILE_LOG_FILE", log_dir.path().join("test.log"))
        .env_remove("RAGFILE_SERVER_URL")
        .arg("--server-url")
        .arg(server_url);
    cmd
}

/// Runs the command off the async runtime so the mock server keeps serving.
async fn output(mut cmd: Command) -> Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

#[test]
fn test_blank_question_fails_before_any_request() {
    // Arrange
    let dir = tempdir().unwrap();

    // Act & Assert
    ragfile(&dir, "http://127.0.0.1:9")
        .arg("ask")
        .arg("   ")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Ask failed: Type a question first"));
}

#[test]
fn test_out_of_range_chunk_size_is_rejected() {
    let dir = tempdir().unwrap();
    ragfile(&dir, "http://127.0.0.1:9")
        .arg("rechunk")
        .arg("--chunk-size")
        .arg("10")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Rechunk failed: chunk size must be between 50 and 2000, got 10",
        ));
}

#[test]
fn test_unknown_model_is_rejected() {
    let dir = tempdir().unwrap();
    ragfile(&dir, "http://127.0.0.1:9")
        .args(["ask", "hello?", "--model", "gpt-9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown model 'gpt-9'"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_ask_prints_answer_and_evidence() {
    // --- 1. Arrange ---
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(body_string_contains("What is the refund policy?"))
        .and(body_string_contains("mistral"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "answer": "30 days",
            "sources": [{"file": "policy.txt", "index": 0, "chunk": "Refunds within 30 days..."}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempdir().unwrap();

    // --- 2. Act ---
    let mut cmd = ragfile(&dir, &server.uri());
    cmd.args(["ask", "What is the refund policy?", "--model", "mistral"]);
    let out = output(cmd).await;

    // --- 3. Assert ---
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Response:\n30 days"));
    assert!(stdout.contains("File: policy.txt | Chunk #0"));
    assert!(stdout.contains("Refunds within 30 days..."));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_ask_service_error_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model not loaded"))
        .mount(&server)
        .await;
    let dir = tempdir().unwrap();

    let mut cmd = ragfile(&dir, &server.uri());
    cmd.args(["ask", "anything"]);
    let out = output(cmd).await;

    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Ask failed: Error: Could not get answer."));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_upload_two_files() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .and(body_string_contains("filename=\"a.txt\""))
        .and(body_string_contains("filename=\"b.md\""))
        .and(body_string_contains("250"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "uploaded"})))
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "alpha").unwrap();
    fs::write(dir.path().join("b.md"), "# beta").unwrap();

    let mut cmd = ragfile(&dir, &server.uri());
    cmd.args(["upload", "a.txt", "b.md", "--chunk-size", "250"]);
    let out = output(cmd).await;

    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert!(String::from_utf8_lossy(&out.stdout).contains("Uploaded 2 files successfully"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_files_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"filename": "a.txt", "chunks": 3},
            {"filename": "b.pdf", "chunks": 12}
        ])))
        .mount(&server)
        .await;
    let dir = tempdir().unwrap();

    let mut cmd = ragfile(&dir, &server.uri());
    cmd.args(["files", "list"]);
    let out = output(cmd).await;

    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("a.txt  Chunks: 3"));
    assert!(stdout.contains("b.pdf  Chunks: 12"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_delete_missing_file_fails() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/files/gone.txt"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;
    let dir = tempdir().unwrap();

    let mut cmd = ragfile(&dir, &server.uri());
    cmd.args(["files", "delete", "gone.txt", "--yes"]);
    let out = output(cmd).await;

    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("Files failed: File not found: gone.txt"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_show_file_content() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/notes.md"))
        .respond_with(ResponseTemplate::new(200).set_body_string("# Notes\nline two"))
        .mount(&server)
        .await;
    let dir = tempdir().unwrap();

    let mut cmd = ragfile(&dir, &server.uri());
    cmd.args(["files", "show", "notes.md"]);
    let out = output(cmd).await;

    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("# Notes\nline two"));
}
