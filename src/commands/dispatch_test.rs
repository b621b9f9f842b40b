use std::ffi::OsStr;

use super::dispatch::{DispatchError, Dispatcher, UNRECOGNIZED_MESSAGE};
use crate::api::upload::UploadError;
use crate::config::settings::{Config, RunOptions};
use crate::input::classifier::Input;
use httpmock::prelude::*;
use serde_json::json;

const FILES_BASE: &str = "https://files.interclip.app";

fn dispatcher_for(server: &MockServer, options: RunOptions) -> Dispatcher {
    let config = Config {
        api_url: server.base_url(),
        upload_url: server.base_url(),
        files_url: FILES_BASE.to_string(),
        ..Config::default()
    };
    Dispatcher::from_config(&config, options).unwrap()
}

async fn mock_presign<'a>(server: &'a MockServer, key: &str) -> httpmock::Mock<'a> {
    let url = server.url("/bucket");
    let key = key.to_string();
    server
        .mock_async(move |when, then| {
            when.method(GET).path("/api/uploadFile");
            then.status(200)
                .json_body(json!({ "url": url, "fields": { "key": key } }));
        })
        .await
}

async fn mock_bucket(server: &MockServer, status: u16) -> httpmock::Mock<'_> {
    server
        .mock_async(|when, then| {
            when.method(POST).path("/bucket");
            then.status(status);
        })
        .await
}

fn pdf_in(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("report.pdf");
    let mut data = b"%PDF-1.7\n".to_vec();
    data.resize(1200, b'.');
    std::fs::write(&path, data).unwrap();
    path
}

#[tokio::test]
async fn file_is_uploaded_then_clipped() {
    let server = MockServer::start_async().await;
    let dir = tempfile::tempdir().unwrap();
    let path = pdf_in(&dir);

    mock_presign(&server, "key123").await;
    let bucket = mock_bucket(&server, 204).await;
    let set = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/set")
                .body("url=https%3A%2F%2Ffiles.interclip.app%2Fkey123");
            then.status(200)
                .json_body(json!({ "status": "success", "result": "Fk93a" }));
        })
        .await;

    let dispatcher = dispatcher_for(&server, RunOptions::default());
    let result = dispatcher.run(path.as_os_str()).await.unwrap();

    bucket.assert_async().await;
    set.assert_async().await;
    assert_eq!(result, "Fk93a");
}

#[tokio::test]
async fn upload_only_returns_the_file_url() {
    let server = MockServer::start_async().await;
    let dir = tempfile::tempdir().unwrap();
    let path = pdf_in(&dir);

    mock_presign(&server, "key123").await;
    mock_bucket(&server, 204).await;
    let set = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/set");
            then.status(200)
                .json_body(json!({ "status": "success", "result": "never" }));
        })
        .await;

    let options = RunOptions {
        upload_only: true,
        ..RunOptions::default()
    };
    let result = dispatcher_for(&server, options)
        .dispatch(Input::File(path))
        .await
        .unwrap();

    assert_eq!(result, format!("{}/key123", FILES_BASE));
    assert_eq!(set.hits_async().await, 0);
}

#[tokio::test]
async fn clip_failure_after_upload_is_reported_separately() {
    let server = MockServer::start_async().await;
    let dir = tempfile::tempdir().unwrap();
    let path = pdf_in(&dir);

    mock_presign(&server, "key123").await;
    mock_bucket(&server, 204).await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/set");
            then.status(200)
                .json_body(json!({ "status": "error", "result": "Rate limited" }));
        })
        .await;

    let err = dispatcher_for(&server, RunOptions::default())
        .dispatch(Input::File(path))
        .await
        .unwrap_err();

    assert!(matches!(err, DispatchError::ClipForFile(_)));
    assert_eq!(
        err.to_string(),
        "Error creating clip for file: API response: Rate limited"
    );
}

#[tokio::test]
async fn upload_failure_stops_before_clip_creation() {
    let server = MockServer::start_async().await;
    let dir = tempfile::tempdir().unwrap();
    let path = pdf_in(&dir);

    mock_presign(&server, "key123").await;
    mock_bucket(&server, 500).await;
    let set = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/set");
            then.status(200)
                .json_body(json!({ "status": "success", "result": "never" }));
        })
        .await;

    let err = dispatcher_for(&server, RunOptions::default())
        .dispatch(Input::File(path))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DispatchError::Upload(UploadError::Rejected { status: 500, .. })
    ));
    assert_eq!(set.hits_async().await, 0);
}

#[tokio::test]
async fn url_is_clipped_verbatim() {
    let server = MockServer::start_async().await;
    let set = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/set")
                .body("url=https%3A%2F%2Fexample.com");
            then.status(200)
                .json_body(json!({ "status": "success", "result": "ab3F9" }));
        })
        .await;

    let result = dispatcher_for(&server, RunOptions::default())
        .run(OsStr::new("https://example.com"))
        .await
        .unwrap();

    set.assert_async().await;
    assert_eq!(result, "ab3F9");
}

#[tokio::test]
async fn code_is_retrieved() {
    let server = MockServer::start_async().await;
    let get = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/get").query_param("code", "ab3F9");
            then.status(200)
                .json_body(json!({ "status": "success", "result": "https://example.com" }));
        })
        .await;

    let result = dispatcher_for(&server, RunOptions::default())
        .run(OsStr::new("ab3F9"))
        .await
        .unwrap();

    get.assert_async().await;
    assert_eq!(result, "https://example.com");
}

#[tokio::test]
async fn retrieval_failure_names_the_step() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/get");
            then.status(200)
                .json_body(json!({ "status": "error", "result": "Clip not found" }));
        })
        .await;

    let err = dispatcher_for(&server, RunOptions::default())
        .run(OsStr::new("ab3F9"))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Error retrieving clip: API response: Clip not found");
}

#[tokio::test]
async fn unrecognized_input_makes_no_request() {
    let server = MockServer::start_async().await;
    let any = server
        .mock_async(|when, then| {
            when.path_contains("/");
            then.status(200);
        })
        .await;

    let err = dispatcher_for(&server, RunOptions::default())
        .run(OsStr::new("zz"))
        .await
        .unwrap_err();

    assert!(matches!(err, DispatchError::Unrecognized));
    assert_eq!(err.to_string(), UNRECOGNIZED_MESSAGE);
    assert_eq!(any.hits_async().await, 0);
}
