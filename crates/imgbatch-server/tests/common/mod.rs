//! Shared helpers for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use imgbatch_server::{
    api,
    config::Config,
    ingest::{CompressionError, Compressor},
    store::InMemoryProductStore,
};

pub const BOUNDARY: &str = "imgbatch-test-boundary";

/// Returns the source bytes unchanged
pub struct PassThroughCompressor;

#[async_trait]
impl Compressor for PassThroughCompressor {
    async fn compress(&self, source: Vec<u8>) -> Result<Vec<u8>, CompressionError> {
        Ok(source)
    }
}

/// A router over an in-memory store with its directories in a temp dir
pub struct TestApp {
    pub router: Router,
    pub store: InMemoryProductStore,
    pub upload_dir: PathBuf,
    pub image_dir: PathBuf,
    _dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_compressor(Arc::new(PassThroughCompressor))
    }

    pub fn with_compressor(compressor: Arc<dyn Compressor>) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.pipeline.upload_dir = dir.path().join("upload");
        config.pipeline.image_dir = dir.path().join("images");

        let store = InMemoryProductStore::new();
        let state = api::build_state(
            &config,
            Arc::new(store.clone()),
            compressor,
            reqwest::Client::new(),
        );

        Self {
            router: api::create_router(state, &config),
            store,
            upload_dir: config.pipeline.upload_dir.clone(),
            image_dir: config.pipeline.image_dir.clone(),
            _dir: dir,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec())
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Vec<u8>) {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post_json(&self, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let (status, bytes) = self
            .send(
                Request::builder()
                    .uri(uri)
                    .method("POST")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await;
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    /// Upload `content` as a multipart file in `field`
    pub async fn upload(&self, field: &str, file_name: &str, content: &str) -> (StatusCode, serde_json::Value) {
        let body = multipart_body(&[(field, Some(file_name), content)]);
        self.post_multipart(body).await
    }

    pub async fn post_multipart(&self, body: String) -> (StatusCode, serde_json::Value) {
        let (status, bytes) = self
            .send(
                Request::builder()
                    .uri("/upload")
                    .method("POST")
                    .header(
                        "content-type",
                        format!("multipart/form-data; boundary={BOUNDARY}"),
                    )
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await;
        (status, serde_json::from_slice(&bytes).unwrap())
    }
}

/// Encode `(field name, file name, content)` parts as a multipart body
pub fn multipart_body(parts: &[(&str, Option<&str>, &str)]) -> String {
    let mut body = String::new();
    for (name, file_name, content) in parts {
        body.push_str(&format!("--{BOUNDARY}\r\n"));
        match file_name {
            Some(file_name) => {
                body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n"
                ));
                body.push_str("Content-Type: text/csv\r\n\r\n");
            },
            None => {
                body.push_str(&format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"));
            },
        }
        body.push_str(content);
        body.push_str("\r\n");
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    body
}

pub fn is_tracking_id(value: &str) -> bool {
    value
        .strip_prefix("req")
        .map(|digits| digits.len() == 5 && digits.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(false)
}
