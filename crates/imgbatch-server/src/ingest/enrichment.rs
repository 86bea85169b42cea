//! Per-image enrichment
//!
//! Takes one image reference from a batch row, fetches the image, runs it
//! through the [`Compressor`], writes the result into the image directory
//! and answers with the public URL it is served from. Any failure along the
//! way is folded into [`EnrichmentOutcome::Failed`]; enrichment never aborts
//! the batch.

use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

use imgbatch_common::url_list::file_name_from_url;
use imgbatch_common::CommonError;

use super::compression::{CompressionError, Compressor};
use crate::config::STATIC_IMAGE_PATH;

/// Value persisted in place of a compressed URL when enrichment fails
pub const ENRICHMENT_FAILED_SENTINEL: &str = "Error while compressing the image";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrichmentOutcome {
    /// Public URL of the compressed copy
    Compressed(String),
    /// Human-readable reason
    Failed(String),
}

impl EnrichmentOutcome {
    pub fn is_compressed(&self) -> bool {
        matches!(self, EnrichmentOutcome::Compressed(_))
    }

    /// What goes into the `compressed_urls` list for this reference
    pub fn stored_value(&self) -> &str {
        match self {
            EnrichmentOutcome::Compressed(url) => url,
            EnrichmentOutcome::Failed(_) => ENRICHMENT_FAILED_SENTINEL,
        }
    }
}

#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error("Image URL is required")]
    MissingReference,

    #[error("Invalid image URL: {0}")]
    InvalidReference(#[from] CommonError),

    #[error("Failed to fetch source image: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error(transparent)]
    Compression(#[from] CompressionError),

    #[error("Failed to write compressed image {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub struct EnrichmentClient {
    http: reqwest::Client,
    compressor: Arc<dyn Compressor>,
    image_dir: PathBuf,
    public_image_base: String,
}

impl EnrichmentClient {
    /// `public_base_url` is the externally visible origin of this service;
    /// compressed files are addressed under its static image path.
    pub fn new(
        http: reqwest::Client,
        compressor: Arc<dyn Compressor>,
        image_dir: impl Into<PathBuf>,
        public_base_url: &str,
    ) -> Self {
        Self {
            http,
            compressor,
            image_dir: image_dir.into(),
            public_image_base: format!(
                "{}{}",
                public_base_url.trim_end_matches('/'),
                STATIC_IMAGE_PATH
            ),
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn enrich(&self, reference: &str) -> EnrichmentOutcome {
        match self.try_enrich(reference).await {
            Ok(url) => {
                tracing::debug!(compressed = %url, "Image enriched");
                EnrichmentOutcome::Compressed(url)
            },
            Err(e) => {
                tracing::warn!(error = %e, "Image enrichment failed");
                EnrichmentOutcome::Failed(e.to_string())
            },
        }
    }

    async fn try_enrich(&self, reference: &str) -> Result<String, EnrichmentError> {
        if reference.is_empty() {
            return Err(EnrichmentError::MissingReference);
        }

        let file_name = file_name_from_url(reference)?;

        let source = self
            .http
            .get(reference)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        let compressed = self.compressor.compress(source.to_vec()).await?;

        tokio::fs::create_dir_all(&self.image_dir)
            .await
            .map_err(|source| EnrichmentError::Write {
                path: self.image_dir.clone(),
                source,
            })?;

        let target = self.image_dir.join(&file_name);
        tokio::fs::write(&target, &compressed)
            .await
            .map_err(|source| EnrichmentError::Write {
                path: target.clone(),
                source,
            })?;

        Ok(format!("{}/{}", self.public_image_base, file_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Reverses the bytes so the written file is distinguishable from the source
    #[derive(Default)]
    struct ReversingCompressor {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Compressor for ReversingCompressor {
        async fn compress(&self, mut source: Vec<u8>) -> Result<Vec<u8>, CompressionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            source.reverse();
            Ok(source)
        }
    }

    struct RejectingCompressor;

    #[async_trait]
    impl Compressor for RejectingCompressor {
        async fn compress(&self, _source: Vec<u8>) -> Result<Vec<u8>, CompressionError> {
            Err(CompressionError::Service {
                status: 429,
                kind: "TooManyRequests".to_string(),
                message: "Monthly limit reached".to_string(),
            })
        }
    }

    fn client(compressor: Arc<dyn Compressor>, dir: &std::path::Path) -> EnrichmentClient {
        EnrichmentClient::new(
            reqwest::Client::new(),
            compressor,
            dir,
            "http://localhost:3000/",
        )
    }

    #[tokio::test]
    async fn test_enrich_writes_file_and_returns_public_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/img/a.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"abc".to_vec()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let compressor = Arc::new(ReversingCompressor::default());
        let enricher = client(compressor.clone(), dir.path());

        let outcome = enricher.enrich(&format!("{}/img/a.png", server.uri())).await;

        assert_eq!(
            outcome,
            EnrichmentOutcome::Compressed("http://localhost:3000/images/a.png".to_string())
        );
        assert_eq!(std::fs::read(dir.path().join("a.png")).unwrap(), b"cba");
        assert_eq!(compressor.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_enrich_creates_missing_image_dir() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"xyz".to_vec()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested").join("images");
        let enricher = client(Arc::new(ReversingCompressor::default()), &nested);

        let outcome = enricher.enrich(&format!("{}/b.jpg?size=large", server.uri())).await;

        assert!(outcome.is_compressed());
        assert!(nested.join("b.jpg").exists());
    }

    #[tokio::test]
    async fn test_encoded_file_name_is_written_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"abc".to_vec()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let enricher = client(Arc::new(ReversingCompressor::default()), dir.path());

        let outcome = enricher.enrich(&format!("{}/red%20shoe.png", server.uri())).await;

        assert_eq!(
            outcome,
            EnrichmentOutcome::Compressed(
                "http://localhost:3000/images/red%20shoe.png".to_string()
            )
        );
        assert!(dir.path().join("red%20shoe.png").exists());
        assert!(!dir.path().join("red shoe.png").exists());
    }

    #[tokio::test]
    async fn test_empty_reference_fails_without_network() {
        let dir = tempfile::tempdir().unwrap();
        let compressor = Arc::new(ReversingCompressor::default());
        let enricher = client(compressor.clone(), dir.path());

        let outcome = enricher.enrich("").await;

        assert_eq!(outcome, EnrichmentOutcome::Failed("Image URL is required".to_string()));
        assert_eq!(outcome.stored_value(), ENRICHMENT_FAILED_SENTINEL);
        assert_eq!(compressor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unparseable_reference_fails() {
        let dir = tempfile::tempdir().unwrap();
        let enricher = client(Arc::new(ReversingCompressor::default()), dir.path());

        let outcome = enricher.enrich("not a url").await;

        assert!(!outcome.is_compressed());
    }

    #[tokio::test]
    async fn test_fetch_error_status_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let compressor = Arc::new(ReversingCompressor::default());
        let enricher = client(compressor.clone(), dir.path());

        let outcome = enricher.enrich(&format!("{}/missing.png", server.uri())).await;

        assert!(!outcome.is_compressed());
        assert_eq!(compressor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_compression_error_fails_and_writes_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"abc".to_vec()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let enricher = client(Arc::new(RejectingCompressor), dir.path());

        let outcome = enricher.enrich(&format!("{}/a.png", server.uri())).await;

        match outcome {
            EnrichmentOutcome::Failed(reason) => assert!(reason.contains("Monthly limit")),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(!dir.path().join("a.png").exists());
    }
}
