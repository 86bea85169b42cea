//! Image compression client
//!
//! The hosted compressor takes the raw image bytes on `POST /shrink`,
//! authenticated with HTTP basic auth (`api:<key>`). A `201` response names
//! the compressed output in its `Location` header (or in `output.url` of the
//! JSON body); the bytes are then downloaded from there with the same
//! credentials.

use async_trait::async_trait;
use reqwest::header::LOCATION;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::config::CompressionConfig;

const BASIC_AUTH_USER: &str = "api";

#[derive(Debug, Error)]
pub enum CompressionError {
    #[error("Compression API key is not configured")]
    MissingCredential,

    #[error("Compression request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Compression service returned {status}: {kind}: {message}")]
    Service {
        status: u16,
        kind: String,
        message: String,
    },

    #[error("Compression response did not name an output location")]
    MissingOutput,

    #[error("Invalid compression output location: {0}")]
    InvalidLocation(#[from] url::ParseError),
}

/// Turns source image bytes into compressed image bytes
#[async_trait]
pub trait Compressor: Send + Sync {
    async fn compress(&self, source: Vec<u8>) -> Result<Vec<u8>, CompressionError>;
}

#[derive(Debug, Deserialize)]
struct ShrinkResponse {
    output: Option<ShrinkOutput>,
}

#[derive(Debug, Deserialize)]
struct ShrinkOutput {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ServiceErrorBody {
    error: Option<String>,
    message: Option<String>,
}

/// [`Compressor`] backed by the Tinify HTTP API
#[derive(Clone)]
pub struct TinifyClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl TinifyClient {
    pub fn new(http: reqwest::Client, config: &CompressionConfig) -> Self {
        Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    fn shrink_url(&self) -> String {
        format!("{}/shrink", self.endpoint)
    }

    /// Resolve the output location against the endpoint; absolute locations pass through
    fn resolve_location(&self, location: &str) -> Result<Url, CompressionError> {
        let base = Url::parse(&format!("{}/", self.endpoint))?;
        Ok(base.join(location)?)
    }

    async fn service_error(response: reqwest::Response) -> CompressionError {
        let status = response.status().as_u16();
        let body = response.json::<ServiceErrorBody>().await.ok();
        let (kind, message) = match body {
            Some(ServiceErrorBody { error, message }) => (
                error.unwrap_or_else(|| "Unknown".to_string()),
                message.unwrap_or_default(),
            ),
            None => ("Unknown".to_string(), String::new()),
        };
        CompressionError::Service {
            status,
            kind,
            message,
        }
    }
}

#[async_trait]
impl Compressor for TinifyClient {
    #[tracing::instrument(skip(self, source), fields(source_bytes = source.len()))]
    async fn compress(&self, source: Vec<u8>) -> Result<Vec<u8>, CompressionError> {
        if self.api_key.is_empty() {
            return Err(CompressionError::MissingCredential);
        }

        let response = self
            .http
            .post(self.shrink_url())
            .basic_auth(BASIC_AUTH_USER, Some(&self.api_key))
            .body(source)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::service_error(response).await);
        }

        let header_location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let location = match header_location {
            Some(location) => location,
            None => response
                .json::<ShrinkResponse>()
                .await?
                .output
                .and_then(|o| o.url)
                .ok_or(CompressionError::MissingOutput)?,
        };

        let output_url = self.resolve_location(&location)?;
        tracing::debug!(output = %output_url, "Downloading compressed output");

        let output = self
            .http
            .get(output_url)
            .basic_auth(BASIC_AUTH_USER, Some(&self.api_key))
            .send()
            .await?;

        if !output.status().is_success() {
            return Err(Self::service_error(output).await);
        }

        let bytes = output.bytes().await?;
        tracing::debug!(compressed_bytes = bytes.len(), "Image compressed");
        Ok(bytes.to_vec())
    }
}
