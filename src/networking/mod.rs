use async_trait::async_trait;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use log::{debug, warn};
use reqwest::header::ACCEPT;
use reqwest::{Client, Response};

use crate::config::UpdateConfig;
use crate::error::UpdateError;

const GITHUB_JSON: &str = "application/vnd.github+json";

/// Response body delivered chunk by chunk.
pub type ByteStream = BoxStream<'static, Result<Vec<u8>, UpdateError>>;

/// Minimal HTTP capability used by the resolver and the orchestrator.
///
/// Both calls are plain GETs. A connection failure or a non-success status is
/// reported as an error before any body bytes are handed out.
#[async_trait]
pub trait HttpFetch: Send + Sync {
    /// Fetch the complete response body, typically a JSON document.
    async fn fetch_body(&self, url: &str) -> Result<Vec<u8>, UpdateError>;

    /// Open a streaming download of the response body.
    async fn fetch_stream(&self, url: &str) -> Result<ByteStream, UpdateError>;
}

#[derive(Clone)]
pub struct NetworkClient {
    client: Client,
}

impl NetworkClient {
    pub fn new(config: &UpdateConfig) -> Self {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(config.timeout)
            .read_timeout(config.timeout)
            .build()
            .unwrap_or_else(|err| {
                warn!("network client: falling back to default HTTP client configuration ({err})");
                Client::new()
            });
        Self { client }
    }

    async fn get(&self, url: &str, accept: Option<&str>) -> Result<Response, UpdateError> {
        let mut request = self.client.get(url);
        if let Some(accept) = accept {
            request = request.header(ACCEPT, accept);
        }
        let response = request
            .send()
            .await
            .map_err(|e| UpdateError::NetworkUnavailable {
                url: url.to_owned(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpdateError::HttpStatus {
                url: url.to_owned(),
                status: status.as_u16(),
            });
        }
        debug!("network client: GET {url} -> {status}");
        Ok(response)
    }
}

#[async_trait]
impl HttpFetch for NetworkClient {
    async fn fetch_body(&self, url: &str) -> Result<Vec<u8>, UpdateError> {
        let response = self.get(url, Some(GITHUB_JSON)).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| UpdateError::NetworkUnavailable {
                url: url.to_owned(),
                reason: format!("body read error: {e}"),
            })?;
        Ok(bytes.to_vec())
    }

    async fn fetch_stream(&self, url: &str) -> Result<ByteStream, UpdateError> {
        let response = self.get(url, None).await?;
        let url = url.to_owned();
        let stream = response.bytes_stream().map(move |chunk| {
            chunk
                .map(|bytes| bytes.to_vec())
                .map_err(|e| UpdateError::DownloadTransport {
                    url: url.clone(),
                    reason: format!("stream error: {e}"),
                })
        });
        Ok(stream.boxed())
    }
}
