use bytes::Bytes;
use futures::{stream::BoxStream, StreamExt};
use reqwest::{header, Client, Response};
use thiserror::Error;

use super::models::{ApiConfig, ErrorBody, FetchRequest, FetchResponse, StreamMessage};
use super::sse::SseDecoder;
use crate::domain::Quality;

const FETCH_PATH: &str = "/api/fetch-videos";
const STREAM_PATH: &str = "/api/download/stream";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("{0}")]
    ServerError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Clone)]
pub struct ApiClient {
    config: ApiConfig,
    http: Client,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// Turns a non-2xx response into the server's `{error}` message, or the status text.
    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ErrorBody>(&body) {
            Ok(ErrorBody { error }) => error,
            Err(_) => format!(
                "Server returned {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("")
            )
            .trim_end()
            .to_string(),
        };
        Err(ApiError::ServerError(message))
    }

    /// Resolves a channel or playlist URL into its channel info and video list.
    pub async fn fetch_videos(&self, url: &str) -> Result<FetchResponse> {
        tracing::debug!(url, "fetching video metadata");

        let response = self
            .http
            .post(self.endpoint(FETCH_PATH))
            .json(&FetchRequest { url })
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("JSON decode error: {}", e)))
    }

    /// Opens the server-push progress stream for one video.
    ///
    /// Each item is one decoded `data:` payload. Payloads that are not a known
    /// status message come through as `ApiError::InvalidResponse` without ending
    /// the stream.
    pub async fn progress_stream(
        &self,
        video_id: &str,
        quality: Quality,
    ) -> Result<BoxStream<'static, Result<StreamMessage>>> {
        tracing::debug!(video_id, quality = quality.as_str(), "opening progress stream");

        let response = self
            .http
            .get(self.endpoint(STREAM_PATH))
            .query(&[("video_id", video_id), ("quality", quality.as_str())])
            .header(header::ACCEPT, "text/event-stream")
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let mut decoder = SseDecoder::new();
        let stream = response
            .bytes_stream()
            .map(move |chunk: reqwest::Result<Bytes>| {
                let items: Vec<Result<StreamMessage>> = match chunk {
                    Ok(bytes) => decoder
                        .push(&bytes)
                        .into_iter()
                        .map(|data| {
                            serde_json::from_str(&data).map_err(|e| {
                                ApiError::InvalidResponse(format!("{}: {}", e, data))
                            })
                        })
                        .collect(),
                    Err(e) => vec![Err(ApiError::RequestError(e))],
                };
                futures::stream::iter(items)
            })
            .flatten()
            .boxed();

        Ok(stream)
    }
}
