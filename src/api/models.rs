use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{ChannelInfo, Outcome, ProgressEvent, Video};

/// Body of the metadata fetch request
#[derive(Debug, Clone, Serialize)]
pub struct FetchRequest<'a> {
    pub url: &'a str,
}

/// Response from the metadata fetch endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct FetchResponse {
    #[serde(default)]
    pub channel: ChannelInfo,
    #[serde(default, deserialize_with = "usable_videos")]
    pub videos: Vec<Video>,
}

/// Keeps every entry that decodes as a `Video`; entries with a missing or null
/// id are dropped instead of failing the whole list.
fn usable_videos<'de, D>(deserializer: D) -> Result<Vec<Video>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?.unwrap_or_default();
    let total = entries.len();
    let videos: Vec<Video> = entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value(entry).ok())
        .collect();
    if videos.len() < total {
        tracing::warn!(skipped = total - videos.len(), "dropping video entries without an id");
    }
    Ok(videos)
}

/// Error body returned with a non-2xx status
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// One `data:` payload of the download progress stream
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum StreamMessage {
    Progress {
        percent: f32,
        #[serde(default)]
        size_str: String,
    },
    Finished {
        #[serde(default)]
        message: String,
    },
    Error {
        #[serde(default)]
        message: String,
    },
    Skipped {
        #[serde(default)]
        message: String,
    },
}

impl From<StreamMessage> for ProgressEvent {
    fn from(message: StreamMessage) -> Self {
        match message {
            StreamMessage::Progress { percent, size_str } => ProgressEvent::Progress {
                percent: if percent.is_finite() {
                    percent.clamp(0.0, 100.0)
                } else {
                    0.0
                },
                human_size: size_str,
            },
            StreamMessage::Finished { message } => ProgressEvent::terminal(Outcome::Finished, message),
            StreamMessage::Error { message } => ProgressEvent::terminal(Outcome::Error, message),
            StreamMessage::Skipped { message } => ProgressEvent::terminal(Outcome::Skipped, message),
        }
    }
}

pub const CONFIG_URL_VAR: &str = "CHANNEL_DOWNLOADER_URL";

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }

    /// Reads the backend address from `CHANNEL_DOWNLOADER_URL`, falling back to the default.
    pub fn from_env() -> Self {
        Self::with_override(std::env::var(CONFIG_URL_VAR).ok())
    }

    fn with_override(url: Option<String>) -> Self {
        match url {
            Some(url) if !url.trim().is_empty() => Self::new(url.trim()),
            _ => Self::default(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new("http://127.0.0.1:5000")
    }
}
