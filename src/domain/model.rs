use std::fmt;

use serde::Deserialize;

use super::AppError;

/// Output format requested from the backend for one item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Quality {
    #[default]
    P1080,
    P720,
    Mp3,
}

impl Quality {
    pub const ALL: [Quality; 3] = [Quality::P1080, Quality::P720, Quality::Mp3];

    /// Value sent on the wire as the `quality` query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            Quality::P1080 => "1080p",
            Quality::P720 => "720p",
            Quality::Mp3 => "mp3",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quality::Mp3 => f.write_str("MP3"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// One item to download. Immutable once enqueued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub video_id: String,
    pub title: String,
    pub quality: Quality,
}

impl DownloadRequest {
    pub fn new(video_id: impl Into<String>, title: impl Into<String>, quality: Quality) -> Self {
        Self {
            video_id: video_id.into(),
            title: title.into(),
            quality,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Finished,
    Error,
    Skipped,
}

impl Outcome {
    pub fn label(self) -> &'static str {
        match self {
            Outcome::Finished => "Finished",
            Outcome::Error => "Error",
            Outcome::Skipped => "Skipped",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Progress { percent: f32, human_size: String },
    Terminal { outcome: Outcome, message: String },
}

impl ProgressEvent {
    pub fn terminal(outcome: Outcome, message: impl Into<String>) -> Self {
        ProgressEvent::Terminal {
            outcome,
            message: message.into(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ProgressEvent::Terminal { .. })
    }

    /// The failure carried by an error or skipped terminal event, if any.
    pub fn failure(&self) -> Option<AppError> {
        match self {
            ProgressEvent::Terminal {
                outcome: Outcome::Error | Outcome::Skipped,
                message,
            } => Some(AppError::Stream(message.clone())),
            _ => None,
        }
    }
}

/// Identifies one opened progress channel. Ids are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelId(pub u64);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChannelInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "uploader_url")]
    pub url: Option<String>,
    #[serde(default)]
    pub video_count: Option<u64>,
    #[serde(default)]
    pub subscriber_count: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Video {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub view_count: Option<u64>,
    #[serde(default)]
    pub upload_date: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
}

impl Video {
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_wire_and_display() {
        assert_eq!(Quality::Mp3.as_str(), "mp3");
        assert_eq!(Quality::Mp3.to_string(), "MP3");
        assert_eq!(Quality::P720.to_string(), "720p");
        assert_eq!(Quality::default(), Quality::P1080);
    }

    #[test]
    fn test_terminal_failure() {
        let lost = ProgressEvent::terminal(Outcome::Error, "Connection lost");
        assert_eq!(
            lost.failure(),
            Some(AppError::Stream("Connection lost".to_string()))
        );
        assert!(ProgressEvent::terminal(Outcome::Finished, "done")
            .failure()
            .is_none());
        assert!(!ProgressEvent::Progress {
            percent: 3.0,
            human_size: "1MiB".into()
        }
        .is_terminal());
    }

    #[test]
    fn test_video_deserializes_sparse_entry() {
        let video: Video = serde_json::from_str(r#"{"id":"abc"}"#).unwrap();
        assert_eq!(video.display_title(), "abc");
        assert_eq!(video.duration, None);
    }

    #[test]
    fn test_channel_ignores_unknown_fields() {
        let channel: ChannelInfo = serde_json::from_str(
            r#"{"name":"Chan","avatar":"http://x/a.png","uploader_url":"http://x/c","video_count":4}"#,
        )
        .unwrap();
        assert_eq!(channel.url.as_deref(), Some("http://x/c"));
        assert_eq!(channel.video_count, Some(4));
    }
}
