use std::collections::{HashMap, HashSet};

use crate::{
    api::FetchResponse,
    domain::{ChannelInfo, DownloadRequest, Quality, Video},
};

/// The last fetch result plus the user's picks over it.
///
/// Every video starts selected. Bulk downloads use `global_quality`; a single
/// download uses that video's own quality.
#[derive(Debug, Default)]
pub struct Selection {
    channel: ChannelInfo,
    videos: Vec<Video>,
    selected: HashSet<String>,
    qualities: HashMap<String, Quality>,
    global_quality: Quality,
}

impl Selection {
    pub fn new(fetched: FetchResponse) -> Self {
        let mut seen = HashSet::new();
        let videos: Vec<Video> = fetched
            .videos
            .into_iter()
            .filter(|v| !v.id.is_empty() && seen.insert(v.id.clone()))
            .collect();
        let selected = videos.iter().map(|v| v.id.clone()).collect();

        Self {
            channel: fetched.channel,
            videos,
            selected,
            qualities: HashMap::new(),
            global_quality: Quality::default(),
        }
    }

    pub fn channel(&self) -> &ChannelInfo {
        &self.channel
    }

    pub fn videos(&self) -> &[Video] {
        &self.videos
    }

    pub fn is_selected(&self, video_id: &str) -> bool {
        self.selected.contains(video_id)
    }

    pub fn all_selected(&self) -> bool {
        !self.videos.is_empty() && self.selected.len() == self.videos.len()
    }

    pub fn set_selected(&mut self, video_id: &str, selected: bool) {
        if !self.videos.iter().any(|v| v.id == video_id) {
            return;
        }
        if selected {
            self.selected.insert(video_id.to_string());
        } else {
            self.selected.remove(video_id);
        }
    }

    pub fn select_all(&mut self, selected: bool) {
        self.selected = if selected {
            self.videos.iter().map(|v| v.id.clone()).collect()
        } else {
            HashSet::new()
        };
    }

    pub fn quality(&self, video_id: &str) -> Quality {
        self.qualities.get(video_id).copied().unwrap_or_default()
    }

    pub fn set_quality(&mut self, video_id: &str, quality: Quality) {
        self.qualities.insert(video_id.to_string(), quality);
    }

    pub fn global_quality(&self) -> Quality {
        self.global_quality
    }

    pub fn set_global_quality(&mut self, quality: Quality) {
        self.global_quality = quality;
    }

    /// A one-item request using the video's own quality.
    pub fn single_request(&self, video_id: &str) -> Option<DownloadRequest> {
        self.videos
            .iter()
            .find(|v| v.id == video_id)
            .map(|v| DownloadRequest::new(&v.id, v.display_title(), self.quality(&v.id)))
    }

    /// Requests for every selected video in fetch order, all at the global quality.
    pub fn bulk_requests(&self) -> Vec<DownloadRequest> {
        self.videos
            .iter()
            .filter(|v| self.selected.contains(&v.id))
            .map(|v| DownloadRequest::new(&v.id, v.display_title(), self.global_quality))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetched(ids: &[&str]) -> FetchResponse {
        let videos = ids
            .iter()
            .map(|id| {
                serde_json::from_value(serde_json::json!({"id": id, "title": format!("T-{}", id)}))
                    .unwrap()
            })
            .collect();
        FetchResponse {
            channel: ChannelInfo::default(),
            videos,
        }
    }

    #[test]
    fn test_everything_selected_initially() {
        let selection = Selection::new(fetched(&["a", "b"]));
        assert!(selection.all_selected());
        assert_eq!(selection.bulk_requests().len(), 2);
    }

    #[test]
    fn test_bulk_uses_global_quality_in_fetch_order() {
        let mut selection = Selection::new(fetched(&["a", "b", "c"]));
        selection.set_quality("a", Quality::P720);
        selection.set_global_quality(Quality::Mp3);
        selection.set_selected("b", false);

        let requests = selection.bulk_requests();
        let ids: Vec<_> = requests.iter().map(|r| r.video_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert!(requests.iter().all(|r| r.quality == Quality::Mp3));
        assert_eq!(requests[0].title, "T-a");
    }

    #[test]
    fn test_single_uses_card_quality() {
        let mut selection = Selection::new(fetched(&["a", "b"]));
        selection.set_global_quality(Quality::Mp3);
        selection.set_quality("b", Quality::P720);

        let request = selection.single_request("b").unwrap();
        assert_eq!(request.quality, Quality::P720);
        assert_eq!(selection.single_request("a").unwrap().quality, Quality::P1080);
        assert!(selection.single_request("zzz").is_none());
    }

    #[test]
    fn test_select_all_toggle() {
        let mut selection = Selection::new(fetched(&["a", "b"]));
        selection.select_all(false);
        assert!(selection.bulk_requests().is_empty());
        assert!(!selection.all_selected());
        selection.select_all(true);
        assert!(selection.all_selected());
    }

    #[test]
    fn test_duplicate_ids_are_dropped() {
        let selection = Selection::new(fetched(&["a", "a", "b"]));
        assert_eq!(selection.videos().len(), 2);
    }

    #[test]
    fn test_blank_ids_are_dropped() {
        let selection = Selection::new(fetched(&["a", "", "b"]));
        let ids: Vec<_> = selection.videos().iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(selection.bulk_requests().len(), 2);
    }

    #[test]
    fn test_unknown_id_cannot_be_selected() {
        let mut selection = Selection::new(fetched(&["a"]));
        selection.select_all(false);
        selection.set_selected("ghost", true);
        assert!(selection.bulk_requests().is_empty());
    }
}
