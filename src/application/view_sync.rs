use crate::domain::{DownloadRequest, Outcome};

/// Update points the orchestrator drives on the visible UI.
///
/// Implementations hold no authoritative state and must ignore item ids they no
/// longer display.
pub trait ViewSync {
    fn mark_downloading(&mut self, request: &DownloadRequest);

    /// Updates both the item's own progress and the aggregate dock.
    fn show_progress(&mut self, video_id: &str, percent: f32, human_size: &str);

    fn mark_finished(&mut self, video_id: &str, outcome: Outcome, message: &str);

    fn set_dock_visible(&mut self, visible: bool);

    fn warn(&mut self, message: &str);
}
