use super::{
    progress_channel::{ChannelOpener, ProgressChannel},
    queue::DownloadQueue,
    view_sync::ViewSync,
};
use crate::domain::{AppError, ChannelId, DownloadRequest, Outcome, ProgressEvent};

pub const CANCELLED: &str = "Cancelled";

struct ActiveChannel<C> {
    id: ChannelId,
    channel: C,
}

/// Whether a download is running, and which one.
///
/// `active == false` implies no current request and no channel; a channel implies
/// a current request.
pub struct OrchestrationState<C> {
    active: bool,
    current: Option<DownloadRequest>,
    channel: Option<ActiveChannel<C>>,
}

impl<C> Default for OrchestrationState<C> {
    fn default() -> Self {
        Self {
            active: false,
            current: None,
            channel: None,
        }
    }
}

impl<C> OrchestrationState<C> {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn current_request(&self) -> Option<&DownloadRequest> {
        self.current.as_ref()
    }

    pub fn active_channel(&self) -> Option<ChannelId> {
        self.channel.as_ref().map(|c| c.id)
    }
}

/// Drives the queue one request at a time.
///
/// Every terminal event, real or synthesized, advances to the next request in
/// the same call, so the queue drains without outside re-triggering.
pub struct Orchestrator<O: ChannelOpener> {
    opener: O,
    queue: DownloadQueue,
    state: OrchestrationState<O::Channel>,
    next_channel: u64,
}

impl<O: ChannelOpener> Orchestrator<O> {
    pub fn new(opener: O) -> Self {
        Self {
            opener,
            queue: DownloadQueue::new(),
            state: OrchestrationState::default(),
            next_channel: 0,
        }
    }

    pub fn state(&self) -> &OrchestrationState<O::Channel> {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn opener_mut(&mut self) -> &mut O {
        &mut self.opener
    }

    /// Single entry point for both single-item and bulk downloads.
    ///
    /// Rejected while a download is active; the queue is left untouched.
    pub fn enqueue_many(
        &mut self,
        requests: Vec<DownloadRequest>,
        view: &mut impl ViewSync,
    ) -> Result<(), AppError> {
        if self.state.active {
            let err = AppError::Concurrency;
            tracing::warn!(rejected = requests.len(), "enqueue while a download is active");
            view.warn(&err.to_string());
            return Err(err);
        }
        if requests.is_empty() {
            return Ok(());
        }

        tracing::info!(count = requests.len(), "starting download queue");
        self.queue.replace(requests);
        self.state.active = true;
        view.set_dock_visible(true);
        self.advance(view);
        Ok(())
    }

    /// Reacts to one event from a progress channel.
    ///
    /// Events from any channel other than the active one are stale and dropped.
    pub fn handle_event(&mut self, id: ChannelId, event: ProgressEvent, view: &mut impl ViewSync) {
        if self.state.active_channel() != Some(id) {
            tracing::debug!(channel = %id, "dropping event from inactive channel");
            return;
        }
        let Some(request) = self.state.current.as_ref() else {
            return;
        };

        let failure = event.failure();
        match event {
            ProgressEvent::Progress {
                percent,
                human_size,
            } => {
                tracing::debug!(video_id = %request.video_id, percent, "progress");
                view.show_progress(&request.video_id, percent, &human_size);
            }
            ProgressEvent::Terminal { outcome, message } => {
                if let Some(active) = self.state.channel.as_mut() {
                    active.channel.close();
                }
                self.state.channel = None;

                if let Some(request) = self.state.current.take() {
                    match &failure {
                        None => {
                            tracing::info!(video_id = %request.video_id, %message, "download finished")
                        }
                        Some(err) => tracing::warn!(
                            video_id = %request.video_id,
                            outcome = outcome.label(),
                            error = %err,
                            "download did not complete"
                        ),
                    }
                    view.mark_finished(&request.video_id, outcome, &message);
                }
                self.advance(view);
            }
        }
    }

    /// Stops listening immediately and discards everything still queued.
    pub fn cancel_all(&mut self, view: &mut impl ViewSync) {
        if let Some(mut active) = self.state.channel.take() {
            active.channel.close();
        }
        if let Some(request) = self.state.current.take() {
            tracing::info!(video_id = %request.video_id, "download cancelled");
            view.mark_finished(&request.video_id, Outcome::Error, CANCELLED);
        }
        if !self.queue.is_empty() {
            tracing::info!(discarded = self.queue.len(), "clearing download queue");
        }
        self.queue.clear();
        self.state.active = false;
        view.set_dock_visible(false);
    }

    fn advance(&mut self, view: &mut impl ViewSync) {
        if let Some(mut lingering) = self.state.channel.take() {
            lingering.channel.close();
        }

        match self.queue.pop_next() {
            Some(request) => {
                let id = ChannelId(self.next_channel);
                self.next_channel += 1;

                tracing::info!(
                    video_id = %request.video_id,
                    quality = request.quality.as_str(),
                    channel = %id,
                    remaining = self.queue.len(),
                    "starting download"
                );
                let channel = self.opener.open(&request, id);
                debug_assert!(!channel.is_closed());
                view.mark_downloading(&request);
                self.state.channel = Some(ActiveChannel { id, channel });
                self.state.current = Some(request);
            }
            None => {
                tracing::info!("download queue drained");
                self.state.active = false;
                self.state.current = None;
                view.set_dock_visible(false);
            }
        }
    }
}
