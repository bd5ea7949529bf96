use futures::{stream::BoxStream, StreamExt};
use iced::task::{Handle, Task};

use crate::{
    api::{self, ApiClient, ApiError, StreamMessage},
    domain::{ChannelId, DownloadRequest, Outcome, ProgressEvent, Quality},
};

pub const CONNECTION_LOST: &str = "Connection lost";

/// A live progress connection for one request. `close` is idempotent.
pub trait ProgressChannel {
    fn close(&mut self);

    fn is_closed(&self) -> bool;
}

/// Opens one progress channel per request. Events produced by the channel must
/// come back to the orchestrator tagged with the given `ChannelId`.
pub trait ChannelOpener {
    type Channel: ProgressChannel;

    fn open(&mut self, request: &DownloadRequest, id: ChannelId) -> Self::Channel;
}

/// Normalizes raw stream messages into `ProgressEvent`s.
///
/// The returned stream always ends with exactly one `Terminal` event. A server
/// refusal ends it with the server's message; if the transport fails or ends
/// before the server sent one, a `Terminal{Error, "Connection lost"}` is
/// synthesized.
pub fn normalize(raw: BoxStream<'static, api::Result<StreamMessage>>) -> BoxStream<'static, ProgressEvent> {
    futures::stream::unfold(ChannelState::Streaming(raw), |state| async move {
        let ChannelState::Streaming(mut raw) = state else {
            return None;
        };

        loop {
            match raw.next().await {
                Some(Ok(message)) => {
                    let event = ProgressEvent::from(message);
                    let next = if event.is_terminal() {
                        ChannelState::Done
                    } else {
                        ChannelState::Streaming(raw)
                    };
                    return Some((event, next));
                }
                Some(Err(ApiError::InvalidResponse(reason))) => {
                    tracing::warn!(%reason, "skipping undecodable progress message");
                }
                Some(Err(ApiError::ServerError(message))) => {
                    tracing::warn!(%message, "server refused progress stream");
                    return Some((
                        ProgressEvent::terminal(Outcome::Error, message),
                        ChannelState::Done,
                    ));
                }
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "progress stream failed");
                    return Some((connection_lost(), ChannelState::Done));
                }
                None => {
                    tracing::warn!("progress stream ended without a terminal message");
                    return Some((connection_lost(), ChannelState::Done));
                }
            }
        }
    })
    .boxed()
}

/// Connects to the backend and yields the normalized events for one video.
pub fn open_events(client: ApiClient, video_id: String, quality: Quality) -> BoxStream<'static, ProgressEvent> {
    let raw = futures::stream::once(async move { client.progress_stream(&video_id, quality).await })
        .flat_map(|opened| match opened {
            Ok(stream) => stream,
            Err(e) => futures::stream::iter([Err(e)]).boxed(),
        })
        .boxed();

    normalize(raw)
}

fn connection_lost() -> ProgressEvent {
    ProgressEvent::terminal(Outcome::Error, CONNECTION_LOST)
}

enum ChannelState {
    Streaming(BoxStream<'static, api::Result<StreamMessage>>),
    Done,
}

/// Opens channels as abortable iced tasks.
///
/// Tasks created by `open` are buffered until the caller collects them with
/// `take_tasks` and hands them to the runtime.
pub struct TaskChannelOpener<M> {
    client: ApiClient,
    to_message: fn(ChannelId, ProgressEvent) -> M,
    pending: Vec<Task<M>>,
}

impl<M: Send + 'static> TaskChannelOpener<M> {
    pub fn new(client: ApiClient, to_message: fn(ChannelId, ProgressEvent) -> M) -> Self {
        Self {
            client,
            to_message,
            pending: Vec::new(),
        }
    }

    pub fn take_tasks(&mut self) -> Task<M> {
        Task::batch(std::mem::take(&mut self.pending))
    }
}

impl<M: Send + 'static> ChannelOpener for TaskChannelOpener<M> {
    type Channel = TaskChannel;

    fn open(&mut self, request: &DownloadRequest, id: ChannelId) -> TaskChannel {
        let to_message = self.to_message;
        let events = open_events(self.client.clone(), request.video_id.clone(), request.quality);
        let (task, handle) = Task::stream(events.map(move |event| to_message(id, event))).abortable();
        self.pending.push(task);

        TaskChannel {
            handle,
            closed: false,
        }
    }
}

/// Dropping the aborted task drops the HTTP stream with it.
pub struct TaskChannel {
    handle: Handle,
    closed: bool,
}

impl ProgressChannel for TaskChannel {
    fn close(&mut self) {
        if !self.closed {
            self.handle.abort();
            self.closed = true;
        }
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Drop for TaskChannel {
    fn drop(&mut self) {
        self.close();
    }
}
