use crate::api::{ApiClient, ApiConfig, FetchResponse};
use crate::application::{Orchestrator, Selection, TaskChannelOpener};
use crate::domain::{AppError, ChannelId, ProgressEvent};
use crate::ui::{DownloadMessage, DownloadView};
use iced::Task;

pub struct DownloadApp {
    view: DownloadView,
    api_client: ApiClient,
    selection: Option<Selection>,
    orchestrator: Orchestrator<TaskChannelOpener<Message>>,
}

impl Default for DownloadApp {
    fn default() -> Self {
        Self::new(ApiConfig::from_env())
    }
}

impl DownloadApp {
    pub fn new(config: ApiConfig) -> Self {
        tracing::info!(backend = %config.base_url, "starting channel downloader");
        let api_client = ApiClient::new(config);
        let opener = TaskChannelOpener::new(api_client.clone(), Message::Progress);

        Self {
            view: DownloadView::default(),
            api_client,
            selection: None,
            orchestrator: Orchestrator::new(opener),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    UiMessage(DownloadMessage),
    /// Result of resolving the source URL
    FetchCompleted(Result<FetchResponse, AppError>),
    /// One event from the progress channel with the given id
    Progress(ChannelId, ProgressEvent),
}

pub fn update(app: &mut DownloadApp, message: Message) -> Task<Message> {
    match message {
        Message::UiMessage(ui_msg) => {
            app.view.update(ui_msg.clone());

            match ui_msg {
                DownloadMessage::FetchPressed => return start_fetch(app),
                DownloadMessage::SelectAllToggled(checked) => {
                    if let Some(selection) = app.selection.as_mut() {
                        selection.select_all(checked);
                    }
                }
                DownloadMessage::VideoToggled(video_id, checked) => {
                    if let Some(selection) = app.selection.as_mut() {
                        selection.set_selected(&video_id, checked);
                    }
                }
                DownloadMessage::QualityPicked(video_id, quality) => {
                    if let Some(selection) = app.selection.as_mut() {
                        selection.set_quality(&video_id, quality);
                    }
                }
                DownloadMessage::GlobalQualityPicked(quality) => {
                    if let Some(selection) = app.selection.as_mut() {
                        selection.set_global_quality(quality);
                    }
                }
                DownloadMessage::DownloadVideoPressed(video_id) => {
                    let requests = app
                        .selection
                        .as_ref()
                        .and_then(|s| s.single_request(&video_id))
                        .into_iter()
                        .collect();
                    return enqueue(app, requests);
                }
                DownloadMessage::DownloadSelectedPressed => {
                    let requests = app
                        .selection
                        .as_ref()
                        .map(Selection::bulk_requests)
                        .unwrap_or_default();
                    return enqueue(app, requests);
                }
                DownloadMessage::StopAllPressed => {
                    let was_active = app.orchestrator.is_active();
                    app.orchestrator.cancel_all(&mut app.view);
                    if was_active {
                        app.view.status_message = "All downloads stopped".to_string();
                    }
                }
                DownloadMessage::UrlChanged(_) => {}
            }
        }
        Message::FetchCompleted(result) => {
            app.view.is_fetching = false;
            match result {
                Ok(fetched) => {
                    let selection = Selection::new(fetched);
                    app.view.status_message =
                        format!("Found {} videos", selection.videos().len());
                    app.view.load(&selection);
                    app.selection = Some(selection);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "metadata fetch failed");
                    app.view.status_message = format!("Error: {}", e);
                }
            }
        }
        Message::Progress(channel, event) => {
            app.orchestrator.handle_event(channel, event, &mut app.view);
            return app.orchestrator.opener_mut().take_tasks();
        }
    }
    Task::none()
}

fn start_fetch(app: &mut DownloadApp) -> Task<Message> {
    if app.view.is_fetching {
        return Task::none();
    }

    let url = match crate::utils::validate_source_url(&app.view.source_url) {
        Ok(url) => url,
        Err(e) => {
            app.view.status_message = e.to_string();
            return Task::none();
        }
    };

    app.view.is_fetching = true;
    app.view.status_message = format!("Fetching: {}", url);

    let api_client = app.api_client.clone();
    Task::perform(
        async move {
            api_client
                .fetch_videos(url.as_str())
                .await
                .map_err(AppError::from)
        },
        Message::FetchCompleted,
    )
}

fn enqueue(app: &mut DownloadApp, requests: Vec<crate::domain::DownloadRequest>) -> Task<Message> {
    let count = requests.len();
    match app.orchestrator.enqueue_many(requests, &mut app.view) {
        Ok(()) if count > 0 => {
            app.view.status_message = format!("Downloading {} item(s)", count);
        }
        Ok(()) => {
            app.view.status_message = "Nothing selected".to_string();
        }
        Err(e) => {
            if let Some(current) = app.orchestrator.state().current_request() {
                tracing::debug!(in_flight = %current.video_id, error = %e, "enqueue rejected");
            }
        }
    }
    app.orchestrator.opener_mut().take_tasks()
}

pub fn view(app: &DownloadApp) -> iced::Element<'_, Message> {
    app.view
        .view(app.selection.as_ref(), app.orchestrator.pending())
        .map(Message::UiMessage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Outcome;

    fn app() -> DownloadApp {
        DownloadApp::new(ApiConfig::new("http://127.0.0.1:9"))
    }

    fn fetched(ids: &[&str]) -> FetchResponse {
        FetchResponse {
            channel: Default::default(),
            videos: ids
                .iter()
                .map(|id| serde_json::from_value(serde_json::json!({"id": id})).unwrap())
                .collect(),
        }
    }

    fn ui(app: &mut DownloadApp, msg: DownloadMessage) {
        let _ = update(app, Message::UiMessage(msg));
    }

    #[test]
    fn test_invalid_url_is_rejected_before_fetch() {
        let mut app = app();
        ui(&mut app, DownloadMessage::UrlChanged("nope".to_string()));
        ui(&mut app, DownloadMessage::FetchPressed);
        assert!(!app.view.is_fetching);
        assert!(app.view.status_message.starts_with("Invalid URL"));
    }

    #[test]
    fn test_fetch_error_is_shown() {
        let mut app = app();
        let _ = update(
            &mut app,
            Message::FetchCompleted(Err(AppError::Request("Failed to fetch video data.".into()))),
        );
        assert_eq!(
            app.view.status_message,
            "Error: Request failed: Failed to fetch video data."
        );
        assert!(app.selection.is_none());
    }

    #[test]
    fn test_download_selected_then_stop_all() {
        let mut app = app();
        let _ = update(&mut app, Message::FetchCompleted(Ok(fetched(&["a", "b"]))));

        ui(&mut app, DownloadMessage::DownloadSelectedPressed);
        assert!(app.orchestrator.is_active());
        assert_eq!(app.orchestrator.pending(), 1);
        assert!(app.view.dock_visible());

        ui(&mut app, DownloadMessage::DownloadVideoPressed("b".to_string()));
        assert_eq!(
            app.view.status_message,
            AppError::Concurrency.to_string()
        );
        assert_eq!(app.orchestrator.pending(), 1);

        ui(&mut app, DownloadMessage::StopAllPressed);
        assert_eq!(app.view.status_message, "All downloads stopped");
        assert!(!app.orchestrator.is_active());
        assert_eq!(app.orchestrator.pending(), 0);
        assert!(!app.view.dock_visible());
    }

    #[test]
    fn test_stop_all_when_idle_keeps_status() {
        let mut app = app();
        let _ = update(&mut app, Message::FetchCompleted(Ok(fetched(&["a"]))));
        let before = app.view.status_message.clone();

        ui(&mut app, DownloadMessage::StopAllPressed);
        assert_eq!(app.view.status_message, before);
        assert!(!app.orchestrator.is_active());
    }

    #[test]
    fn test_progress_messages_drive_the_queue() {
        let mut app = app();
        let _ = update(&mut app, Message::FetchCompleted(Ok(fetched(&["a", "b"]))));
        ui(&mut app, DownloadMessage::DownloadSelectedPressed);

        let first = app.orchestrator.state().active_channel().unwrap();
        let _ = update(
            &mut app,
            Message::Progress(first, ProgressEvent::terminal(Outcome::Finished, "done")),
        );
        let second = app.orchestrator.state().active_channel().unwrap();
        assert_ne!(first, second);
        assert_eq!(
            app.orchestrator.state().current_request().unwrap().video_id,
            "b"
        );

        let _ = update(
            &mut app,
            Message::Progress(second, ProgressEvent::terminal(Outcome::Error, "Connection lost")),
        );
        assert!(!app.orchestrator.is_active());
    }

    #[test]
    fn test_empty_selection_does_not_start() {
        let mut app = app();
        let _ = update(&mut app, Message::FetchCompleted(Ok(fetched(&["a"]))));
        ui(&mut app, DownloadMessage::SelectAllToggled(false));
        ui(&mut app, DownloadMessage::DownloadSelectedPressed);

        assert!(!app.orchestrator.is_active());
        assert!(!app.view.dock_visible());
        assert_eq!(app.view.status_message, "Nothing selected");
    }
}
