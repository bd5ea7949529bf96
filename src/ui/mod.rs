use std::collections::HashMap;

use iced::{
    widget::{
        button, column, container, pick_list, progress_bar, row, scrollable, text, text_input,
        toggler, Column, Space,
    },
    Element, Length,
};

use crate::{
    application::{Selection, ViewSync},
    domain::{DownloadRequest, Outcome, Quality},
    utils::{format_count, format_duration, percent_label},
};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
enum CardStatus {
    #[default]
    Ready,
    Downloading,
    Done(Outcome),
}

/// Display state of one video card, looked up by video id.
#[derive(Debug, Default)]
struct CardView {
    status: CardStatus,
    progress_visible: bool,
    percent: f32,
    detail: String,
}

/// The shared indicator for whichever item is in flight.
#[derive(Debug, Default)]
struct DockView {
    visible: bool,
    title: String,
    percent: f32,
    status: String,
}

/// Main view state
pub struct DownloadView {
    pub source_url: String,
    pub status_message: String,
    pub is_fetching: bool,
    cards: HashMap<String, CardView>,
    dock: DockView,
}

impl Default for DownloadView {
    fn default() -> Self {
        Self {
            source_url: String::new(),
            status_message: "Paste a channel or playlist URL to get started".to_string(),
            is_fetching: false,
            cards: HashMap::new(),
            dock: DockView::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum DownloadMessage {
    UrlChanged(String),
    FetchPressed,
    SelectAllToggled(bool),
    VideoToggled(String, bool),
    QualityPicked(String, Quality),
    GlobalQualityPicked(Quality),
    DownloadVideoPressed(String),
    DownloadSelectedPressed,
    StopAllPressed,
}

impl DownloadView {
    pub fn update(&mut self, message: DownloadMessage) {
        match message {
            DownloadMessage::UrlChanged(url) => {
                self.source_url = url;
            }
            _ => {
                // Will be handled by the app
            }
        }
    }

    /// Replaces all cards with fresh ones for a new fetch result.
    pub fn load(&mut self, selection: &Selection) {
        self.cards = selection
            .videos()
            .iter()
            .map(|v| (v.id.clone(), CardView::default()))
            .collect();
    }

    pub fn dock_visible(&self) -> bool {
        self.dock.visible
    }

    pub fn view<'a>(
        &'a self,
        selection: Option<&'a Selection>,
        queued: usize,
    ) -> Element<'a, DownloadMessage> {
        let fetch_label = if self.is_fetching {
            "Fetching..."
        } else {
            "Fetch Content"
        };

        let mut content = column![
            text("Channel Downloader").size(32),
            row![
                text_input("Paste a channel or playlist URL...", &self.source_url)
                    .on_input(DownloadMessage::UrlChanged)
                    .on_submit(DownloadMessage::FetchPressed)
                    .padding(10),
                button(fetch_label)
                    .on_press_maybe((!self.is_fetching).then_some(DownloadMessage::FetchPressed))
                    .padding([10, 20]),
            ]
            .spacing(10),
            text(&self.status_message).size(14),
        ]
        .padding(20)
        .spacing(10);

        if let Some(selection) = selection {
            content = content
                .push(self.channel_header(selection))
                .push(self.bulk_controls(selection))
                .push(scrollable(self.card_list(selection)).height(Length::Fill));
        }

        if self.dock.visible {
            content = content.push(self.dock_view(queued));
        }

        content.into()
    }

    fn channel_header<'a>(&'a self, selection: &'a Selection) -> Element<'a, DownloadMessage> {
        let channel = selection.channel();
        let name = channel.name.as_deref().unwrap_or("Unknown channel");
        let subscribers = channel.subscriber_count.as_deref().unwrap_or("N/A");
        let count = channel
            .video_count
            .unwrap_or(selection.videos().len() as u64);

        let mut header = column![
            text(name).size(22),
            text(format!("{} | {} videos", subscribers, format_count(count))).size(12),
        ]
        .spacing(4);
        if let Some(url) = channel.url.as_deref() {
            header = header.push(text(url).size(12));
        }
        container(header).padding(10).into()
    }

    fn bulk_controls<'a>(&'a self, selection: &'a Selection) -> Element<'a, DownloadMessage> {
        row![
            toggler(selection.all_selected())
                .label(format!("Select All ({})", selection.videos().len()))
                .on_toggle(DownloadMessage::SelectAllToggled),
            Space::new().width(Length::Fill),
            pick_list(
                Quality::ALL,
                Some(selection.global_quality()),
                DownloadMessage::GlobalQualityPicked
            ),
            button("Download Selected")
                .on_press(DownloadMessage::DownloadSelectedPressed)
                .padding([10, 20]),
        ]
        .spacing(10)
        .into()
    }

    fn card_list<'a>(&'a self, selection: &'a Selection) -> Element<'a, DownloadMessage> {
        let cards = selection
            .videos()
            .iter()
            .map(|video| -> Element<'a, DownloadMessage> {
                let id = video.id.clone();
                let card = self.cards.get(&video.id);
                let status = card.map(|c| c.status).unwrap_or_default();

                let mut meta = format!(
                    "{} views | {}",
                    format_count(video.view_count.unwrap_or(0)),
                    video.upload_date.as_deref().unwrap_or("N/A")
                );
                if let Some(duration) = video.duration {
                    meta.push_str(&format!(" | {}", format_duration(duration)));
                }

                let mut body = column![text(video.display_title()).size(16), text(meta).size(12)]
                    .spacing(4);

                if let Some(card) = card.filter(|c| c.progress_visible) {
                    body = body
                        .push(progress_bar(0.0..=100.0, card.percent))
                        .push(text(percent_label(card.percent)).size(12));
                }
                if let Some(card) = card.filter(|c| !c.detail.is_empty()) {
                    body = body.push(text(&card.detail).size(12));
                }

                let toggle_id = id.clone();
                let select = toggler(selection.is_selected(&id))
                    .on_toggle(move |checked| DownloadMessage::VideoToggled(toggle_id.clone(), checked));

                let controls: Element<'a, DownloadMessage> = match status {
                    CardStatus::Ready => {
                        let quality_id = id.clone();
                        row![
                            pick_list(Quality::ALL, Some(selection.quality(&id)), move |q| {
                                DownloadMessage::QualityPicked(quality_id.clone(), q)
                            }),
                            button("Download")
                                .on_press(DownloadMessage::DownloadVideoPressed(id.clone())),
                        ]
                        .spacing(10)
                        .into()
                    }
                    CardStatus::Downloading => text("Downloading...").into(),
                    CardStatus::Done(outcome) => text(outcome.label()).into(),
                };

                container(
                    column![body, row![select, Space::new().width(Length::Fill), controls]]
                        .spacing(8),
                )
                .padding(10)
                .into()
            })
            .collect::<Vec<_>>();

        Column::with_children(cards).spacing(12).into()
    }

    fn dock_view(&self, queued: usize) -> Element<'_, DownloadMessage> {
        let mut status = self.dock.status.clone();
        if queued > 0 {
            status = format!("{}  ·  {} more queued", status, queued);
        }

        container(
            column![
                text(&self.dock.title).size(14),
                progress_bar(0.0..=100.0, self.dock.percent),
                row![
                    text(status).size(12),
                    Space::new().width(Length::Fill),
                    button("Stop All").on_press(DownloadMessage::StopAllPressed),
                ]
                .spacing(10),
            ]
            .spacing(6),
        )
        .padding(10)
        .into()
    }
}

impl ViewSync for DownloadView {
    fn mark_downloading(&mut self, request: &DownloadRequest) {
        if let Some(card) = self.cards.get_mut(&request.video_id) {
            card.status = CardStatus::Downloading;
            card.progress_visible = true;
            card.percent = 0.0;
            card.detail.clear();
        }
        self.dock.title = format!("Downloading: {}", request.title);
        self.dock.percent = 0.0;
        self.dock.status.clear();
    }

    fn show_progress(&mut self, video_id: &str, percent: f32, human_size: &str) {
        if let Some(card) = self.cards.get_mut(video_id) {
            card.percent = percent;
            card.detail = human_size.to_string();
        }
        self.dock.percent = percent;
        self.dock.status = format!("{} ({})", human_size, percent_label(percent));
    }

    fn mark_finished(&mut self, video_id: &str, outcome: Outcome, message: &str) {
        if let Some(card) = self.cards.get_mut(video_id) {
            card.status = CardStatus::Done(outcome);
            card.detail = message.to_string();
        }
    }

    fn set_dock_visible(&mut self, visible: bool) {
        self.dock.visible = visible;
        if !visible {
            self.dock = DockView::default();
        }
    }

    fn warn(&mut self, message: &str) {
        self.status_message = message.to_string();
    }
}
