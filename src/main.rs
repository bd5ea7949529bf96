mod api;
mod app;
mod application;
mod domain;
mod ui;
mod utils;

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "channel_downloader=info".into());

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn main() -> iced::Result {
    init_tracing();

    iced::application(app::DownloadApp::default, app::update, app::view)
        .title("Channel Downloader")
        .run()
}
