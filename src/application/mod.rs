pub mod orchestrator;
pub mod progress_channel;
pub mod queue;
pub mod selection;
pub mod view_sync;

pub use orchestrator::Orchestrator;
pub use progress_channel::TaskChannelOpener;
pub use selection::Selection;
pub use view_sync::ViewSync;
