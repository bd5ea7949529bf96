pub mod error;
pub mod model;

pub use error::AppError;
pub use model::{
    ChannelId, ChannelInfo, DownloadRequest, Outcome, ProgressEvent, Quality, Video,
};
