//! Video upload: validation through a [`MediaProbe`] and the simulated
//! upload/analysis progress that precedes playback.

pub mod probe;
pub mod session;

#[cfg(feature = "ffmpeg")]
pub use probe::FfmpegProbe;
pub use probe::{is_video_path, MediaProbe, MimeProbe, UploadedMedia};
pub use session::{UploadError, UploadSession, UploadStatus, UploadUpdate};
