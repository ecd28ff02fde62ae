//! Media validation and duration probing for uploads.

use std::path::{Path, PathBuf};

use crate::core::time::Seconds;
use crate::upload::session::UploadError;

/// A validated video ready for playback
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedMedia {
    pub path: PathBuf,
    pub duration: Seconds,
}

/// Decides whether a file is a playable video and reads its duration
pub trait MediaProbe {
    fn probe(&self, path: &Path) -> Result<UploadedMedia, UploadError>;
}

impl<P: MediaProbe + ?Sized> MediaProbe for Box<P> {
    fn probe(&self, path: &Path) -> Result<UploadedMedia, UploadError> {
        (**self).probe(path)
    }
}

/// True if the file's extension maps to a `video/*` MIME type
pub fn is_video_path(path: &Path) -> bool {
    mime_guess::from_path(path)
        .first()
        .map_or(false, |mime| mime.type_() == mime_guess::mime::VIDEO)
}

/// Judges by file extension and reports a fixed duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MimeProbe {
    fallback_duration: Seconds,
}

impl MimeProbe {
    pub fn new(fallback_duration: Seconds) -> Self {
        Self { fallback_duration }
    }
}

impl MediaProbe for MimeProbe {
    fn probe(&self, path: &Path) -> Result<UploadedMedia, UploadError> {
        if !is_video_path(path) {
            return Err(UploadError::NotVideo(path.to_path_buf()));
        }

        Ok(UploadedMedia {
            path: path.to_path_buf(),
            duration: self.fallback_duration,
        })
    }
}

#[cfg(feature = "ffmpeg")]
pub use ffmpeg_probe::FfmpegProbe;

#[cfg(feature = "ffmpeg")]
mod ffmpeg_probe {
    use super::*;
    use ffmpeg_next as ffmpeg;

    /// Reads the container duration with FFmpeg
    #[derive(Debug, Clone, Copy, Default)]
    pub struct FfmpegProbe;

    impl FfmpegProbe {
        pub fn new() -> Result<Self, UploadError> {
            ffmpeg::init().map_err(|e| UploadError::Probe {
                path: PathBuf::new(),
                reason: format!("FFmpeg init failed: {e}"),
            })?;
            Ok(Self)
        }
    }

    impl MediaProbe for FfmpegProbe {
        fn probe(&self, path: &Path) -> Result<UploadedMedia, UploadError> {
            if !is_video_path(path) {
                return Err(UploadError::NotVideo(path.to_path_buf()));
            }

            let input = ffmpeg::format::input(&path).map_err(|e| UploadError::Probe {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

            if input.streams().best(ffmpeg::media::Type::Video).is_none() {
                return Err(UploadError::NotVideo(path.to_path_buf()));
            }

            // Container duration is in AV_TIME_BASE units
            let duration = input.duration().max(0) as f64 / f64::from(ffmpeg::ffi::AV_TIME_BASE);
            tracing::debug!(path = %path.display(), duration, "probed media");

            Ok(UploadedMedia {
                path: path.to_path_buf(),
                duration,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_extensions_accepted() {
        assert!(is_video_path(Path::new("match.mp4")));
        assert!(is_video_path(Path::new("/tmp/clips/derby.MOV")));
        assert!(is_video_path(Path::new("final.webm")));
    }

    #[test]
    fn test_non_video_rejected() {
        let probe = MimeProbe::new(90.0);
        let err = probe.probe(Path::new("lineup.png")).unwrap_err();
        assert!(matches!(err, UploadError::NotVideo(_)));
        assert!(probe.probe(Path::new("notes")).is_err());
    }

    #[test]
    fn test_mime_probe_uses_fallback_duration() {
        let media = MimeProbe::new(90.0).probe(Path::new("match.mp4")).unwrap();
        assert_eq!(media.duration, 90.0);
        assert_eq!(media.path, PathBuf::from("match.mp4"));
    }
}
