//! Crate-wide error type.

use crate::audio::speech::SpeechError;
use crate::config::ConfigError;
use crate::core::analysis::AnalysisError;
use crate::upload::session::UploadError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Speech(#[from] SpeechError),
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_conversions_keep_message() {
        let err: Error = UploadError::NotVideo(PathBuf::from("a.png")).into();
        assert_eq!(err.to_string(), "Not a video file: a.png");

        let err: Error = SpeechError::Unavailable("no engine".into()).into();
        assert!(matches!(err, Error::Speech(_)));
    }
}
