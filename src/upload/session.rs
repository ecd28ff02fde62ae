//! Upload session: validation, then simulated upload and analysis progress.
//!
//! Progress is driven by [`UploadSession::tick`] with the host's clock, so the
//! session never spawns timers of its own. Upload advances 5% every 200 ms and
//! analysis 2% every 300 ms.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::core::analysis::{AnalysisError, AnalysisId};
use crate::core::source::generate_analysis;
use crate::upload::probe::{MediaProbe, UploadedMedia};

const UPLOAD_STEP: u8 = 5;
const UPLOAD_INTERVAL: Duration = Duration::from_millis(200);
const ANALYSIS_STEP: u8 = 2;
const ANALYSIS_INTERVAL: Duration = Duration::from_millis(300);

/// Error type for uploads
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Not a video file: {0}")]
    NotVideo(PathBuf),
    #[error("Failed to probe {path}: {reason}")]
    Probe { path: PathBuf, reason: String },
    #[error("Analysis failed: {0}")]
    Analysis(#[from] AnalysisError),
    #[error("An upload is already in progress")]
    Busy,
}

/// Phase of an upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStatus {
    Idle,
    Uploading,
    Analyzing,
    Complete,
    Error,
}

impl UploadStatus {
    pub fn is_active(self) -> bool {
        matches!(self, UploadStatus::Uploading | UploadStatus::Analyzing)
    }
}

/// Milestones reported by [`UploadSession::tick`]
#[derive(Debug, Clone, PartialEq)]
pub enum UploadUpdate {
    Progress { status: UploadStatus, progress: u8 },
    /// Upload finished; the media can be played
    MediaReady(UploadedMedia),
    /// Analysis finished under this identifier
    AnalysisReady(AnalysisId),
    Failed(String),
}

pub struct UploadSession {
    status: UploadStatus,
    progress: u8, // 0 to 100 within the current phase
    media: Option<UploadedMedia>,
    analysis_id: Option<AnalysisId>,
    error: Option<String>,
    next_step: Option<Instant>,
}

impl UploadSession {
    pub fn new() -> Self {
        Self {
            status: UploadStatus::Idle,
            progress: 0,
            media: None,
            analysis_id: None,
            error: None,
            next_step: None,
        }
    }

    pub fn status(&self) -> UploadStatus {
        self.status
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn media(&self) -> Option<&UploadedMedia> {
        self.media.as_ref()
    }

    pub fn analysis_id(&self) -> Option<&AnalysisId> {
        self.analysis_id.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Validate `path` and begin uploading.
    ///
    /// A file the probe rejects leaves the session untouched.
    pub fn start(
        &mut self,
        path: &Path,
        probe: &dyn MediaProbe,
        now: Instant,
    ) -> Result<(), UploadError> {
        if self.status.is_active() {
            return Err(UploadError::Busy);
        }

        let media = match probe.probe(path) {
            Ok(media) => media,
            Err(e @ UploadError::NotVideo(_)) => {
                tracing::warn!(path = %path.display(), "rejected non-video upload");
                return Err(e);
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "upload probe failed");
                self.fail(e.to_string());
                return Err(e);
            }
        };

        tracing::info!(path = %media.path.display(), duration = media.duration, "upload started");
        *self = Self {
            status: UploadStatus::Uploading,
            media: Some(media),
            next_step: Some(now + UPLOAD_INTERVAL),
            ..Self::new()
        };
        Ok(())
    }

    /// Advance every progress step due by `now`
    pub fn tick(&mut self, now: Instant) -> Vec<UploadUpdate> {
        let mut updates = Vec::new();

        while let Some(due) = self.next_step {
            if now < due {
                break;
            }
            self.step(due, &mut updates);
        }

        updates
    }

    /// Return to idle, forgetting the previous upload
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn step(&mut self, due: Instant, updates: &mut Vec<UploadUpdate>) {
        match self.status {
            UploadStatus::Uploading => {
                self.progress = (self.progress + UPLOAD_STEP).min(100);
                updates.push(self.progress_update());

                if self.progress < 100 {
                    self.next_step = Some(due + UPLOAD_INTERVAL);
                    return;
                }

                if let Some(media) = &self.media {
                    updates.push(UploadUpdate::MediaReady(media.clone()));
                }
                self.status = UploadStatus::Analyzing;
                self.progress = 0;
                self.next_step = Some(due + ANALYSIS_INTERVAL);
                updates.push(self.progress_update());
            }
            UploadStatus::Analyzing => {
                self.progress = (self.progress + ANALYSIS_STEP).min(100);
                if self.progress < 100 {
                    updates.push(self.progress_update());
                    self.next_step = Some(due + ANALYSIS_INTERVAL);
                    return;
                }

                self.next_step = None;
                let duration = self.media.as_ref().map_or(0.0, |m| m.duration);
                match generate_analysis(duration) {
                    Ok(analysis) => {
                        tracing::info!(analysis = %analysis.id, "analysis complete");
                        self.status = UploadStatus::Complete;
                        updates.push(self.progress_update());
                        updates.push(UploadUpdate::AnalysisReady(analysis.id.clone()));
                        self.analysis_id = Some(analysis.id);
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "analysis failed");
                        self.fail(e.to_string());
                        updates.push(UploadUpdate::Failed(e.to_string()));
                    }
                }
            }
            UploadStatus::Idle | UploadStatus::Complete | UploadStatus::Error => {
                self.next_step = None;
            }
        }
    }

    fn progress_update(&self) -> UploadUpdate {
        UploadUpdate::Progress {
            status: self.status,
            progress: self.progress,
        }
    }

    fn fail(&mut self, message: String) {
        self.status = UploadStatus::Error;
        self.progress = 0;
        self.error = Some(message);
        self.next_step = None;
    }
}

impl Default for UploadSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::probe::MimeProbe;

    struct BrokenProbe;

    impl MediaProbe for BrokenProbe {
        fn probe(&self, path: &Path) -> Result<UploadedMedia, UploadError> {
            Err(UploadError::Probe {
                path: path.to_path_buf(),
                reason: "truncated container".into(),
            })
        }
    }

    #[test]
    fn test_non_video_creates_no_state() {
        let mut session = UploadSession::new();
        let err = session
            .start(Path::new("lineup.pdf"), &MimeProbe::new(90.0), Instant::now())
            .unwrap_err();

        assert!(matches!(err, UploadError::NotVideo(_)));
        assert_eq!(session.status(), UploadStatus::Idle);
        assert!(session.media().is_none());
    }

    #[test]
    fn test_probe_failure_sets_error() {
        let mut session = UploadSession::new();
        assert!(session
            .start(Path::new("match.mp4"), &BrokenProbe, Instant::now())
            .is_err());
        assert_eq!(session.status(), UploadStatus::Error);
        assert!(session.error().unwrap().contains("truncated"));
    }

    #[test]
    fn test_upload_progresses_in_steps() {
        let t0 = Instant::now();
        let mut session = UploadSession::new();
        session
            .start(Path::new("match.mp4"), &MimeProbe::new(90.0), t0)
            .unwrap();
        assert_eq!(session.status(), UploadStatus::Uploading);
        assert_eq!(session.progress(), 0);

        assert!(session.tick(t0 + Duration::from_millis(199)).is_empty());
        session.tick(t0 + Duration::from_millis(200));
        assert_eq!(session.progress(), 5);
        session.tick(t0 + Duration::from_millis(1000));
        assert_eq!(session.progress(), 25);
    }

    #[test]
    fn test_full_run_reports_media_then_analysis() {
        let t0 = Instant::now();
        let mut session = UploadSession::new();
        session
            .start(Path::new("match.mp4"), &MimeProbe::new(90.0), t0)
            .unwrap();

        // 20 upload steps of 200 ms
        let updates = session.tick(t0 + Duration::from_millis(4000));
        assert!(updates.contains(&UploadUpdate::Progress {
            status: UploadStatus::Uploading,
            progress: 100,
        }));
        assert!(matches!(
            updates.iter().find(|u| matches!(u, UploadUpdate::MediaReady(_))),
            Some(UploadUpdate::MediaReady(media)) if media.duration == 90.0
        ));
        assert_eq!(session.status(), UploadStatus::Analyzing);
        assert_eq!(session.progress(), 0);

        // 50 analysis steps of 300 ms
        let updates = session.tick(t0 + Duration::from_millis(4000 + 15_000));
        assert_eq!(session.status(), UploadStatus::Complete);
        assert_eq!(session.progress(), 100);
        let id = session.analysis_id().unwrap();
        assert!(id.as_str().starts_with("analysis-"));
        assert_eq!(updates.last(), Some(&UploadUpdate::AnalysisReady(id.clone())));

        assert!(session.tick(t0 + Duration::from_secs(60)).is_empty());
    }

    #[test]
    fn test_busy_while_uploading() {
        let t0 = Instant::now();
        let mut session = UploadSession::new();
        let probe = MimeProbe::new(90.0);
        session.start(Path::new("match.mp4"), &probe, t0).unwrap();
        assert!(matches!(
            session.start(Path::new("other.mp4"), &probe, t0),
            Err(UploadError::Busy)
        ));
    }

    #[test]
    fn test_reset_returns_to_idle() {
        let mut session = UploadSession::new();
        session
            .start(Path::new("match.mp4"), &MimeProbe::new(90.0), Instant::now())
            .unwrap();
        session.reset();
        assert_eq!(session.status(), UploadStatus::Idle);
        assert!(session.media().is_none());
    }
}
