//! Main application window.
//! Hosts the upload panel, the player, the event strip, the tactical map and
//! the analysis summary, all driven from one playback controller.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use eframe::egui::*;
use eframe::{App, CreationContext};

use crate::audio::{ManualBackend, Narrator, SpeechBackend, SystemSpeech};
use crate::config::AppConfig;
use crate::core::analysis::Analysis;
use crate::core::source::{AnalysisSource, FixtureSource};
use crate::playback::{ClockMedia, PlaybackController, PlaybackEvent};
use crate::ui::timeline_view::TimelineView;
use crate::ui::{player_view, summary_view, tactical_view};
use crate::upload::{MediaProbe, UploadSession, UploadStatus, UploadUpdate, UploadedMedia};

type Controller = PlaybackController<ClockMedia, Box<dyn SpeechBackend>>;

const FRAME_INTERVAL: Duration = Duration::from_millis(50);

/// Narration backend for this platform, or a silent one when unavailable.
/// The flag reports whether a real engine was found.
fn narration_backend() -> (Box<dyn SpeechBackend>, bool) {
    match SystemSpeech::new() {
        Ok(speech) => (Box::new(speech), true),
        Err(e) => {
            tracing::warn!(error = %e, "speech engine unavailable, narration disabled");
            (Box::new(ManualBackend::silent()), false)
        }
    }
}

pub struct PlayerApp {
    config: AppConfig,
    /// Where preference changes are written; `None` uses confy's location
    config_path: Option<PathBuf>,
    config_dirty: bool,
    speech_available: bool,
    probe: Box<dyn MediaProbe>,
    source: FixtureSource,
    upload: UploadSession,
    upload_path: String,
    upload_error: Option<String>,
    /// Held until the first media arrives and a controller is built
    narrator: Option<Narrator<Box<dyn SpeechBackend>>>,
    controller: Option<Controller>,
    events: Option<crossbeam::channel::Receiver<PlaybackEvent>>,
    analysis: Option<Arc<Analysis>>,
    timeline: TimelineView,
}

impl PlayerApp {
    /// Create the app, uploading `initial_video` right away if given
    pub fn new(
        _cc: &CreationContext<'_>,
        config: AppConfig,
        config_path: Option<PathBuf>,
        probe: Box<dyn MediaProbe>,
        initial_video: Option<PathBuf>,
    ) -> Self {
        let (backend, speech_available) = narration_backend();
        let mut narrator = Narrator::new(backend);
        narrator.prefer_voices(&config.preferred_voices);
        narrator.set_rate(config.speech_rate);

        let mut app = Self {
            config,
            config_path,
            config_dirty: false,
            speech_available,
            probe,
            source: FixtureSource,
            upload: UploadSession::new(),
            upload_path: String::new(),
            upload_error: None,
            narrator: Some(narrator),
            controller: None,
            events: None,
            analysis: None,
            timeline: TimelineView::new(),
        };

        if let Some(path) = initial_video {
            app.upload_path = path.display().to_string();
            app.start_upload(&path);
        }
        app
    }

    fn start_upload(&mut self, path: &Path) {
        self.upload_error = None;
        if let Err(e) = self.upload.start(path, self.probe.as_ref(), Instant::now()) {
            self.upload_error = Some(e.to_string());
        }
    }

    fn poll_upload(&mut self, now: Instant) {
        for update in self.upload.tick(now) {
            match update {
                UploadUpdate::MediaReady(media) => self.load_media(media),
                UploadUpdate::AnalysisReady(id) => match self.source.lookup(&id) {
                    Ok(analysis) => {
                        let analysis = Arc::new(analysis);
                        self.analysis = Some(analysis.clone());
                        if let Some(controller) = &mut self.controller {
                            controller.set_analysis(Some(analysis));
                        }
                    }
                    Err(e) => {
                        tracing::error!(analysis = %id, error = %e, "analysis lookup failed");
                        self.upload_error = Some(e.to_string());
                    }
                },
                UploadUpdate::Failed(message) => self.upload_error = Some(message),
                UploadUpdate::Progress { .. } => {}
            }
        }
    }

    /// Swap the uploaded media into the player; the previous analysis goes away
    fn load_media(&mut self, media: UploadedMedia) {
        let clock = ClockMedia::new(media.path, media.duration);
        self.analysis = None;

        match self.controller.as_mut() {
            Some(controller) => {
                controller.replace_media(clock);
                controller.set_analysis(None);
            }
            None => {
                let Some(narrator) = self.narrator.take() else {
                    return;
                };
                let mut settings = self.config.player_settings();
                settings.narration_enabled &= self.speech_available;
                let controller = PlaybackController::new(clock, narrator, settings);
                self.events = Some(controller.events());
                self.controller = Some(controller);
            }
        }
    }

    fn drain_events(&mut self) -> bool {
        let Some(events) = &self.events else {
            return false;
        };
        let mut changed = false;
        for event in events.try_iter() {
            tracing::trace!(?event, "playback event");
            changed = true;
        }
        changed
    }

    /// Persist volume and commentary toggles once the user lets go of the
    /// controls
    fn remember_preferences(&mut self, ctx: &Context) {
        let Some(controller) = &self.controller else {
            return;
        };
        let mut updated = self.config.clone();
        updated.remember(controller.state());
        if !self.speech_available {
            updated.narration_enabled = self.config.narration_enabled;
        }
        if updated != self.config {
            self.config = updated;
            self.config_dirty = true;
        }

        if self.config_dirty && !ctx.input(|i| i.pointer.any_down()) {
            self.config_dirty = false;
            match self.config.save(self.config_path.as_deref()) {
                Ok(()) => tracing::debug!(path = ?self.config_path, "preferences saved"),
                Err(e) => tracing::warn!(error = %e, "failed to save preferences"),
            }
        }
    }

    fn upload_panel(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.label("Match video:");
            let busy = self.upload.status().is_active();
            ui.add_enabled(!busy, TextEdit::singleline(&mut self.upload_path).desired_width(320.0));
            if ui.add_enabled(!busy, Button::new("Upload & analyze")).clicked() {
                let path = PathBuf::from(self.upload_path.trim());
                self.start_upload(&path);
            }
        });

        let (label, progress) = match self.upload.status() {
            UploadStatus::Idle => (None, 0),
            UploadStatus::Uploading => (Some("Uploading video"), self.upload.progress()),
            UploadStatus::Analyzing => (Some("Analyzing match"), self.upload.progress()),
            UploadStatus::Complete => (Some("Analysis complete"), 100),
            UploadStatus::Error => (Some("Upload failed"), 0),
        };
        if let Some(label) = label {
            ui.add(
                ProgressBar::new(f32::from(progress) / 100.0)
                    .text(format!("{label} {progress}%")),
            );
        }
        if let Some(error) = &self.upload_error {
            ui.colored_label(ui.visuals().error_fg_color, error.as_str());
        }
    }
}

impl App for PlayerApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.poll_upload(now);
        if let Some(controller) = &mut self.controller {
            controller.tick(now);
        }
        let changed = self.drain_events();

        TopBottomPanel::top("upload").show(ctx, |ui| {
            ui.heading("Pitchside");
            self.upload_panel(ui);
        });

        let mut seek_request = None;
        let current_time = self
            .controller
            .as_ref()
            .map_or(0.0, |controller| controller.current_time());

        if let Some(analysis) = self.analysis.clone() {
            SidePanel::right("analysis")
                .resizable(true)
                .default_width(340.0)
                .show(ctx, |ui| {
                    tactical_view::show(ui, &analysis, current_time);
                    ui.separator();
                    seek_request = seek_request.or(summary_view::show(ui, &analysis));
                });

            TopBottomPanel::bottom("timeline")
                .resizable(false)
                .show(ctx, |ui| {
                    seek_request = seek_request.or(self.timeline.show(ui, &analysis, current_time));
                });
        }

        CentralPanel::default().show(ctx, |ui| match self.controller.as_mut() {
            Some(controller) => {
                let title = controller
                    .media()
                    .source()
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                player_view::show(ui, controller, &title, now);
            }
            None => {
                ui.centered_and_justified(|ui| {
                    ui.label("Upload a match video to begin");
                });
            }
        });

        if let (Some(time), Some(controller)) = (seek_request, self.controller.as_mut()) {
            controller.seek_to(time);
        }
        self.remember_preferences(ctx);

        if changed {
            ctx.request_repaint();
        } else if self.controller.is_some() || self.upload.status().is_active() {
            ctx.request_repaint_after(FRAME_INTERVAL);
        }
    }
}
