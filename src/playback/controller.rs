//! Playback controller coordinating the media element, commentary and narration.
//! State changes are published on a crossbeam channel as [`PlaybackEvent`]s.

use std::sync::Arc;
use std::time::Instant;

use crossbeam::channel::{self, Receiver, Sender, TrySendError};

use crate::audio::speech::{Completion, Narrator, SpeechBackend, SpeechOutcome};
use crate::commentary;
use crate::core::analysis::Analysis;
use crate::core::time::{self, constants, Seconds};
use crate::playback::controls::ControlsVisibility;
use crate::playback::media::MediaElement;
use crate::playback::state::{PlaybackState, PlayerSettings, Transport};

/// Media volume factor while narration speaks
pub const DUCK_FACTOR: f32 = 0.3;

/// Undrained notifications kept before the oldest are discarded
pub const EVENT_CAPACITY: usize = 256;

/// Notification published to dependents of the controller
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    TimeUpdate(Seconds),
    TransportChanged(Transport),
    CommentaryChanged(String),
    NarrationStarted(String),
    NarrationEnded(SpeechOutcome),
    ControlsVisibility(bool),
}

/// One ducking episode: the volume to restore and the utterance holding it down
struct Duck {
    restore_volume: f32,
    completion: Completion,
}

/// Owns one media element and one narrator.
pub struct PlaybackController<M: MediaElement, B: SpeechBackend> {
    media: M,
    narrator: Narrator<B>,
    analysis: Option<Arc<Analysis>>,
    state: PlaybackState,
    controls: ControlsVisibility,
    duck: Option<Duck>,
    events_tx: Sender<PlaybackEvent>,
    /// Kept to evict the oldest event when nobody drains the queue
    events_rx: Receiver<PlaybackEvent>,
}

impl<M: MediaElement, B: SpeechBackend> PlaybackController<M, B> {
    pub fn new(mut media: M, narrator: Narrator<B>, settings: PlayerSettings) -> Self {
        let (events_tx, events_rx) = channel::bounded(EVENT_CAPACITY);
        let mut state = PlaybackState::new(settings);
        media.set_volume(state.volume);
        state.duration = known_duration(&media);

        Self {
            media,
            narrator,
            analysis: None,
            state,
            controls: ControlsVisibility::new(),
            duck: None,
            events_tx,
            events_rx,
        }
    }

    /// Receiver for controller notifications. Only the latest
    /// [`EVENT_CAPACITY`] undrained events are retained.
    pub fn events(&self) -> Receiver<PlaybackEvent> {
        self.events_rx.clone()
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn narrator(&self) -> &Narrator<B> {
        &self.narrator
    }

    pub fn narrator_mut(&mut self) -> &mut Narrator<B> {
        &mut self.narrator
    }

    pub fn analysis(&self) -> Option<&Arc<Analysis>> {
        self.analysis.as_ref()
    }

    /// Authoritative playback time
    pub fn current_time(&self) -> Seconds {
        self.state.current_time
    }

    pub fn progress_percent(&self) -> f64 {
        self.state.progress_percent()
    }

    pub fn controls_visible(&self) -> bool {
        self.controls.is_visible()
    }

    pub fn is_speaking(&self) -> bool {
        self.narrator.is_speaking()
    }

    /// Attach (or detach) the analysis driving commentary
    pub fn set_analysis(&mut self, analysis: Option<Arc<Analysis>>) {
        self.stop_narration();
        self.analysis = analysis;
        self.state.commentary.clear();
        self.state.last_spoken.clear();
        self.refresh_commentary();
    }

    /// Swap in a new media source, returning the previous one.
    ///
    /// Speech is stopped, timers are cleared and per-source state is reset.
    pub fn replace_media(&mut self, media: M) -> M {
        self.stop_narration();
        self.media.pause();
        self.controls.clear();

        let previous = std::mem::replace(&mut self.media, media);
        self.state.reset();
        self.media.set_volume(self.state.volume);
        self.media.set_muted(self.state.muted);
        self.state.duration = known_duration(&self.media);
        tracing::debug!(duration = self.state.duration, "media source replaced");
        self.refresh_commentary();
        previous
    }

    /// Media metadata became available
    pub fn on_loaded_metadata(&mut self) {
        self.state.duration = known_duration(&self.media);
    }

    /// Media tick. Propagates the time only when it moved more than the
    /// threshold since the last report; returns the propagated time.
    pub fn on_time_update(&mut self) -> Option<Seconds> {
        let now = self.media.current_time();
        if (now - self.state.last_reported).abs() > constants::TIME_UPDATE_THRESHOLD {
            self.propagate(now);
            Some(now)
        } else {
            None
        }
    }

    /// Media reached its end
    pub fn on_ended(&mut self) {
        self.media.pause();
        self.set_transport(Transport::Paused);
        self.stop_narration();
        let end = self.media.current_time();
        self.propagate(end);
    }

    pub fn toggle_play(&mut self) {
        if self.state.is_playing() {
            self.media.pause();
            self.set_transport(Transport::Paused);
            self.stop_narration();
        } else {
            self.media.play();
            self.state.commentary_paused = false;
            self.set_transport(Transport::Playing);
        }
    }

    pub fn set_volume(&mut self, volume: f32) {
        let volume = volume.clamp(0.0, 1.0);
        self.state.volume = volume;
        self.state.muted = volume == 0.0;
        self.media.set_volume(volume);
        self.media.set_muted(self.state.muted);
    }

    pub fn toggle_mute(&mut self) {
        self.state.muted = !self.state.muted;
        self.media.set_muted(self.state.muted);
    }

    /// Seek to an absolute time. Bypasses the update threshold.
    pub fn seek_to(&mut self, time: Seconds) {
        self.media.set_current_time(time);
        let landed = self.media.current_time();
        self.propagate(landed);
    }

    /// Seek to a percentage (0-100) of the duration
    pub fn seek_percent(&mut self, percent: f64) {
        let target = time::from_percent(percent, self.state.duration);
        self.seek_to(target);
    }

    pub fn skip_forward(&mut self) {
        self.seek_to(self.media.current_time() + constants::SKIP_STEP);
    }

    pub fn skip_backward(&mut self) {
        self.seek_to(self.media.current_time() - constants::SKIP_STEP);
    }

    pub fn toggle_commentary_visibility(&mut self) {
        self.state.show_commentary = !self.state.show_commentary;
    }

    /// Enable or disable spoken commentary; disabling stops current speech
    pub fn toggle_audio_commentary(&mut self) {
        if self.state.audio_enabled {
            self.stop_narration();
        }
        self.state.audio_enabled = !self.state.audio_enabled;
    }

    /// Suppress or resume narration without touching playback.
    ///
    /// Resuming while playing speaks the current commentary again.
    pub fn toggle_commentary_pause(&mut self) {
        if self.state.commentary_paused {
            self.state.commentary_paused = false;
            if self.state.is_playing()
                && self.state.audio_enabled
                && !self.state.commentary.is_empty()
            {
                let text = self.state.commentary.clone();
                self.narrate(text);
            }
        } else {
            self.state.commentary_paused = true;
            self.stop_narration();
        }
    }

    /// Pointer moved over the player surface
    pub fn pointer_moved(&mut self, now: Instant) {
        if self.controls.pointer_moved(now) {
            self.emit(PlaybackEvent::ControlsVisibility(true));
        }
    }

    /// Per-frame upkeep: narration completions, end of media, controls timer
    /// and throttled time updates.
    pub fn tick(&mut self, now: Instant) {
        self.settle_duck();

        if self.state.is_playing() && self.media.is_ended() {
            self.on_ended();
        }

        if self.controls.tick(now, self.state.is_playing()) {
            self.emit(PlaybackEvent::ControlsVisibility(false));
        }

        if self.state.is_playing() {
            self.on_time_update();
        }
    }

    fn propagate(&mut self, time: Seconds) {
        self.state.current_time = time;
        self.state.last_reported = time;
        self.emit(PlaybackEvent::TimeUpdate(time));
        self.refresh_commentary();
    }

    fn refresh_commentary(&mut self) {
        let text = match &self.analysis {
            Some(analysis) => commentary::resolve(self.state.current_time, analysis),
            None => String::new(),
        };
        if text == self.state.commentary {
            return;
        }

        self.state.commentary = text.clone();
        self.emit(PlaybackEvent::CommentaryChanged(text.clone()));

        if self.should_narrate(&text) {
            self.narrate(text);
        }
    }

    fn should_narrate(&self, text: &str) -> bool {
        self.state.audio_enabled
            && !text.is_empty()
            && text != self.state.last_spoken
            && !self.state.commentary_paused
            && self.state.is_playing()
    }

    /// Duck the media, speak, and arm the restore.
    ///
    /// The pre-duck volume is taken once per ducking episode; a narration
    /// that preempts another inherits the first snapshot.
    fn narrate(&mut self, text: String) {
        self.state.last_spoken = text.clone();

        let restore_volume = match self.duck.take() {
            Some(previous) => previous.restore_volume,
            None => self.media.volume(),
        };
        self.media.set_volume(restore_volume * DUCK_FACTOR);

        let completion = self.narrator.speak(&text);
        self.duck = Some(Duck {
            restore_volume,
            completion,
        });
        self.emit(PlaybackEvent::NarrationStarted(text));

        // A backend that failed to start has already resolved
        self.settle_duck();
    }

    fn stop_narration(&mut self) {
        if self.narrator.is_speaking() {
            self.narrator.stop();
        }
        self.settle_duck();
    }

    /// Restore the ducked volume once the active utterance has ended
    fn settle_duck(&mut self) {
        self.narrator.poll();

        let outcome = match self.duck.as_mut() {
            Some(duck) => duck.completion.try_outcome(),
            None => None,
        };
        let Some(outcome) = outcome else {
            return;
        };
        let Some(duck) = self.duck.take() else {
            return;
        };

        self.media.set_volume(duck.restore_volume);
        self.state.volume = duck.restore_volume;
        if let Some(error) = self.narrator.last_error() {
            tracing::warn!(error = %error, "narration skipped");
        }
        tracing::debug!(?outcome, volume = duck.restore_volume, "narration ended, volume restored");
        self.emit(PlaybackEvent::NarrationEnded(outcome));
    }

    fn set_transport(&mut self, transport: Transport) {
        if self.state.transport != transport {
            self.state.transport = transport;
            self.emit(PlaybackEvent::TransportChanged(transport));
        }
    }

    fn emit(&self, mut event: PlaybackEvent) {
        loop {
            match self.events_tx.try_send(event) {
                Ok(()) | Err(TrySendError::Disconnected(_)) => return,
                Err(TrySendError::Full(rejected)) => {
                    let _ = self.events_rx.try_recv();
                    event = rejected;
                }
            }
        }
    }
}

impl<M: MediaElement, B: SpeechBackend> Drop for PlaybackController<M, B> {
    fn drop(&mut self) {
        self.stop_narration();
        self.controls.clear();
    }
}

fn known_duration<M: MediaElement>(media: &M) -> Seconds {
    let duration = media.duration();
    if duration.is_finite() && duration > 0.0 {
        duration
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::backend::ManualBackend;
    use crate::core::source::match_fixture;
    use crate::playback::media::ManualMedia;
    use std::time::Duration;

    type Controller = PlaybackController<ManualMedia, ManualBackend>;

    fn controller() -> Controller {
        let mut controller = PlaybackController::new(
            ManualMedia::new(90.0),
            Narrator::new(ManualBackend::new()),
            PlayerSettings::default(),
        );
        controller.set_analysis(Some(Arc::new(match_fixture().unwrap())));
        controller
    }

    fn drain(controller: &Controller) -> Vec<PlaybackEvent> {
        controller.events().try_iter().collect()
    }

    #[test]
    fn test_time_updates_are_throttled() {
        let mut c = controller();
        c.toggle_play();

        c.media.advance(0.25);
        assert_eq!(c.on_time_update(), None);
        assert_eq!(c.current_time(), 0.0);
        c.media.advance(0.375);
        assert_eq!(c.on_time_update(), Some(0.625));
        assert_eq!(c.current_time(), 0.625);

        // Exactly the threshold does not propagate
        c.media.advance(0.5);
        assert_eq!(c.on_time_update(), None);
        assert_eq!(c.current_time(), 0.625);
    }

    #[test]
    fn test_seek_bypasses_throttle() {
        let mut c = controller();
        c.seek_to(0.2);
        assert!((c.current_time() - 0.2).abs() < 1e-9);

        c.skip_forward();
        assert!((c.current_time() - 10.2).abs() < 1e-9);
        c.skip_backward();
        c.skip_backward();
        assert_eq!(c.current_time(), 0.0);
    }

    #[test]
    fn test_seek_percent_uses_duration() {
        let mut c = controller();
        c.seek_percent(50.0);
        assert!((c.current_time() - 45.0).abs() < 1e-9);
        assert!((c.progress_percent() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_narration_ducks_and_restores() {
        let mut c = controller();
        c.toggle_play();
        c.seek_to(32.4);

        assert!(c.is_speaking());
        assert!((c.media().volume() - 0.7 * DUCK_FACTOR).abs() < 1e-6);
        assert!(c.state().commentary.starts_with("GOAL!"));

        c.narrator_mut().backend_mut().finish_current();
        c.tick(Instant::now());

        assert!(!c.is_speaking());
        assert!((c.media().volume() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_restore_ignores_mid_speech_volume_change() {
        let mut c = controller();
        c.toggle_play();
        c.seek_to(32.4);
        c.set_volume(0.2);

        c.narrator_mut().backend_mut().finish_current();
        c.tick(Instant::now());

        assert!((c.media().volume() - 0.7).abs() < 1e-6);
        assert!((c.state().volume - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_overlapping_narration_keeps_first_snapshot() {
        let mut c = controller();
        c.toggle_play();
        c.seek_to(12.5);
        assert!(c.is_speaking());
        c.seek_to(32.4);

        assert_eq!(c.narrator().backend().started().len(), 2);
        assert_eq!(c.narrator().backend().cancelled().len(), 1);
        assert!((c.media().volume() - 0.7 * DUCK_FACTOR).abs() < 1e-6);

        c.narrator_mut().backend_mut().finish_current();
        c.tick(Instant::now());
        assert!((c.media().volume() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_no_narration_while_paused() {
        let mut c = controller();
        c.seek_to(32.4);
        assert!(c.state().commentary.starts_with("GOAL!"));
        assert!(!c.is_speaking());
        assert!(c.narrator().backend().started().is_empty());
    }

    #[test]
    fn test_same_text_is_not_spoken_twice() {
        let mut c = controller();
        c.toggle_play();
        c.seek_to(30.0);
        c.narrator_mut().backend_mut().finish_current();
        c.tick(Instant::now());

        c.seek_to(31.0);
        assert_eq!(c.narrator().backend().started().len(), 1);
    }

    #[test]
    fn test_pause_stops_speech_and_restores_volume() {
        let mut c = controller();
        c.toggle_play();
        c.seek_to(32.4);
        assert!(c.is_speaking());

        c.toggle_play();
        assert!(!c.is_speaking());
        assert_eq!(c.state().transport, Transport::Paused);
        assert!((c.media().volume() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_commentary_pause_suppresses_and_resumes() {
        let mut c = controller();
        c.toggle_play();
        c.seek_to(32.4);

        c.toggle_commentary_pause();
        assert!(!c.is_speaking());
        assert!(c.state().commentary_paused);

        c.seek_to(45.0);
        assert!(!c.is_speaking());

        c.toggle_commentary_pause();
        assert!(c.is_speaking());
        let spoken = c.narrator().backend().current().map(|(_, text)| text.to_string());
        assert_eq!(spoken, Some(c.state().commentary.clone()));
    }

    #[test]
    fn test_releasing_hold_while_paused_stays_silent() {
        let mut c = controller();
        c.seek_to(32.4);
        c.toggle_commentary_pause();
        c.toggle_commentary_pause();

        assert!(!c.state().commentary_paused);
        assert!(!c.is_speaking());
        assert!(c.narrator().backend().started().is_empty());
        assert!((c.media().volume() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_resuming_playback_clears_commentary_pause() {
        let mut c = controller();
        c.toggle_commentary_pause();
        assert!(c.state().commentary_paused);
        c.toggle_play();
        assert!(!c.state().commentary_paused);
    }

    #[test]
    fn test_disabling_audio_stops_speech() {
        let mut c = controller();
        c.toggle_play();
        c.seek_to(32.4);
        c.toggle_audio_commentary();

        assert!(!c.is_speaking());
        assert!(!c.state().audio_enabled);
        c.seek_to(58.3);
        assert!(!c.is_speaking());
    }

    #[test]
    fn test_failed_speech_restores_immediately() {
        let mut c = controller();
        c.narrator_mut().backend_mut().fail_next_start("no device");
        c.toggle_play();
        c.seek_to(32.4);

        assert!(!c.is_speaking());
        assert!((c.media().volume() - 0.7).abs() < 1e-6);
        assert!(c.narrator().last_error().is_some());
        assert!(drain(&c).contains(&PlaybackEvent::NarrationEnded(SpeechOutcome::Failed)));
    }

    #[test]
    fn test_ended_forces_pause() {
        let mut c = controller();
        c.toggle_play();
        c.media.advance(120.0);
        c.tick(Instant::now());

        assert_eq!(c.state().transport, Transport::Paused);
        assert_eq!(c.current_time(), 90.0);
    }

    #[test]
    fn test_controls_hide_only_while_playing() {
        let t0 = Instant::now();
        let mut c = controller();
        c.pointer_moved(t0);
        c.tick(t0 + Duration::from_secs(4));
        assert!(c.controls_visible());

        c.toggle_play();
        c.pointer_moved(t0 + Duration::from_secs(5));
        c.tick(t0 + Duration::from_secs(8));
        assert!(!c.controls_visible());
        assert!(drain(&c).contains(&PlaybackEvent::ControlsVisibility(false)));
    }

    #[test]
    fn test_volume_zero_mutes() {
        let mut c = controller();
        c.set_volume(0.0);
        assert!(c.state().muted);
        assert!(c.media().is_muted());
        c.set_volume(0.5);
        assert!(!c.state().muted);
        c.toggle_mute();
        assert!(c.media().is_muted());
    }

    #[test]
    fn test_replace_media_resets_state() {
        let mut c = controller();
        c.toggle_play();
        c.seek_to(32.4);
        assert!(c.is_speaking());

        let old = c.replace_media(ManualMedia::new(60.0));
        assert!(old.is_paused());
        assert!(!c.is_speaking());
        assert_eq!(c.state().transport, Transport::Paused);
        assert_eq!(c.state().duration, 60.0);
        assert_eq!(c.current_time(), 0.0);
        assert!((c.media().volume() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_events_published() {
        let mut c = controller();
        drain(&c);
        c.toggle_play();
        c.seek_to(32.4);

        let events = drain(&c);
        assert_eq!(events[0], PlaybackEvent::TransportChanged(Transport::Playing));
        assert_eq!(events[1], PlaybackEvent::TimeUpdate(32.4));
        assert!(matches!(&events[2], PlaybackEvent::CommentaryChanged(text) if text.starts_with("GOAL!")));
        assert!(matches!(&events[3], PlaybackEvent::NarrationStarted(_)));
    }

    #[test]
    fn test_undrained_events_stay_bounded() {
        let mut c = PlaybackController::new(
            ManualMedia::new(100_000.0),
            Narrator::new(ManualBackend::new()),
            PlayerSettings::default(),
        );
        c.toggle_play();
        let now = Instant::now();
        for _ in 0..5_000 {
            c.media.advance(0.75);
            c.tick(now);
        }

        let events = c.events();
        assert_eq!(events.len(), EVENT_CAPACITY);
        let last = events.try_iter().last();
        assert_eq!(last, Some(PlaybackEvent::TimeUpdate(3750.0)));
    }
}
