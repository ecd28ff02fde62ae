//! The media element a playback controller drives.

use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::core::time::Seconds;
use crate::playback::sync::MediaClock;

/// A single playable media source.
///
/// Implementations clamp `set_current_time` to `[0, duration]` and volume to
/// `[0, 1]`.
pub trait MediaElement {
    fn play(&mut self);
    fn pause(&mut self);
    fn is_paused(&self) -> bool;

    fn current_time(&self) -> Seconds;
    fn set_current_time(&mut self, time: Seconds);
    /// Total length; zero until known
    fn duration(&self) -> Seconds;
    fn is_ended(&self) -> bool;

    fn volume(&self) -> f32;
    fn set_volume(&mut self, volume: f32);
    fn is_muted(&self) -> bool;
    fn set_muted(&mut self, muted: bool);
}

fn clamp_time(time: Seconds, duration: Seconds) -> Seconds {
    if time.is_nan() {
        return 0.0;
    }
    time.clamp(0.0, duration.max(0.0))
}

/// Media element whose position follows the wall clock.
///
/// Used by the desktop player, where the source is probed for its duration
/// but not decoded.
#[derive(Debug, Clone)]
pub struct ClockMedia {
    source: PathBuf,
    duration: Seconds,
    clock: MediaClock,
    volume: f32,
    muted: bool,
}

impl ClockMedia {
    pub fn new(source: impl Into<PathBuf>, duration: Seconds) -> Self {
        Self {
            source: source.into(),
            duration: duration.max(0.0),
            clock: MediaClock::new(),
            volume: 1.0,
            muted: false,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }
}

impl MediaElement for ClockMedia {
    fn play(&mut self) {
        let now = Instant::now();
        if self.clock.position(now) >= self.duration {
            self.clock.seek(0.0, now);
        }
        self.clock.start(now);
    }

    fn pause(&mut self) {
        let now = Instant::now();
        self.clock.stop(now);
        let held = clamp_time(self.clock.position(now), self.duration);
        self.clock.seek(held, now);
    }

    fn is_paused(&self) -> bool {
        !self.clock.is_running()
    }

    fn current_time(&self) -> Seconds {
        clamp_time(self.clock.position(Instant::now()), self.duration)
    }

    fn set_current_time(&mut self, time: Seconds) {
        self.clock
            .seek(clamp_time(time, self.duration), Instant::now());
    }

    fn duration(&self) -> Seconds {
        self.duration
    }

    fn is_ended(&self) -> bool {
        self.duration > 0.0 && self.clock.position(Instant::now()) >= self.duration
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    fn is_muted(&self) -> bool {
        self.muted
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }
}

/// Media element moved only by explicit calls; for headless hosts and tests.
#[derive(Debug, Clone, PartialEq)]
pub struct ManualMedia {
    time: Seconds,
    duration: Seconds,
    playing: bool,
    volume: f32,
    muted: bool,
}

impl ManualMedia {
    pub fn new(duration: Seconds) -> Self {
        Self {
            time: 0.0,
            duration: duration.max(0.0),
            playing: false,
            volume: 1.0,
            muted: false,
        }
    }

    /// Advance the position as if `seconds` of playback elapsed
    pub fn advance(&mut self, seconds: Seconds) {
        if self.playing {
            self.time = clamp_time(self.time + seconds, self.duration);
        }
    }
}

impl MediaElement for ManualMedia {
    fn play(&mut self) {
        if self.time >= self.duration {
            self.time = 0.0;
        }
        self.playing = true;
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn is_paused(&self) -> bool {
        !self.playing
    }

    fn current_time(&self) -> Seconds {
        self.time
    }

    fn set_current_time(&mut self, time: Seconds) {
        self.time = clamp_time(time, self.duration);
    }

    fn duration(&self) -> Seconds {
        self.duration
    }

    fn is_ended(&self) -> bool {
        self.duration > 0.0 && self.time >= self.duration
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    fn is_muted(&self) -> bool {
        self.muted
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_media_clamps_seek() {
        let mut media = ManualMedia::new(90.0);
        media.set_current_time(120.0);
        assert_eq!(media.current_time(), 90.0);
        assert!(media.is_ended());
        media.set_current_time(-5.0);
        assert_eq!(media.current_time(), 0.0);
    }

    #[test]
    fn test_manual_media_advances_only_while_playing() {
        let mut media = ManualMedia::new(90.0);
        media.advance(5.0);
        assert_eq!(media.current_time(), 0.0);
        media.play();
        media.advance(5.0);
        assert_eq!(media.current_time(), 5.0);
    }

    #[test]
    fn test_clock_media_holds_when_paused() {
        let mut media = ClockMedia::new("match.mp4", 90.0);
        assert!(media.is_paused());
        media.set_current_time(42.0);
        assert!((media.current_time() - 42.0).abs() < 1e-9);
        media.play();
        media.pause();
        assert!(media.current_time() >= 42.0);
        assert!(media.current_time() < 43.0);
        assert_eq!(media.source(), Path::new("match.mp4"));
    }

    #[test]
    fn test_volume_clamped() {
        let mut media = ClockMedia::new("match.mp4", 90.0);
        media.set_volume(1.4);
        assert_eq!(media.volume(), 1.0);
        media.set_volume(-0.2);
        assert_eq!(media.volume(), 0.0);
    }
}
