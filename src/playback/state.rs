//! Playback state owned by the controller.

use crate::core::time::{self, Seconds};

/// Transport state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Paused,
    Playing,
}

/// User-facing settings a controller starts from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerSettings {
    pub initial_volume: f32,
    pub narration_enabled: bool,
    pub show_commentary: bool,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            initial_volume: 0.7,
            narration_enabled: true,
            show_commentary: true,
        }
    }
}

/// Transient playback state.
///
/// `current_time` is the one clock commentary, tactical frames and the
/// event timeline derive from. Reset when the media source changes.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    pub transport: Transport,
    pub current_time: Seconds,
    pub duration: Seconds,
    pub volume: f32,            // 0.0 to 1.0, the user's setting
    pub muted: bool,
    pub audio_enabled: bool,      // narration on/off
    pub commentary_paused: bool,  // narration suppressed independently of playback
    pub show_commentary: bool,
    pub commentary: String,       // text currently shown
    pub last_spoken: String,
    pub last_reported: Seconds,   // last time propagated to dependents
}

impl PlaybackState {
    pub fn new(settings: PlayerSettings) -> Self {
        Self {
            transport: Transport::Paused,
            current_time: time::ZERO,
            duration: time::ZERO,
            volume: settings.initial_volume.clamp(0.0, 1.0),
            muted: false,
            audio_enabled: settings.narration_enabled,
            commentary_paused: false,
            show_commentary: settings.show_commentary,
            commentary: String::new(),
            last_spoken: String::new(),
            last_reported: time::ZERO,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.transport == Transport::Playing
    }

    /// Playback position as a percentage of the duration
    pub fn progress_percent(&self) -> f64 {
        time::to_percent(self.current_time, self.duration)
    }

    /// Clear per-source state, keeping the user's preferences
    pub fn reset(&mut self) {
        *self = Self {
            volume: self.volume,
            muted: self.muted,
            audio_enabled: self.audio_enabled,
            show_commentary: self.show_commentary,
            ..Self::new(PlayerSettings::default())
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = PlaybackState::new(PlayerSettings::default());
        assert!(!state.is_playing());
        assert_eq!(state.volume, 0.7);
        assert!(state.audio_enabled);
        assert_eq!(state.progress_percent(), 0.0);
    }

    #[test]
    fn test_reset_keeps_preferences() {
        let mut state = PlaybackState::new(PlayerSettings::default());
        state.transport = Transport::Playing;
        state.current_time = 40.0;
        state.duration = 90.0;
        state.volume = 0.4;
        state.audio_enabled = false;
        state.commentary = "GOAL!".into();
        state.last_spoken = "GOAL!".into();

        state.reset();

        assert_eq!(state.transport, Transport::Paused);
        assert_eq!(state.current_time, 0.0);
        assert_eq!(state.duration, 0.0);
        assert!(state.commentary.is_empty());
        assert!(state.last_spoken.is_empty());
        assert_eq!(state.volume, 0.4);
        assert!(!state.audio_enabled);
    }
}
