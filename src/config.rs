//! Persisted user preferences.
//!
//! Stored as YAML through `confy` under the `pitchside` app name, or at an
//! explicit path given on the command line.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::time::Seconds;
use crate::playback::state::{PlaybackState, PlayerSettings};

const APP_NAME: &str = "pitchside";
const CONFIG_NAME: &str = "config";

/// Error type for configuration persistence
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config storage error: {0}")]
    Storage(#[from] confy::ConfyError),
    #[error("Volume out of range: {0}")]
    InvalidVolume(f32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub initial_volume: f32,
    pub narration_enabled: bool,
    /// Vendor names matched against voice names, in priority order
    pub preferred_voices: Vec<String>,
    pub speech_rate: f32,
    /// Duration assumed for uploads when the probe cannot read one
    pub fallback_duration_secs: Seconds,
    pub show_commentary: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            initial_volume: 0.7,
            narration_enabled: true,
            preferred_voices: vec!["Google".into(), "Daniel".into(), "Microsoft".into()],
            speech_rate: 1.0,
            fallback_duration_secs: 90.0,
            show_commentary: true,
        }
    }
}

impl AppConfig {
    /// Load from `path`, or from the platform config location.
    ///
    /// Any failure is logged and yields the defaults.
    pub fn load(path: Option<&Path>) -> Self {
        let loaded = match path {
            Some(path) => Self::load_from(path),
            None => confy::load(APP_NAME, CONFIG_NAME).map_err(ConfigError::from),
        };

        match loaded {
            Ok(config) => config.sanitized(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to load config, using defaults");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Ok(confy::load_path(path)?)
    }

    pub fn save(&self, path: Option<&Path>) -> Result<(), ConfigError> {
        match path {
            Some(path) => confy::store_path(path, self)?,
            None => confy::store(APP_NAME, CONFIG_NAME, self)?,
        }
        Ok(())
    }

    /// Location used when no explicit path is given
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        Ok(confy::get_configuration_file_path(APP_NAME, CONFIG_NAME)?)
    }

    pub fn set_volume(&mut self, volume: f32) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&volume) {
            return Err(ConfigError::InvalidVolume(volume));
        }
        self.initial_volume = volume;
        Ok(())
    }

    /// Clamp values a hand-edited file may have pushed out of range
    pub fn sanitized(mut self) -> Self {
        self.initial_volume = if self.initial_volume.is_finite() {
            self.initial_volume.clamp(0.0, 1.0)
        } else {
            0.7
        };
        if !(self.speech_rate.is_finite() && self.speech_rate > 0.0) {
            self.speech_rate = 1.0;
        }
        if !(self.fallback_duration_secs.is_finite() && self.fallback_duration_secs > 0.0) {
            self.fallback_duration_secs = 90.0;
        }
        self
    }

    /// Take over the preferences the user changed in the player.
    /// Returns whether anything differs from before.
    pub fn remember(&mut self, state: &PlaybackState) -> bool {
        let before = (self.initial_volume, self.narration_enabled, self.show_commentary);
        self.initial_volume = state.volume;
        self.narration_enabled = state.audio_enabled;
        self.show_commentary = state.show_commentary;
        before != (self.initial_volume, self.narration_enabled, self.show_commentary)
    }

    pub fn player_settings(&self) -> PlayerSettings {
        PlayerSettings {
            initial_volume: self.initial_volume,
            narration_enabled: self.narration_enabled,
            show_commentary: self.show_commentary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.initial_volume, 0.7);
        assert!(config.narration_enabled);
        assert_eq!(config.preferred_voices, ["Google", "Daniel", "Microsoft"]);
        assert_eq!(config.fallback_duration_secs, 90.0);
    }

    #[test]
    fn test_sanitize_clamps() {
        let config = AppConfig {
            initial_volume: 3.0,
            speech_rate: -1.0,
            fallback_duration_secs: f64::NAN,
            ..AppConfig::default()
        }
        .sanitized();
        assert_eq!(config.initial_volume, 1.0);
        assert_eq!(config.speech_rate, 1.0);
        assert_eq!(config.fallback_duration_secs, 90.0);
    }

    #[test]
    fn test_set_volume_rejects_out_of_range() {
        let mut config = AppConfig::default();
        assert!(config.set_volume(0.4).is_ok());
        assert_eq!(config.initial_volume, 0.4);
        assert!(matches!(config.set_volume(1.5), Err(ConfigError::InvalidVolume(_))));
        assert_eq!(config.initial_volume, 0.4);
    }

    #[test]
    fn test_store_and_load_path() {
        let path = std::env::temp_dir().join(format!("pitchside-test-{}.yml", std::process::id()));
        let config = AppConfig {
            initial_volume: 0.25,
            narration_enabled: false,
            ..AppConfig::default()
        };
        config.save(Some(&path)).unwrap();

        let loaded = AppConfig::load(Some(&path));
        assert_eq!(loaded, config);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_partial_document_fills_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"speech_rate": 1.25}"#).unwrap();
        assert_eq!(config.speech_rate, 1.25);
        assert_eq!(config.initial_volume, 0.7);
    }

    #[test]
    fn test_remember_player_changes() {
        let mut config = AppConfig::default();
        let mut state = PlaybackState::new(config.player_settings());
        assert!(!config.remember(&state));

        state.volume = 0.4;
        state.audio_enabled = false;
        assert!(config.remember(&state));
        assert_eq!(config.initial_volume, 0.4);
        assert!(!config.narration_enabled);
        assert!(config.show_commentary);
        assert!(!config.remember(&state));
    }

    #[test]
    fn test_player_settings() {
        let settings = AppConfig::default().player_settings();
        assert_eq!(settings, PlayerSettings::default());
    }
}
