//! Command-line arguments for the desktop player.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{AppConfig, ConfigError};

#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "pitchside", version, about = "Match video player with synchronized commentary and tactical map")]
pub struct Cli {
    /// Video to upload on startup
    pub video: Option<PathBuf>,

    /// Start with spoken commentary disabled
    #[arg(long)]
    pub no_narration: bool,

    /// Initial playback volume (0.0 to 1.0)
    #[arg(long)]
    pub volume: Option<f32>,

    /// Read and write preferences at this path instead of the default location
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Apply command-line overrides on top of the stored preferences
    pub fn apply(&self, config: &mut AppConfig) -> Result<(), ConfigError> {
        if self.no_narration {
            config.narration_enabled = false;
        }
        if let Some(volume) = self.volume {
            config.set_volume(volume)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full() {
        let cli = Cli::try_parse_from([
            "pitchside",
            "match.mp4",
            "--no-narration",
            "--volume",
            "0.3",
            "--config",
            "/tmp/p.yml",
        ])
        .unwrap();

        assert_eq!(cli.video, Some(PathBuf::from("match.mp4")));
        assert!(cli.no_narration);
        assert_eq!(cli.volume, Some(0.3));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/p.yml")));
    }

    #[test]
    fn test_overrides_applied() {
        let cli = Cli::try_parse_from(["pitchside", "--no-narration", "--volume", "0.5"]).unwrap();
        let mut config = AppConfig::default();
        cli.apply(&mut config).unwrap();
        assert!(!config.narration_enabled);
        assert_eq!(config.initial_volume, 0.5);
    }

    #[test]
    fn test_bad_volume_rejected() {
        let cli = Cli::try_parse_from(["pitchside", "--volume", "2"]).unwrap();
        let mut config = AppConfig::default();
        assert!(cli.apply(&mut config).is_err());
        assert_eq!(config.initial_volume, 0.7);
    }

    #[test]
    fn test_no_args() {
        let cli = Cli::try_parse_from(["pitchside"]).unwrap();
        let mut config = AppConfig::default();
        cli.apply(&mut config).unwrap();
        assert_eq!(config, AppConfig::default());
    }
}
