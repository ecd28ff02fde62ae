//! Desktop entry point.
//! Parses the command line, loads preferences and opens the player window.

use clap::Parser;
use eframe::egui;

use pitchside::cli::Cli;
use pitchside::config::AppConfig;
use pitchside::logging;
use pitchside::ui::PlayerApp;
use pitchside::upload::MediaProbe;

fn media_probe(config: &AppConfig) -> Box<dyn MediaProbe> {
    #[cfg(feature = "ffmpeg")]
    {
        match pitchside::upload::FfmpegProbe::new() {
            Ok(probe) => return Box::new(probe),
            Err(e) => tracing::warn!(error = %e, "FFmpeg unavailable, durations will use the fallback"),
        }
    }
    Box::new(pitchside::upload::MimeProbe::new(config.fallback_duration_secs))
}

fn main() -> eframe::Result<()> {
    let cli = Cli::parse();
    logging::init();

    let config_path = cli.config.clone().or_else(|| match AppConfig::default_path() {
        Ok(path) => Some(path),
        Err(e) => {
            tracing::warn!(error = %e, "no default config location");
            None
        }
    });
    let mut config = AppConfig::load(config_path.as_deref());
    if let Err(e) = cli.apply(&mut config) {
        tracing::warn!(error = %e, "ignoring invalid command-line override");
    }
    tracing::debug!(?config, path = ?config_path, "configuration loaded");

    let probe = media_probe(&config);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Pitchside")
            .with_inner_size([1280.0, 800.0]),
        renderer: eframe::Renderer::Wgpu,
        ..Default::default()
    };

    eframe::run_native(
        "Pitchside",
        native_options,
        Box::new(move |cc| Box::new(PlayerApp::new(cc, config, config_path, probe, cli.video))),
    )
}
