//! Match video player with synchronized commentary, narration, an event
//! timeline and a tactical map.
//!
//! The library core is headless: [`playback::PlaybackController`] drives any
//! [`playback::MediaElement`] and [`audio::SpeechBackend`]. The [`ui`] module
//! adds the egui front end used by the binary.

pub mod audio;
pub mod cli;
pub mod commentary;
pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod playback;
pub mod render;
pub mod timeline;
pub mod ui;
pub mod upload;

pub use error::{Error, Result};
