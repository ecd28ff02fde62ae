//! egui front end for the desktop player.
//! Runs on the UI thread; playback, narration and upload are all driven from `App::update`.

pub mod app;
pub mod player_view;
pub mod summary_view;
pub mod tactical_view;
pub mod timeline_view;

pub use app::PlayerApp;
pub use timeline_view::TimelineView;
