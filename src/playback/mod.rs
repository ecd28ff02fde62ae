//! Playback control: the media element, its clock, transient state, the
//! controls auto-hide timer and the controller tying them to narration.

pub mod controller;
pub mod controls;
pub mod media;
pub mod state;
pub mod sync;

pub use controller::{PlaybackController, PlaybackEvent, DUCK_FACTOR, EVENT_CAPACITY};
pub use controls::{ControlsVisibility, HIDE_DELAY};
pub use media::{ClockMedia, ManualMedia, MediaElement};
pub use state::{PlaybackState, PlayerSettings, Transport};
pub use sync::MediaClock;
