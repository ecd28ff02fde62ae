//! Transport-controls auto-hide timer.

use std::time::{Duration, Instant};

/// Inactivity before controls hide during playback
pub const HIDE_DELAY: Duration = Duration::from_secs(3);

/// Controls are shown on pointer movement and hidden after [`HIDE_DELAY`]
/// of inactivity, but only while playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlsVisibility {
    visible: bool,
    hide_at: Option<Instant>,
}

impl ControlsVisibility {
    pub fn new() -> Self {
        Self {
            visible: true,
            hide_at: None,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Show the controls and restart the inactivity timer.
    /// Returns true if visibility changed.
    pub fn pointer_moved(&mut self, now: Instant) -> bool {
        let changed = !self.visible;
        self.visible = true;
        self.hide_at = Some(now + HIDE_DELAY);
        changed
    }

    /// Fire the timer if due. Returns true if visibility changed.
    pub fn tick(&mut self, now: Instant, playing: bool) -> bool {
        match self.hide_at {
            Some(deadline) if now >= deadline => {
                self.hide_at = None;
                if playing && self.visible {
                    self.visible = false;
                    return true;
                }
                false
            }
            _ => false,
        }
    }

    /// Cancel the timer and show the controls
    pub fn clear(&mut self) {
        self.visible = true;
        self.hide_at = None;
    }
}

impl Default for ControlsVisibility {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hides_after_delay_while_playing() {
        let t0 = Instant::now();
        let mut controls = ControlsVisibility::new();
        controls.pointer_moved(t0);

        assert!(!controls.tick(t0 + Duration::from_secs(2), true));
        assert!(controls.is_visible());
        assert!(controls.tick(t0 + HIDE_DELAY, true));
        assert!(!controls.is_visible());
    }

    #[test]
    fn test_never_hides_while_paused() {
        let t0 = Instant::now();
        let mut controls = ControlsVisibility::new();
        controls.pointer_moved(t0);

        assert!(!controls.tick(t0 + Duration::from_secs(10), false));
        assert!(controls.is_visible());
        // Timer was consumed; later playback does not hide without new movement
        assert!(!controls.tick(t0 + Duration::from_secs(20), true));
        assert!(controls.is_visible());
    }

    #[test]
    fn test_movement_restarts_timer() {
        let t0 = Instant::now();
        let mut controls = ControlsVisibility::new();
        controls.pointer_moved(t0);
        controls.pointer_moved(t0 + Duration::from_secs(2));

        assert!(!controls.tick(t0 + Duration::from_secs(4), true));
        assert!(controls.tick(t0 + Duration::from_secs(5), true));
    }

    #[test]
    fn test_movement_reveals_hidden_controls() {
        let t0 = Instant::now();
        let mut controls = ControlsVisibility::new();
        controls.pointer_moved(t0);
        controls.tick(t0 + HIDE_DELAY, true);

        assert!(controls.pointer_moved(t0 + Duration::from_secs(6)));
        assert!(controls.is_visible());
    }
}
