//! Wall-clock media position.
//! Position advances with real time while running and holds while stopped.

use std::time::Instant;

use crate::core::time::{self, Seconds};

/// Clock anchored at a media position and the instant playback resumed from it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaClock {
    /// Instant the clock last started running; `None` while stopped
    anchor: Option<Instant>,
    /// Media position at `anchor` (or the held position while stopped)
    anchor_position: Seconds,
}

impl MediaClock {
    /// Create a stopped clock at position zero
    pub fn new() -> Self {
        Self {
            anchor: None,
            anchor_position: time::ZERO,
        }
    }

    pub fn is_running(&self) -> bool {
        self.anchor.is_some()
    }

    /// Start running from the current position
    pub fn start(&mut self, now: Instant) {
        if self.anchor.is_none() {
            self.anchor = Some(now);
        }
    }

    /// Stop and hold the position reached at `now`
    pub fn stop(&mut self, now: Instant) {
        self.anchor_position = self.position(now);
        self.anchor = None;
    }

    /// Current media position
    pub fn position(&self, now: Instant) -> Seconds {
        match self.anchor {
            Some(anchor) => {
                self.anchor_position + time::from_duration(now.saturating_duration_since(anchor))
            }
            None => self.anchor_position,
        }
    }

    /// Jump to a new position, keeping the running state
    pub fn seek(&mut self, position: Seconds, now: Instant) {
        self.anchor_position = position;
        if self.anchor.is_some() {
            self.anchor = Some(now);
        }
    }
}

impl Default for MediaClock {
    fn default() -> Self {
        Self::new()
    }
}
