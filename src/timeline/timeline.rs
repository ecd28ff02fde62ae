//! Event timeline: where events and the playhead sit on the match strip.
//!
//! Everything here is derived from the analysis and the current playback
//! time; the timeline keeps no clock of its own.

use crate::commentary;
use crate::core::analysis::{Analysis, MatchEvent};
use crate::core::time::Seconds;

/// Read-only view of an analysis laid out along its duration.
#[derive(Debug, Clone, Copy)]
pub struct EventTimeline<'a> {
    analysis: &'a Analysis,
}

impl<'a> EventTimeline<'a> {
    pub fn new(analysis: &'a Analysis) -> Self {
        Self { analysis }
    }

    pub fn duration(&self) -> Seconds {
        self.analysis.duration
    }

    /// Horizontal position (0.0-1.0) of a time on the strip.
    ///
    /// Clamped so out-of-range events still draw at the edges.
    pub fn fraction(&self, time: Seconds) -> f32 {
        if self.analysis.duration <= 0.0 {
            return 0.0;
        }
        (time / self.analysis.duration).clamp(0.0, 1.0) as f32
    }

    /// Events with their strip positions, in list order
    pub fn markers(&self) -> impl Iterator<Item = (&'a MatchEvent, f32)> + '_ {
        self.analysis
            .events
            .iter()
            .map(move |event| (event, self.fraction(event.time)))
    }

    /// Event to highlight at `time`: the first one within the tolerance window
    pub fn active_event(&self, time: Seconds) -> Option<&'a MatchEvent> {
        commentary::event_near(time, self.analysis)
    }

    /// Scroll offset that centers the playhead in a scrolled strip.
    ///
    /// `content_width` is the full strip width and `visible_width` the viewport.
    pub fn scroll_offset(&self, time: Seconds, content_width: f32, visible_width: f32) -> f32 {
        let position = self.fraction(time) * content_width - visible_width / 2.0;
        let max_offset = (content_width - visible_width).max(0.0);
        position.clamp(0.0, max_offset)
    }
}
