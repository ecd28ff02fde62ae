//! Event strip: colored markers per match event and the playhead.

use egui::{vec2, Align2, Color32, FontId, Pos2, ScrollArea, Sense, Stroke, Ui};

use crate::core::analysis::{Analysis, EventKind, MatchEvent};
use crate::core::time::{self, Seconds};
use crate::timeline::EventTimeline;

const STRIP_HEIGHT: f32 = 64.0;
const MARKER_RADIUS: f32 = 12.0;
const MIN_PX_PER_SECOND: f32 = 8.0;

/// Marker fill per event kind
pub fn marker_color(kind: EventKind) -> Color32 {
    match kind {
        EventKind::Goal => Color32::from_rgb(0xEF, 0x44, 0x44),
        EventKind::Shot => Color32::from_rgb(0xF5, 0x9E, 0x0B),
        EventKind::Pass => Color32::from_rgb(0x3B, 0x82, 0xF6),
        EventKind::Foul => Color32::from_rgb(0xA8, 0x55, 0xF7),
        EventKind::Save => Color32::from_rgb(0x22, 0xC5, 0x5E),
        EventKind::Dribble => Color32::from_rgb(0x63, 0x66, 0xF1),
        EventKind::Tackle => Color32::from_rgb(0xF9, 0x73, 0x16),
        EventKind::Offside => Color32::from_rgb(0xF4, 0x3F, 0x5E),
    }
}

/// First marker (in list order) under horizontal position `x` of a strip
/// `width` points wide
pub fn hit_test<'a>(timeline: &EventTimeline<'a>, x: f32, width: f32) -> Option<&'a MatchEvent> {
    timeline
        .markers()
        .find(|(_, fraction)| (fraction * width - x).abs() <= MARKER_RADIUS)
        .map(|(event, _)| event)
}

/// Scrolling strip that follows the playhead
#[derive(Debug, Default)]
pub struct TimelineView {
    last_time: Option<Seconds>,
}

impl TimelineView {
    pub fn new() -> Self {
        Self { last_time: None }
    }

    /// Draw the strip. Returns the time of a clicked marker.
    pub fn show(&mut self, ui: &mut Ui, analysis: &Analysis, current_time: Seconds) -> Option<Seconds> {
        let timeline = EventTimeline::new(analysis);
        let visible_width = ui.available_width();
        let content_width =
            visible_width.max(timeline.duration() as f32 * MIN_PX_PER_SECOND);

        ui.label("Match Events");

        let mut scroll = ScrollArea::horizontal().id_source("event_strip");
        if self.last_time != Some(current_time) {
            self.last_time = Some(current_time);
            scroll = scroll.horizontal_scroll_offset(timeline.scroll_offset(
                current_time,
                content_width,
                visible_width,
            ));
        }

        scroll
            .show(ui, |ui| {
                let (rect, response) =
                    ui.allocate_exact_size(vec2(content_width, STRIP_HEIGHT), Sense::click());
                let painter = ui.painter_at(rect);
                let track_y = rect.top() + STRIP_HEIGHT / 2.0;

                painter.line_segment(
                    [Pos2::new(rect.left(), track_y), Pos2::new(rect.right(), track_y)],
                    Stroke::new(4.0, ui.visuals().widgets.inactive.bg_fill),
                );

                let active = timeline.active_event(current_time).map(|e| e.id.as_str());
                for (event, fraction) in timeline.markers() {
                    let center = Pos2::new(rect.left() + fraction * rect.width(), track_y);
                    painter.circle_filled(center, MARKER_RADIUS, marker_color(event.kind));
                    if active == Some(event.id.as_str()) {
                        painter.circle_stroke(center, MARKER_RADIUS + 3.0, Stroke::new(2.0, Color32::WHITE));
                    }
                    painter.text(
                        center + vec2(0.0, MARKER_RADIUS + 8.0),
                        Align2::CENTER_CENTER,
                        time::format_match_time(event.time),
                        FontId::proportional(11.0),
                        ui.visuals().text_color(),
                    );
                }

                let playhead_x = rect.left() + timeline.fraction(current_time) * rect.width();
                painter.line_segment(
                    [Pos2::new(playhead_x, rect.top()), Pos2::new(playhead_x, rect.bottom())],
                    Stroke::new(2.0, ui.visuals().selection.bg_fill),
                );

                if let Some(pos) = response.hover_pos() {
                    if let Some(event) = hit_test(&timeline, pos.x - rect.left(), rect.width()) {
                        response.clone().on_hover_ui_at_pointer(|ui| {
                            ui.strong(event.kind.name().to_uppercase());
                            ui.label(event.description.as_str());
                            if let Some(player) = &event.player {
                                ui.label(player.as_str());
                            }
                        });
                    }
                }

                let clicked = response.clicked().then(|| response.interact_pointer_pos()).flatten();
                clicked
                    .filter(|pos| rect.contains(*pos))
                    .and_then(|pos| hit_test(&timeline, pos.x - rect.left(), rect.width()))
                    .map(|event| {
                        tracing::debug!(event = %event.id, time = event.time, "timeline marker selected");
                        event.time
                    })
            })
            .inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::source::match_fixture;

    #[test]
    fn test_hit_test_finds_marker() {
        let analysis = match_fixture().unwrap();
        let timeline = EventTimeline::new(&analysis);
        // 32.4 of 90 on a 900 pt strip sits at x = 324
        let event = hit_test(&timeline, 330.0, 900.0).unwrap();
        assert_eq!(event.id, "event-5");
        assert!(hit_test(&timeline, 800.0, 900.0).is_none());
    }

    #[test]
    fn test_hit_test_prefers_first_overlapping() {
        let analysis = match_fixture().unwrap();
        let timeline = EventTimeline::new(&analysis);
        // 18.7 and 19.1 overlap at this scale
        let event = hit_test(&timeline, 189.0, 900.0).unwrap();
        assert_eq!(event.id, "event-3");
    }

    #[test]
    fn test_marker_colors_distinct() {
        let mut colors: Vec<_> = EventKind::ALL.iter().map(|k| marker_color(*k)).collect();
        colors.dedup();
        assert_eq!(colors.len(), EventKind::ALL.len());
    }
}
