//! Analysis summary: per-kind counts and the key event list.

use egui::{Grid, RichText, ScrollArea, Ui};

use crate::core::analysis::Analysis;
use crate::core::time::{self, Seconds};
use crate::ui::timeline_view::marker_color;

/// Returns the time of an event the user clicked
pub fn show(ui: &mut Ui, analysis: &Analysis) -> Option<Seconds> {
    let mut selected = None;

    ui.heading("Analysis Summary");

    Grid::new("event_counts").num_columns(4).show(ui, |ui| {
        for (i, (kind, count)) in analysis.event_counts().into_iter().enumerate() {
            ui.vertical_centered(|ui| {
                ui.label(RichText::new(count.to_string()).size(20.0).strong());
                ui.label(RichText::new(kind.plural_label()).small().weak());
            });
            if i % 4 == 3 {
                ui.end_row();
            }
        }
    });

    ui.add_space(8.0);
    ui.label(RichText::new("Key Events").strong());

    ScrollArea::vertical()
        .id_source("key_events")
        .max_height(200.0)
        .show(ui, |ui| {
            for event in &analysis.events {
                ui.horizontal(|ui| {
                    ui.label(RichText::new("●").color(marker_color(event.kind)));
                    let title = format!(
                        "{}  {}",
                        time::format_match_time(event.time),
                        capitalize(event.kind.name())
                    );
                    if ui.link(title).clicked() {
                        selected = Some(event.time);
                    }
                    if let Some(player) = &event.player {
                        ui.label(RichText::new(player.as_str()).weak());
                    }
                });
                ui.label(RichText::new(event.description.as_str()).small());
            }
        });

    selected
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("goal"), "Goal");
        assert_eq!(capitalize(""), "");
    }
}
