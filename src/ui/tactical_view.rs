//! Tactical map panel.

use egui::{vec2, Sense, Ui};

use crate::core::analysis::Analysis;
use crate::core::time::Seconds;
use crate::render::{resolve_frame, EguiCanvas, TacticalRenderer};

/// Field proportions (105 x 68 m)
const FIELD_ASPECT: f32 = 105.0 / 68.0;

pub fn show(ui: &mut Ui, analysis: &Analysis, current_time: Seconds) {
    ui.label("Tactical View");

    let width = ui.available_width();
    let (rect, _) = ui.allocate_exact_size(vec2(width, width / FIELD_ASPECT), Sense::hover());

    match resolve_frame(current_time, analysis) {
        Some(frame) => {
            let painter = ui.painter_at(rect);
            let mut canvas = EguiCanvas::new(&painter, rect);
            TacticalRenderer::new().render(frame, &mut canvas);
        }
        None => {
            ui.painter_at(rect).text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "No tactical data",
                egui::FontId::proportional(14.0),
                ui.visuals().weak_text_color(),
            );
        }
    }
}
