//! Player surface: video area, commentary overlay and transport controls.

use std::time::Instant;

use egui::{
    vec2, Align2, Color32, FontId, Frame, Margin, Pos2, Rect, Rounding, Sense, Slider, Stroke, Ui,
    Vec2,
};

use crate::audio::speech::SpeechBackend;
use crate::core::time;
use crate::playback::{MediaElement, PlaybackController};

const ASPECT: f32 = 16.0 / 9.0;
const OVERLAY_FILL: Color32 = Color32::from_rgba_premultiplied(0, 0, 0, 77);
const SPEAKING_COLOR: Color32 = Color32::from_rgb(0x60, 0xA5, 0xFA);

/// Draw the player for `controller`; `title` labels the surface
pub fn show<M: MediaElement, B: SpeechBackend>(
    ui: &mut Ui,
    controller: &mut PlaybackController<M, B>,
    title: &str,
    now: Instant,
) {
    let width = ui.available_width();
    let (rect, response) = ui.allocate_exact_size(vec2(width, width / ASPECT), Sense::hover());
    let painter = ui.painter_at(rect);

    painter.rect_filled(rect, Rounding::same(8.0), Color32::BLACK);
    painter.text(
        rect.center(),
        Align2::CENTER_CENTER,
        title,
        FontId::proportional(18.0),
        Color32::from_gray(160),
    );

    if response.hovered() && ui.input(|i| i.pointer.delta() != Vec2::ZERO) {
        controller.pointer_moved(now);
    }

    let state = controller.state();
    if state.show_commentary && !state.commentary.is_empty() {
        draw_commentary(ui, rect, &state.commentary);
    }
    if controller.is_speaking() && state.audio_enabled {
        draw_speaking_indicator(ui, rect);
    }

    painter.text(
        rect.left_top() + vec2(12.0, 12.0),
        Align2::LEFT_TOP,
        format!(
            "{} / {}",
            time::format_clock(state.current_time),
            time::format_clock(state.duration)
        ),
        FontId::monospace(14.0),
        Color32::WHITE,
    );

    if controller.controls_visible() {
        controls(ui, controller);
    } else {
        // Keep the layout stable while hidden
        ui.add_space(ui.spacing().interact_size.y * 2.0 + ui.spacing().item_spacing.y);
    }
}

fn draw_commentary(ui: &Ui, surface: Rect, text: &str) {
    let painter = ui.painter_at(surface);
    let wrap_width = surface.width() - 48.0;
    let galley = painter.layout(
        text.to_string(),
        FontId::proportional(15.0),
        Color32::WHITE,
        wrap_width,
    );

    let size = galley.size() + vec2(24.0, 16.0);
    let panel = Rect::from_min_size(
        Pos2::new(surface.left() + 24.0, surface.bottom() - 24.0 - size.y),
        vec2(wrap_width, size.y),
    );
    painter.rect_filled(panel, Rounding::same(8.0), OVERLAY_FILL);
    painter.galley(panel.min + vec2(12.0, 8.0), galley, Color32::WHITE);
}

fn draw_speaking_indicator(ui: &Ui, surface: Rect) {
    let painter = ui.painter_at(surface);
    let center = surface.right_top() + vec2(-28.0, 28.0);
    painter.circle_filled(center, 16.0, Color32::from_rgba_premultiplied(0, 0, 0, 102));

    let phase = ui.input(|i| i.time) as f32 * 6.0;
    for (i, base) in [6.0_f32, 10.0, 8.0].into_iter().enumerate() {
        let height = base * (0.75 + 0.25 * (phase + i as f32).sin());
        let x = center.x + (i as f32 - 1.0) * 5.0;
        painter.line_segment(
            [Pos2::new(x, center.y - height / 2.0), Pos2::new(x, center.y + height / 2.0)],
            Stroke::new(3.0, SPEAKING_COLOR),
        );
    }
    ui.ctx().request_repaint();
}

fn controls<M: MediaElement, B: SpeechBackend>(ui: &mut Ui, controller: &mut PlaybackController<M, B>) {
    Frame::none().inner_margin(Margin::symmetric(0.0, 4.0)).show(ui, |ui| {
        let mut percent = controller.progress_percent();
        let seek = ui.add_sized(
            [ui.available_width(), ui.spacing().interact_size.y],
            Slider::new(&mut percent, 0.0..=100.0).show_value(false),
        );
        if seek.changed() {
            controller.seek_percent(percent);
        }

        ui.horizontal(|ui| {
            let play_label = if controller.state().is_playing() { "⏸" } else { "▶" };
            if ui.button(play_label).clicked() {
                controller.toggle_play();
            }
            if ui.button("⏪ 10s").clicked() {
                controller.skip_backward();
            }
            if ui.button("10s ⏩").clicked() {
                controller.skip_forward();
            }

            ui.separator();

            let mute_label = if controller.state().muted { "🔇" } else { "🔊" };
            if ui.button(mute_label).clicked() {
                controller.toggle_mute();
            }
            let mut volume = controller.state().volume;
            if ui
                .add(Slider::new(&mut volume, 0.0..=1.0).show_value(false))
                .changed()
            {
                controller.set_volume(volume);
            }

            ui.separator();

            let state = controller.state();
            let (show_text, audio, paused) =
                (state.show_commentary, state.audio_enabled, state.commentary_paused);
            if ui.selectable_label(show_text, "Commentary").clicked() {
                controller.toggle_commentary_visibility();
            }
            if ui.selectable_label(audio, "Narration").clicked() {
                controller.toggle_audio_commentary();
            }
            if ui
                .add_enabled(audio, egui::SelectableLabel::new(paused, "Hold narration"))
                .clicked()
            {
                controller.toggle_commentary_pause();
            }
        });
    });
}
