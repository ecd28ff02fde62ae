//! Tactical map: frame lookup and the 2D field/player/ball painter.

use egui::{Color32, Pos2, Rect, Stroke, Vec2};

use crate::core::analysis::{Analysis, Point, TacticalFrame, Team};
use crate::core::time::Seconds;
use crate::render::canvas::Canvas;

pub const FIELD_COLOR: Color32 = Color32::from_rgb(0x5D, 0x82, 0x33);
pub const HOME_COLOR: Color32 = Color32::from_rgb(0x1E, 0x40, 0xAF);
pub const AWAY_COLOR: Color32 = Color32::from_rgb(0xBE, 0x12, 0x3C);

const FIELD_INSET: f32 = 0.05;
const LINE_WIDTH: f32 = 2.0;
const CENTER_CIRCLE_RADIUS: f32 = 0.1; // of width
const CENTER_DOT_RADIUS: f32 = 3.0;
const PLAYER_RADIUS: f32 = 0.02; // of width
const POSSESSION_RING_OFFSET: f32 = 4.0;
const BALL_RADIUS: f32 = 0.01; // of width

/// Snapshot nearest to `time` in either direction
pub fn resolve_frame(time: Seconds, analysis: &Analysis) -> Option<&TacticalFrame> {
    analysis.frames.nearest(time).map(|(_, frame)| frame)
}

/// Paints a tactical frame scaled to the canvas
#[derive(Debug, Default, Clone, Copy)]
pub struct TacticalRenderer;

impl TacticalRenderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &TacticalFrame, canvas: &mut impl Canvas) {
        let size = canvas.size();
        canvas.clear();

        draw_field(canvas, size);

        for player in &frame.players {
            let center = to_canvas(player.position, size);
            let radius = size.x * PLAYER_RADIUS;
            let color = match player.team {
                Team::Home => HOME_COLOR,
                Team::Away => AWAY_COLOR,
            };

            canvas.fill_circle(center, radius, color);
            if player.possession {
                canvas.stroke_circle(
                    center,
                    radius + POSSESSION_RING_OFFSET,
                    Stroke::new(LINE_WIDTH, Color32::WHITE),
                );
            }
            canvas.text(center, &player.number.to_string(), radius, Color32::WHITE);
        }

        let ball = to_canvas(frame.ball, size);
        let ball_radius = size.x * BALL_RADIUS;
        canvas.fill_circle(ball, ball_radius, Color32::WHITE);
        canvas.stroke_circle(ball, ball_radius, Stroke::new(1.0, Color32::BLACK));
    }
}

/// Field coordinates (0-100 on both axes) to canvas points
pub fn to_canvas(point: Point, size: Vec2) -> Pos2 {
    Pos2::new(
        (point.x / 100.0) as f32 * size.x,
        (point.y / 100.0) as f32 * size.y,
    )
}

fn draw_field(canvas: &mut impl Canvas, size: Vec2) {
    let (w, h) = (size.x, size.y);
    let line = Stroke::new(LINE_WIDTH, Color32::from_rgba_unmultiplied(255, 255, 255, 204));

    canvas.fill_rect(Rect::from_min_size(Pos2::ZERO, size), FIELD_COLOR);

    // Outline
    let outline = Rect::from_min_max(
        Pos2::new(w * FIELD_INSET, h * FIELD_INSET),
        Pos2::new(w * (1.0 - FIELD_INSET), h * (1.0 - FIELD_INSET)),
    );
    canvas.stroke_rect(outline, line);

    // Halfway line, center circle and spot
    let center = Pos2::new(w * 0.5, h * 0.5);
    canvas.line(
        Pos2::new(center.x, h * FIELD_INSET),
        Pos2::new(center.x, h * (1.0 - FIELD_INSET)),
        line,
    );
    canvas.stroke_circle(center, w * CENTER_CIRCLE_RADIUS, line);
    canvas.fill_circle(center, CENTER_DOT_RADIUS, line.color);

    // Penalty areas
    for x in [0.05, 0.80] {
        canvas.stroke_rect(fraction_rect(x, 0.3, 0.15, 0.4, size), line);
    }

    // Goal areas
    for x in [0.05, 0.90] {
        canvas.stroke_rect(fraction_rect(x, 0.4, 0.05, 0.2, size), line);
    }
}

fn fraction_rect(x: f32, y: f32, width: f32, height: f32, size: Vec2) -> Rect {
    Rect::from_min_size(
        Pos2::new(x * size.x, y * size.y),
        Vec2::new(width * size.x, height * size.y),
    )
}
