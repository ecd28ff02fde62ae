//! 2D drawing surface the tactical renderer paints on.
//! Coordinates are local to the canvas, origin top-left, in points.

use egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Rounding, Stroke, Vec2};

/// Minimal immediate-mode drawing surface
pub trait Canvas {
    /// Current drawable size; read on every render
    fn size(&self) -> Vec2;
    fn clear(&mut self);
    fn fill_rect(&mut self, rect: Rect, color: Color32);
    fn stroke_rect(&mut self, rect: Rect, stroke: Stroke);
    fn line(&mut self, from: Pos2, to: Pos2, stroke: Stroke);
    fn fill_circle(&mut self, center: Pos2, radius: f32, color: Color32);
    fn stroke_circle(&mut self, center: Pos2, radius: f32, stroke: Stroke);
    /// Text centered on `center`
    fn text(&mut self, center: Pos2, text: &str, size: f32, color: Color32);
}

/// Canvas backed by an egui painter over a screen rectangle
pub struct EguiCanvas<'a> {
    painter: &'a Painter,
    rect: Rect,
}

impl<'a> EguiCanvas<'a> {
    pub fn new(painter: &'a Painter, rect: Rect) -> Self {
        Self { painter, rect }
    }

    fn to_screen(&self, pos: Pos2) -> Pos2 {
        self.rect.min + pos.to_vec2()
    }

    fn rect_to_screen(&self, rect: Rect) -> Rect {
        rect.translate(self.rect.min.to_vec2())
    }
}

impl Canvas for EguiCanvas<'_> {
    fn size(&self) -> Vec2 {
        self.rect.size()
    }

    fn clear(&mut self) {
        // egui repaints every frame; the background fill covers the rect
    }

    fn fill_rect(&mut self, rect: Rect, color: Color32) {
        self.painter
            .rect_filled(self.rect_to_screen(rect), Rounding::ZERO, color);
    }

    fn stroke_rect(&mut self, rect: Rect, stroke: Stroke) {
        self.painter
            .rect_stroke(self.rect_to_screen(rect), Rounding::ZERO, stroke);
    }

    fn line(&mut self, from: Pos2, to: Pos2, stroke: Stroke) {
        self.painter
            .line_segment([self.to_screen(from), self.to_screen(to)], stroke);
    }

    fn fill_circle(&mut self, center: Pos2, radius: f32, color: Color32) {
        self.painter
            .circle_filled(self.to_screen(center), radius, color);
    }

    fn stroke_circle(&mut self, center: Pos2, radius: f32, stroke: Stroke) {
        self.painter
            .circle_stroke(self.to_screen(center), radius, stroke);
    }

    fn text(&mut self, center: Pos2, text: &str, size: f32, color: Color32) {
        self.painter.text(
            self.to_screen(center),
            Align2::CENTER_CENTER,
            text,
            FontId::proportional(size),
            color,
        );
    }
}

/// Recorded drawing operation
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    FillRect { rect: Rect, color: Color32 },
    StrokeRect { rect: Rect, stroke: Stroke },
    Line { from: Pos2, to: Pos2, stroke: Stroke },
    FillCircle { center: Pos2, radius: f32, color: Color32 },
    StrokeCircle { center: Pos2, radius: f32, stroke: Stroke },
    Text { center: Pos2, text: String, size: f32, color: Color32 },
}

/// Canvas that records commands instead of drawing them
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingCanvas {
    size: Vec2,
    commands: Vec<DrawCommand>,
}

impl RecordingCanvas {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Vec2::new(width, height),
            commands: Vec::new(),
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.size = Vec2::new(width, height);
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }
}

impl Canvas for RecordingCanvas {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn clear(&mut self) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear);
    }

    fn fill_rect(&mut self, rect: Rect, color: Color32) {
        self.commands.push(DrawCommand::FillRect { rect, color });
    }

    fn stroke_rect(&mut self, rect: Rect, stroke: Stroke) {
        self.commands.push(DrawCommand::StrokeRect { rect, stroke });
    }

    fn line(&mut self, from: Pos2, to: Pos2, stroke: Stroke) {
        self.commands.push(DrawCommand::Line { from, to, stroke });
    }

    fn fill_circle(&mut self, center: Pos2, radius: f32, color: Color32) {
        self.commands
            .push(DrawCommand::FillCircle { center, radius, color });
    }

    fn stroke_circle(&mut self, center: Pos2, radius: f32, stroke: Stroke) {
        self.commands
            .push(DrawCommand::StrokeCircle { center, radius, stroke });
    }

    fn text(&mut self, center: Pos2, text: &str, size: f32, color: Color32) {
        self.commands.push(DrawCommand::Text {
            center,
            text: text.to_string(),
            size,
            color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_drops_previous_commands() {
        let mut canvas = RecordingCanvas::new(100.0, 50.0);
        canvas.fill_circle(Pos2::new(1.0, 1.0), 2.0, Color32::WHITE);
        canvas.clear();
        assert_eq!(canvas.commands(), &[DrawCommand::Clear]);
    }

    #[test]
    fn test_resize_updates_size() {
        let mut canvas = RecordingCanvas::new(100.0, 50.0);
        canvas.resize(200.0, 80.0);
        assert_eq!(canvas.size(), Vec2::new(200.0, 80.0));
    }
}
