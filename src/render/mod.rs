//! 2D rendering for the tactical map.
//! The renderer paints through the [`Canvas`] trait; the UI hands it an egui painter.

pub mod canvas;
pub mod tactical;

pub use canvas::{Canvas, DrawCommand, EguiCanvas, RecordingCanvas};
pub use tactical::{resolve_frame, TacticalRenderer};
