pub mod generator;

pub use generator::{event_line, event_near, resolve};
