//! Colors and debug drawing. No graphics backend lives here.

pub mod color;
pub mod draw;

pub use color::{color_for_shape, hashed_color, mix_hash, Rgba};
pub use draw::{debug_draw, DebugDraw, DrawCommand, DrawFlags, DrawList, DrawOptions};
