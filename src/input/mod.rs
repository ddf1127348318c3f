//! Pointer input: events from the input source and the drag controller they drive.

pub mod drag;

use glam::Vec2;

pub use drag::{DragState, MouseDragController};

/// Pointer events in world coordinates (screen and world coincide).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Moved(Vec2),
    Pressed,
    Released,
}
