//! Utility helpers: generational arenas, 2D math, logging and step profiling.

pub mod allocator;
pub mod logging;
pub mod math;
pub mod profiling;

pub use allocator::{Arena, BodyHandle, ConstraintHandle, GenerationalId, ShapeHandle};
pub use math::*;
pub use profiling::StepProfile;
