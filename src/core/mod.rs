//! Core types describing simulation entities: bodies, shapes, constraints and their shared data.

pub mod body;
pub mod constraint;
pub mod shape;
pub mod types;

pub use body::Body;
pub use constraint::{Constraint, Joint};
pub use shape::{Aabb, Shape, ShapeBuilder, ShapeGeometry};
pub use types::{BodyType, Material, ShapeFilter, Sleeping};
