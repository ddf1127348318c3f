//! Collision detection: broad-phase grid, narrow-phase manifolds, contact arbiters and point queries.

pub mod broadphase;
pub mod clipping;
pub mod contact;
pub mod narrowphase;
pub mod queries;

pub use broadphase::{BroadPhase, SpatialGrid};
pub use contact::{Arbiter, ContactPoint};
pub use narrowphase::{Manifold, ManifoldPoint, NarrowPhase};
pub use queries::{PointQuery, PointQueryInfo, SurfaceProjection};
