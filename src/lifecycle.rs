//! Deferred destruction of world objects.
//!
//! Removals discovered while the world is being traversed are staged here and
//! applied by [`DeferredDestructionQueue::flush`] once the traversal is over.

use std::collections::HashSet;

use log::{debug, warn};

use crate::utils::allocator::{BodyHandle, ConstraintHandle, ShapeHandle};
use crate::world::World;

/// A pending removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Removal {
    Shape(ShapeHandle),
    Constraint(ConstraintHandle),
    Body(BodyHandle),
}

impl From<ShapeHandle> for Removal {
    fn from(handle: ShapeHandle) -> Self {
        Self::Shape(handle)
    }
}

impl From<ConstraintHandle> for Removal {
    fn from(handle: ConstraintHandle) -> Self {
        Self::Constraint(handle)
    }
}

impl From<BodyHandle> for Removal {
    fn from(handle: BodyHandle) -> Self {
        Self::Body(handle)
    }
}

/// What a flush actually removed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FlushReport {
    pub shapes: usize,
    pub constraints: usize,
    pub bodies: usize,
    /// Entries that no longer resolved (already removed) or were refused.
    pub skipped: usize,
}

impl FlushReport {
    pub fn removed(&self) -> usize {
        self.shapes + self.constraints + self.bodies
    }
}

/// Ordered queue of removal requests, applied between frames.
#[derive(Debug, Default)]
pub struct DeferredDestructionQueue {
    pending: Vec<Removal>,
}

impl DeferredDestructionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages a removal. Safe to call from inside `World::each_*` closures.
    pub fn schedule(&mut self, removal: impl Into<Removal>) {
        self.pending.push(removal.into());
    }

    pub fn schedule_shape(&mut self, handle: ShapeHandle) {
        self.schedule(handle);
    }

    pub fn schedule_constraint(&mut self, handle: ConstraintHandle) {
        self.schedule(handle);
    }

    pub fn schedule_body(&mut self, handle: BodyHandle) {
        self.schedule(handle);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn pending(&self) -> &[Removal] {
        &self.pending
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Applies every pending removal and empties the queue.
    ///
    /// Shapes and constraints attached to a scheduled body are removed with it.
    /// Shapes go first, then constraints, then bodies, so no owner is freed while
    /// something still references it. Duplicates and stale handles are absorbed.
    pub fn flush(&mut self, world: &mut World) -> FlushReport {
        debug_assert!(!world.is_locked(), "flush called during a traversal");
        let mut report = FlushReport::default();
        if self.pending.is_empty() {
            return report;
        }

        let mut seen = HashSet::new();
        let mut shapes = Vec::new();
        let mut constraints = Vec::new();
        let mut bodies = Vec::new();

        for removal in self.pending.drain(..) {
            if !seen.insert(removal) {
                continue;
            }
            match removal {
                Removal::Shape(handle) => shapes.push(handle),
                Removal::Constraint(handle) => constraints.push(handle),
                Removal::Body(handle) if world.is_permanent_body(handle) => {
                    warn!("Permanent body {handle:?} scheduled for removal; skipping");
                    report.skipped += 1;
                }
                Removal::Body(handle) => bodies.push(handle),
            }
        }

        for &body in &bodies {
            for shape in world.shapes_of(body) {
                if seen.insert(Removal::Shape(shape)) {
                    shapes.push(shape);
                }
            }
            for constraint in world.constraints_of(body) {
                if seen.insert(Removal::Constraint(constraint)) {
                    constraints.push(constraint);
                }
            }
        }

        for handle in shapes {
            match world.remove_shape(handle) {
                Some(_) => report.shapes += 1,
                None => report.skipped += 1,
            }
        }
        for handle in constraints {
            match world.remove_constraint(handle) {
                Some(_) => report.constraints += 1,
                None => report.skipped += 1,
            }
        }
        for handle in bodies {
            match world.remove_body(handle) {
                Some(_) => report.bodies += 1,
                None => report.skipped += 1,
            }
        }

        debug!(
            "Flushed removals: {} shapes, {} constraints, {} bodies ({} skipped)",
            report.shapes, report.constraints, report.bodies, report.skipped
        );
        report
    }
}

/// Removes every member shape, constraint and body from the world.
///
/// Everything is discovered through the world's own traversals, staged on
/// `queue`, then flushed. The static body survives.
pub fn free_world_children(world: &mut World, queue: &mut DeferredDestructionQueue) -> FlushReport {
    world.each_shape(|shape| queue.schedule_shape(shape.id));
    world.each_constraint(|constraint| queue.schedule_constraint(constraint.id));
    world.each_body(|body| queue.schedule_body(body.id));
    queue.flush(world)
}
