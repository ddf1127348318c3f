use glam::{Mat2, Vec2};
use serde::{Deserialize, Serialize};

use crate::config::error_bias_for;
use crate::utils::allocator::{BodyHandle, ConstraintHandle};

/// Supported joint types.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Joint {
    /// Pins a point of body A to a point of body B. Anchors are body-local.
    Pivot { anchor_a: Vec2, anchor_b: Vec2 },
}

/// Per-step solver data; rebuilt in the pre-step.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct JointSolverState {
    pub r_a: Vec2,
    pub r_b: Vec2,
    pub k: Mat2,
    pub bias: Vec2,
    pub max_impulse: f32,
}

/// A joint between two bodies plus its solver tuning.
#[derive(Debug, Clone)]
pub struct Constraint {
    pub id: ConstraintHandle,
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    pub joint: Joint,
    /// Largest force the joint may apply; `INFINITY` for a rigid joint.
    pub max_force: f32,
    /// Fraction of positional error left after one second.
    pub error_bias: f32,
    /// Cap on the error-correction velocity.
    pub max_bias: f32,
    pub accumulated_impulse: Vec2,
    pub(crate) solver: JointSolverState,
}

impl Constraint {
    pub fn pivot(body_a: BodyHandle, body_b: BodyHandle, anchor_a: Vec2, anchor_b: Vec2) -> Self {
        Self {
            id: ConstraintHandle::default(),
            body_a,
            body_b,
            joint: Joint::Pivot { anchor_a, anchor_b },
            max_force: f32::INFINITY,
            error_bias: error_bias_for(0.1, 60.0),
            max_bias: f32::INFINITY,
            accumulated_impulse: Vec2::ZERO,
            solver: JointSolverState::default(),
        }
    }

    pub fn with_max_force(mut self, max_force: f32) -> Self {
        self.max_force = max_force;
        self
    }

    pub fn with_error_bias(mut self, error_bias: f32) -> Self {
        self.error_bias = error_bias;
        self
    }

    pub fn with_max_bias(mut self, max_bias: f32) -> Self {
        self.max_bias = max_bias;
        self
    }

    pub fn bodies(&self) -> (BodyHandle, BodyHandle) {
        (self.body_a, self.body_b)
    }

    pub fn references(&self, body: BodyHandle) -> bool {
        self.body_a == body || self.body_b == body
    }

    /// The body at the other end of the joint, if `body` is one of its ends.
    pub fn other_body(&self, body: BodyHandle) -> Option<BodyHandle> {
        if self.body_a == body {
            Some(self.body_b)
        } else if self.body_b == body {
            Some(self.body_a)
        } else {
            None
        }
    }

    pub fn anchors(&self) -> (Vec2, Vec2) {
        match self.joint {
            Joint::Pivot { anchor_a, anchor_b } => (anchor_a, anchor_b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::allocator::GenerationalId;

    #[test]
    fn pivot_defaults_to_rigid_joint() {
        let a = BodyHandle::from(GenerationalId::new(0, 0));
        let b = BodyHandle::from(GenerationalId::new(1, 0));
        let joint = Constraint::pivot(a, b, Vec2::ZERO, Vec2::X);
        assert_eq!(joint.max_force, f32::INFINITY);
        assert!(joint.references(a) && joint.references(b));
        assert_eq!(joint.other_body(a), Some(b));
        assert_eq!(joint.anchors(), (Vec2::ZERO, Vec2::X));
    }

    #[test]
    fn builders_override_tuning() {
        let joint = Constraint::pivot(BodyHandle::default(), BodyHandle::default(), Vec2::ZERO, Vec2::ZERO)
            .with_max_force(50_000.0)
            .with_error_bias(0.25)
            .with_max_bias(100.0);
        assert_eq!(joint.max_bias, 100.0);
        assert_eq!(joint.max_force, 50_000.0);
        assert_eq!(joint.error_bias, 0.25);
    }
}
