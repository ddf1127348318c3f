use glam::Vec2;

use crate::{
    collision::contact::Arbiter,
    core::{
        body::Body,
        constraint::{Constraint, Joint},
    },
    utils::{
        allocator::{Arena, BodyHandle, ConstraintHandle},
        math::{bias_coefficient, k_tensor},
    },
};

/// Sequential-impulse solver for contacts and pivot joints.
///
/// Contacts resolve overlap with separate bias velocities, so position
/// correction never adds kinetic energy.
#[derive(Debug, Clone)]
pub struct ConstraintSolver {
    pub iterations: u32,
    /// Fraction of overlap left after one second.
    pub collision_bias: f32,
    /// Overlap tolerated before correction kicks in.
    pub collision_slop: f32,
}

impl ConstraintSolver {
    pub fn new(iterations: u32, collision_bias: f32, collision_slop: f32) -> Self {
        Self {
            iterations,
            collision_bias,
            collision_slop,
        }
    }

    pub fn pre_step(
        &self,
        bodies: &Arena<Body>,
        arbiters: &mut [Arbiter],
        constraints: &mut Arena<Constraint>,
        active_constraints: &[ConstraintHandle],
        dt: f32,
    ) {
        let contact_bias = bias_coefficient(self.collision_bias, dt);
        for arbiter in arbiters.iter_mut() {
            let (Some(a), Some(b)) = (bodies.get(arbiter.body_a), bodies.get(arbiter.body_b)) else {
                continue;
            };
            let n = arbiter.normal;
            for contact in &mut arbiter.contacts {
                contact.r_a = contact.point - a.position;
                contact.r_b = contact.point - b.position;
                contact.normal_mass = 1.0 / k_scalar(a, b, contact.r_a, contact.r_b, n);
                contact.tangent_mass = 1.0 / k_scalar(a, b, contact.r_a, contact.r_b, n.perp());
                contact.bias = contact_bias * (contact.depth - self.collision_slop).max(0.0) / dt;
                contact.bias_impulse = 0.0;
                contact.bounce =
                    relative_velocity(a, b, contact.r_a, contact.r_b).dot(n) * arbiter.material.elasticity;
            }
        }

        for &handle in active_constraints {
            let Some(constraint) = constraints.get_mut(handle) else {
                continue;
            };
            let (Some(a), Some(b)) = (bodies.get(constraint.body_a), bodies.get(constraint.body_b)) else {
                continue;
            };
            match constraint.joint {
                Joint::Pivot { anchor_a, anchor_b } => {
                    let r_a = a.rotation().rotate(anchor_a);
                    let r_b = b.rotation().rotate(anchor_b);
                    let solver = &mut constraint.solver;
                    solver.r_a = r_a;
                    solver.r_b = r_b;
                    solver.k = k_tensor(
                        a.inverse_mass(),
                        a.inverse_moment(),
                        r_a,
                        b.inverse_mass(),
                        b.inverse_moment(),
                        r_b,
                    );
                    let delta = (b.position + r_b) - (a.position + r_a);
                    let bias = -delta * (bias_coefficient(constraint.error_bias, dt) / dt);
                    solver.bias = bias.clamp_length_max(constraint.max_bias);
                    solver.max_impulse = constraint.max_force * dt;
                }
            }
        }
    }

    /// Re-applies last step's accumulated impulses.
    pub fn warm_start(
        &self,
        bodies: &mut Arena<Body>,
        arbiters: &[Arbiter],
        constraints: &Arena<Constraint>,
        active_constraints: &[ConstraintHandle],
    ) {
        for arbiter in arbiters {
            let Some((a, b)) = bodies.get2_mut(arbiter.body_a, arbiter.body_b) else {
                continue;
            };
            for contact in &arbiter.contacts {
                let j = arbiter
                    .normal
                    .rotate(Vec2::new(contact.normal_impulse, contact.tangent_impulse));
                apply_impulses(a, b, contact.r_a, contact.r_b, j);
            }
        }

        for &handle in active_constraints {
            let Some(constraint) = constraints.get(handle) else {
                continue;
            };
            let Some((a, b)) = bodies.get2_mut(constraint.body_a, constraint.body_b) else {
                continue;
            };
            apply_impulses(
                a,
                b,
                constraint.solver.r_a,
                constraint.solver.r_b,
                constraint.accumulated_impulse,
            );
        }
    }

    pub fn solve(
        &self,
        bodies: &mut Arena<Body>,
        arbiters: &mut [Arbiter],
        constraints: &mut Arena<Constraint>,
        active_constraints: &[ConstraintHandle],
    ) {
        for _ in 0..self.iterations {
            for arbiter in arbiters.iter_mut() {
                Self::resolve_arbiter(bodies, arbiter);
            }
            for &handle in active_constraints {
                if let Some(constraint) = constraints.get_mut(handle) {
                    Self::resolve_constraint(bodies, constraint);
                }
            }
        }
    }

    fn resolve_arbiter(bodies: &mut Arena<Body>, arbiter: &mut Arbiter) {
        let Some((a, b)) = bodies.get2_mut(arbiter.body_a, arbiter.body_b) else {
            return;
        };
        let n = arbiter.normal;
        let friction = arbiter.material.friction;

        for contact in &mut arbiter.contacts {
            let (r_a, r_b) = (contact.r_a, contact.r_b);

            let vb_a = a.velocity_bias + r_a.perp() * a.angular_velocity_bias;
            let vb_b = b.velocity_bias + r_b.perp() * b.angular_velocity_bias;
            let vr = relative_velocity(a, b, r_a, r_b);

            let vbn = (vb_b - vb_a).dot(n);
            let vrn = vr.dot(n);
            let vrt = vr.dot(n.perp());

            let jbn = (contact.bias - vbn) * contact.normal_mass;
            let jbn_old = contact.bias_impulse;
            contact.bias_impulse = (jbn_old + jbn).max(0.0);

            let jn = -(contact.bounce + vrn) * contact.normal_mass;
            let jn_old = contact.normal_impulse;
            contact.normal_impulse = (jn_old + jn).max(0.0);

            let jt_max = friction * contact.normal_impulse;
            let jt = -vrt * contact.tangent_mass;
            let jt_old = contact.tangent_impulse;
            contact.tangent_impulse = (jt_old + jt).clamp(-jt_max, jt_max);

            apply_bias_impulses(a, b, r_a, r_b, n * (contact.bias_impulse - jbn_old));
            apply_impulses(
                a,
                b,
                r_a,
                r_b,
                n.rotate(Vec2::new(
                    contact.normal_impulse - jn_old,
                    contact.tangent_impulse - jt_old,
                )),
            );
        }
    }

    fn resolve_constraint(bodies: &mut Arena<Body>, constraint: &mut Constraint) {
        let Some((a, b)) = bodies.get2_mut(constraint.body_a, constraint.body_b) else {
            return;
        };
        let solver = constraint.solver;
        let vr = relative_velocity(a, b, solver.r_a, solver.r_b);

        let j = solver.k * (solver.bias - vr);
        let j_old = constraint.accumulated_impulse;
        constraint.accumulated_impulse = (j_old + j).clamp_length_max(solver.max_impulse);

        apply_impulses(a, b, solver.r_a, solver.r_b, constraint.accumulated_impulse - j_old);
    }
}

/// Constraints worth solving this step: at least one end is an awake dynamic body.
pub fn active_constraints(bodies: &Arena<Body>, constraints: &Arena<Constraint>) -> Vec<ConstraintHandle> {
    let is_active = |handle: BodyHandle| bodies.get(handle).is_some_and(Body::is_active);
    constraints
        .iter()
        .filter(|(_, c)| is_active(c.body_a) || is_active(c.body_b))
        .map(|(id, _)| ConstraintHandle::from(id))
        .collect()
}

fn k_scalar(a: &Body, b: &Body, r_a: Vec2, r_b: Vec2, n: Vec2) -> f32 {
    let rcn_a = r_a.perp_dot(n);
    let rcn_b = r_b.perp_dot(n);
    let value = a.inverse_mass()
        + b.inverse_mass()
        + a.inverse_moment() * rcn_a * rcn_a
        + b.inverse_moment() * rcn_b * rcn_b;
    debug_assert!(value > 0.0, "unsolvable contact between two immovable bodies");
    value
}

fn relative_velocity(a: &Body, b: &Body, r_a: Vec2, r_b: Vec2) -> Vec2 {
    b.velocity_at_offset(r_b) - a.velocity_at_offset(r_a)
}

fn apply_impulses(a: &mut Body, b: &mut Body, r_a: Vec2, r_b: Vec2, j: Vec2) {
    a.apply_impulse(-j, r_a);
    b.apply_impulse(j, r_b);
}

fn apply_bias_impulses(a: &mut Body, b: &mut Body, r_a: Vec2, r_b: Vec2, j: Vec2) {
    a.apply_bias_impulse(-j, r_a);
    b.apply_bias_impulse(j, r_b);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::narrowphase::{Manifold, ManifoldPoint};
    use crate::core::types::Material;
    use crate::utils::allocator::ShapeHandle;
    use approx::assert_relative_eq;

    #[test]
    fn contact_stops_approaching_body() {
        let mut bodies = Arena::new();
        let ground = BodyHandle::from(bodies.insert(Body::static_body()));
        let ball = BodyHandle::from(bodies.insert(
            Body::dynamic(1.0, 1.0).with_position(Vec2::new(0.0, -1.0)),
        ));
        if let Some(body) = bodies.get_mut(ball) {
            body.velocity = Vec2::new(0.0, 5.0);
        }

        // Ball (A) above the ground (B); y grows downward.
        let manifold = Manifold {
            normal: Vec2::Y,
            points: vec![ManifoldPoint {
                point: Vec2::ZERO,
                depth: 0.0,
                feature: 0,
            }],
        };
        let mut arbiters = vec![Arbiter::new(
            ShapeHandle::default(),
            ShapeHandle::default(),
            ball,
            ground,
            (0, 1),
            Material::new(0.0, 0.0),
            manifold,
        )];
        let mut constraints = Arena::new();
        let solver = ConstraintSolver::new(10, 0.1, 0.5);

        solver.pre_step(&bodies, &mut arbiters, &mut constraints, &[], 0.01);
        solver.solve(&mut bodies, &mut arbiters, &mut constraints, &[]);

        let velocity = bodies.get(ball).map(|b| b.velocity).unwrap_or_default();
        assert_relative_eq!(velocity.y, 0.0, epsilon = 1e-4);
        assert!(arbiters[0].contacts[0].normal_impulse > 0.0);
    }

    #[test]
    fn pivot_impulse_is_clamped_by_max_force() {
        let mut bodies = Arena::new();
        let anchor = BodyHandle::from(bodies.insert(Body::kinematic()));
        let load = BodyHandle::from(bodies.insert(
            Body::dynamic(1.0, 1.0).with_position(Vec2::new(100.0, 0.0)),
        ));
        let mut constraints = Arena::new();
        let joint = ConstraintHandle::from(constraints.insert(
            Constraint::pivot(anchor, load, Vec2::ZERO, Vec2::ZERO).with_max_force(10.0),
        ));
        let solver = ConstraintSolver::new(10, 0.1, 0.5);
        let active = active_constraints(&bodies, &constraints);
        assert_eq!(active, vec![joint]);

        let mut arbiters = Vec::new();
        solver.pre_step(&bodies, &mut arbiters, &mut constraints, &active, 0.1);
        solver.solve(&mut bodies, &mut arbiters, &mut constraints, &active);

        let impulse = constraints
            .get(joint)
            .map(|c| c.accumulated_impulse)
            .unwrap_or_default();
        assert_relative_eq!(impulse.length(), 1.0, epsilon = 1e-4);
        let velocity = bodies.get(load).map(|b| b.velocity).unwrap_or_default();
        assert!(velocity.x < 0.0);
    }
}
