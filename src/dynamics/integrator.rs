use glam::Vec2;

use crate::core::body::Body;

/// Semi-implicit Euler integrator for world member bodies.
#[derive(Debug, Clone)]
pub struct Integrator {
    pub gravity: Vec2,
    /// Fraction of velocity kept per second.
    pub damping: f32,
}

impl Integrator {
    pub fn new(gravity: Vec2, damping: f32) -> Self {
        Self { gravity, damping }
    }

    /// Moves awake dynamic bodies and kinematic bodies along their velocities.
    ///
    /// Bias velocities from the previous step are folded in and cleared.
    pub fn integrate_position(&self, body: &mut Body, dt: f32) {
        if body.is_static() || body.is_sleeping() {
            return;
        }

        body.position += (body.velocity + body.velocity_bias) * dt;
        let angle = body.angle + (body.angular_velocity + body.angular_velocity_bias) * dt;
        body.set_angle(angle);

        body.velocity_bias = Vec2::ZERO;
        body.angular_velocity_bias = 0.0;
    }

    pub fn integrate_velocity(&self, body: &mut Body, dt: f32) {
        if !body.is_active() {
            return;
        }

        let damping = self.damping.powf(dt);
        body.velocity = body.velocity * damping + (self.gravity + body.force * body.inverse_mass()) * dt;
        body.angular_velocity =
            body.angular_velocity * damping + body.torque * body.inverse_moment() * dt;

        body.force = Vec2::ZERO;
        body.torque = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn gravity_accelerates_dynamic_bodies_only() {
        let integrator = Integrator::new(Vec2::new(0.0, 100.0), 1.0);
        let mut dynamic = Body::dynamic(1.0, 1.0);
        let mut kinematic = Body::kinematic();

        integrator.integrate_velocity(&mut dynamic, 0.01);
        integrator.integrate_velocity(&mut kinematic, 0.01);

        assert_relative_eq!(dynamic.velocity.y, 1.0, epsilon = 1e-5);
        assert_eq!(kinematic.velocity, Vec2::ZERO);
    }

    #[test]
    fn kinematic_bodies_follow_their_velocity() {
        let integrator = Integrator::new(Vec2::new(0.0, 100.0), 1.0);
        let mut kinematic = Body::kinematic();
        kinematic.velocity = Vec2::new(10.0, 0.0);
        integrator.integrate_position(&mut kinematic, 0.5);
        assert_relative_eq!(kinematic.position.x, 5.0);
    }

    #[test]
    fn sleeping_bodies_stay_put() {
        let integrator = Integrator::new(Vec2::new(0.0, 100.0), 1.0);
        let mut body = Body::dynamic(1.0, 1.0);
        body.velocity = Vec2::new(3.0, 0.0);
        body.sleeping.asleep = true;
        integrator.integrate_position(&mut body, 1.0);
        integrator.integrate_velocity(&mut body, 1.0);
        assert_eq!(body.position, Vec2::ZERO);
        assert_eq!(body.velocity, Vec2::new(3.0, 0.0));
    }

    #[test]
    fn damping_scales_velocity_per_second() {
        let integrator = Integrator::new(Vec2::ZERO, 0.5);
        let mut body = Body::dynamic(1.0, 1.0);
        body.velocity = Vec2::new(8.0, 0.0);
        integrator.integrate_velocity(&mut body, 1.0);
        assert_relative_eq!(body.velocity.x, 4.0, epsilon = 1e-5);
    }
}
