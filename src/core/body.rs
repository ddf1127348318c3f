use glam::Vec2;

use super::types::{BodyType, Sleeping};
use crate::utils::allocator::BodyHandle;

/// Rigid body state: a 2D frame with linear and angular motion.
#[derive(Debug, Clone)]
pub struct Body {
    pub id: BodyHandle,
    pub body_type: BodyType,
    pub position: Vec2,
    pub velocity: Vec2,
    pub force: Vec2,
    pub angle: f32,
    pub angular_velocity: f32,
    pub torque: f32,
    pub sleeping: Sleeping,
    rotation: Vec2,
    mass: f32,
    inverse_mass: f32,
    moment: f32,
    inverse_moment: f32,
    pub(crate) velocity_bias: Vec2,
    pub(crate) angular_velocity_bias: f32,
    pub(crate) detached: bool,
}

impl Default for Body {
    fn default() -> Self {
        Self::dynamic(1.0, 1.0)
    }
}

impl Body {
    pub fn dynamic(mass: f32, moment: f32) -> Self {
        let mut body = Self::with_type(BodyType::Dynamic);
        body.set_mass(mass);
        body.set_moment(moment);
        body
    }

    pub fn kinematic() -> Self {
        Self::with_type(BodyType::Kinematic)
    }

    pub fn static_body() -> Self {
        let mut body = Self::with_type(BodyType::Static);
        body.sleeping = Sleeping::for_static();
        body
    }

    fn with_type(body_type: BodyType) -> Self {
        Self {
            id: BodyHandle::default(),
            body_type,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            force: Vec2::ZERO,
            angle: 0.0,
            angular_velocity: 0.0,
            torque: 0.0,
            sleeping: Sleeping::awake(),
            rotation: Vec2::X,
            mass: f32::INFINITY,
            inverse_mass: 0.0,
            moment: f32::INFINITY,
            inverse_moment: 0.0,
            velocity_bias: Vec2::ZERO,
            angular_velocity_bias: 0.0,
            detached: false,
        }
    }

    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn with_angle(mut self, angle: f32) -> Self {
        self.set_angle(angle);
        self
    }

    pub fn is_dynamic(&self) -> bool {
        self.body_type == BodyType::Dynamic
    }

    pub fn is_kinematic(&self) -> bool {
        self.body_type == BodyType::Kinematic
    }

    pub fn is_static(&self) -> bool {
        self.body_type == BodyType::Static
    }

    pub fn is_sleeping(&self) -> bool {
        self.sleeping.asleep
    }

    /// Dynamic and awake: integrated and solved this step.
    pub fn is_active(&self) -> bool {
        self.is_dynamic() && !self.sleeping.asleep
    }

    /// Detached bodies are referenced by constraints but not simulated as world members.
    pub fn is_detached(&self) -> bool {
        self.detached
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn moment(&self) -> f32 {
        self.moment
    }

    pub fn inverse_mass(&self) -> f32 {
        self.inverse_mass
    }

    pub fn inverse_moment(&self) -> f32 {
        self.inverse_moment
    }

    pub fn has_finite_mass(&self) -> bool {
        self.mass.is_finite()
    }

    /// Sets the mass of a dynamic body. Non-dynamic bodies keep infinite mass.
    pub fn set_mass(&mut self, mass: f32) {
        if !self.is_dynamic() {
            return;
        }
        debug_assert!(mass > 0.0 && mass.is_finite(), "dynamic body mass must be positive and finite");
        self.mass = mass;
        self.inverse_mass = 1.0 / mass;
    }

    pub fn set_moment(&mut self, moment: f32) {
        if !self.is_dynamic() {
            return;
        }
        debug_assert!(moment > 0.0, "dynamic body moment must be positive");
        self.moment = moment;
        self.inverse_moment = if moment.is_finite() { 1.0 / moment } else { 0.0 };
    }

    pub fn set_angle(&mut self, angle: f32) {
        self.angle = angle;
        self.rotation = Vec2::from_angle(angle);
    }

    /// Unit vector `(cos, sin)` of the body's angle.
    pub fn rotation(&self) -> Vec2 {
        self.rotation
    }

    pub fn local_to_world(&self, point: Vec2) -> Vec2 {
        self.position + self.rotation.rotate(point)
    }

    pub fn world_to_local(&self, point: Vec2) -> Vec2 {
        Vec2::new(self.rotation.x, -self.rotation.y).rotate(point - self.position)
    }

    /// Velocity of the material point at `offset` from the body's center.
    pub fn velocity_at_offset(&self, offset: Vec2) -> Vec2 {
        self.velocity + offset.perp() * self.angular_velocity
    }

    pub fn velocity_at_world_point(&self, point: Vec2) -> Vec2 {
        self.velocity_at_offset(point - self.position)
    }

    pub fn apply_impulse(&mut self, impulse: Vec2, offset: Vec2) {
        self.velocity += impulse * self.inverse_mass;
        self.angular_velocity += self.inverse_moment * offset.perp_dot(impulse);
    }

    pub(crate) fn apply_bias_impulse(&mut self, impulse: Vec2, offset: Vec2) {
        self.velocity_bias += impulse * self.inverse_mass;
        self.angular_velocity_bias += self.inverse_moment * offset.perp_dot(impulse);
    }

    pub fn apply_force(&mut self, force: Vec2) {
        self.force += force;
    }

    /// Wakes the body and resets its idle timer.
    pub fn activate(&mut self) {
        if !self.is_dynamic() {
            return;
        }
        self.sleeping.asleep = false;
        self.sleeping.idle_time = 0.0;
    }

    pub fn kinetic_energy(&self) -> f32 {
        if !self.is_dynamic() {
            return 0.0;
        }
        let linear = self.velocity.length_squared();
        let angular = self.angular_velocity * self.angular_velocity;
        linear * self.mass + angular * self.moment
    }
}
