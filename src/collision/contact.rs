use glam::Vec2;

use super::narrowphase::Manifold;
use crate::core::types::Material;
use crate::utils::allocator::{BodyHandle, ShapeHandle};

/// One contact point of an arbiter plus its solver state.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContactPoint {
    pub point: Vec2,
    pub depth: f32,
    pub feature: u32,
    pub normal_impulse: f32,
    pub tangent_impulse: f32,
    pub(crate) bias_impulse: f32,
    pub(crate) r_a: Vec2,
    pub(crate) r_b: Vec2,
    pub(crate) normal_mass: f32,
    pub(crate) tangent_mass: f32,
    pub(crate) bias: f32,
    pub(crate) bounce: f32,
}

/// Persistent collision state between two shapes.
#[derive(Debug, Clone)]
pub struct Arbiter {
    pub shape_a: ShapeHandle,
    pub shape_b: ShapeHandle,
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    /// Ordered pair of shape hash ids; arbiters are sorted by it.
    pub key: (u32, u32),
    /// Points from shape A toward shape B.
    pub normal: Vec2,
    pub material: Material,
    pub contacts: Vec<ContactPoint>,
}

impl Arbiter {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        shape_a: ShapeHandle,
        shape_b: ShapeHandle,
        body_a: BodyHandle,
        body_b: BodyHandle,
        key: (u32, u32),
        material: Material,
        manifold: Manifold,
    ) -> Self {
        let contacts = manifold
            .points
            .iter()
            .map(|p| ContactPoint {
                point: p.point,
                depth: p.depth,
                feature: p.feature,
                ..ContactPoint::default()
            })
            .collect();
        Self {
            shape_a,
            shape_b,
            body_a,
            body_b,
            key,
            normal: manifold.normal,
            material,
            contacts,
        }
    }

    /// Carries accumulated impulses over from last step's contacts with matching features.
    pub fn warm_start_from(&mut self, previous: &Arbiter) {
        for contact in &mut self.contacts {
            if let Some(old) = previous.contacts.iter().find(|c| c.feature == contact.feature) {
                contact.normal_impulse = old.normal_impulse;
                contact.tangent_impulse = old.tangent_impulse;
            }
        }
    }

    /// Sum of normal impulses applied this step.
    pub fn total_normal_impulse(&self) -> f32 {
        self.contacts.iter().map(|c| c.normal_impulse).sum()
    }
}
