use serde::{Deserialize, Serialize};

use crate::config::GRABBABLE_MASK_BIT;

/// How a body participates in the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BodyType {
    /// Moved by forces, gravity and collisions.
    #[default]
    Dynamic,
    /// Driven externally through its velocity; infinite mass.
    Kinematic,
    /// Never moves; infinite mass.
    Static,
}

/// Sleep bookkeeping of a body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sleeping {
    pub asleep: bool,
    /// Seconds the body has spent below the idle energy threshold.
    pub idle_time: f32,
}

impl Sleeping {
    pub fn awake() -> Self {
        Self {
            asleep: false,
            idle_time: 0.0,
        }
    }

    /// Static bodies count as idle forever.
    pub fn for_static() -> Self {
        Self {
            asleep: false,
            idle_time: f32::INFINITY,
        }
    }
}

impl Default for Sleeping {
    fn default() -> Self {
        Self::awake()
    }
}

/// Surface coefficients of a shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    pub elasticity: f32,
    pub friction: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            elasticity: 0.0,
            friction: 0.0,
        }
    }
}

impl Material {
    pub fn new(elasticity: f32, friction: f32) -> Self {
        Self {
            elasticity,
            friction,
        }
    }

    /// Combined coefficients of two touching surfaces (products of both sides).
    pub fn combine_pair(a: &Self, b: &Self) -> Self {
        Self {
            elasticity: a.elasticity * b.elasticity,
            friction: a.friction * b.friction,
        }
    }
}

/// Group/category/mask collision filter.
///
/// Two filters interact unless they share a non-zero group or either side's
/// categories miss the other side's mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShapeFilter {
    pub group: u32,
    pub categories: u32,
    pub mask: u32,
}

impl Default for ShapeFilter {
    fn default() -> Self {
        Self::ALL
    }
}

impl ShapeFilter {
    pub const NO_GROUP: u32 = 0;

    /// Collides with everything.
    pub const ALL: Self = Self {
        group: Self::NO_GROUP,
        categories: u32::MAX,
        mask: u32::MAX,
    };

    /// Query filter used when picking shapes with the pointer.
    pub const GRAB: Self = Self {
        group: Self::NO_GROUP,
        categories: GRABBABLE_MASK_BIT,
        mask: GRABBABLE_MASK_BIT,
    };

    /// Shapes tagged with this filter are invisible to [`ShapeFilter::GRAB`] but collide normally.
    pub const NOT_GRABBABLE: Self = Self {
        group: Self::NO_GROUP,
        categories: !GRABBABLE_MASK_BIT,
        mask: !GRABBABLE_MASK_BIT,
    };

    pub fn new(group: u32, categories: u32, mask: u32) -> Self {
        Self {
            group,
            categories,
            mask,
        }
    }

    pub fn rejects(&self, other: &Self) -> bool {
        (self.group != Self::NO_GROUP && self.group == other.group)
            || (self.categories & other.mask) == 0
            || (other.categories & self.mask) == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grab_filter_skips_boundaries_only() {
        assert!(ShapeFilter::GRAB.rejects(&ShapeFilter::NOT_GRABBABLE));
        assert!(!ShapeFilter::GRAB.rejects(&ShapeFilter::ALL));
        assert!(!ShapeFilter::NOT_GRABBABLE.rejects(&ShapeFilter::ALL));
    }

    #[test]
    fn shared_group_rejects() {
        let a = ShapeFilter::new(3, u32::MAX, u32::MAX);
        let b = ShapeFilter::new(3, u32::MAX, u32::MAX);
        assert!(a.rejects(&b));
        assert!(!a.rejects(&ShapeFilter::ALL));
    }

    #[test]
    fn pair_material_multiplies_coefficients() {
        let pair = Material::combine_pair(&Material::new(1.0, 1.0), &Material::new(0.0, 0.8));
        assert_eq!(pair.elasticity, 0.0);
        assert!((pair.friction - 0.8).abs() < 1e-6);
    }
}
