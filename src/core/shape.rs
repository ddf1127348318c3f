use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::Body;
use super::types::{Material, ShapeFilter};
use crate::utils::allocator::{BodyHandle, ShapeHandle};
use crate::utils::math::signed_area2;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_points(points: &[Vec2]) -> Self {
        let mut min = Vec2::splat(f32::INFINITY);
        let mut max = Vec2::splat(f32::NEG_INFINITY);
        for point in points {
            min = min.min(*point);
            max = max.max(*point);
        }
        Self { min, max }
    }

    pub fn expanded(self, amount: f32) -> Self {
        Self {
            min: self.min - Vec2::splat(amount),
            max: self.max + Vec2::splat(amount),
        }
    }

    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }
}

/// Geometric form of a shape. Coordinates are body-local unless produced by
/// [`ShapeGeometry::transformed`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShapeGeometry {
    Circle {
        center: Vec2,
        radius: f32,
    },
    /// A capsule: the segment `a`-`b` swept by `radius`.
    Segment {
        a: Vec2,
        b: Vec2,
        radius: f32,
    },
    /// Convex polygon, counter-clockwise, with rounded corners of `radius`.
    Polygon {
        vertices: Vec<Vec2>,
        radius: f32,
    },
}

impl ShapeGeometry {
    /// The same geometry expressed in world coordinates for `body`.
    pub fn transformed(&self, body: &Body) -> Self {
        match self {
            Self::Circle { center, radius } => Self::Circle {
                center: body.local_to_world(*center),
                radius: *radius,
            },
            Self::Segment { a, b, radius } => Self::Segment {
                a: body.local_to_world(*a),
                b: body.local_to_world(*b),
                radius: *radius,
            },
            Self::Polygon { vertices, radius } => Self::Polygon {
                vertices: vertices.iter().map(|v| body.local_to_world(*v)).collect(),
                radius: *radius,
            },
        }
    }

    pub fn radius(&self) -> f32 {
        match self {
            Self::Circle { radius, .. }
            | Self::Segment { radius, .. }
            | Self::Polygon { radius, .. } => *radius,
        }
    }

    pub fn aabb(&self) -> Aabb {
        match self {
            Self::Circle { center, radius } => {
                Aabb::new(*center - Vec2::splat(*radius), *center + Vec2::splat(*radius))
            }
            Self::Segment { a, b, radius } => Aabb::from_points(&[*a, *b]).expanded(*radius),
            Self::Polygon { vertices, radius } => Aabb::from_points(vertices).expanded(*radius),
        }
    }
}

/// Collidable geometry attached to a body.
#[derive(Debug, Clone)]
pub struct Shape {
    pub id: ShapeHandle,
    pub body: BodyHandle,
    pub geometry: ShapeGeometry,
    pub filter: ShapeFilter,
    pub sensor: bool,
    pub material: Material,
    /// Stable identity token assigned by the world in insertion order.
    pub hash_id: u32,
}

impl Shape {
    pub fn builder(body: BodyHandle) -> ShapeBuilder {
        ShapeBuilder::new(body)
    }

    pub fn elasticity(&self) -> f32 {
        self.material.elasticity
    }

    pub fn friction(&self) -> f32 {
        self.material.friction
    }
}

pub struct ShapeBuilder {
    body: BodyHandle,
    geometry: ShapeGeometry,
    filter: ShapeFilter,
    sensor: bool,
    material: Material,
}

impl ShapeBuilder {
    pub fn new(body: BodyHandle) -> Self {
        Self {
            body,
            geometry: ShapeGeometry::Circle {
                center: Vec2::ZERO,
                radius: 1.0,
            },
            filter: ShapeFilter::default(),
            sensor: false,
            material: Material::default(),
        }
    }

    pub fn circle(mut self, radius: f32, center: Vec2) -> Self {
        self.geometry = ShapeGeometry::Circle { center, radius };
        self
    }

    pub fn segment(mut self, a: Vec2, b: Vec2, radius: f32) -> Self {
        self.geometry = ShapeGeometry::Segment { a, b, radius };
        self
    }

    /// Box centered on the body origin.
    pub fn box_shape(self, width: f32, height: f32, radius: f32) -> Self {
        let hw = width * 0.5;
        let hh = height * 0.5;
        self.polygon(
            vec![
                Vec2::new(-hw, -hh),
                Vec2::new(hw, -hh),
                Vec2::new(hw, hh),
                Vec2::new(-hw, hh),
            ],
            radius,
        )
    }

    /// Convex polygon; clockwise input is reversed so the winding is always counter-clockwise.
    pub fn polygon(mut self, mut vertices: Vec<Vec2>, radius: f32) -> Self {
        debug_assert!(vertices.len() >= 3, "polygons need at least three vertices");
        if signed_area2(&vertices) < 0.0 {
            vertices.reverse();
        }
        self.geometry = ShapeGeometry::Polygon { vertices, radius };
        self
    }

    pub fn filter(mut self, filter: ShapeFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn sensor(mut self, sensor: bool) -> Self {
        self.sensor = sensor;
        self
    }

    pub fn elasticity(mut self, elasticity: f32) -> Self {
        self.material.elasticity = elasticity;
        self
    }

    pub fn friction(mut self, friction: f32) -> Self {
        self.material.friction = friction;
        self
    }

    pub fn build(self) -> Shape {
        Shape {
            id: ShapeHandle::default(),
            body: self.body,
            geometry: self.geometry,
            filter: self.filter,
            sensor: self.sensor,
            material: self.material,
            hash_id: 0,
        }
    }
}
