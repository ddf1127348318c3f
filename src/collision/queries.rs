use glam::Vec2;

use crate::{
    core::{body::Body, shape::Shape, shape::ShapeGeometry, types::ShapeFilter},
    utils::{
        allocator::{Arena, BodyHandle, ShapeHandle},
        math::{closest_point_on_segment, outward_normal},
    },
};

/// Result of a nearest-point query against a shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointQueryInfo {
    pub shape: ShapeHandle,
    pub body: BodyHandle,
    /// Closest point on the shape's surface.
    pub point: Vec2,
    /// Signed distance to the surface; negative when the query point is inside.
    pub distance: f32,
    /// Direction of increasing distance at `point`.
    pub gradient: Vec2,
}

/// Surface point, signed distance and gradient of a world-space geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceProjection {
    pub point: Vec2,
    pub distance: f32,
    pub gradient: Vec2,
}

pub struct PointQuery;

impl PointQuery {
    /// Nearest shape whose surface lies within `max_distance` of `point`.
    ///
    /// Sensors, shapes rejected by `filter` and shapes on detached bodies are ignored.
    /// Ties keep the shape inserted first.
    pub fn nearest(
        point: Vec2,
        max_distance: f32,
        filter: ShapeFilter,
        shapes: &Arena<Shape>,
        bodies: &Arena<Body>,
    ) -> Option<PointQueryInfo> {
        let mut best: Option<PointQueryInfo> = None;

        for (_, shape) in shapes.iter() {
            if shape.sensor || filter.rejects(&shape.filter) {
                continue;
            }
            let body = match bodies.get(shape.body) {
                Some(b) if !b.is_detached() => b,
                _ => continue,
            };

            let projection = Self::project(&shape.geometry.transformed(body), point);
            if projection.distance > max_distance {
                continue;
            }
            if best.is_some_and(|b| b.distance <= projection.distance) {
                continue;
            }
            best = Some(PointQueryInfo {
                shape: shape.id,
                body: shape.body,
                point: projection.point,
                distance: projection.distance,
                gradient: projection.gradient,
            });
        }

        best
    }

    pub fn project(geometry: &ShapeGeometry, point: Vec2) -> SurfaceProjection {
        match geometry {
            ShapeGeometry::Circle { center, radius } => Self::round_point(*center, *radius, point),
            ShapeGeometry::Segment { a, b, radius } => {
                Self::round_point(closest_point_on_segment(point, *a, *b), *radius, point)
            }
            ShapeGeometry::Polygon { vertices, radius } => Self::polygon(vertices, *radius, point),
        }
    }

    fn round_point(center: Vec2, radius: f32, point: Vec2) -> SurfaceProjection {
        let delta = point - center;
        let dist = delta.length();
        let gradient = if dist > f32::EPSILON { delta / dist } else { Vec2::X };
        SurfaceProjection {
            point: center + gradient * radius,
            distance: dist - radius,
            gradient,
        }
    }

    fn polygon(vertices: &[Vec2], radius: f32, point: Vec2) -> SurfaceProjection {
        let count = vertices.len();
        let mut max_separation = f32::NEG_INFINITY;
        let mut max_normal = Vec2::X;
        let mut closest = vertices[0];
        let mut closest_dist_sq = f32::INFINITY;

        for i in 0..count {
            let (v0, v1) = (vertices[i], vertices[(i + 1) % count]);
            let normal = outward_normal(v0, v1);
            let separation = normal.dot(point - v0);
            if separation > max_separation {
                max_separation = separation;
                max_normal = normal;
            }
            let candidate = closest_point_on_segment(point, v0, v1);
            let dist_sq = candidate.distance_squared(point);
            if dist_sq < closest_dist_sq {
                closest_dist_sq = dist_sq;
                closest = candidate;
            }
        }

        if max_separation > 0.0 {
            Self::round_point(closest, radius, point)
        } else {
            // Inside the core polygon: leave through the least penetrated edge.
            let surface = point - max_normal * max_separation;
            SurfaceProjection {
                point: surface + max_normal * radius,
                distance: max_separation - radius,
                gradient: max_normal,
            }
        }
    }
}
