use glam::Vec2;

use super::clipping::{clip_to_reference_sides, ClipVertex};
use crate::core::shape::ShapeGeometry;
use crate::utils::math::{closest_point_on_segment, outward_normal};

/// Single contact point produced by the narrow phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManifoldPoint {
    /// Midpoint between the two surfaces, in world space.
    pub point: Vec2,
    /// Penetration depth; positive when overlapping.
    pub depth: f32,
    /// Identifies the pair of features that produced the point, for warm starting.
    pub feature: u32,
}

/// Contact manifold; `normal` points from shape A toward shape B.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifold {
    pub normal: Vec2,
    pub points: Vec<ManifoldPoint>,
}

impl Manifold {
    fn single(normal: Vec2, point: Vec2, depth: f32) -> Self {
        Self {
            normal,
            points: vec![ManifoldPoint {
                point,
                depth,
                feature: 0,
            }],
        }
    }

    /// Same contact seen from the other shape.
    pub fn flipped(mut self) -> Self {
        self.normal = -self.normal;
        self
    }
}

/// Narrow phase dispatcher over world-space geometries.
pub struct NarrowPhase;

impl NarrowPhase {
    /// Surfaces closer than this still form a contact, so resting stacks keep their manifolds.
    const SEPARATION_TOLERANCE: f32 = 0.0;
    /// Bias toward shape A's faces when choosing the reference edge.
    const REFERENCE_TOLERANCE: f32 = 1e-3;

    pub fn collide(a: &ShapeGeometry, b: &ShapeGeometry) -> Option<Manifold> {
        use ShapeGeometry::*;

        match (a, b) {
            (Circle { center: ca, radius: ra }, Circle { center: cb, radius: rb }) => {
                Self::circles(*ca, *ra, *cb, *rb)
            }
            (Circle { center, radius }, Segment { a: sa, b: sb, radius: rs }) => {
                let closest = closest_point_on_segment(*center, *sa, *sb);
                Self::circles(*center, *radius, closest, *rs)
            }
            (Segment { .. }, Circle { .. }) => Self::collide(b, a).map(Manifold::flipped),
            (Circle { center, radius }, Polygon { vertices, radius: rp }) => {
                Self::circle_polygon(*center, *radius, vertices, *rp).map(Manifold::flipped)
            }
            (Polygon { vertices, radius: rp }, Circle { center, radius }) => {
                Self::circle_polygon(*center, *radius, vertices, *rp)
            }
            (Segment { a: sa, b: sb, radius: rs }, Polygon { vertices, radius: rp }) => {
                Self::polygons(&[*sa, *sb], *rs, vertices, *rp)
            }
            (Polygon { vertices, radius: rp }, Segment { a: sa, b: sb, radius: rs }) => {
                Self::polygons(vertices, *rp, &[*sa, *sb], *rs)
            }
            (Segment { a: a0, b: a1, radius: ra }, Segment { a: b0, b: b1, radius: rb }) => {
                Self::polygons(&[*a0, *a1], *ra, &[*b0, *b1], *rb)
            }
            (Polygon { vertices: va, radius: ra }, Polygon { vertices: vb, radius: rb }) => {
                Self::polygons(va, *ra, vb, *rb)
            }
        }
    }

    fn circles(ca: Vec2, ra: f32, cb: Vec2, rb: f32) -> Option<Manifold> {
        let delta = cb - ca;
        let radius_sum = ra + rb;
        let dist_sq = delta.length_squared();
        if dist_sq >= radius_sum * radius_sum {
            return None;
        }
        let dist = dist_sq.sqrt();
        let normal = if dist > f32::EPSILON { delta / dist } else { Vec2::X };
        let point = ((ca + normal * ra) + (cb - normal * rb)) * 0.5;
        Some(Manifold::single(normal, point, radius_sum - dist))
    }

    /// Normal points from the polygon toward the circle.
    fn circle_polygon(center: Vec2, radius: f32, vertices: &[Vec2], poly_radius: f32) -> Option<Manifold> {
        let count = vertices.len();
        let mut max_separation = f32::NEG_INFINITY;
        let mut best_edge = 0;
        for i in 0..count {
            let normal = outward_normal(vertices[i], vertices[(i + 1) % count]);
            let separation = normal.dot(center - vertices[i]);
            if separation > max_separation {
                max_separation = separation;
                best_edge = i;
            }
        }

        let radius_sum = radius + poly_radius;
        let (surface, normal, dist) = if max_separation > 0.0 {
            let mut closest = vertices[0];
            let mut closest_dist_sq = f32::INFINITY;
            for i in 0..count {
                let candidate = closest_point_on_segment(center, vertices[i], vertices[(i + 1) % count]);
                let dist_sq = candidate.distance_squared(center);
                if dist_sq < closest_dist_sq {
                    closest_dist_sq = dist_sq;
                    closest = candidate;
                }
            }
            let dist = closest_dist_sq.sqrt();
            if dist >= radius_sum {
                return None;
            }
            let normal = if dist > f32::EPSILON {
                (center - closest) / dist
            } else {
                outward_normal(vertices[best_edge], vertices[(best_edge + 1) % count])
            };
            (closest, normal, dist)
        } else {
            let normal = outward_normal(vertices[best_edge], vertices[(best_edge + 1) % count]);
            (center - normal * max_separation, normal, max_separation)
        };

        let point = ((surface + normal * poly_radius) + (center - normal * radius)) * 0.5;
        Some(Manifold::single(normal, point, radius_sum - dist))
    }

    /// Rounded SAT between convex vertex loops; a segment is a two-vertex loop.
    fn polygons(va: &[Vec2], ra: f32, vb: &[Vec2], rb: f32) -> Option<Manifold> {
        let radius_sum = ra + rb;
        let (sep_a, edge_a) = Self::max_separation(va, vb);
        if sep_a > radius_sum + Self::SEPARATION_TOLERANCE {
            return None;
        }
        let (sep_b, edge_b) = Self::max_separation(vb, va);
        if sep_b > radius_sum + Self::SEPARATION_TOLERANCE {
            return None;
        }

        let flip = sep_b > sep_a + Self::REFERENCE_TOLERANCE;
        let (reference, r_ref, ref_edge, incident, r_inc) = if flip {
            (vb, rb, edge_b, va, ra)
        } else {
            (va, ra, edge_a, vb, rb)
        };

        let r0 = reference[ref_edge];
        let r1 = reference[(ref_edge + 1) % reference.len()];
        let normal = outward_normal(r0, r1);

        let inc_edge = Self::incident_edge(incident, normal);
        let inc_next = (inc_edge + 1) % incident.len();
        let incident_vertices = [
            ClipVertex {
                point: incident[inc_edge],
                tag: 0,
            },
            ClipVertex {
                point: incident[inc_next],
                tag: 1,
            },
        ];
        let clipped = clip_to_reference_sides(incident_vertices, r0, r1)?;

        let feature_base = (u32::from(flip) << 24) | ((ref_edge as u32 & 0xff) << 16) | ((inc_edge as u32 & 0xff) << 8);
        let points: Vec<ManifoldPoint> = clipped
            .iter()
            .filter_map(|vertex| {
                let separation = normal.dot(vertex.point - r0);
                if separation > radius_sum + Self::SEPARATION_TOLERANCE {
                    return None;
                }
                Some(ManifoldPoint {
                    point: vertex.point + normal * ((r_ref - r_inc - separation) * 0.5),
                    depth: radius_sum - separation,
                    feature: feature_base | u32::from(vertex.tag),
                })
            })
            .collect();

        if points.is_empty() {
            return None;
        }
        let normal = if flip { -normal } else { normal };
        Some(Manifold { normal, points })
    }

    /// Largest separation of `other` along the edge normals of `vertices`.
    fn max_separation(vertices: &[Vec2], other: &[Vec2]) -> (f32, usize) {
        let count = vertices.len();
        let mut best = (f32::NEG_INFINITY, 0);
        for i in 0..count {
            let v = vertices[i];
            let normal = outward_normal(v, vertices[(i + 1) % count]);
            let separation = other
                .iter()
                .map(|p| normal.dot(*p - v))
                .fold(f32::INFINITY, f32::min);
            if separation > best.0 {
                best = (separation, i);
            }
        }
        best
    }

    /// Edge of `vertices` most anti-parallel to `normal`.
    fn incident_edge(vertices: &[Vec2], normal: Vec2) -> usize {
        let count = vertices.len();
        let mut best = 0;
        let mut min_dot = f32::INFINITY;
        for i in 0..count {
            let dot = outward_normal(vertices[i], vertices[(i + 1) % count]).dot(normal);
            if dot < min_dot {
                min_dot = dot;
                best = i;
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square(center: Vec2, half: f32) -> ShapeGeometry {
        ShapeGeometry::Polygon {
            vertices: vec![
                center + Vec2::new(-half, -half),
                center + Vec2::new(half, -half),
                center + Vec2::new(half, half),
                center + Vec2::new(-half, half),
            ],
            radius: 0.0,
        }
    }

    #[test]
    fn overlapping_circles_report_depth_and_normal() {
        let a = ShapeGeometry::Circle {
            center: Vec2::ZERO,
            radius: 1.0,
        };
        let b = ShapeGeometry::Circle {
            center: Vec2::new(1.5, 0.0),
            radius: 1.0,
        };
        let manifold = NarrowPhase::collide(&a, &b).expect("circles overlap");
        assert_relative_eq!(manifold.normal.x, 1.0);
        assert_relative_eq!(manifold.points[0].depth, 0.5, epsilon = 1e-5);
        assert_relative_eq!(manifold.points[0].point.x, 0.75, epsilon = 1e-5);
    }

    #[test]
    fn separated_circles_do_not_collide() {
        let a = ShapeGeometry::Circle {
            center: Vec2::ZERO,
            radius: 1.0,
        };
        let b = ShapeGeometry::Circle {
            center: Vec2::new(3.0, 0.0),
            radius: 1.0,
        };
        assert!(NarrowPhase::collide(&a, &b).is_none());
    }

    #[test]
    fn box_resting_on_segment_has_two_points() {
        let floor = ShapeGeometry::Segment {
            a: Vec2::new(-100.0, 0.0),
            b: Vec2::new(100.0, 0.0),
            radius: 0.0,
        };
        // y grows downward: the box sits above the floor, overlapping by 0.5.
        let block = square(Vec2::new(0.0, -9.5), 10.0);
        let manifold = NarrowPhase::collide(&block, &floor).expect("box touches floor");
        assert_eq!(manifold.points.len(), 2);
        assert_relative_eq!(manifold.normal.y, 1.0, epsilon = 1e-5);
        for point in &manifold.points {
            assert_relative_eq!(point.depth, 0.5, epsilon = 1e-4);
        }
        let flipped = NarrowPhase::collide(&floor, &block).expect("symmetric test");
        assert_relative_eq!(flipped.normal.y, -1.0, epsilon = 1e-5);
    }

    #[test]
    fn circle_inside_polygon_is_pushed_out_through_nearest_face() {
        let block = square(Vec2::ZERO, 10.0);
        let ball = ShapeGeometry::Circle {
            center: Vec2::new(8.0, 0.0),
            radius: 1.0,
        };
        let manifold = NarrowPhase::collide(&block, &ball).expect("ball overlaps box");
        assert_relative_eq!(manifold.normal.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(manifold.points[0].depth, 3.0, epsilon = 1e-4);
    }

    #[test]
    fn features_are_stable_across_calls() {
        let a = square(Vec2::ZERO, 5.0);
        let b = square(Vec2::new(0.0, 9.0), 5.0);
        let first = NarrowPhase::collide(&a, &b).expect("boxes overlap");
        let second = NarrowPhase::collide(&a, &b).expect("boxes overlap");
        assert_eq!(first, second);
        assert_ne!(first.points[0].feature, first.points[1].feature);
    }
}
