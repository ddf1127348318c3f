use glam::Vec2;

const EPSILON: f32 = 1e-4;

/// Half-plane `normal · p <= distance`.
#[derive(Debug, Clone, Copy)]
pub struct HalfPlane {
    normal: Vec2,
    distance: f32,
    /// Tag written into vertices this plane creates.
    tag: u8,
}

impl HalfPlane {
    pub fn from_point_normal(point: Vec2, normal: Vec2, tag: u8) -> Self {
        let n = normal.normalize_or_zero();
        Self {
            normal: n,
            distance: n.dot(point),
            tag,
        }
    }

    pub fn signed_distance(&self, point: Vec2) -> f32 {
        self.normal.dot(point) - self.distance
    }
}

/// A vertex of a clipped edge, tagged with where it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipVertex {
    pub point: Vec2,
    pub tag: u8,
}

/// Clips the edge `v0`-`v1` against a half-plane. Returns `None` when the edge lies fully outside.
pub fn clip_segment(v0: ClipVertex, v1: ClipVertex, plane: HalfPlane) -> Option<[ClipVertex; 2]> {
    let d0 = plane.signed_distance(v0.point);
    let d1 = plane.signed_distance(v1.point);
    let inside0 = d0 <= EPSILON;
    let inside1 = d1 <= EPSILON;

    match (inside0, inside1) {
        (true, true) => Some([v0, v1]),
        (false, false) => None,
        (true, false) => {
            let point = line_plane_intersection(v0.point, v1.point, d0, d1)?;
            Some([v0, ClipVertex { point, tag: plane.tag }])
        }
        (false, true) => {
            let point = line_plane_intersection(v0.point, v1.point, d0, d1)?;
            Some([ClipVertex { point, tag: plane.tag }, v1])
        }
    }
}

/// Clips an edge against the two side planes of a reference edge `r0`-`r1`.
pub fn clip_to_reference_sides(
    incident: [ClipVertex; 2],
    r0: Vec2,
    r1: Vec2,
) -> Option<[ClipVertex; 2]> {
    let tangent = (r1 - r0).normalize_or_zero();
    let start = HalfPlane::from_point_normal(r0, -tangent, 2);
    let end = HalfPlane::from_point_normal(r1, tangent, 3);
    let [a, b] = clip_segment(incident[0], incident[1], start)?;
    clip_segment(a, b, end)
}

fn line_plane_intersection(start: Vec2, end: Vec2, start_dist: f32, end_dist: f32) -> Option<Vec2> {
    let denom = start_dist - end_dist;
    if denom.abs() <= EPSILON {
        return None;
    }
    let t = start_dist / denom;
    Some(start + (end - start) * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn vertex(x: f32, y: f32, tag: u8) -> ClipVertex {
        ClipVertex {
            point: Vec2::new(x, y),
            tag,
        }
    }

    #[test]
    fn clips_edge_to_reference_extent() {
        let incident = [vertex(-5.0, 1.0, 0), vertex(15.0, 1.0, 1)];
        let [a, b] = clip_to_reference_sides(incident, Vec2::ZERO, Vec2::new(10.0, 0.0))
            .expect("edge overlaps the reference edge");
        assert_relative_eq!(a.point.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(b.point.x, 10.0, epsilon = 1e-5);
        assert_eq!((a.tag, b.tag), (2, 3));
    }

    #[test]
    fn edge_outside_is_rejected() {
        let incident = [vertex(20.0, 1.0, 0), vertex(30.0, 1.0, 1)];
        assert!(clip_to_reference_sides(incident, Vec2::ZERO, Vec2::new(10.0, 0.0)).is_none());
    }

    #[test]
    fn inner_vertices_keep_their_tags() {
        let incident = [vertex(2.0, 1.0, 0), vertex(8.0, 1.0, 1)];
        let [a, b] = clip_to_reference_sides(incident, Vec2::ZERO, Vec2::new(10.0, 0.0))
            .expect("edge is inside");
        assert_eq!((a.tag, b.tag), (0, 1));
    }
}
