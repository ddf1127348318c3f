//! Additional 2D math helpers layered on top of `glam`.

use glam::{Mat2, Vec2};

/// Moment of inertia of a solid box of the given width and height about its center.
pub fn moment_for_box(mass: f32, width: f32, height: f32) -> f32 {
    mass * (width * width + height * height) / 12.0
}

/// Moment of inertia of a hollow (or solid, `inner = 0`) circle with its center at `offset`.
pub fn moment_for_circle(mass: f32, inner_radius: f32, outer_radius: f32, offset: Vec2) -> f32 {
    mass * (0.5 * (inner_radius * inner_radius + outer_radius * outer_radius)
        + offset.length_squared())
}

/// Closest point to `point` on the segment `a`-`b`.
pub fn closest_point_on_segment(point: Vec2, a: Vec2, b: Vec2) -> Vec2 {
    let delta = b - a;
    let length_sq = delta.length_squared();
    if length_sq <= f32::EPSILON {
        return a;
    }
    let t = ((point - a).dot(delta) / length_sq).clamp(0.0, 1.0);
    a + delta * t
}

/// Outward normal of the edge `a -> b` of a counter-clockwise polygon.
pub fn outward_normal(a: Vec2, b: Vec2) -> Vec2 {
    let edge = b - a;
    Vec2::new(edge.y, -edge.x).normalize_or_zero()
}

/// Twice the signed area of a polygon; positive for counter-clockwise winding.
pub fn signed_area2(vertices: &[Vec2]) -> f32 {
    let n = vertices.len();
    (0..n)
        .map(|i| vertices[i].perp_dot(vertices[(i + 1) % n]))
        .sum()
}

/// Velocity-space bias coefficient for an error that should shrink to `error_bias` per second.
pub fn bias_coefficient(error_bias: f32, dt: f32) -> f32 {
    1.0 - error_bias.powf(dt)
}

/// Effective mass (the inverse of the K matrix) of a point constraint between two bodies.
///
/// Returns `Mat2::ZERO` when both bodies are immovable.
pub fn k_tensor(
    inverse_mass_a: f32,
    inverse_moment_a: f32,
    r_a: Vec2,
    inverse_mass_b: f32,
    inverse_moment_b: f32,
    r_b: Vec2,
) -> Mat2 {
    let mass_sum = inverse_mass_a + inverse_mass_b;

    let mut k11 = mass_sum;
    let mut k12 = 0.0;
    let mut k22 = mass_sum;

    k11 += r_a.y * r_a.y * inverse_moment_a;
    k12 += -r_a.x * r_a.y * inverse_moment_a;
    k22 += r_a.x * r_a.x * inverse_moment_a;

    k11 += r_b.y * r_b.y * inverse_moment_b;
    k12 += -r_b.x * r_b.y * inverse_moment_b;
    k22 += r_b.x * r_b.x * inverse_moment_b;

    let determinant = k11 * k22 - k12 * k12;
    if determinant.abs() <= f32::EPSILON {
        return Mat2::ZERO;
    }
    let inverse = 1.0 / determinant;
    Mat2::from_cols(
        Vec2::new(k22 * inverse, -k12 * inverse),
        Vec2::new(-k12 * inverse, k11 * inverse),
    )
}
