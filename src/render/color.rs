use serde::{Deserialize, Serialize};

use crate::core::{body::Body, shape::Shape};

/// Linear RGBA color with channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Neutral gray of lightness `l`.
    pub const fn luminance(l: f32, a: f32) -> Self {
        Self::new(l, l, l, a)
    }

    /// Packs to `0xRRGGBBFF`; alpha is always written opaque.
    pub fn to_rgba8(self) -> u32 {
        let channel = |v: f32| (v * 255.0) as u32;
        (channel(self.r) << 24) | (channel(self.g) << 16) | (channel(self.b) << 8) | 0xFF
    }
}

pub const SENSOR_COLOR: Rgba = Rgba::luminance(1.0, 0.1);
pub const SLEEPING_COLOR: Rgba = Rgba::luminance(0.2, 1.0);
pub const IDLE_COLOR: Rgba = Rgba::luminance(0.66, 1.0);

pub const STATIC_INTENSITY: f32 = 0.15;
pub const DYNAMIC_INTENSITY: f32 = 0.75;

/// Robert Jenkins' 32-bit integer hash.
pub fn mix_hash(mut val: u32) -> u32 {
    val = val.wrapping_add(0x7ed5_5d16).wrapping_add(val << 12);
    val = (val ^ 0xc761_c23c) ^ (val >> 19);
    val = val.wrapping_add(0x1656_67b1).wrapping_add(val << 5);
    val = val.wrapping_add(0xd3a2_646c) ^ (val << 9);
    val = val.wrapping_add(0xfd70_46c5).wrapping_add(val << 3);
    val = (val ^ 0xb55a_4f09) ^ (val >> 16);
    val
}

/// Saturated color derived from a shape's hash id, scaled to `intensity`.
pub fn hashed_color(hash_id: u32, intensity: f32) -> Rgba {
    let val = mix_hash(hash_id);
    let r = (val & 0xFF) as f32;
    let g = ((val >> 8) & 0xFF) as f32;
    let b = ((val >> 16) & 0xFF) as f32;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    if min == max {
        return Rgba::new(intensity, 0.0, 0.0, 1.0);
    }
    let coef = intensity / (max - min);
    Rgba::new((r - min) * coef, (g - min) * coef, (b - min) * coef, 1.0)
}

/// Display color of a shape.
///
/// Sensors are translucent, sleeping bodies dark gray, bodies idle past
/// `sleep_time_threshold` light gray; everything else gets its hash color.
pub fn color_for_shape(shape: &Shape, body: &Body, sleep_time_threshold: f32) -> Rgba {
    if shape.sensor {
        return SENSOR_COLOR;
    }
    if body.is_sleeping() {
        return SLEEPING_COLOR;
    }
    if body.sleeping.idle_time > sleep_time_threshold {
        return IDLE_COLOR;
    }
    let intensity = if body.is_static() {
        STATIC_INTENSITY
    } else {
        DYNAMIC_INTENSITY
    };
    hashed_color(shape.hash_id, intensity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::allocator::BodyHandle;
    use glam::Vec2;

    #[test]
    fn jenkins_mix_matches_reference_values() {
        assert_eq!(mix_hash(0), 0x6b4e_d927);
        assert_eq!(mix_hash(1), 0xb486_81b6);
    }

    #[test]
    fn packs_channels_big_endian_with_opaque_alpha() {
        assert_eq!(Rgba::new(1.0, 0.0, 0.0, 0.2).to_rgba8(), 0xFF00_00FF);
        assert_eq!(Rgba::luminance(0.2, 1.0).to_rgba8(), 0x3333_33FF);
    }

    #[test]
    fn priority_order_is_sensor_sleep_idle_hash() {
        let mut shape = Shape::builder(BodyHandle::default())
            .circle(1.0, Vec2::ZERO)
            .sensor(true)
            .build();
        let mut body = Body::dynamic(1.0, 1.0);
        body.sleeping.asleep = true;
        assert_eq!(color_for_shape(&shape, &body, 0.5), SENSOR_COLOR);

        shape.sensor = false;
        assert_eq!(color_for_shape(&shape, &body, 0.5), SLEEPING_COLOR);

        body.sleeping.asleep = false;
        body.sleeping.idle_time = 0.6;
        assert_eq!(color_for_shape(&shape, &body, 0.5), IDLE_COLOR);

        body.sleeping.idle_time = 0.0;
        assert_eq!(
            color_for_shape(&shape, &body, 0.5),
            hashed_color(shape.hash_id, DYNAMIC_INTENSITY)
        );
    }

    #[test]
    fn hashed_channels_span_zero_to_intensity() {
        let color = hashed_color(7, DYNAMIC_INTENSITY);
        let channels = [color.r, color.g, color.b];
        let max = channels.iter().copied().fold(f32::MIN, f32::max);
        let min = channels.iter().copied().fold(f32::MAX, f32::min);
        assert!((max - DYNAMIC_INTENSITY).abs() < 1e-6);
        assert_eq!(min, 0.0);
    }
}
