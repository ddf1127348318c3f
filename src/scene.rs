//! Initial scene: screen boundaries, a pyramid of boxes and a heavy ball.

use glam::Vec2;
use log::debug;

use crate::config::SandboxConfig;
use crate::core::{body::Body, shape::Shape, types::ShapeFilter};
use crate::utils::allocator::BodyHandle;
use crate::utils::math::{moment_for_box, moment_for_circle};
use crate::world::{World, WorldSettings};

pub const PYRAMID_ROWS: usize = 12;
pub const BOX_WIDTH: f32 = 20.0;
pub const BOX_HEIGHT: f32 = BOX_WIDTH * 1.618;
pub const BOX_ROUNDING: f32 = 0.5;
pub const BOX_MASS: f32 = 1.0;
pub const BOX_SPACING: f32 = 32.0;
pub const BALL_RADIUS: f32 = 15.0;
pub const BALL_MASS: f32 = 10.0;

/// A freshly built world plus the kinematic body the pointer drags with.
pub struct Scene {
    pub world: World,
    /// Detached from the world: referenced by drag constraints only.
    pub drag_proxy: BodyHandle,
}

pub struct SceneBuilder {
    settings: WorldSettings,
}

impl SceneBuilder {
    pub fn new(config: &SandboxConfig) -> Self {
        Self {
            settings: WorldSettings::from_config(config),
        }
    }

    pub fn with_settings(settings: WorldSettings) -> Self {
        Self { settings }
    }

    pub fn build(&self, width: f32, height: f32) -> Scene {
        let mut world = World::new(self.settings.clone());

        Self::add_boundaries(&mut world, width, height);
        let boxes = Self::add_pyramid(&mut world, width);
        Self::add_ball(&mut world, width, height);
        let drag_proxy = world.add_detached_body(Body::kinematic());

        debug!(
            "Scene built ({width} x {height}): {} boxes, {} bodies, {} shapes",
            boxes,
            world.body_count(),
            world.shape_count()
        );
        Scene { world, drag_proxy }
    }

    fn add_boundaries(world: &mut World, width: f32, height: f32) {
        let anchor = world.static_body();
        let edges = [
            (Vec2::new(0.0, -height), Vec2::new(0.0, height)),
            (Vec2::new(width, -height), Vec2::new(width, height)),
            (Vec2::new(0.0, height), Vec2::new(width, height)),
        ];
        for (a, b) in edges {
            world.add_shape(
                Shape::builder(anchor)
                    .segment(a, b, 0.0)
                    .elasticity(1.0)
                    .friction(1.0)
                    .filter(ShapeFilter::NOT_GRABBABLE)
                    .build(),
            );
        }
    }

    fn add_pyramid(world: &mut World, width: f32) -> usize {
        let mut count = 0;
        for row in 0..PYRAMID_ROWS {
            for column in 0..=row {
                let position = Vec2::new(
                    width / 2.0 + column as f32 * BOX_SPACING - row as f32 * (BOX_SPACING / 2.0),
                    row as f32 * BOX_WIDTH * 2.0,
                );
                let body = world.add_body(
                    Body::dynamic(BOX_MASS, moment_for_box(BOX_MASS, BOX_WIDTH, BOX_HEIGHT))
                        .with_position(position),
                );
                world.add_shape(
                    Shape::builder(body)
                        .box_shape(BOX_WIDTH, BOX_HEIGHT, BOX_ROUNDING)
                        .elasticity(0.0)
                        .friction(0.8)
                        .build(),
                );
                count += 1;
            }
        }
        count
    }

    fn add_ball(world: &mut World, width: f32, height: f32) {
        let body = world.add_body(
            Body::dynamic(BALL_MASS, moment_for_circle(BALL_MASS, 0.0, BALL_RADIUS, Vec2::ZERO))
                .with_position(Vec2::new(width / 2.0, -height / 2.0 + BALL_RADIUS + 5.0)),
        );
        world.add_shape(
            Shape::builder(body)
                .circle(BALL_RADIUS, Vec2::ZERO)
                .elasticity(0.0)
                .friction(0.9)
                .build(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proxy_is_kinematic_and_detached() {
        let scene = SceneBuilder::new(&SandboxConfig::default()).build(480.0, 480.0);
        let proxy = scene.world.body(scene.drag_proxy).expect("proxy is stored");
        assert!(proxy.is_kinematic());
        assert!(proxy.is_detached());
        assert!(!proxy.has_finite_mass());
    }

    #[test]
    fn explicit_settings_are_used() {
        let settings = WorldSettings {
            iterations: 3,
            ..WorldSettings::default()
        };
        let scene = SceneBuilder::with_settings(settings).build(200.0, 200.0);
        assert_eq!(scene.world.settings().iterations, 3);
        assert_eq!(scene.world.shape_count(), 82);
    }

    #[test]
    fn pyramid_apex_is_centered() {
        let scene = SceneBuilder::new(&SandboxConfig::default()).build(480.0, 480.0);
        let mut apex = None;
        scene.world.each_body(|body| {
            if apex.is_none() && body.mass() == BOX_MASS {
                apex = Some(body.position);
            }
        });
        assert_eq!(apex, Some(Vec2::new(240.0, 0.0)));
    }
}
