//! Backend-agnostic debug drawing.
//!
//! Implement [`DebugDraw`] for a graphics backend, then call [`debug_draw`]
//! once per frame. [`DrawList`] records the primitives instead of drawing
//! them, which is what the headless demo and the tests use.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::color::{color_for_shape, Rgba};
use crate::core::{constraint::Joint, shape::ShapeGeometry};
use crate::world::World;

/// Size of the dots marking a pivot joint's anchors.
pub const PIVOT_DOT_SIZE: f32 = 5.0;
/// Size of the dots marking contact points.
pub const CONTACT_DOT_SIZE: f32 = 2.0;

/// Primitive sink for [`debug_draw`]. All coordinates are world-space.
pub trait DebugDraw {
    fn circle(&mut self, center: Vec2, angle: f32, radius: f32, outline: Rgba, fill: Rgba);

    fn segment(&mut self, a: Vec2, b: Vec2, color: Rgba);

    /// Capsule of `radius` around `a`-`b`. Backends without capsules get a plain line.
    fn fat_segment(&mut self, a: Vec2, b: Vec2, radius: f32, outline: Rgba, fill: Rgba) {
        let _ = (radius, outline);
        self.segment(a, b, fill);
    }

    /// Convex polygon, counter-clockwise, with corners rounded by `radius`.
    fn polygon(&mut self, vertices: &[Vec2], radius: f32, outline: Rgba, fill: Rgba);

    fn dot(&mut self, size: f32, position: Vec2, color: Rgba);
}

/// Which layers to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawFlags {
    pub shapes: bool,
    pub constraints: bool,
    pub collision_points: bool,
}

impl Default for DrawFlags {
    fn default() -> Self {
        Self {
            shapes: true,
            constraints: true,
            collision_points: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawOptions {
    pub flags: DrawFlags,
    pub outline_color: Rgba,
    pub constraint_color: Rgba,
    pub collision_point_color: Rgba,
}

impl Default for DrawOptions {
    fn default() -> Self {
        Self {
            flags: DrawFlags::default(),
            outline_color: Rgba::new(200.0 / 255.0, 210.0 / 255.0, 230.0 / 255.0, 1.0),
            constraint_color: Rgba::new(0.0, 0.75, 0.0, 1.0),
            collision_point_color: Rgba::new(1.0, 0.0, 0.0, 1.0),
        }
    }
}

/// Emits the current state of `world`: shapes first, then joints, then contacts.
pub fn debug_draw(world: &World, options: &DrawOptions, drawer: &mut impl DebugDraw) {
    let flags = options.flags;
    let outline = options.outline_color;

    if flags.shapes {
        let threshold = world.settings().sleep_time_threshold;
        world.each_shape(|shape| {
            let Some(body) = world.body(shape.body) else {
                return;
            };
            let fill = color_for_shape(shape, body, threshold);
            match shape.geometry.transformed(body) {
                ShapeGeometry::Circle { center, radius } => {
                    drawer.circle(center, body.angle, radius, outline, fill)
                }
                ShapeGeometry::Segment { a, b, radius } => {
                    drawer.fat_segment(a, b, radius, outline, fill)
                }
                ShapeGeometry::Polygon { vertices, radius } => {
                    drawer.polygon(&vertices, radius, outline, fill)
                }
            }
        });
    }

    if flags.constraints {
        world.each_constraint(|constraint| {
            let (Some(a), Some(b)) = (world.body(constraint.body_a), world.body(constraint.body_b))
            else {
                return;
            };
            match constraint.joint {
                Joint::Pivot { anchor_a, anchor_b } => {
                    drawer.dot(PIVOT_DOT_SIZE, a.local_to_world(anchor_a), options.constraint_color);
                    drawer.dot(PIVOT_DOT_SIZE, b.local_to_world(anchor_b), options.constraint_color);
                }
            }
        });
    }

    if flags.collision_points {
        for point in world.contact_points() {
            drawer.dot(CONTACT_DOT_SIZE, point, options.collision_point_color);
        }
    }
}

/// One recorded primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawCommand {
    Circle {
        center: Vec2,
        angle: f32,
        radius: f32,
        outline: Rgba,
        fill: Rgba,
    },
    Segment {
        a: Vec2,
        b: Vec2,
        color: Rgba,
    },
    FatSegment {
        a: Vec2,
        b: Vec2,
        radius: f32,
        outline: Rgba,
        fill: Rgba,
    },
    Polygon {
        vertices: Vec<Vec2>,
        radius: f32,
        outline: Rgba,
        fill: Rgba,
    },
    Dot {
        size: f32,
        position: Vec2,
        color: Rgba,
    },
}

/// Records primitives in call order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn iter(&self) -> impl Iterator<Item = &DrawCommand> + '_ {
        self.commands.iter()
    }
}

impl DebugDraw for DrawList {
    fn circle(&mut self, center: Vec2, angle: f32, radius: f32, outline: Rgba, fill: Rgba) {
        self.commands.push(DrawCommand::Circle {
            center,
            angle,
            radius,
            outline,
            fill,
        });
    }

    fn segment(&mut self, a: Vec2, b: Vec2, color: Rgba) {
        self.commands.push(DrawCommand::Segment { a, b, color });
    }

    fn fat_segment(&mut self, a: Vec2, b: Vec2, radius: f32, outline: Rgba, fill: Rgba) {
        self.commands.push(DrawCommand::FatSegment {
            a,
            b,
            radius,
            outline,
            fill,
        });
    }

    fn polygon(&mut self, vertices: &[Vec2], radius: f32, outline: Rgba, fill: Rgba) {
        self.commands.push(DrawCommand::Polygon {
            vertices: vertices.to_vec(),
            radius,
            outline,
            fill,
        });
    }

    fn dot(&mut self, size: f32, position: Vec2, color: Rgba) {
        self.commands.push(DrawCommand::Dot {
            size,
            position,
            color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{body::Body, constraint::Constraint, shape::Shape};

    /// Counts calls and nothing else; relies on the default `fat_segment`.
    #[derive(Default)]
    struct Counter {
        circles: usize,
        segments: usize,
        polygons: usize,
        dots: usize,
    }

    impl DebugDraw for Counter {
        fn circle(&mut self, _: Vec2, _: f32, _: f32, _: Rgba, _: Rgba) {
            self.circles += 1;
        }
        fn segment(&mut self, _: Vec2, _: Vec2, _: Rgba) {
            self.segments += 1;
        }
        fn polygon(&mut self, _: &[Vec2], _: f32, _: Rgba, _: Rgba) {
            self.polygons += 1;
        }
        fn dot(&mut self, _: f32, _: Vec2, _: Rgba) {
            self.dots += 1;
        }
    }

    fn sample_world() -> World {
        let mut world = World::default();
        let ground = world.static_body();
        world.add_shape(
            Shape::builder(ground)
                .segment(Vec2::new(-50.0, 0.0), Vec2::new(50.0, 0.0), 0.0)
                .build(),
        );
        let ball = world.add_body(Body::dynamic(1.0, 1.0).with_position(Vec2::new(0.0, -20.0)));
        world.add_shape(Shape::builder(ball).circle(5.0, Vec2::ZERO).build());
        let crate_body =
            world.add_body(Body::dynamic(1.0, 1.0).with_position(Vec2::new(30.0, -20.0)));
        world.add_shape(Shape::builder(crate_body).box_shape(4.0, 4.0, 0.0).build());
        world.add_constraint(Constraint::pivot(ball, crate_body, Vec2::ZERO, Vec2::ZERO));
        world
    }

    #[test]
    fn default_fat_segment_falls_back_to_a_line() {
        let world = sample_world();
        let mut counter = Counter::default();
        debug_draw(&world, &DrawOptions::default(), &mut counter);
        assert_eq!(counter.segments, 1);
        assert_eq!(counter.circles, 1);
        assert_eq!(counter.polygons, 1);
        assert_eq!(counter.dots, 2);
    }

    #[test]
    fn pivot_dots_sit_on_world_anchors() {
        let world = sample_world();
        let mut list = DrawList::new();
        let options = DrawOptions {
            flags: DrawFlags {
                shapes: false,
                constraints: true,
                collision_points: false,
            },
            ..DrawOptions::default()
        };
        debug_draw(&world, &options, &mut list);

        let positions: Vec<Vec2> = list
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Dot { size, position, .. } if *size == PIVOT_DOT_SIZE => Some(*position),
                _ => None,
            })
            .collect();
        assert_eq!(positions, vec![Vec2::new(0.0, -20.0), Vec2::new(30.0, -20.0)]);
    }

    #[test]
    fn disabled_flags_draw_nothing() {
        let world = sample_world();
        let mut list = DrawList::new();
        let options = DrawOptions {
            flags: DrawFlags {
                shapes: false,
                constraints: false,
                collision_points: false,
            },
            ..DrawOptions::default()
        };
        debug_draw(&world, &options, &mut list);
        assert!(list.is_empty());
    }
}
